// src/services/mod.rs
pub mod account;
pub mod chat;
pub mod submission;
pub mod token_store;
pub mod transport;
pub mod upload_validator;

pub use account::AccountClient;
pub use chat::ChatSession;
pub use submission::AnalysisSubmission;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, MultipartField, RequestBody, Transport};
pub use upload_validator::UploadValidator;
