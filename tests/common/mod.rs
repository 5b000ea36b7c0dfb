#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use async_trait::async_trait;
use glowguide::SubmissionError;
use glowguide::models::SelectedFile;
use glowguide::services::{ApiRequest, ApiResponse, Transport};
use serde_json::Value;
use tokio::sync::Notify;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Replays queued responses and records every request it is handed.
#[derive(Default)]
pub struct MockTransport {
    responses: RefCell<VecDeque<Result<ApiResponse, SubmissionError>>>,
    calls: RefCell<Vec<ApiRequest>>,
    gate: Option<Rc<Notify>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `send` parks until the gate is notified.
    pub fn gated(gate: Rc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    pub fn respond(self, status: u16, body: Value) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Ok(ApiResponse::json(status, &body)));
        self
    }

    pub fn fail(self, cause: &str) -> Self {
        self.responses
            .borrow_mut()
            .push_back(Err(SubmissionError::connectivity(cause)));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.borrow().clone()
    }

    pub fn last_call(&self) -> Option<ApiRequest> {
        self.calls.borrow().last().cloned()
    }
}

#[async_trait(?Send)]
impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SubmissionError> {
        self.calls.borrow_mut().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(SubmissionError::connectivity("no response queued")))
    }
}

/// A file on disk of exactly `size` bytes that starts with `magic`.
pub fn image_file(magic: &[u8], size: usize) -> tempfile::NamedTempFile {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    let mut payload = vec![0u8; size];
    payload[..magic.len()].copy_from_slice(magic);
    tmp.write_all(&payload).unwrap();
    tmp
}

pub const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0];
pub const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

pub fn selected(path: &Path, mime_type: &str, size_bytes: u64) -> SelectedFile {
    SelectedFile {
        path: path.to_path_buf(),
        file_name: path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        mime_type: mime_type.to_string(),
        size_bytes,
    }
}
