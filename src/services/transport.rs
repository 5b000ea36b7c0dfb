// src/services/transport.rs
use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, error};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::errors::SubmissionError;
use crate::models::*;

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime_type: String,
        data: Bytes,
    },
}

impl MultipartField {
    fn image(name: &str, asset: &UploadedAsset) -> Self {
        MultipartField::File {
            name: name.to_string(),
            file_name: asset.file_name.clone(),
            mime_type: asset.mime_type.clone(),
            data: asset.raw.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Form(Vec<(String, String)>),
    Multipart(Vec<MultipartField>),
}

/// One outbound call, described independently of the HTTP client that carries it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub bearer: Option<String>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>, body: RequestBody) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body,
        }
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn for_analysis(request: &AnalysisRequest) -> Self {
        let body = match request {
            AnalysisRequest::GenerateLook { image, lang } => RequestBody::Multipart(vec![
                MultipartField::image("image", image),
                MultipartField::Text {
                    name: "lang".to_string(),
                    value: lang.clone(),
                },
            ]),
            AnalysisRequest::TryOn {
                user_image,
                reference_image,
            } => RequestBody::Multipart(vec![
                MultipartField::image("user_photo", user_image),
                MultipartField::image("makeup_reference", reference_image),
            ]),
            AnalysisRequest::IngredientCheck { text } => {
                RequestBody::Json(json!({ "input_text": text }))
            }
            AnalysisRequest::ChatTurn { message, .. } => {
                RequestBody::Json(json!({ "message": message }))
            }
        };

        Self::new(Method::POST, request.kind().path(), body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Carries requests to the backend. Futures need not be `Send`: everything runs on one
/// event loop.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SubmissionError>;
}

pub struct HttpTransport {
    config: ClientConfig,
    client: Client,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    fn build_form(fields: Vec<MultipartField>) -> Result<Form, SubmissionError> {
        let mut form = Form::new();
        for field in fields {
            form = match field {
                MultipartField::Text { name, value } => form.text(name, value),
                MultipartField::File {
                    name,
                    file_name,
                    mime_type,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name)
                        .mime_str(&mime_type)
                        .map_err(|e| {
                            SubmissionError::connectivity(format!("Invalid MIME type: {}", e))
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SubmissionError> {
        let url = self
            .config
            .endpoint(&request.path)
            .map_err(|e| SubmissionError::connectivity(e.to_string()))?;

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Form(pairs) => builder.form(&pairs),
            RequestBody::Multipart(fields) => builder.multipart(Self::build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| {
            error!("{} {} failed: {}", request.method, request.path, e);
            SubmissionError::connectivity(format!("Request failed: {}", e))
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            error!("{} {} body read failed: {}", request.method, request.path, e);
            SubmissionError::connectivity(format!("Failed to read response: {}", e))
        })?;

        debug!("{} {} -> {}", request.method, request.path, status);
        Ok(ApiResponse { status, body })
    }
}

/// Maps a response onto the expected success schema.
///
/// Non-2xx bodies supply the message through `error`, then `detail`, then `fallback`.
/// Anything that is not JSON counts as a connectivity failure.
pub fn interpret<R: DeserializeOwned>(
    response: &ApiResponse,
    fallback: &str,
) -> Result<R, SubmissionError> {
    if !response.is_success() {
        return Err(rejection(response, fallback));
    }

    serde_json::from_slice(&response.body).map_err(|e| {
        error!("Malformed response body ({}): {}", response.status, e);
        SubmissionError::connectivity(format!("Malformed response: {}", e))
    })
}

/// For endpoints whose success body carries nothing the client needs.
pub fn interpret_empty(response: &ApiResponse, fallback: &str) -> Result<(), SubmissionError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(rejection(response, fallback))
    }
}

pub fn parse_analysis(
    kind: OperationKind,
    response: &ApiResponse,
) -> Result<AnalysisResult, SubmissionError> {
    match kind {
        OperationKind::GenerateLook => interpret(response, UNKNOWN_ERROR).map(AnalysisResult::Look),
        OperationKind::TryOn => interpret(response, UNKNOWN_ERROR).map(AnalysisResult::TryOn),
        OperationKind::IngredientCheck => {
            interpret(response, UNKNOWN_ERROR).map(AnalysisResult::Ingredients)
        }
        OperationKind::Chat => interpret(response, UNKNOWN_ERROR).map(AnalysisResult::Chat),
    }
}

fn rejection(response: &ApiResponse, fallback: &str) -> SubmissionError {
    let body: Value = match serde_json::from_slice(&response.body) {
        Ok(body) => body,
        Err(e) => {
            error!("Unreadable error body ({}): {}", response.status, e);
            return SubmissionError::connectivity(format!(
                "HTTP {} with unreadable body",
                response.status
            ));
        }
    };

    let message = ["error", "detail"]
        .iter()
        .find_map(|key| match body.get(key) {
            Some(Value::String(text)) if !text.is_empty() => Some(text.clone()),
            Some(Value::String(_)) | Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        })
        .unwrap_or_else(|| fallback.to_string());

    SubmissionError::ServerRejected {
        status: response.status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(name: &str) -> UploadedAsset {
        UploadedAsset {
            file_name: name.to_string(),
            raw: Bytes::from_static(b"\xFF\xD8\xFF"),
            preview_data_uri: "data:image/jpeg;base64,/9j/".to_string(),
            size_bytes: 3,
            mime_type: "image/jpeg".to_string(),
        }
    }

    #[test]
    fn generate_look_is_multipart_with_lang() {
        let request = ApiRequest::for_analysis(&AnalysisRequest::GenerateLook {
            image: asset("me.jpg"),
            lang: "en".to_string(),
        });

        assert_eq!(request.method, Method::POST);
        assert_eq!(request.path, "/generate-look");
        let RequestBody::Multipart(fields) = request.body else {
            panic!("expected multipart body");
        };
        assert!(matches!(&fields[0], MultipartField::File { name, .. } if name == "image"));
        assert_eq!(
            fields[1],
            MultipartField::Text {
                name: "lang".to_string(),
                value: "en".to_string()
            }
        );
    }

    #[test]
    fn try_on_sends_both_photos() {
        let request = ApiRequest::for_analysis(&AnalysisRequest::TryOn {
            user_image: asset("me.jpg"),
            reference_image: asset("ref.jpg"),
        });

        let RequestBody::Multipart(fields) = request.body else {
            panic!("expected multipart body");
        };
        let names: Vec<_> = fields
            .iter()
            .map(|f| match f {
                MultipartField::File { name, .. } | MultipartField::Text { name, .. } => {
                    name.as_str()
                }
            })
            .collect();
        assert_eq!(names, ["user_photo", "makeup_reference"]);
    }

    #[test]
    fn chat_body_only_carries_message() {
        let request = ApiRequest::for_analysis(&AnalysisRequest::ChatTurn {
            message: "hello".to_string(),
            history: vec![ChatMessage::user("earlier")],
        });

        assert_eq!(request.path, "/beauty-chat");
        assert_eq!(request.body, RequestBody::Json(json!({ "message": "hello" })));
    }

    #[test]
    fn ingredient_check_uses_input_text() {
        let request = ApiRequest::for_analysis(&AnalysisRequest::IngredientCheck {
            text: "water, coconut oil".to_string(),
        });
        assert_eq!(
            request.body,
            RequestBody::Json(json!({ "input_text": "water, coconut oil" }))
        );
    }

    #[test]
    fn server_message_prefers_error_then_detail() {
        let with_error = ApiResponse::json(500, &json!({ "error": "boom", "detail": "d" }));
        assert_eq!(
            interpret::<ChatReply>(&with_error, UNKNOWN_ERROR).unwrap_err(),
            SubmissionError::ServerRejected {
                status: 500,
                message: "boom".to_string()
            }
        );

        let with_detail = ApiResponse::json(400, &json!({ "detail": "Incorrect password" }));
        assert_eq!(
            interpret_empty(&with_detail, "Login failed").unwrap_err(),
            SubmissionError::ServerRejected {
                status: 400,
                message: "Incorrect password".to_string()
            }
        );

        let bare = ApiResponse::json(502, &json!({}));
        assert_eq!(
            interpret::<ChatReply>(&bare, UNKNOWN_ERROR).unwrap_err(),
            SubmissionError::ServerRejected {
                status: 502,
                message: UNKNOWN_ERROR.to_string()
            }
        );
    }

    #[test]
    fn structured_detail_is_stringified() {
        let response = ApiResponse::json(422, &json!({ "detail": [{ "msg": "field required" }] }));
        let err = interpret_empty(&response, "x").unwrap_err();
        assert!(matches!(err, SubmissionError::ServerRejected { ref message, .. } if message.contains("field required")));
    }

    #[test]
    fn unparseable_bodies_are_connectivity_failures() {
        let html = ApiResponse {
            status: 502,
            body: Bytes::from_static(b"<html>Bad Gateway</html>"),
        };
        assert!(matches!(
            interpret::<ChatReply>(&html, UNKNOWN_ERROR),
            Err(SubmissionError::ConnectivityFailure { .. })
        ));

        let wrong_shape = ApiResponse::json(200, &json!({ "answer": "hi" }));
        assert!(matches!(
            parse_analysis(OperationKind::Chat, &wrong_shape),
            Err(SubmissionError::ConnectivityFailure { .. })
        ));
    }

    #[test]
    fn parses_ingredient_report() {
        let response = ApiResponse::json(
            200,
            &json!({
                "comedogenic": [{ "name": "Coconut Oil", "level": 4, "description": "Clogs pores" }],
                "safe": [{ "name": "Water", "description": "Solvent" }],
                "unknown": []
            }),
        );

        let AnalysisResult::Ingredients(report) =
            parse_analysis(OperationKind::IngredientCheck, &response).unwrap()
        else {
            panic!("expected ingredient report");
        };
        assert_eq!(report.comedogenic[0].level, Some(4));
        assert_eq!(report.safe[0].level, None);
        assert!(report.unknown.is_empty());
    }

    #[test]
    fn multipart_form_builds_from_analysis_fields() {
        let request = ApiRequest::for_analysis(&AnalysisRequest::GenerateLook {
            image: asset("me.jpg"),
            lang: "en".to_string(),
        });
        let RequestBody::Multipart(fields) = request.body else {
            panic!("expected multipart body");
        };

        let form = HttpTransport::build_form(fields).unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn bad_mime_type_fails_before_sending() {
        let mut image = asset("me.jpg");
        image.mime_type = "not a mime".to_string();

        let err = HttpTransport::build_form(vec![
            MultipartField::image("image", &image),
            MultipartField::Text {
                name: "lang".to_string(),
                value: "en".to_string(),
            },
        ])
        .unwrap_err();

        assert!(matches!(
            err,
            SubmissionError::ConnectivityFailure { ref cause } if cause.starts_with("Invalid MIME type")
        ));
    }
}
