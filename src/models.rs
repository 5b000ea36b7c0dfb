// src/models.rs
use std::collections::BTreeMap;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pixel offset from the viewport origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub type PanelPosition = Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A file the user picked, before anything has been read from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// A validated image, staged for preview and submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedAsset {
    pub file_name: String,
    pub raw: Bytes,
    pub preview_data_uri: String,
    pub size_bytes: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    GenerateLook,
    TryOn,
    IngredientCheck,
    Chat,
}

impl OperationKind {
    pub fn path(&self) -> &'static str {
        match self {
            OperationKind::GenerateLook => "/generate-look",
            OperationKind::TryOn => "/try-on",
            OperationKind::IngredientCheck => "/check-ingredients",
            OperationKind::Chat => "/beauty-chat",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    GenerateLook {
        image: UploadedAsset,
        lang: String,
    },
    TryOn {
        user_image: UploadedAsset,
        reference_image: UploadedAsset,
    },
    IngredientCheck {
        text: String,
    },
    /// `history` is the transcript at send time; the endpoint itself only receives `message`.
    ChatTurn {
        message: String,
        history: Vec<ChatMessage>,
    },
}

impl AnalysisRequest {
    pub fn kind(&self) -> OperationKind {
        match self {
            AnalysisRequest::GenerateLook { .. } => OperationKind::GenerateLook,
            AnalysisRequest::TryOn { .. } => OperationKind::TryOn,
            AnalysisRequest::IngredientCheck { .. } => OperationKind::IngredientCheck,
            AnalysisRequest::ChatTurn { .. } => OperationKind::Chat,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisResult {
    Look(GeneratedLook),
    TryOn(TryOnResult),
    Ingredients(IngredientReport),
    Chat(ChatReply),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Idle,
    Submitting,
    Succeeded(AnalysisResult),
    Failed(crate::errors::SubmissionError),
}

impl AnalysisState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, AnalysisState::Submitting)
    }
}

/// A makeup field the backend sends either as plain text or as a structured object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringOrStructured<T> {
    Text(String),
    Structured(T),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoundationSpec {
    pub tone: Option<String>,
    pub undertone: Option<String>,
    pub coverage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConcealerSpec {
    pub shade: Option<String>,
    pub coverage: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowderSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub finish: Option<String>,
}

/// Blush, bronzer and highlighter share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementSpec {
    pub shade: Option<String>,
    pub placement: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyeshadowSpec {
    pub colors: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelinerSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MascaraSpec {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub effect: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipstickSpec {
    pub shade: Option<String>,
    pub finish: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LipLinerSpec {
    pub shade: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyebrowSpec {
    pub product: Option<String>,
    pub style: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MakeupSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation: Option<StringOrStructured<FoundationSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concealer: Option<StringOrStructured<ConcealerSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub powder: Option<StringOrStructured<PowderSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blush: Option<StringOrStructured<PlacementSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bronzer: Option<StringOrStructured<PlacementSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlighter: Option<StringOrStructured<PlacementSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyeshadow: Option<StringOrStructured<EyeshadowSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyeliner: Option<StringOrStructured<EyelinerSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mascara: Option<StringOrStructured<MascaraSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lipstick: Option<StringOrStructured<LipstickSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lip_liner: Option<StringOrStructured<LipLinerSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eyebrow: Option<StringOrStructured<EyebrowSpec>>,
    /// Fields this client does not know about, kept so a saved result round-trips intact.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedLook {
    pub image_url: String,
    pub prompt: String,
    #[serde(default)]
    pub spec: MakeupSpec,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryOnResult {
    pub image_url: String,
    pub prompt_used: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientNote {
    pub name: String,
    /// 1-5, only present for comedogenic entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngredientReport {
    pub comedogenic: Vec<IngredientNote>,
    pub safe: Vec<IngredientNote>,
    pub unknown: Vec<IngredientNote>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub accepted_terms: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultKind {
    #[serde(rename = "generate-look")]
    GenerateLook,
    #[serde(rename = "try-on")]
    TryOn,
    #[serde(rename = "ingredients")]
    Ingredients,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResultRequest {
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub title: String,
    pub image_url: String,
    pub prompt: String,
    pub spec: MakeupSpec,
}

impl SaveResultRequest {
    pub fn from_look(look: &GeneratedLook) -> Self {
        Self {
            kind: ResultKind::GenerateLook,
            title: "AI Generated Look".to_string(),
            image_url: look.image_url.clone(),
            prompt: look.prompt.clone(),
            spec: look.spec.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ResultKind,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub spec: Option<serde_json::Value>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// RFC 3339 timestamps, also accepting the zone-less form some backends emit (read as UTC).
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(ts.with_timezone(&Utc));
        }
        ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&raw, fmt).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
