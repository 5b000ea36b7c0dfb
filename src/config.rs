// src/config.rs
use reqwest::Url;

use crate::errors::ConfigError;

pub const API_URL_VAR: &str = "GLOWGUIDE_API_URL";

/// Largest file the upload forms accept (10MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Launcher button footprint and its initial distance from the bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub size: f64,
    pub initial_margin: f64,
}

impl Default for PanelGeometry {
    fn default() -> Self {
        Self {
            size: 56.0,
            initial_margin: 100.0,
        }
    }
}

/// The chat window opened from the launcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowGeometry {
    pub width: f64,
    pub height: f64,
    /// Minimum gap kept between the window and every viewport edge.
    pub edge_inset: f64,
    /// How far up and left of the launcher the window's origin sits.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for WindowGeometry {
    fn default() -> Self {
        Self {
            width: 320.0,
            height: 400.0,
            edge_inset: 20.0,
            offset_x: 160.0,
            offset_y: 210.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: Url,
    pub max_upload_bytes: u64,
    pub default_lang: String,
    pub panel: PanelGeometry,
    pub chat_window: WindowGeometry,
}

impl ClientConfig {
    pub fn new(api_base_url: &str) -> Result<Self, ConfigError> {
        let api_base_url = Url::parse(api_base_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", api_base_url, e)))?;

        Ok(Self {
            api_base_url,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            default_lang: "en".to_string(),
            panel: PanelGeometry::default(),
            chat_window: WindowGeometry::default(),
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var(API_URL_VAR).map_err(|_| ConfigError::Missing(API_URL_VAR))?;
        Self::new(raw.trim())
    }

    /// Resolves an endpoint path against the base URL, keeping any path prefix the base carries.
    pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
        let base = self.api_base_url.as_str().trim_end_matches('/');
        let joined = format!("{}/{}", base, path.trim_start_matches('/'));
        Url::parse(&joined).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", joined, e)))
    }
}
