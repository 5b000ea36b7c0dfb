// src/lib.rs
//! Client core for GlowGuide: the draggable chat launcher, photo upload validation and
//! the submission workflows that talk to the external beauty-analysis API.

use std::rc::Rc;

use log::info;

pub mod config;
pub mod errors;
pub mod models;
pub mod pages;
pub mod panel;
pub mod presentation;
pub mod services;

pub use config::ClientConfig;
pub use errors::*;
pub use models::*;
pub use pages::{ChatWidget, GenerateLookPage, IngredientCheckPage, TryOnPage};
pub use panel::{DraggablePanel, PointerCapture, PointerEvent, PointerInput};

use crate::services::{AccountClient, HttpTransport, TokenStore, Transport, UploadValidator};

/// Shared collaborators for one page view. Page controllers built from it share the
/// transport and sign-in state but nothing mutable.
#[derive(Clone)]
pub struct GlowGuide {
    config: ClientConfig,
    transport: Rc<dyn Transport>,
    validator: Rc<UploadValidator>,
    account: Rc<AccountClient>,
}

impl GlowGuide {
    pub fn new(
        config: ClientConfig,
        transport: Rc<dyn Transport>,
        tokens: Rc<dyn TokenStore>,
    ) -> Self {
        let validator = Rc::new(UploadValidator::new(config.max_upload_bytes));
        let account = Rc::new(AccountClient::new(transport.clone(), tokens));

        Self {
            config,
            transport,
            validator,
            account,
        }
    }

    pub fn from_env(tokens: Rc<dyn TokenStore>) -> Result<Self, ConfigError> {
        let config = ClientConfig::from_env()?;
        info!("Using GlowGuide API at {}", config.api_base_url);
        let transport: Rc<dyn Transport> = Rc::new(HttpTransport::new(config.clone()));
        Ok(Self::new(config, transport, tokens))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn account(&self) -> Rc<AccountClient> {
        self.account.clone()
    }

    pub fn validator(&self) -> Rc<UploadValidator> {
        self.validator.clone()
    }

    pub fn generate_look_page(&self) -> GenerateLookPage {
        GenerateLookPage::new(
            self.validator.clone(),
            self.transport.clone(),
            self.account.clone(),
            self.config.default_lang.clone(),
        )
    }

    pub fn try_on_page(&self) -> TryOnPage {
        TryOnPage::new(self.validator.clone(), self.transport.clone())
    }

    pub fn ingredient_check_page(&self) -> IngredientCheckPage {
        IngredientCheckPage::new(self.transport.clone())
    }

    pub fn chat_widget<C: PointerCapture>(&self, capture: C) -> ChatWidget<C> {
        ChatWidget::new(&self.config, capture, self.transport.clone())
    }
}
