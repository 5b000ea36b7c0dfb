// src/pages.rs
//! Page controllers. Each owns its staged inputs and one [`AnalysisSubmission`]; hosts
//! render from the accessors and forward user actions to the async methods.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{debug, info};

use crate::config::{ClientConfig, WindowGeometry};
use crate::errors::{PageError, SubmitRejected};
use crate::models::*;
use crate::panel::{DraggablePanel, PointerCapture, PointerEvent};
use crate::services::{AccountClient, AnalysisSubmission, ChatSession, Transport, UploadValidator};

/// Validates a selection and, on success, swaps it in whole and starts a fresh attempt.
/// A rejected file, or any selection while a request is in flight, leaves the previous
/// one staged.
async fn stage(
    validator: &UploadValidator,
    submission: &AnalysisSubmission,
    slot: &RefCell<Option<UploadedAsset>>,
    file: &SelectedFile,
) -> Result<(), PageError> {
    let asset = validator.validate(file).await?;
    if let Err(e) = submission.reset() {
        debug!("Discarding {}: a request is in flight", asset.file_name);
        return Err(e.into());
    }
    *slot.borrow_mut() = Some(asset);
    Ok(())
}

pub struct GenerateLookPage {
    validator: Rc<UploadValidator>,
    account: Rc<AccountClient>,
    submission: AnalysisSubmission,
    photo: RefCell<Option<UploadedAsset>>,
    lang: String,
    saved: Cell<bool>,
    saving: Cell<bool>,
}

impl GenerateLookPage {
    pub fn new(
        validator: Rc<UploadValidator>,
        transport: Rc<dyn Transport>,
        account: Rc<AccountClient>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            account,
            submission: AnalysisSubmission::new(transport),
            photo: RefCell::new(None),
            lang: lang.into(),
            saved: Cell::new(false),
            saving: Cell::new(false),
        }
    }

    pub async fn select_photo(&self, file: &SelectedFile) -> Result<(), PageError> {
        self.ensure_not_saving()?;
        stage(&self.validator, &self.submission, &self.photo, file).await?;
        self.saved.set(false);
        Ok(())
    }

    pub fn photo(&self) -> Option<UploadedAsset> {
        self.photo.borrow().clone()
    }

    pub async fn analyze(&self) -> Result<AnalysisState, PageError> {
        let image = self
            .photo
            .borrow()
            .clone()
            .ok_or(PageError::MissingInput("Please upload a photo first."))?;

        let state = self
            .submission
            .submit(AnalysisRequest::GenerateLook {
                image,
                lang: self.lang.clone(),
            })
            .await?;
        self.saved.set(false);
        Ok(state)
    }

    pub async fn retry(&self) -> Result<AnalysisState, PageError> {
        Ok(self.submission.retry().await?)
    }

    pub fn state(&self) -> AnalysisState {
        self.submission.state()
    }

    pub fn result(&self) -> Option<GeneratedLook> {
        match self.submission.state() {
            AnalysisState::Succeeded(AnalysisResult::Look(look)) => Some(look),
            _ => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.saved.get()
    }

    pub fn is_saving(&self) -> bool {
        self.saving.get()
    }

    /// Stores the current look in the signed-in user's account, once per result. A save
    /// arriving while another is outstanding is refused.
    pub async fn save(&self) -> Result<(), PageError> {
        let Some(look) = self.result() else {
            return Err(PageError::MissingInput("Generate a look before saving."));
        };
        if self.saved.get() {
            return Ok(());
        }
        self.ensure_not_saving()?;
        if !self.account.is_signed_in() {
            return Err(PageError::MissingInput("Please sign in to save results"));
        }

        self.saving.set(true);
        let outcome = self
            .account
            .save_result(&SaveResultRequest::from_look(&look))
            .await;
        self.saving.set(false);

        outcome?;
        self.saved.set(true);
        info!("Saved generated look {}", look.image_url);
        Ok(())
    }

    pub fn reset(&self) -> Result<(), PageError> {
        self.ensure_not_saving()?;
        self.submission.reset()?;
        *self.photo.borrow_mut() = None;
        self.saved.set(false);
        Ok(())
    }

    fn ensure_not_saving(&self) -> Result<(), SubmitRejected> {
        if self.saving.get() {
            return Err(SubmitRejected::AlreadySubmitting);
        }
        Ok(())
    }
}

pub struct TryOnPage {
    validator: Rc<UploadValidator>,
    submission: AnalysisSubmission,
    user_photo: RefCell<Option<UploadedAsset>>,
    makeup_reference: RefCell<Option<UploadedAsset>>,
}

impl TryOnPage {
    pub fn new(validator: Rc<UploadValidator>, transport: Rc<dyn Transport>) -> Self {
        Self {
            validator,
            submission: AnalysisSubmission::new(transport),
            user_photo: RefCell::new(None),
            makeup_reference: RefCell::new(None),
        }
    }

    pub async fn select_user_photo(&self, file: &SelectedFile) -> Result<(), PageError> {
        stage(&self.validator, &self.submission, &self.user_photo, file).await
    }

    pub async fn select_makeup_reference(&self, file: &SelectedFile) -> Result<(), PageError> {
        stage(&self.validator, &self.submission, &self.makeup_reference, file).await
    }

    pub fn user_photo(&self) -> Option<UploadedAsset> {
        self.user_photo.borrow().clone()
    }

    pub fn makeup_reference(&self) -> Option<UploadedAsset> {
        self.makeup_reference.borrow().clone()
    }

    pub async fn try_on(&self) -> Result<AnalysisState, PageError> {
        let missing = PageError::MissingInput("Please upload both user photo and makeup reference.");
        let user_image = self.user_photo.borrow().clone().ok_or(missing.clone())?;
        let reference_image = self.makeup_reference.borrow().clone().ok_or(missing)?;

        Ok(self
            .submission
            .submit(AnalysisRequest::TryOn {
                user_image,
                reference_image,
            })
            .await?)
    }

    pub async fn retry(&self) -> Result<AnalysisState, PageError> {
        Ok(self.submission.retry().await?)
    }

    pub fn state(&self) -> AnalysisState {
        self.submission.state()
    }

    pub fn result(&self) -> Option<TryOnResult> {
        match self.submission.state() {
            AnalysisState::Succeeded(AnalysisResult::TryOn(result)) => Some(result),
            _ => None,
        }
    }

    pub fn reset(&self) -> Result<(), PageError> {
        self.submission.reset()?;
        *self.user_photo.borrow_mut() = None;
        *self.makeup_reference.borrow_mut() = None;
        Ok(())
    }
}

pub struct IngredientCheckPage {
    submission: AnalysisSubmission,
    text: RefCell<String>,
}

impl IngredientCheckPage {
    pub fn new(transport: Rc<dyn Transport>) -> Self {
        Self {
            submission: AnalysisSubmission::new(transport),
            text: RefCell::new(String::new()),
        }
    }

    pub fn set_text(&self, text: &str) {
        *self.text.borrow_mut() = text.to_string();
    }

    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub async fn analyze(&self) -> Result<AnalysisState, PageError> {
        let text = self.text.borrow().trim().to_string();
        if text.is_empty() {
            return Err(PageError::MissingInput("Please enter ingredients to analyze."));
        }

        Ok(self
            .submission
            .submit(AnalysisRequest::IngredientCheck { text })
            .await?)
    }

    pub async fn retry(&self) -> Result<AnalysisState, PageError> {
        Ok(self.submission.retry().await?)
    }

    pub fn state(&self) -> AnalysisState {
        self.submission.state()
    }

    pub fn report(&self) -> Option<IngredientReport> {
        match self.submission.state() {
            AnalysisState::Succeeded(AnalysisResult::Ingredients(report)) => Some(report),
            _ => None,
        }
    }

    pub fn reset(&self) -> Result<(), PageError> {
        self.submission.reset()?;
        self.text.borrow_mut().clear();
        Ok(())
    }
}

/// Floating launcher plus the chat window it opens.
pub struct ChatWidget<C: PointerCapture = ()> {
    launcher: RefCell<DraggablePanel<C>>,
    window: WindowGeometry,
    open: Cell<bool>,
    session: ChatSession,
}

impl<C: PointerCapture> ChatWidget<C> {
    pub fn new(config: &ClientConfig, capture: C, transport: Rc<dyn Transport>) -> Self {
        Self {
            launcher: RefCell::new(DraggablePanel::new(config.panel, capture)),
            window: config.chat_window,
            open: Cell::new(false),
            session: ChatSession::new(transport),
        }
    }

    /// Call once layout has measured the viewport, and again on every resize.
    pub fn mount(&self, viewport: ViewportSize) {
        self.launcher.borrow_mut().initialize(viewport);
    }

    pub fn pointer(&self, event: &PointerEvent) {
        self.launcher.borrow_mut().handle(event);
    }

    pub fn launcher_position(&self) -> PanelPosition {
        self.launcher.borrow().position()
    }

    pub fn is_dragging(&self) -> bool {
        self.launcher.borrow().is_dragging()
    }

    pub fn toggle(&self) -> bool {
        let open = !self.open.get();
        self.open.set(open);
        debug!("chat window {}", if open { "opened" } else { "closed" });
        open
    }

    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    pub fn window_origin(&self) -> Option<Point> {
        self.open
            .get()
            .then(|| self.launcher.borrow().anchored_window(&self.window))
    }

    pub async fn send(&self, input: &str) -> Result<AnalysisState, SubmitRejected> {
        self.session.send(input).await
    }

    pub async fn retry(&self) -> Result<AnalysisState, SubmitRejected> {
        self.session.retry().await
    }

    pub fn history(&self) -> Vec<ChatMessage> {
        self.session.history()
    }

    pub fn state(&self) -> AnalysisState {
        self.session.state()
    }
}
