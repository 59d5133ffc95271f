//! Edit session: the state behind the editor view.
//!
//! The session owns the selected image, the prompt, the latest result and
//! the status shown to the user. It changes only in response to three
//! events: an image is selected, submit is pressed, the remote call settles.
//! At most one edit is outstanding at any time.

use crate::client::ImageEditor;
use crate::error::{Result, MISSING_INPUT_MESSAGE};
use crate::image::{download_name, EditResult, ImageAsset};

/// Status of an edit session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditState {
    /// Nothing selected or typed yet.
    #[default]
    Idle,
    /// A prompt was typed but no image is selected.
    AwaitingImage,
    /// An image is selected and ready to be edited.
    Ready,
    /// An edit request is in flight.
    Submitting,
    /// The last edit produced an image.
    Success,
    /// The last submission failed with this message.
    Failed(String),
}

/// Outcome of pressing submit.
#[derive(Debug)]
pub enum Submission {
    /// The request was accepted and should be executed.
    Started(EditRequest),
    /// Inputs were missing; no request was made.
    Rejected(String),
    /// Another request is still outstanding; nothing changed.
    Busy,
}

/// An image plus an instruction, built right before the remote call.
#[derive(Debug, Clone)]
pub struct EditRequest {
    /// Image to edit.
    pub image: ImageAsset,
    /// Editing instruction, as typed.
    pub prompt: String,
}

impl EditRequest {
    /// Encodes the image and sends it to `editor`.
    ///
    /// # Errors
    ///
    /// Returns encoding errors and whatever the editor reports.
    pub async fn execute<E: ImageEditor + ?Sized>(&self, editor: &E) -> Result<EditResult> {
        let encoded = self.image.encode()?;
        editor.edit(&encoded, &self.prompt).await
    }
}

/// State of one editing session.
#[derive(Debug, Default)]
pub struct EditSession {
    original: Option<ImageAsset>,
    edited: Option<EditResult>,
    prompt: String,
    state: EditState,
}

impl EditSession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selected image, clearing any previous result and error.
    ///
    /// Returns `false` and changes nothing while an edit is in flight.
    pub fn select_image(&mut self, asset: ImageAsset) -> bool {
        if self.is_loading() {
            return false;
        }
        self.original = Some(asset);
        self.edited = None;
        self.state = EditState::Ready;
        true
    }

    /// Updates the prompt text.
    ///
    /// Returns `false` and changes nothing while an edit is in flight.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> bool {
        if self.is_loading() {
            return false;
        }
        self.prompt = prompt.into();
        if matches!(self.state, EditState::Idle | EditState::AwaitingImage) {
            self.state = if self.prompt.trim().is_empty() {
                EditState::Idle
            } else {
                EditState::AwaitingImage
            };
        }
        true
    }

    /// Returns true if pressing submit would start a request.
    pub fn can_submit(&self) -> bool {
        !self.is_loading() && self.original.is_some() && !self.prompt.trim().is_empty()
    }

    /// Handles a submit press.
    ///
    /// Missing inputs fail immediately without a request. A press while a
    /// request is outstanding is ignored.
    pub fn begin_submit(&mut self) -> Submission {
        if self.is_loading() {
            return Submission::Busy;
        }

        let image = match &self.original {
            Some(image) if !self.prompt.trim().is_empty() => image.clone(),
            _ => {
                self.state = EditState::Failed(MISSING_INPUT_MESSAGE.to_string());
                return Submission::Rejected(MISSING_INPUT_MESSAGE.to_string());
            }
        };

        self.edited = None;
        self.state = EditState::Submitting;
        Submission::Started(EditRequest {
            image,
            prompt: self.prompt.clone(),
        })
    }

    /// Records the outcome of the outstanding request.
    ///
    /// Returns `false` if no request was outstanding.
    pub fn settle(&mut self, outcome: Result<EditResult>) -> bool {
        if !self.is_loading() {
            tracing::debug!("ignoring edit outcome with no request outstanding");
            return false;
        }
        match outcome {
            Ok(result) => {
                self.edited = Some(result);
                self.state = EditState::Success;
            }
            Err(e) => {
                tracing::warn!(error = %e, "edit failed");
                self.state = EditState::Failed(e.user_message());
            }
        }
        true
    }

    /// Submits and waits for the result in one step.
    pub async fn submit<E: ImageEditor + ?Sized>(&mut self, editor: &E) -> &EditState {
        if let Submission::Started(request) = self.begin_submit() {
            let outcome = request.execute(editor).await;
            self.settle(outcome);
        }
        &self.state
    }

    /// Current status.
    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// The selected image, if any.
    pub fn original(&self) -> Option<&ImageAsset> {
        self.original.as_ref()
    }

    /// The latest edited image, if any.
    pub fn edited(&self) -> Option<&EditResult> {
        self.edited.as_ref()
    }

    /// Current prompt text.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Error message to display, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            EditState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    /// True while a request is in flight.
    pub fn is_loading(&self) -> bool {
        self.state == EditState::Submitting
    }

    /// File name offered for the edited image.
    pub fn download_name(&self) -> String {
        match &self.original {
            Some(asset) => asset.download_name(),
            None => download_name(None),
        }
    }
}
