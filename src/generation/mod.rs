//! Generation request lifecycle: validate, call the remote capability once,
//! and drive the Idle / Submitting / Success / Failure state machine that
//! the result pane renders from.

mod gemini;
pub use gemini::{GeminiClient, UnconfiguredBackend};

use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::error::GenerationError;
use crate::snapshot;

/// Image bytes plus their declared media type. Used both for inline images
/// in capability replies and for the surfaced result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// One request to the capability: the encoded snapshot and the full
/// instruction text (system template with the user prompt embedded).
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub image_bytes: Vec<u8>,
    pub mime_type: String,
    pub instruction: String,
}

/// One part of a capability reply; may carry text, an image, both or neither.
#[derive(Debug, Clone, Default)]
pub struct ReplyPart {
    pub text: Option<String>,
    pub image: Option<ImageData>,
}

/// A capability reply: zero or more parts, order capability-defined.
#[derive(Debug, Clone, Default)]
pub struct GenerationReply {
    pub parts: Vec<ReplyPart>,
}

/// The seam to the remote generation capability. The real implementation is
/// [`GeminiClient`]; tests substitute mocks.
pub trait GenerationBackend: Send + Sync {
    fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply, GenerationError>;
}

/// Exactly one variant holds at any time; presentation renders from it, so
/// "loading and error at once" is unrepresentable.
#[derive(Debug, Clone)]
pub enum GenerationState {
    Idle,
    Submitting,
    Success(ImageData),
    Failure(String),
}

/// Drives the request lifecycle: `Idle → Submitting → {Success | Failure}`,
/// with resubmission allowed from any terminal state.
///
/// The single remote call runs on a worker thread; its outcome comes back
/// through a shared slot drained by [`Orchestrator::poll`] on the UI thread.
/// The call is not cancellable and has no timeout of its own.
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    state: GenerationState,
    outcome: Arc<Mutex<Option<Result<ImageData, GenerationError>>>>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            state: GenerationState::Idle,
            outcome: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, GenerationState::Submitting)
    }

    /// Submit the encoded snapshot and prompt for generation.
    ///
    /// A submit while already `Submitting` is a no-op (at most one request in
    /// flight, no queueing). Validation failures — empty prompt, missing or
    /// malformed snapshot — are returned synchronously without contacting the
    /// capability, and leave the state machine in `Failure`.
    ///
    /// `snapshot` carries the data URL of the drawing, or the error that
    /// prevented producing one (no surface, encoding failure).
    pub fn submit(
        &mut self,
        snapshot: Result<String, GenerationError>,
        prompt: &str,
    ) -> Result<(), GenerationError> {
        if self.is_submitting() {
            log::debug!("submit ignored: a generation request is already in flight");
            return Ok(());
        }
        if let Err(err) = self.try_submit(snapshot, prompt) {
            log::warn!("generation request rejected: {err}");
            self.state = GenerationState::Failure(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    fn try_submit(
        &mut self,
        snapshot: Result<String, GenerationError>,
        prompt: &str,
    ) -> Result<(), GenerationError> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::EmptyPrompt);
        }
        let decoded = snapshot::parse_data_url(&snapshot?)?;
        let request = GenerationRequest {
            image_bytes: decoded.bytes,
            mime_type: decoded.mime_type,
            instruction: build_instruction(prompt),
        };

        *self.outcome.lock() = None;
        self.state = GenerationState::Submitting;
        log::info!("submitting generation request ({} snapshot bytes)", request.image_bytes.len());

        let backend = Arc::clone(&self.backend);
        let slot = Arc::clone(&self.outcome);
        thread::spawn(move || {
            let result = backend.generate(&request).and_then(first_image);
            *slot.lock() = Some(result);
        });
        Ok(())
    }

    /// Drain the worker outcome, if any, and perform the terminal transition.
    /// Called once per UI frame; returns whether the state changed.
    pub fn poll(&mut self) -> bool {
        if !self.is_submitting() {
            return false;
        }
        let Some(outcome) = self.outcome.lock().take() else {
            return false;
        };
        self.state = match outcome {
            Ok(image) => {
                log::info!("generation succeeded: {} bytes of {}", image.bytes.len(), image.mime_type);
                GenerationState::Success(image)
            }
            Err(err) => {
                log::warn!("generation failed: {err}");
                GenerationState::Failure(err.to_string())
            }
        };
        true
    }
}

/// The first image part found wins; order among multiple parts is
/// capability-defined.
fn first_image(reply: GenerationReply) -> Result<ImageData, GenerationError> {
    reply
        .parts
        .into_iter()
        .find_map(|part| part.image)
        .ok_or(GenerationError::NoResult)
}

/// System-authored instruction template; embeds the user prompt verbatim.
fn build_instruction(prompt: &str) -> String {
    format!(
        "You are an expert at turning drawings into anime-style art. \
         Transform the following line drawing into a vivid, beautiful, \
         high-quality anime-style image that matches the given prompt. \
         Keep the composition and key elements of the original drawing \
         while applying the style.\n\nPrompt: \"{prompt}\""
    )
}
