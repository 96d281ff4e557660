use std::sync::Arc;

use crate::canvas::SketchSurface;
use crate::error::GenerationError;
use crate::generation::{GeminiClient, GenerationBackend, Orchestrator, UnconfiguredBackend};
use crate::panels;
use crate::snapshot;
use crate::tool::ToolState;

/// Background color of the drawing surface; eraser strokes paint this.
pub const CANVAS_BACKGROUND: egui::Color32 = egui::Color32::WHITE;

/// We derive Deserialize/Serialize so we can persist tool settings and the
/// prompt on shutdown.
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct SketchApp {
    pub(crate) tool: ToolState,
    pub(crate) prompt: String,
    // Everything below is runtime-only state.
    #[serde(skip)]
    pub(crate) surface: Option<SketchSurface>,
    #[serde(skip, default = "default_orchestrator")]
    pub(crate) orchestrator: Orchestrator,
    #[serde(skip)]
    pub(crate) canvas_texture: Option<egui::TextureHandle>,
    #[serde(skip)]
    pub(crate) canvas_texture_version: u64,
    #[serde(skip)]
    pub(crate) result_texture: Option<egui::TextureHandle>,
    #[serde(skip)]
    pub(crate) result_decode_error: Option<String>,
}

fn default_orchestrator() -> Orchestrator {
    let backend: Arc<dyn GenerationBackend> = match GeminiClient::from_env() {
        Ok(client) => Arc::new(client),
        Err(err) => {
            log::warn!("generation backend unavailable: {err}");
            Arc::new(UnconfiguredBackend::new(err.to_string()))
        }
    };
    Orchestrator::new(backend)
}

impl Default for SketchApp {
    fn default() -> Self {
        Self {
            tool: ToolState::default(),
            prompt: String::new(),
            surface: None,
            orchestrator: default_orchestrator(),
            canvas_texture: None,
            canvas_texture_version: 0,
            result_texture: None,
            result_decode_error: None,
        }
    }
}

impl SketchApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        if let Some(storage) = cc.storage {
            return eframe::get_value(storage, eframe::APP_KEY).unwrap_or_default();
        }
        Self::default()
    }

    /// Snapshot the drawing and hand it to the orchestrator together with
    /// the current prompt. Validation failures surface through the
    /// orchestrator's Failure state.
    pub(crate) fn submit_generation(&mut self) {
        let snapshot = match &self.surface {
            Some(surface) => surface
                .export_png()
                .map(|bytes| snapshot::encode_data_url(snapshot::PNG_MIME, &bytes))
                .map_err(GenerationError::from),
            None => Err(GenerationError::MissingSurface),
        };
        self.result_texture = None;
        self.result_decode_error = None;
        // Rejections already transition the state machine; nothing more to do.
        let _ = self.orchestrator.submit(snapshot, &self.prompt);
    }
}

impl eframe::App for SketchApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, self);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.orchestrator.poll() {
            self.result_texture = None;
            self.result_decode_error = None;
        }
        if self.orchestrator.is_submitting() {
            // Keep polling while the remote call is in flight.
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        panels::tools_panel(self, ctx);
        panels::result_panel(self, ctx);
        panels::canvas_panel(self, ctx);
    }
}
