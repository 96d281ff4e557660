#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod canvas;
pub mod error;
pub mod generation;
pub mod panels;
pub mod snapshot;
pub mod tool;

pub use app::SketchApp;
pub use canvas::SketchSurface;
pub use error::GenerationError;
pub use generation::{GenerationBackend, GenerationState, Orchestrator};
pub use tool::{StrokeStyle, ToolMode, ToolState};
