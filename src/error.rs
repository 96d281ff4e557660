use thiserror::Error;

/// Everything that can go wrong between pressing "Generate" and seeing a
/// result. Validation variants are raised before any remote call is made.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The prompt was empty or whitespace-only.
    #[error("enter a prompt describing the image you want")]
    EmptyPrompt,

    /// There is no drawing surface to snapshot.
    #[error("no drawing surface is available")]
    MissingSurface,

    /// The encoded snapshot did not match the `data:<mime>;base64,<payload>` pattern.
    #[error("invalid image data URL: {0}")]
    MalformedSnapshot(String),

    /// The drawing could not be encoded as PNG.
    #[error("failed to encode the drawing: {0}")]
    SnapshotEncode(#[from] image::ImageError),

    /// The generation capability raised a fault.
    #[error("image generation failed: {0}")]
    RemoteCall(String),

    /// The capability responded, but supplied no image part.
    #[error("no image data found in the response")]
    NoResult,
}

impl GenerationError {
    /// True for errors caught before the remote capability is contacted.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPrompt | Self::MissingSurface | Self::MalformedSnapshot(_) | Self::SnapshotEncode(_)
        )
    }
}
