use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Enter a valid YouTube URL")]
    InvalidInput,

    #[error("Failed to read clipboard")]
    Clipboard,
}
