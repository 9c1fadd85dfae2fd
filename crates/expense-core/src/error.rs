use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Malformed command: {0}")]
    MalformedCommand(String),
    #[error("Invalid amount: `{0}`")]
    InvalidAmount(String),
    #[error("Invalid date token: `{0}`")]
    InvalidDateToken(String),
    #[error("Invalid installment token: `{0}`")]
    InvalidInstallmentToken(String),
    #[error("Persistence failure: {0}")]
    Persistence(String),
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),
    #[error("Delivery failed: {0}")]
    Delivery(String),
    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),
    #[error("Chart rendering failed: {0}")]
    ChartRendering(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl CoreError {
    /// Errors caused by what the user typed; recovered with a corrective reply.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedCommand(_)
                | CoreError::InvalidAmount(_)
                | CoreError::InvalidDateToken(_)
                | CoreError::InvalidInstallmentToken(_)
                | CoreError::TranscriptionFailed(_)
        )
    }
}
