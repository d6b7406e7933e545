use serde::ser::SerializeStruct;
use serde::Serialize;

/// Errors surfaced by the analysis and history commands.
///
/// The web view receives these as `{ kind, message }` so it can pick the
/// right inline message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Could not read the uploaded image: {0}")]
    ImageDecode(String),
    #[error("Failed to load the classifier model: {0}")]
    ModelLoad(String),
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Failed to save the prediction: {0}")]
    StorageWrite(String),
    #[error("Failed to read the prediction history: {0}")]
    StorageRead(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ImageDecode(_) => "image_decode",
            AppError::ModelLoad(_) => "model_load",
            AppError::Inference(_) => "inference",
            AppError::StorageWrite(_) => "storage_write",
            AppError::StorageRead(_) => "storage_read",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl Serialize for AppError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("AppError", 2)?;
        state.serialize_field("kind", self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::ImageDecode(format!("upload payload is not valid base64: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Task join failed: {}", err))
    }
}
