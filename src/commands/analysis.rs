use crate::error::AppError;
use crate::models::prediction_types::{AnalysisOutcome, AppStatus};
use crate::services::analysis;
use crate::services::classifier::model_manager::OnnxClassifier;
use crate::services::db::PredictionLog;
use base64::Engine;
use tauri::State;
use tracing::warn;

/// Analyze one uploaded image. `data` is the file's bytes, base64-encoded
/// by the page.
#[tauri::command]
pub async fn analyze_image(
    classifier: State<'_, OnnxClassifier>,
    log: State<'_, PredictionLog>,
    file_name: String,
    data: String,
) -> Result<AnalysisOutcome, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.as_bytes())?;

    let classifier = classifier.inner().clone();
    let log = log.inner().clone();

    let result = tokio::task::spawn_blocking(move || {
        analysis::analyze(&classifier, &log, &file_name, &bytes)
    })
    .await?;

    if let Err(ref e) = result {
        warn!(kind = e.kind(), error = %e, "Analysis failed");
    }
    result
}

#[tauri::command]
pub async fn get_app_status(
    classifier: State<'_, OnnxClassifier>,
    log: State<'_, PredictionLog>,
) -> Result<AppStatus, AppError> {
    let log = log.inner().clone();
    let database_path = log.path().to_string_lossy().to_string();
    let prediction_count = tokio::task::spawn_blocking(move || log.count()).await??;

    Ok(AppStatus {
        model_path: classifier.model_path().to_string_lossy().to_string(),
        database_path,
        prediction_count,
    })
}
