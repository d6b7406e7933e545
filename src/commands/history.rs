use crate::error::AppError;
use crate::models::prediction_types::HistoryView;
use crate::services::db::PredictionLog;
use crate::services::history;
use tauri::State;

#[tauri::command]
pub async fn list_predictions(log: State<'_, PredictionLog>) -> Result<HistoryView, AppError> {
    let log = log.inner().clone();
    let records = tokio::task::spawn_blocking(move || log.list_all()).await??;
    Ok(history::build_history(records))
}
