use crate::error::AppError;
use crate::models::prediction_types::AnalysisOutcome;
use crate::services::classifier::inference;
use crate::services::classifier::Classifier;
use crate::services::db::PredictionLog;
use crate::services::verdict;
use tracing::{info, warn};

/// Runs one upload through preprocess, classify, format and log.
///
/// Decode and inference failures return early and leave the log untouched.
/// A failed append still returns the verdict, with `log_error` set.
pub fn analyze<C: Classifier>(
    classifier: &C,
    log: &PredictionLog,
    file_name: &str,
    bytes: &[u8],
) -> Result<AnalysisOutcome, AppError> {
    if !inference::is_supported_upload(file_name) {
        return Err(AppError::ImageDecode(format!(
            "unsupported file type '{}'; upload a PNG, JPG or JPEG image",
            file_name
        )));
    }

    let tensor = inference::preprocess_image(bytes)?;
    let score = classifier.score(tensor)?;
    let summary = verdict::summarize(score);

    info!(
        file = %file_name,
        score,
        verdict = %summary.label,
        "Analyzed upload"
    );

    let (record, log_error) = match log.append(file_name, score) {
        Ok(record) => (Some(record), None),
        Err(e) => {
            warn!(file = %file_name, error = %e, "Prediction was not logged");
            (None, Some(e.to_string()))
        }
    };

    Ok(AnalysisOutcome {
        file_name: file_name.to_string(),
        verdict: summary,
        record,
        log_error,
    })
}
