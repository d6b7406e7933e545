use crate::models::prediction_types::{HistoryRow, HistoryView, PredictionRecord};
use crate::services::db::TIMESTAMP_FORMAT;
use chrono::{Local, NaiveDateTime, TimeZone, Utc};

pub const EMPTY_HISTORY_MESSAGE: &str =
    "No predictions found. Make your first prediction on the Home page.";

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M";

pub fn build_history(records: Vec<PredictionRecord>) -> HistoryView {
    if records.is_empty() {
        return HistoryView::Empty {
            message: EMPTY_HISTORY_MESSAGE.to_string(),
        };
    }

    let rows = records
        .into_iter()
        .map(|r| HistoryRow {
            timestamp: display_timestamp(&r.timestamp),
            filename: r.filename,
            result: r.result,
            confidence: r.confidence,
        })
        .collect();

    HistoryView::Table { rows }
}

/// Stored UTC text to local `YYYY-MM-DD HH:MM`. Unparseable values are shown
/// as stored.
pub fn display_timestamp(stored: &str) -> String {
    match NaiveDateTime::parse_from_str(stored, TIMESTAMP_FORMAT) {
        Ok(naive) => Utc
            .from_utc_datetime(&naive)
            .with_timezone(&Local)
            .format(DISPLAY_FORMAT)
            .to_string(),
        Err(_) => stored.to_string(),
    }
}
