use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Discrete outcome derived from the classifier score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    TumorDetected,
    NoTumor,
}

impl Verdict {
    pub const THRESHOLD: f32 = 0.5;

    /// Strictly above the threshold is a detection; a tie is not.
    pub fn from_score(score: f32) -> Self {
        if score > Self::THRESHOLD {
            Verdict::TumorDetected
        } else {
            Verdict::NoTumor
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::TumorDetected => "Tumor Detected",
            Verdict::NoTumor => "No Tumor",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Tumor Detected" => Ok(Verdict::TumorDetected),
            "No Tumor" => Ok(Verdict::NoTumor),
            other => Err(format!("unknown verdict label '{}'", other)),
        }
    }
}

/// One row of the `predictions` table.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    pub filename: String,
    pub result: String,
    /// Raw classifier score, not the displayed percentage.
    pub confidence: f64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct VerdictSummary {
    pub label: String,
    pub score: f32,
    pub confidence_pct: f64,
    pub confidence_display: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct AnalysisOutcome {
    pub file_name: String,
    pub verdict: VerdictSummary,
    /// `None` when the log append failed; `log_error` then says why.
    pub record: Option<PredictionRecord>,
    pub log_error: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct HistoryRow {
    pub filename: String,
    pub result: String,
    pub confidence: f64,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum HistoryView {
    Empty { message: String },
    Table { rows: Vec<HistoryRow> },
}

#[derive(Debug, Serialize, Clone)]
pub struct AppStatus {
    pub model_path: String,
    pub database_path: String,
    pub prediction_count: i64,
}
