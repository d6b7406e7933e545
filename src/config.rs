use crate::error::AppError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings.json";
pub const DEFAULT_MODEL_PATH: &str = "models/brain_tumor_classifier.onnx";
pub const DEFAULT_DATABASE_PATH: &str = "database/predictions.db";

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub use_gpu: bool,
    pub intra_threads: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            use_gpu: false,
            intra_threads: 4,
        }
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub model_path: PathBuf,
    pub database_path: PathBuf,
    pub model: ModelSettings,
}

/// Optional overrides read from `settings.json` in the app data directory.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsFile {
    pub model_path: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub use_gpu: Option<bool>,
    pub intra_threads: Option<usize>,
}

impl AppConfig {
    /// Reads `settings.json` from `app_data_dir` when present and resolves the
    /// model path against `resource_dir` and the database path against
    /// `app_data_dir`.
    pub fn load(app_data_dir: &Path, resource_dir: &Path) -> Result<Self, AppError> {
        let settings_path = app_data_dir.join(SETTINGS_FILE);
        let settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path).map_err(|e| {
                AppError::Config(format!(
                    "Failed to read {}: {}",
                    settings_path.display(),
                    e
                ))
            })?;
            serde_json::from_str::<SettingsFile>(&content).map_err(|e| {
                AppError::Config(format!(
                    "Failed to parse {}: {}",
                    settings_path.display(),
                    e
                ))
            })?
        } else {
            SettingsFile::default()
        };

        Self::from_settings(settings, app_data_dir, resource_dir)
    }

    pub fn from_settings(
        settings: SettingsFile,
        app_data_dir: &Path,
        resource_dir: &Path,
    ) -> Result<Self, AppError> {
        let defaults = ModelSettings::default();
        let intra_threads = settings.intra_threads.unwrap_or(defaults.intra_threads);
        if intra_threads == 0 {
            return Err(AppError::Config(
                "intra_threads must be at least 1".to_string(),
            ));
        }

        let model_path = resolve(
            resource_dir,
            settings
                .model_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
        );
        let database_path = resolve(
            app_data_dir,
            settings
                .database_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH)),
        );

        Ok(Self {
            model_path,
            database_path,
            model: ModelSettings {
                use_gpu: settings.use_gpu.unwrap_or(defaults.use_gpu),
                intra_threads,
            },
        })
    }
}

fn resolve(base: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
