mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

use config::AppConfig;
use error::AppError;
use services::classifier::model_manager::OnnxClassifier;
use services::db::PredictionLog;
use tauri::Manager;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    init_tracing();

    let result = tauri::Builder::default()
        .plugin(tauri_plugin_window_state::Builder::default().build())
        .setup(|app| {
            let app_data_dir = app
                .path()
                .app_data_dir()
                .map_err(|e| AppError::Config(format!("Failed to get app data directory: {}", e)))?;
            let resource_dir = app
                .path()
                .resource_dir()
                .map_err(|e| AppError::Config(format!("Failed to get resource directory: {}", e)))?;

            let config = AppConfig::load(&app_data_dir, &resource_dir)?;
            info!(
                model = %config.model_path.display(),
                database = %config.database_path.display(),
                "Starting"
            );

            let log = PredictionLog::open(&config.database_path)?;
            app.manage(log);

            // Without a model nothing can be served, so this aborts startup.
            let classifier = OnnxClassifier::load(&config.model_path, &config.model)
                .inspect_err(|e| error!(error = %e, "Classifier unavailable"))?;
            app.manage(classifier);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::analysis::analyze_image,
            commands::analysis::get_app_status,
            commands::history::list_predictions,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        error!(error = %e, "Application failed to start");
        std::process::exit(1);
    }
}
