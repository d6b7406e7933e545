use crate::config::ModelSettings;
use crate::error::AppError;
use crate::services::classifier::Classifier;
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// The brain tumor classifier backed by an ONNX Runtime session.
///
/// Loaded once during application setup and never replaced. `Session::run`
/// needs exclusive access, so calls are serialized on the mutex.
#[derive(Clone)]
pub struct OnnxClassifier {
    model_path: PathBuf,
    session: Arc<Mutex<Session>>,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, settings: &ModelSettings) -> Result<Self, AppError> {
        if !model_path.exists() {
            return Err(AppError::ModelLoad(format!(
                "model file not found at {}",
                model_path.display()
            )));
        }

        info!(
            path = %model_path.display(),
            use_gpu = settings.use_gpu,
            intra_threads = settings.intra_threads,
            "Loading classifier model"
        );

        let _ = ort::init().with_name("tumor-lens").commit();

        let mut builder = Session::builder()
            .map_err(|e| AppError::ModelLoad(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| AppError::ModelLoad(format!("Failed to set optimization level: {}", e)))?
            .with_intra_threads(settings.intra_threads)
            .map_err(|e| AppError::ModelLoad(format!("Failed to set intra threads: {}", e)))?;

        if settings.use_gpu {
            builder = builder
                .with_execution_providers([
                    ort::execution_providers::CUDAExecutionProvider::default().build(),
                    ort::execution_providers::CoreMLExecutionProvider::default().build(),
                    ort::execution_providers::CPUExecutionProvider::default().build(),
                ])
                .map_err(|e| {
                    AppError::ModelLoad(format!("Failed to register GPU execution providers: {}", e))
                })?;
        } else {
            builder = builder
                .with_execution_providers([
                    ort::execution_providers::CPUExecutionProvider::default().build(),
                ])
                .map_err(|e| {
                    AppError::ModelLoad(format!("Failed to register CPU execution provider: {}", e))
                })?;
        }

        let session = builder
            .commit_from_file(model_path)
            .map_err(|e| AppError::ModelLoad(format!("Failed to load ONNX model: {}", e)))?;

        if session.inputs().is_empty() {
            return Err(AppError::ModelLoad("model declares no inputs".to_string()));
        }

        Ok(Self {
            model_path: model_path.to_path_buf(),
            session: Arc::new(Mutex::new(session)),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl Classifier for OnnxClassifier {
    fn score(&self, input: Array4<f32>) -> Result<f32, AppError> {
        let mut session = self
            .session
            .lock()
            .map_err(|_| AppError::Inference("model session lock poisoned".to_string()))?;

        let input_name = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| AppError::Inference("model declares no inputs".to_string()))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| AppError::Inference(format!("Failed to create tensor value: {}", e)))?;

        let outputs = session
            .run(ort::inputs![input_name.as_str() => input_tensor])
            .map_err(|e| AppError::Inference(format!("Inference failed: {}", e)))?;

        let output_value = outputs
            .values()
            .next()
            .ok_or_else(|| AppError::Inference("Model produced no outputs".to_string()))?;

        let (_, data) = output_value
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Inference(format!("Failed to extract output tensor: {}", e)))?;

        let score = score_from_output(data)?;

        debug!(score, "Classifier scored image");
        Ok(score)
    }
}

/// Reads `[0][0]` from a flattened `(1, 1)` output. The model must emit a
/// probability, so anything outside [0, 1] is rejected rather than stored.
pub fn score_from_output(data: &[f32]) -> Result<f32, AppError> {
    let score = data
        .first()
        .copied()
        .ok_or_else(|| AppError::Inference("Model output tensor is empty".to_string()))?;

    if !(0.0..=1.0).contains(&score) {
        return Err(AppError::Inference(format!(
            "Model produced a score outside [0, 1] ({})",
            score
        )));
    }

    Ok(score)
}
