//! Crafting classifier inference via ONNX Runtime.
//!
//! Loads one ONNX model per discipline and runs it on encoder output. The
//! CNNs take `[1, H, W, 3]` images; the tree models take `[1, N]` feature
//! rows. Without the `neural` feature, or without a model for a discipline,
//! predictions return `None` and the caller falls back to rule-based checks.

#[cfg(feature = "neural")]
use std::collections::HashMap;
#[cfg(feature = "neural")]
use std::sync::Mutex;

#[cfg(feature = "neural")]
use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::contract::{expect_len, Discipline};
use crate::request::EncodeResponse;

/// Paths to per-discipline ONNX models. Missing entries disable that model.
#[derive(Debug, Clone, Default)]
pub struct ModelPaths {
    pub smithing: Option<String>,
    pub adornment: Option<String>,
    pub alchemy: Option<String>,
    pub refining: Option<String>,
    pub engineering: Option<String>,
}

impl ModelPaths {
    pub fn get(&self, discipline: Discipline) -> Option<&str> {
        match discipline {
            Discipline::Smithing => self.smithing.as_deref(),
            Discipline::Adornment => self.adornment.as_deref(),
            Discipline::Alchemy => self.alchemy.as_deref(),
            Discipline::Refining => self.refining.as_deref(),
            Discipline::Engineering => self.engineering.as_deref(),
        }
    }
}

/// Holds an ONNX session per discipline.
pub struct CraftingClassifier {
    #[cfg(feature = "neural")]
    sessions: HashMap<Discipline, Mutex<Session>>,
}

impl CraftingClassifier {
    /// Loads every model that has a path. Models that fail to load are
    /// skipped with a warning.
    pub fn new(paths: &ModelPaths) -> Self {
        #[cfg(feature = "neural")]
        {
            let mut sessions = HashMap::new();
            for discipline in crate::contract::ALL_DISCIPLINES {
                if let Some(session) = paths.get(discipline).and_then(load_session) {
                    tracing::info!(%discipline, "loaded classifier model");
                    sessions.insert(discipline, Mutex::new(session));
                }
            }
            CraftingClassifier { sessions }
        }

        #[cfg(not(feature = "neural"))]
        {
            let _ = paths;
            tracing::info!("classifier disabled (compiled without 'neural' feature)");
            CraftingClassifier {}
        }
    }

    /// Returns true if a model is loaded for the discipline.
    pub fn has_model(&self, discipline: Discipline) -> bool {
        #[cfg(feature = "neural")]
        {
            self.sessions.contains_key(&discipline)
        }
        #[cfg(not(feature = "neural"))]
        {
            let _ = discipline;
            false
        }
    }

    /// Runs the discipline's model on encoder output and returns the
    /// probability of the last output class (the "valid" class).
    ///
    /// # Panics
    ///
    /// Panics if `encoded.values` has the wrong length for its discipline.
    pub fn predict(&self, encoded: &EncodeResponse) -> Option<f32> {
        let values = expect_len(encoded.discipline, &encoded.values);

        #[cfg(feature = "neural")]
        {
            let mutex = self.sessions.get(&encoded.discipline)?;
            let mut session = mutex.lock().ok()?;
            run_inference(&mut session, encoded.discipline, values)
        }
        #[cfg(not(feature = "neural"))]
        {
            let _ = values;
            None
        }
    }
}

/// Loads an ONNX session from a file path. Returns None on failure.
#[cfg(feature = "neural")]
fn load_session(path: &str) -> Option<Session> {
    match Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|b| b.with_intra_threads(1))
        .and_then(|b| b.commit_from_file(path))
    {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(path, error = %e, "failed to load classifier model");
            None
        }
    }
}

/// Shapes encoder output as a batch of one.
///
/// # Panics
///
/// Panics if `values` does not fill the discipline's input shape.
#[cfg(feature = "neural")]
pub fn to_batch_tensor(discipline: Discipline, values: &[f32]) -> ndarray::ArrayD<f32> {
    let mut shape = vec![1usize];
    shape.extend(discipline.input_shape());
    match ndarray::ArrayD::from_shape_vec(shape, values.to_vec()) {
        Ok(array) => array,
        Err(e) => panic!("{} input contract violated: {}", discipline, e),
    }
}

#[cfg(feature = "neural")]
fn run_inference(session: &mut Session, discipline: Discipline, values: &[f32]) -> Option<f32> {
    use ort::value::Value;

    let tensor = to_batch_tensor(discipline, values);
    let shape = tensor.shape().to_vec();
    let (data, _offset) = tensor.into_raw_vec_and_offset();
    let input = Value::from_array((shape, data)).ok()?;

    let outputs = session.run(ort::inputs![input]).ok()?;
    let (_shape, data) = outputs[0].try_extract_tensor::<f32>().ok()?;
    data.last().copied()
}
