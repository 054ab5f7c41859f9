use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use serde::Serialize;
use std::sync::Mutex;

use crate::config::ModelConfig;
use crate::error::AnalysisError;
use crate::features;
use crate::whitelist::Flow;

/// Label names of the email model's 4-way output, in output order.
pub const EMAIL_LABELS: &[&str] = &[
    "legitimate_email",
    "phishing_url",
    "legitimate_url",
    "phishing_url_alt",
];

/// Label names of the URL model's 2-way output, in output order.
pub const URL_LABELS: &[&str] = &["safe", "phishing"];

/// A labeled probability distribution, produced fresh per inference
/// call. Probabilities sum to 1 within floating tolerance.
#[derive(Debug, Clone)]
pub struct LabelDistribution {
    entries: Vec<(String, f32)>,
}

impl LabelDistribution {
    /// Build from already-normalized probabilities.
    pub fn from_probabilities(entries: Vec<(String, f32)>) -> Self {
        LabelDistribution { entries }
    }

    /// Build from raw model logits by applying softmax.
    pub fn from_logits(labels: &[&str], logits: &[f32]) -> Self {
        let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
        let sum: f32 = exps.iter().sum();

        let entries = labels
            .iter()
            .zip(exps.iter())
            .map(|(label, e)| (label.to_string(), e / sum))
            .collect();
        LabelDistribution { entries }
    }

    /// The winning label and its probability.
    pub fn top(&self) -> Option<(&str, f32)> {
        self.entries
            .iter()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(label, prob)| (label.as_str(), *prob))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.entries.iter().map(|(l, p)| (l.as_str(), *p))
    }
}

/// Abstraction over a pretrained model: raw text in, labeled
/// probability distribution out.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<LabelDistribution, AnalysisError>;
}

/// ONNX-backed classifier. The session is loaded once at startup;
/// `Session::run` takes `&mut self`, so inference is serialized behind a
/// mutex rather than guarded ad hoc.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    labels: &'static [&'static str],
    featurizer: fn(&str) -> Vec<f32>,
}

impl OnnxClassifier {
    pub fn load(model_path: &str, flow: Flow) -> anyhow::Result<Self> {
        log::info!("loading {flow} model from {model_path}");

        if !std::path::Path::new(model_path).exists() {
            anyhow::bail!("model file not found: {model_path}");
        }

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path)?;

        let (labels, featurizer): (&'static [&'static str], fn(&str) -> Vec<f32>) = match flow {
            Flow::Email => (EMAIL_LABELS, features::email_features),
            Flow::Url => (URL_LABELS, features::url_features),
        };

        log::info!("{flow} model loaded ({} labels)", labels.len());
        Ok(OnnxClassifier {
            session: Mutex::new(session),
            labels,
            featurizer,
        })
    }
}

impl TextClassifier for OnnxClassifier {
    fn classify(&self, text: &str) -> Result<LabelDistribution, AnalysisError> {
        let features = (self.featurizer)(text);
        let width = features.len();

        let input_array = Array2::<f32>::from_shape_vec((1, width), features)
            .map_err(|e| AnalysisError::Inference(format!("input shape error: {e}")))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| AnalysisError::Inference("model lock poisoned".to_string()))?;

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| AnalysisError::Inference("model defines no output".to_string()))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| AnalysisError::Inference(format!("tensor error: {e}")))?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| AnalysisError::Inference(format!("inference failed: {e}")))?;

        let output = outputs
            .get(&output_name)
            .ok_or_else(|| AnalysisError::Inference("model produced no output".to_string()))?;

        let output_tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| AnalysisError::Inference(format!("output extract error: {e}")))?;
        let data = output_tensor.1;

        if data.len() < self.labels.len() {
            return Err(AnalysisError::Inference(format!(
                "model returned {} scores, expected {}",
                data.len(),
                self.labels.len()
            )));
        }

        Ok(LabelDistribution::from_logits(
            self.labels,
            &data[..self.labels.len()],
        ))
    }
}

/// Per-flow model load state reported by the readiness probe.
#[derive(Debug, Clone, Serialize)]
pub struct Readiness {
    pub email_model: bool,
    pub url_model: bool,
}

impl Readiness {
    pub fn all_ready(&self) -> bool {
        self.email_model && self.url_model
    }
}

type LoadState = Result<Box<dyn TextClassifier>, String>;

/// Process-wide, read-only registry of loaded models, populated once at
/// startup with explicit success/failure state per flow.
pub struct ModelRegistry {
    email: LoadState,
    url: LoadState,
}

impl ModelRegistry {
    /// Load both flow models. A failed load is recorded, not fatal for
    /// the process; the affected flow refuses requests.
    pub fn load(config: &ModelConfig) -> Self {
        let email = OnnxClassifier::load(&config.email_model_path, Flow::Email)
            .map(|c| Box::new(c) as Box<dyn TextClassifier>)
            .map_err(|e| {
                log::error!("email model failed to load: {e}");
                e.to_string()
            });
        let url = OnnxClassifier::load(&config.url_model_path, Flow::Url)
            .map(|c| Box::new(c) as Box<dyn TextClassifier>)
            .map_err(|e| {
                log::error!("url model failed to load: {e}");
                e.to_string()
            });

        ModelRegistry { email, url }
    }

    /// Assemble a registry from preloaded classifiers. `None` marks the
    /// flow's model as unavailable.
    pub fn from_classifiers(
        email: Option<Box<dyn TextClassifier>>,
        url: Option<Box<dyn TextClassifier>>,
    ) -> Self {
        ModelRegistry {
            email: email.ok_or_else(|| "email model not loaded".to_string()),
            url: url.ok_or_else(|| "url model not loaded".to_string()),
        }
    }

    /// The flow's classifier, or `ModelUnavailable` if its model failed
    /// to load at startup.
    pub fn get(&self, flow: Flow) -> Result<&dyn TextClassifier, AnalysisError> {
        let state = match flow {
            Flow::Email => &self.email,
            Flow::Url => &self.url,
        };
        state
            .as_ref()
            .map(|c| c.as_ref())
            .map_err(|_| AnalysisError::ModelUnavailable { flow })
    }

    pub fn readiness(&self) -> Readiness {
        Readiness {
            email_model: self.email.is_ok(),
            url_model: self.url.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_logits_is_normalized() {
        let dist = LabelDistribution::from_logits(URL_LABELS, &[1.2, 3.4]);
        let sum: f32 = dist.iter().map(|(_, p)| p).sum();
        assert!((sum - 1.0).abs() < 1e-5);

        let (label, prob) = dist.top().unwrap();
        assert_eq!(label, "phishing");
        assert!(prob > 0.5);
    }

    #[test]
    fn test_from_logits_handles_large_values() {
        let dist = LabelDistribution::from_logits(URL_LABELS, &[1000.0, 900.0]);
        let (label, prob) = dist.top().unwrap();
        assert_eq!(label, "safe");
        assert!(prob > 0.99);
    }

    #[test]
    fn test_top_of_probabilities() {
        let dist = LabelDistribution::from_probabilities(vec![
            ("legitimate_email".to_string(), 0.1),
            ("phishing_url".to_string(), 0.7),
            ("legitimate_url".to_string(), 0.15),
            ("phishing_url_alt".to_string(), 0.05),
        ]);
        assert_eq!(dist.top().unwrap().0, "phishing_url");
    }

    #[test]
    fn test_registry_reports_unavailable() {
        let registry = ModelRegistry::from_classifiers(None, None);
        assert!(matches!(
            registry.get(Flow::Email),
            Err(AnalysisError::ModelUnavailable { flow: Flow::Email })
        ));
        let readiness = registry.readiness();
        assert!(!readiness.email_model);
        assert!(!readiness.url_model);
        assert!(!readiness.all_ready());
    }

    struct FixedClassifier;

    impl TextClassifier for FixedClassifier {
        fn classify(&self, _text: &str) -> Result<LabelDistribution, AnalysisError> {
            Ok(LabelDistribution::from_probabilities(vec![
                ("safe".to_string(), 0.9),
                ("phishing".to_string(), 0.1),
            ]))
        }
    }

    #[test]
    fn test_registry_serves_loaded_classifier() {
        let registry = ModelRegistry::from_classifiers(None, Some(Box::new(FixedClassifier)));
        let classifier = registry.get(Flow::Url).unwrap();
        let dist = classifier.classify("http://x.test").unwrap();
        assert_eq!(dist.top().unwrap().0, "safe");
        assert!(registry.readiness().url_model);
    }
}
