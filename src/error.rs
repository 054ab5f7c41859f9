use crate::whitelist::Flow;

/// Errors that cross the analysis boundary. Everything else in the
/// pipeline (enrichment, domain extraction) degrades in place and never
/// surfaces as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Input was empty after trimming; rejected before the pipeline runs.
    EmptyInput,
    /// The flow's model failed to load at startup. The flow refuses
    /// requests instead of guessing.
    ModelUnavailable { flow: Flow },
    /// A single inference call failed. Recovered per-request into a
    /// verdict of `error`, never propagated to other requests.
    Inference(String),
}

impl std::fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalysisError::EmptyInput => write!(f, "input is empty"),
            AnalysisError::ModelUnavailable { flow } => {
                write!(f, "no model loaded for the {flow} flow")
            }
            AnalysisError::Inference(msg) => write!(f, "inference failed: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}
