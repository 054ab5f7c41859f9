pub mod analyzer;
pub mod brand;
pub mod classifier;
pub mod config;
pub mod decision;
pub mod domain_utils;
pub mod enrichment;
pub mod error;
pub mod features;
pub mod keyword_fallback;
pub mod whitelist;
pub mod whois;

pub use analyzer::{AnalysisResult, AnalysisService, Severity, ThreatIndicator};
pub use classifier::{LabelDistribution, ModelRegistry, Readiness, TextClassifier};
pub use config::Config;
pub use decision::Verdict;
pub use enrichment::DomainInfo;
pub use error::AnalysisError;
pub use whitelist::{Flow, Whitelist};
