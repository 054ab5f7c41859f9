use serde::Serialize;

use crate::brand;
use crate::classifier::{ModelRegistry, Readiness};
use crate::config::Config;
use crate::decision::{ThresholdDecision, Verdict};
use crate::domain_utils::DomainExtractor;
use crate::enrichment::{DomainEnricher, DomainInfo};
use crate::error::AnalysisError;
use crate::features;
use crate::keyword_fallback;
use crate::whitelist::{Flow, Whitelist};

/// Confidence reported for whitelist short-circuits.
const WHITELIST_CONFIDENCE: f32 = 99.99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThreatIndicator {
    pub description: String,
    pub severity: Severity,
}

impl ThreatIndicator {
    pub fn new(description: impl Into<String>, severity: Severity) -> Self {
        ThreatIndicator {
            description: description.into(),
            severity,
        }
    }
}

/// The assembled outcome of one analysis. Owned by the invocation that
/// created it; nothing here is shared across requests.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    #[serde(skip)]
    pub verdict: Verdict,
    /// User-facing label: "ham"/"safe", "phishing", or "error".
    pub classification: String,
    pub confidence: f32,
    pub threats: Vec<ThreatIndicator>,
    pub analysis: String,
    pub domain_info: Option<DomainInfo>,
}

impl AnalysisResult {
    fn assemble(
        verdict: Verdict,
        email_flow: bool,
        confidence: f32,
        threats: Vec<ThreatIndicator>,
        analysis: impl Into<String>,
        domain_info: Option<DomainInfo>,
    ) -> Self {
        AnalysisResult {
            verdict,
            classification: verdict.label(email_flow).to_string(),
            confidence,
            threats,
            analysis: analysis.into(),
            domain_info,
        }
    }

    fn inference_error(email_flow: bool, err: &AnalysisError) -> Self {
        let detail = match err {
            AnalysisError::Inference(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self::assemble(
            Verdict::Error,
            email_flow,
            0.0,
            Vec::new(),
            format!("Model prediction failed: {detail}"),
            None,
        )
    }
}

/// Sequences whitelist check, classification, threshold decision,
/// keyword fallback, and enrichment into one request -> result
/// transaction per flow. All shared state is read-only.
pub struct AnalysisService {
    whitelist: Whitelist,
    registry: ModelRegistry,
    enricher: DomainEnricher,
    threshold: f32,
}

impl AnalysisService {
    /// Build the service, loading both flow models. A model that fails
    /// to load disables its flow; the service itself still starts.
    pub fn new(config: &Config) -> Self {
        let registry = ModelRegistry::load(&config.models);
        Self::with_registry(config, registry)
    }

    /// Build the service around preloaded classifiers.
    pub fn with_registry(config: &Config, registry: ModelRegistry) -> Self {
        AnalysisService {
            whitelist: Whitelist::new(
                config.whitelist.email_domains.clone(),
                config.whitelist.url_domains.clone(),
            ),
            registry,
            enricher: DomainEnricher::new(&config.enrichment, config.whois_api_key()),
            threshold: config.confidence_threshold,
        }
    }

    /// Per-flow model load state for the liveness/readiness signal.
    pub fn readiness(&self) -> Readiness {
        self.registry.readiness()
    }

    /// Classify a raw email message.
    pub async fn analyze_email(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let sender_domain = features::extract_sender(text)
            .map(|addr| DomainExtractor::domain_from_email(&addr));

        // Trusted sender: terminal verdict, no classification, no
        // enrichment.
        if let Some(domain) = &sender_domain {
            if self.whitelist.contains(Flow::Email, domain) {
                log::debug!("email sender domain {domain} is whitelisted");
                return Ok(AnalysisResult::assemble(
                    Verdict::Safe,
                    true,
                    WHITELIST_CONFIDENCE,
                    Vec::new(),
                    "Sender domain is trusted. No phishing indicators detected.",
                    None,
                ));
            }
        }

        let classifier = self.registry.get(Flow::Email)?;
        let dist = match classifier.classify(text) {
            Ok(dist) => dist,
            Err(e) => {
                log::warn!("email classification failed: {e}");
                return Ok(AnalysisResult::inference_error(true, &e));
            }
        };

        let (verdict, confidence) = ThresholdDecision::decide_email(&dist, self.threshold);

        let mut threats = Vec::new();
        let analysis = if verdict == Verdict::Phishing {
            threats.push(ThreatIndicator::new(
                "Phishing indicators detected",
                Severity::High,
            ));
            "This email is likely a phishing attempt."
        } else {
            "Email content appears legitimate with no suspicious indicators detected."
        };

        // Indicator only; brand impersonation never overrides the model
        // verdict.
        if let Some(domain) = &sender_domain {
            if let Some(hit) = brand::impersonated_brand(domain) {
                threats.push(ThreatIndicator::new(
                    format!("Sender domain '{domain}' resembles brand '{hit}'"),
                    Severity::Medium,
                ));
            }
        }

        Ok(AnalysisResult::assemble(
            verdict, true, confidence, threats, analysis, None,
        ))
    }

    /// Classify a raw URL.
    pub async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, AnalysisError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        let domain = DomainExtractor::registrable_domain(url);

        // A trusted URL domain short-circuits classification but its
        // reputation metadata is still informative to the caller, so
        // enrichment runs anyway.
        if self.whitelist.contains(Flow::Url, &domain) {
            log::debug!("url domain {domain} is whitelisted");
            let domain_info = self.enricher.enrich(&domain).await;
            return Ok(AnalysisResult::assemble(
                Verdict::Safe,
                false,
                WHITELIST_CONFIDENCE,
                Vec::new(),
                "This is a well-known trusted domain. No phishing indicators detected.",
                Some(domain_info),
            ));
        }

        let classifier = self.registry.get(Flow::Url)?;
        // Enrichment is only attempted once a verdict exists; a failed
        // classification terminates the flow here.
        let dist = match classifier.classify(url) {
            Ok(dist) => dist,
            Err(e) => {
                log::warn!("url classification failed: {e}");
                return Ok(AnalysisResult::inference_error(false, &e));
            }
        };

        let (verdict, confidence) = ThresholdDecision::decide_url(&dist, self.threshold);
        let (verdict, confidence, matched) = keyword_fallback::apply(verdict, confidence, url);

        let mut threats = Vec::new();
        let analysis = match verdict {
            Verdict::Phishing => {
                threats.push(ThreatIndicator::new(
                    "Phishing indicators detected",
                    Severity::High,
                ));
                if !matched.is_empty() {
                    threats.push(ThreatIndicator::new(
                        format!("Suspicious keywords in URL: {}", matched.join(", ")),
                        Severity::Medium,
                    ));
                }
                "This URL is likely a phishing site."
            }
            Verdict::Safe => "URL appears to be legitimate.",
            Verdict::Error => "Unable to classify URL.",
        };

        let domain_info = self.enricher.enrich(&domain).await;

        Ok(AnalysisResult::assemble(
            verdict,
            false,
            confidence,
            threats,
            analysis,
            Some(domain_info),
        ))
    }
}
