use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Confidence threshold (percent) above which a phishing label wins.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    #[serde(default)]
    pub models: ModelConfig,
    #[serde(default)]
    pub whitelist: WhitelistConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub email_model_path: String,
    pub url_model_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhitelistConfig {
    /// Trusted sender domains for the email flow.
    pub email_domains: Vec<String>,
    /// Trusted registrable domains for the URL flow.
    pub url_domains: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// WhoisXMLAPI key. Absent is a normal configuration: lookups then
    /// go straight to the direct WHOIS path. The WHOISXMLAPI_KEY
    /// environment variable overrides an absent key.
    #[serde(default)]
    pub whois_api_key: Option<String>,
    #[serde(default = "default_whois_timeout")]
    pub whois_timeout_seconds: u64,
    #[serde(default = "default_tls_timeout")]
    pub tls_probe_timeout_seconds: u64,
    /// Serve canned enrichment data instead of the network. Testing
    /// only.
    #[serde(default)]
    pub use_mock_data: bool,
}

fn default_confidence_threshold() -> f32 {
    80.0
}

fn default_whois_timeout() -> u64 {
    10
}

fn default_tls_timeout() -> u64 {
    3
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            email_model_path: "/var/lib/phishshield/email_model.onnx".to_string(),
            url_model_path: "/var/lib/phishshield/url_model.onnx".to_string(),
        }
    }
}

impl Default for WhitelistConfig {
    fn default() -> Self {
        WhitelistConfig {
            email_domains: [
                "company.com",
                "gmail.com",
                "outlook.com",
                "yahoo.com",
                "apple.com",
                "microsoft.com",
                "icloud.com",
                "protonmail.com",
                "zoho.com",
                "hotmail.com",
                "aol.com",
                "pm.me",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            url_domains: [
                "google.com",
                "gmail.com",
                "microsoft.com",
                "outlook.com",
                "apple.com",
                "icloud.com",
                "yahoo.com",
                "amazon.com",
                "facebook.com",
                "twitter.com",
                "linkedin.com",
                "github.com",
                "youtube.com",
                "wikipedia.org",
                "instagram.com",
                "whatsapp.com",
                "netflix.com",
                "office.com",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        EnrichmentConfig {
            whois_api_key: None,
            whois_timeout_seconds: default_whois_timeout(),
            tls_probe_timeout_seconds: default_tls_timeout(),
            use_mock_data: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            confidence_threshold: default_confidence_threshold(),
            models: ModelConfig::default(),
            whitelist: WhitelistConfig::default(),
            enrichment: EnrichmentConfig::default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The WHOIS provider key, from config or environment.
    pub fn whois_api_key(&self) -> Option<String> {
        self.enrichment
            .whois_api_key
            .clone()
            .or_else(|| std::env::var("WHOISXMLAPI_KEY").ok())
    }
}
