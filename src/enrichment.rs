use serde::Serialize;
use std::time::Duration;

use crate::config::EnrichmentConfig;
use crate::whois::{self, WhoisClient};

/// Secondary reputation signals for a domain. Every field is
/// independently defaultable: absence of one never blocks presence of
/// another, and enrichment as a whole never fails the parent request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomainInfo {
    pub age_years: Option<u32>,
    pub registrar: Option<String>,
    pub tls_valid: bool,
}

impl std::fmt::Display for DomainInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let age = match self.age_years {
            Some(years) => format!("{years} years"),
            None => "N/A".to_string(),
        };
        let registrar = self.registrar.as_deref().unwrap_or("N/A");
        write!(
            f,
            "age: {age}, registrar: {registrar}, tls: {}",
            if self.tls_valid { "valid" } else { "invalid" }
        )
    }
}

/// Best-effort domain reputation enrichment: registration lookup and a
/// TLS reachability probe, issued concurrently. Each sub-operation is
/// fault-isolated and enforces its own timeout.
pub struct DomainEnricher {
    whois: WhoisClient,
    http: reqwest::Client,
    use_mock: bool,
}

impl DomainEnricher {
    pub fn new(config: &EnrichmentConfig, api_key: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.tls_probe_timeout_seconds))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        DomainEnricher {
            whois: WhoisClient::new(api_key, config.whois_timeout_seconds),
            http,
            use_mock: config.use_mock_data,
        }
    }

    /// Collect whatever subset of reputation fields can be recovered.
    pub async fn enrich(&self, domain: &str) -> DomainInfo {
        if self.use_mock {
            return mock_domain_info(domain);
        }

        let (registration, tls_valid) =
            tokio::join!(self.whois.lookup(domain), self.probe_tls(domain));

        let info = DomainInfo {
            age_years: whois::age_years(&registration),
            registrar: registration.registrar,
            tls_valid,
        };
        log::debug!("enrichment for {domain}: {info}");
        info
    }

    /// TLS handshake probe against the standard HTTPS port. True only
    /// on a completed request; timeout, refused connection, and
    /// certificate failures all read as invalid. This deliberately
    /// conflates unreachable with invalid.
    async fn probe_tls(&self, domain: &str) -> bool {
        match self.http.head(format!("https://{domain}/")).send().await {
            Ok(_) => true,
            Err(e) => {
                log::debug!("TLS probe failed for {domain}: {e}");
                false
            }
        }
    }
}

/// Canned enrichment data for tests and demos.
fn mock_domain_info(domain: &str) -> DomainInfo {
    match domain {
        // Lookup and probe both failing: every field absent.
        "unreachable.test" => DomainInfo::default(),
        "google.com" => DomainInfo {
            age_years: Some(26),
            registrar: Some("MarkMonitor Inc.".to_string()),
            tls_valid: true,
        },
        "psybook.info" => DomainInfo {
            age_years: Some(0),
            registrar: Some("NameCheap, Inc.".to_string()),
            tls_valid: false,
        },
        _ => DomainInfo {
            age_years: Some(1),
            registrar: Some("Example Registrar, Inc.".to_string()),
            tls_valid: true,
        },
    }
}
