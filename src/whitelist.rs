use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The two analysis flows. Each flow has its own trusted-domain list and
/// its own classification model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flow {
    Email,
    Url,
}

impl std::fmt::Display for Flow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flow::Email => write!(f, "email"),
            Flow::Url => write!(f, "url"),
        }
    }
}

/// Static trusted-domain sets, loaded once at startup and read-only for
/// the lifetime of the process. The email and URL lists are disjoint by
/// construction in the default config but nothing requires that; each
/// flow only ever consults its own set.
#[derive(Debug, Clone)]
pub struct Whitelist {
    email_domains: HashSet<String>,
    url_domains: HashSet<String>,
}

impl Whitelist {
    pub fn new<I, J>(email_domains: I, url_domains: J) -> Self
    where
        I: IntoIterator<Item = String>,
        J: IntoIterator<Item = String>,
    {
        Whitelist {
            email_domains: email_domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
            url_domains: url_domains
                .into_iter()
                .map(|d| d.trim().to_lowercase())
                .collect(),
        }
    }

    /// O(1) membership check against the flow's trusted set.
    pub fn contains(&self, flow: Flow, domain: &str) -> bool {
        let domain = domain.to_lowercase();
        match flow {
            Flow::Email => self.email_domains.contains(&domain),
            Flow::Url => self.url_domains.contains(&domain),
        }
    }

    pub fn len(&self, flow: Flow) -> usize {
        match flow {
            Flow::Email => self.email_domains.len(),
            Flow::Url => self.url_domains.len(),
        }
    }

    pub fn is_empty(&self, flow: Flow) -> bool {
        self.len(flow) == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Whitelist {
        Whitelist::new(
            vec!["company.com".to_string(), "gmail.com".to_string()],
            vec!["google.com".to_string(), "github.com".to_string()],
        )
    }

    #[test]
    fn test_contains_per_flow() {
        let wl = sample();
        assert!(wl.contains(Flow::Email, "company.com"));
        assert!(wl.contains(Flow::Email, "GMAIL.COM"));
        assert!(!wl.contains(Flow::Email, "google.com"));

        assert!(wl.contains(Flow::Url, "google.com"));
        assert!(!wl.contains(Flow::Url, "company.com"));
    }

    #[test]
    fn test_entries_normalized() {
        let wl = Whitelist::new(vec!["  Example.COM ".to_string()], vec![]);
        assert!(wl.contains(Flow::Email, "example.com"));
    }

    #[test]
    fn test_unknown_domain() {
        let wl = sample();
        assert!(!wl.contains(Flow::Email, "phishing.example"));
        assert!(!wl.contains(Flow::Url, "phishing.example"));
    }
}
