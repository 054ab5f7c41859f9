use url::Url;

/// Best-effort registrable-domain extraction.
///
/// Extraction never fails: malformed input degrades to a trimmed,
/// lowercased best guess so downstream whitelist and enrichment lookups
/// can still be attempted.
pub struct DomainExtractor;

/// Two-part TLDs where the registrable domain keeps three labels
/// (e.g. example.co.uk).
const TWO_PART_TLDS: &[&str] = &[
    "co.uk", "com.au", "co.jp", "co.kr", "com.br", "co.za", "com.mx", "co.in", "com.sg", "co.nz",
    "com.ar", "co.il", "org.uk", "net.au", "gov.uk", "ac.uk", "edu.au",
];

impl DomainExtractor {
    /// Extract the registrable domain (ETLD+1) from a raw URL.
    ///
    /// Strips the scheme and path, then reduces the host to its last two
    /// labels (three for known two-part TLDs). Input without a `.` is
    /// returned trimmed and lowercased as-is.
    pub fn registrable_domain(url: &str) -> String {
        let trimmed = url.trim();

        // Proper parse first; fall back to manual stripping for
        // scheme-less input like "paypal-verify-login.net/reset".
        let host = match Url::parse(trimmed) {
            Ok(parsed) => parsed.host_str().map(|h| h.to_lowercase()),
            Err(_) => None,
        };

        let host = host.unwrap_or_else(|| {
            let mut rest = trimmed;
            if let Some(idx) = rest.find("://") {
                rest = &rest[idx + 3..];
            }
            let rest = rest.split('/').next().unwrap_or(rest);
            // Drop userinfo and port artifacts.
            let rest = rest.rsplit('@').next().unwrap_or(rest);
            let rest = rest.split(':').next().unwrap_or(rest);
            rest.trim().to_lowercase()
        });

        if !host.contains('.') {
            return if host.is_empty() {
                trimmed.to_lowercase()
            } else {
                host
            };
        }

        Self::root_domain(&host)
    }

    /// Reduce a host name to its registrable root.
    /// e.g. "mail.google.com" -> "google.com"
    pub fn root_domain(host: &str) -> String {
        let host = host.trim_end_matches('.').to_lowercase();
        let parts: Vec<&str> = host.split('.').collect();

        if parts.len() < 2 {
            return host;
        }

        if parts.len() >= 3 {
            let potential_tld = format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1]);
            if TWO_PART_TLDS.contains(&potential_tld.as_str()) {
                return format!(
                    "{}.{}.{}",
                    parts[parts.len() - 3],
                    parts[parts.len() - 2],
                    parts[parts.len() - 1]
                );
            }
        }

        format!("{}.{}", parts[parts.len() - 2], parts[parts.len() - 1])
    }

    /// Extract the domain of an email address: the substring after the
    /// last `@`, lowercased and cleaned of common SMTP artifacts. Input
    /// without an `@` is returned trimmed and lowercased unchanged.
    pub fn domain_from_email(address: &str) -> String {
        let trimmed = address.trim();

        let Some(at_pos) = trimmed.rfind('@') else {
            return trimmed.to_lowercase();
        };

        let domain_part = &trimmed[at_pos + 1..];
        let domain = domain_part
            .split_whitespace()
            .next()
            .unwrap_or("")
            .split('>')
            .next()
            .unwrap_or("")
            .split(',')
            .next()
            .unwrap_or("")
            .split(';')
            .next()
            .unwrap_or("")
            .trim();

        if domain.is_empty() {
            trimmed.to_lowercase()
        } else {
            domain.to_lowercase()
        }
    }
}
