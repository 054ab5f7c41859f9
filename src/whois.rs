use anyhow::{anyhow, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

/// What a registration lookup could recover. Either field may be absent
/// independently.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRecord {
    pub registrar: Option<String>,
    pub creation_date: Option<SystemTime>,
}

impl RegistrationRecord {
    pub fn is_empty(&self) -> bool {
        self.registrar.is_none() && self.creation_date.is_none()
    }
}

/// Registration lookup client: keyed WhoisXMLAPI provider first when a
/// credential is configured, direct WHOIS over port 43 otherwise or on
/// any keyed failure. The fallback is a single deterministic
/// substitution, not a retry loop.
pub struct WhoisClient {
    api_key: Option<String>,
    timeout: Duration,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct WhoisXmlResponse {
    #[serde(rename = "WhoisRecord")]
    whois_record: Option<WhoisXmlRecord>,
}

#[derive(Debug, Deserialize)]
struct WhoisXmlRecord {
    #[serde(rename = "registrarName")]
    registrar_name: Option<String>,
    #[serde(rename = "createdDate")]
    created_date: Option<String>,
}

lazy_static! {
    /// Creation-date field names seen across registry WHOIS formats.
    static ref CREATION_PATTERNS: Vec<Regex> = [
        r"(?i)creation\s*date[:\s]+([^\r\n]+)",
        r"(?i)created[:\s]+([^\r\n]+)",
        r"(?i)registered[:\s]+([^\r\n]+)",
        r"(?i)domain\s*created[:\s]+([^\r\n]+)",
        r"(?i)registration\s*date[:\s]+([^\r\n]+)",
        r"(?i)created\s*on[:\s]+([^\r\n]+)",
        r"(?i)registered\s*on[:\s]+([^\r\n]+)",
        r"(?i)domain_date_created[:\s]+([^\r\n]+)",
        r"(?i)create_date[:\s]+([^\r\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref REGISTRAR_PATTERNS: Vec<Regex> = [
        r"(?im)^\s*registrar:\s*([^\r\n]+)",
        r"(?im)^\s*registrar\s*name:\s*([^\r\n]+)",
        r"(?im)^\s*sponsoring\s*registrar:\s*([^\r\n]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect();

    static ref ISO_DATE_RE: Regex = Regex::new(r"(\d{4})-(\d{2})-(\d{2})").unwrap();
}

impl WhoisClient {
    pub fn new(api_key: Option<String>, timeout_seconds: u64) -> Self {
        let timeout = Duration::from_secs(timeout_seconds);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        WhoisClient {
            api_key,
            timeout,
            http,
        }
    }

    /// Look up registration data for a domain. Failures on both paths
    /// degrade to an empty record; this never errors outward.
    pub async fn lookup(&self, domain: &str) -> RegistrationRecord {
        if let Some(key) = &self.api_key {
            match self.keyed_lookup(key, domain).await {
                Ok(record) => return record,
                Err(e) => {
                    log::debug!("keyed WHOIS lookup failed for {domain}: {e}");
                }
            }
        }

        match self.direct_lookup(domain).await {
            Ok(record) => record,
            Err(e) => {
                log::debug!("direct WHOIS lookup failed for {domain}: {e}");
                RegistrationRecord::default()
            }
        }
    }

    /// Query the keyed JSON provider.
    async fn keyed_lookup(&self, api_key: &str, domain: &str) -> Result<RegistrationRecord> {
        log::debug!("WhoisXMLAPI lookup for domain: {domain}");
        let url = format!(
            "https://www.whoisxmlapi.com/whoisserver/WhoisService?apiKey={api_key}&domainName={domain}&outputFormat=JSON"
        );

        let response = self.http.get(&url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let parsed: WhoisXmlResponse = serde_json::from_str(&body)?;

        let record = parsed
            .whois_record
            .ok_or_else(|| anyhow!("response carries no WhoisRecord"))?;

        Ok(RegistrationRecord {
            registrar: record.registrar_name,
            creation_date: record.created_date.as_deref().and_then(parse_date_string),
        })
    }

    /// Query the TLD's WHOIS server directly over TCP port 43.
    async fn direct_lookup(&self, domain: &str) -> Result<RegistrationRecord> {
        let server = whois_server_for(domain);
        log::debug!("direct WHOIS query to {server} for {domain}");

        let text = self.query_whois_server(server, domain).await?;
        let record = parse_whois_text(&text);
        if record.is_empty() {
            return Err(anyhow!("no registration fields found in WHOIS response"));
        }
        Ok(record)
    }

    async fn query_whois_server(&self, server: &str, domain: &str) -> Result<String> {
        let mut stream = timeout(self.timeout, TcpStream::connect(format!("{server}:43"))).await??;

        let query = format!("{domain}\r\n");
        stream.write_all(query.as_bytes()).await?;

        let mut response = String::new();
        timeout(self.timeout, stream.read_to_string(&mut response)).await??;

        if response.is_empty() {
            return Err(anyhow!("empty WHOIS response"));
        }
        Ok(response)
    }
}

/// WHOIS server by TLD; IANA for anything unlisted.
pub fn whois_server_for(domain: &str) -> &'static str {
    let tld = domain.rsplit('.').next().unwrap_or(domain);
    match tld {
        "com" | "net" => "whois.verisign-grs.com",
        "org" => "whois.pir.org",
        "info" => "whois.afilias.net",
        "biz" => "whois.neulevel.biz",
        "us" => "whois.nic.us",
        "uk" => "whois.nic.uk",
        "de" => "whois.denic.de",
        "fr" => "whois.afnic.fr",
        "it" => "whois.nic.it",
        "nl" => "whois.domain-registry.nl",
        "au" => "whois.auda.org.au",
        "ca" => "whois.cira.ca",
        "jp" => "whois.jprs.jp",
        "cn" => "whois.cnnic.cn",
        "ru" => "whois.tcinet.ru",
        "br" => "whois.registro.br",
        "mx" => "whois.mx",
        "xyz" => "whois.nic.xyz",
        _ => "whois.iana.org",
    }
}

/// Pull registrar and creation date out of raw WHOIS text.
pub fn parse_whois_text(text: &str) -> RegistrationRecord {
    let creation_date = CREATION_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| parse_date_string(m.as_str().trim()))
    });

    let registrar = REGISTRAR_PATTERNS.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    });

    RegistrationRecord {
        registrar,
        creation_date,
    }
}

/// Parse the leading ISO date out of a WHOIS date field
/// ("2015-06-01", "2015-06-01T04:00:00Z", ...).
pub fn parse_date_string(date_str: &str) -> Option<SystemTime> {
    let caps = ISO_DATE_RE.captures(date_str)?;
    let year: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    system_time_from_ymd(year, month, day)
}

/// Approximate calendar-to-timestamp conversion, good enough for
/// year-granularity domain age.
pub fn system_time_from_ymd(year: u32, month: u32, day: u32) -> Option<SystemTime> {
    if year < 1970 || month == 0 || month > 12 || day == 0 || day > 31 {
        return None;
    }

    let years_since_1970 = (year - 1970) as u64;
    let mut days = years_since_1970 * 365;
    days += years_since_1970 / 4;

    let days_in_month = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    for m in 1..month {
        days += days_in_month[(m - 1) as usize] as u64;
    }
    days += day as u64 - 1;

    Some(UNIX_EPOCH + Duration::from_secs(days * 24 * 60 * 60))
}

/// Whole years between creation and now, floored.
pub fn age_years_between(creation: SystemTime, now: SystemTime) -> u32 {
    let days = now
        .duration_since(creation)
        .unwrap_or(Duration::ZERO)
        .as_secs()
        / (24 * 60 * 60);
    (days / 365) as u32
}

/// Age of a registration record as of the current clock.
pub fn age_years(record: &RegistrationRecord) -> Option<u32> {
    record
        .creation_date
        .map(|created| age_years_between(created, SystemTime::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_years_fixed_dates() {
        let created = system_time_from_ymd(2015, 6, 1).unwrap();
        let now = system_time_from_ymd(2024, 6, 1).unwrap();
        assert_eq!(age_years_between(created, now), 9);
    }

    #[test]
    fn test_age_years_future_creation_is_zero() {
        let created = system_time_from_ymd(2030, 1, 1).unwrap();
        let now = system_time_from_ymd(2024, 1, 1).unwrap();
        assert_eq!(age_years_between(created, now), 0);
    }

    #[test]
    fn test_parse_date_formats() {
        assert!(parse_date_string("2015-06-01").is_some());
        assert!(parse_date_string("2015-06-01T04:00:00Z").is_some());
        assert!(parse_date_string("2015-06-01 04:00:00").is_some());
        assert!(parse_date_string("yesterday").is_none());
    }

    #[test]
    fn test_parse_whois_text_standard_format() {
        let text = "Domain Name: EXAMPLE.COM\n\
                    Registrar: MarkMonitor Inc.\n\
                    Creation Date: 1995-08-14T04:00:00Z\n\
                    Registry Expiry Date: 2025-08-13T04:00:00Z\n";
        let record = parse_whois_text(text);
        assert_eq!(record.registrar.as_deref(), Some("MarkMonitor Inc."));
        assert!(record.creation_date.is_some());
    }

    #[test]
    fn test_parse_whois_text_alternate_fields() {
        let text = "domain: example.de\nstatus: connect\ncreated: 2001-03-05\n\
                    sponsoring registrar: PSI-USA, Inc.\n";
        let record = parse_whois_text(text);
        assert!(record.creation_date.is_some());
        assert_eq!(record.registrar.as_deref(), Some("PSI-USA, Inc."));
    }

    #[test]
    fn test_parse_whois_text_nothing_found() {
        let record = parse_whois_text("No match for domain \"NOPE.EXAMPLE\".\n");
        assert!(record.is_empty());
    }

    #[test]
    fn test_keyed_response_parsing() {
        let body = r#"{
            "WhoisRecord": {
                "registrarName": "GoDaddy.com, LLC",
                "createdDate": "2015-06-01T00:00:00Z"
            }
        }"#;
        let parsed: WhoisXmlResponse = serde_json::from_str(body).unwrap();
        let record = parsed.whois_record.unwrap();
        assert_eq!(record.registrar_name.as_deref(), Some("GoDaddy.com, LLC"));
        let created = parse_date_string(record.created_date.as_deref().unwrap()).unwrap();
        let now = system_time_from_ymd(2024, 6, 1).unwrap();
        assert_eq!(age_years_between(created, now), 9);
    }

    #[test]
    fn test_whois_server_table() {
        assert_eq!(whois_server_for("example.com"), "whois.verisign-grs.com");
        assert_eq!(whois_server_for("example.org"), "whois.pir.org");
        assert_eq!(whois_server_for("example.zz"), "whois.iana.org");
    }
}
