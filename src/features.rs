//! Serving-side feature vectors.
//!
//! Both classification models consume fixed-arity numeric vectors. The
//! layouts here are the serving contract with the exported models and
//! must not be reordered without retraining.

use lazy_static::lazy_static;
use regex::Regex;

use crate::brand;
use crate::keyword_fallback::SUSPICIOUS_KEYWORDS;

/// Arity of the email model's input vector.
pub const EMAIL_FEATURE_COUNT: usize = 30;

/// Arity of the URL model's input vector: lexical stats plus one
/// indicator per suspicious keyword.
pub const URL_LEXICAL_FEATURES: usize = 8;

pub fn url_feature_count() -> usize {
    URL_LEXICAL_FEATURES + SUSPICIOUS_KEYWORDS.len()
}

/// Substrings counted as individual email features, in model order.
const EMAIL_COUNTED_TERMS: &[&str] = &[
    "@",
    "http",
    "www",
    "!",
    "$",
    "%",
    "?",
    "click",
    "link",
    "reward",
    "gift",
    "card",
    "claim",
    "win",
    "prize",
    "congratulations",
    "amazon",
    "expires",
    "urgent",
    "verify",
    "update",
    "account",
    "password",
    "support",
    "team",
];

const URGENCY_PHRASES: &[&str] = &[
    "hurry",
    "expires",
    "urgent",
    "limited",
    "now",
    "immediately",
    "24 hours",
];

lazy_static! {
    static ref FROM_ANGLE_RE: Regex =
        Regex::new(r#"(?i)from:\s*"?[^"\n]*"?\s*<([^>]+)>"#).unwrap();
    static ref FROM_BARE_RE: Regex = Regex::new(r"(?i)from:\s*(\S+)").unwrap();
}

/// Pull the sender address out of a raw message's From header, if any.
/// Tries the display-name `<addr>` form first, then a bare address.
pub fn extract_sender(text: &str) -> Option<String> {
    if let Some(caps) = FROM_ANGLE_RE.captures(text) {
        return Some(caps[1].trim().to_string());
    }
    FROM_BARE_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Build the email model's input vector from a raw message.
pub fn email_features(text: &str) -> Vec<f32> {
    let lower = text.to_lowercase();
    let mut features = Vec::with_capacity(EMAIL_FEATURE_COUNT);

    features.push(text.len() as f32);
    for term in EMAIL_COUNTED_TERMS {
        features.push(lower.matches(term).count() as f32);
    }

    let sender_domain = extract_sender(text)
        .map(|s| crate::domain_utils::DomainExtractor::domain_from_email(&s))
        .unwrap_or_default();

    features.push(if brand::impersonated_brand(&sender_domain).is_some() {
        1.0
    } else {
        0.0
    });
    features.push(
        if sender_domain.contains("prizes") || sender_domain.contains("support") {
            1.0
        } else {
            0.0
        },
    );
    features.push(if lower.contains("http") { 1.0 } else { 0.0 });
    features.push(if URGENCY_PHRASES.iter().any(|p| lower.contains(p)) {
        1.0
    } else {
        0.0
    });

    debug_assert_eq!(features.len(), EMAIL_FEATURE_COUNT);
    features
}

/// Build the URL model's input vector from a raw URL.
pub fn url_features(url: &str) -> Vec<f32> {
    let lower = url.to_lowercase();
    let mut features = Vec::with_capacity(url_feature_count());

    features.push(url.len() as f32);
    features.push(url.chars().filter(|c| c.is_ascii_digit()).count() as f32);
    features.push(url.chars().filter(|c| !c.is_alphanumeric()).count() as f32);
    features.push(url.matches('.').count() as f32);
    features.push(if url.contains('@') { 1.0 } else { 0.0 });
    features.push(url.matches('-').count() as f32);

    // Host length, when a scheme is present.
    let host_len = if lower.starts_with("http") {
        url.split('/').nth(2).map(|h| h.len()).unwrap_or(0)
    } else {
        0
    };
    features.push(host_len as f32);
    features.push(if lower.starts_with("https") { 1.0 } else { 0.0 });

    for kw in SUSPICIOUS_KEYWORDS {
        features.push(if lower.contains(kw) { 1.0 } else { 0.0 });
    }

    debug_assert_eq!(features.len(), url_feature_count());
    features
}
