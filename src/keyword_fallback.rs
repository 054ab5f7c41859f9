use crate::decision::Verdict;

/// Substrings that mark a URL as suspicious regardless of the model's
/// opinion: impersonated brands, credential-action verbs, and
/// infrastructure terms that rarely appear in legitimate registrable
/// names.
pub const SUSPICIOUS_KEYWORDS: &[&str] = &[
    "login",
    "secure",
    "verify",
    "account",
    "update",
    "paypal",
    "bank",
    "signin",
    "password",
    "ebay",
    "amazon",
    "admin",
    "confirm",
    "webscr",
    "redirect",
    "submit",
    "id",
    "user",
    "client",
    "auth",
    "pay",
    "refund",
    "win",
    "bonus",
    "prize",
    "alert",
    "urgent",
    "limited",
    "risk",
    "protection",
    "safe",
    "device",
    "remove",
    "register",
    "reset",
    "unlock",
    "activate",
    "support",
    "help",
    "service",
    "access",
    "direct",
    "deposit",
    "royalbank",
    "rbc",
    "halifax",
    "lloyds",
    "interac",
    "apple",
    "google",
    "microsoft",
    "outlook",
    "office",
    "mail",
    "email",
    "sms",
    "whatsapp",
    "facebook",
    "instagram",
    "twitter",
    "linkedin",
    "cloud",
    "azure",
    "aws",
    "netlify",
    "xyz",
    "online",
    "digital",
    "site",
    "web",
    "host",
    "domain",
    "ssl",
    "cert",
    "whois",
    "registrar",
    "phish",
    "scam",
    "fraud",
    "fake",
    "malicious",
    "danger",
    "threat",
    "attack",
    "hack",
    "steal",
    "harvest",
    "spoof",
    "phishing",
];

/// Minimum confidence assigned when the keyword net fires.
pub const FALLBACK_CONFIDENCE: f32 = 80.0;

/// Keywords from the fixed set found in the lowercased URL.
pub fn matched_keywords(url: &str) -> Vec<&'static str> {
    let url = url.to_lowercase();
    SUSPICIOUS_KEYWORDS
        .iter()
        .filter(|kw| url.contains(**kw))
        .copied()
        .collect()
}

/// One-directional safety net over the model's verdict for the URL flow.
///
/// Fires only when the model said safe; it can escalate to phishing and
/// raise the confidence floor, never the reverse. Returns the (possibly
/// overridden) verdict and confidence plus the keywords that fired.
pub fn apply(verdict: Verdict, confidence: f32, url: &str) -> (Verdict, f32, Vec<&'static str>) {
    if verdict != Verdict::Safe {
        return (verdict, confidence, Vec::new());
    }

    let matched = matched_keywords(url);
    if matched.is_empty() {
        return (verdict, confidence, matched);
    }

    log::debug!("keyword fallback fired for {url}: {matched:?}");
    (
        Verdict::Phishing,
        confidence.max(FALLBACK_CONFIDENCE),
        matched,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_multiple_keywords() {
        let matched = matched_keywords("http://paypal-verify-login.net/reset");
        assert!(matched.contains(&"paypal"));
        assert!(matched.contains(&"verify"));
        assert!(matched.contains(&"login"));
        assert!(matched.contains(&"reset"));
    }

    #[test]
    fn test_escalates_safe_verdict() {
        let (verdict, confidence, matched) =
            apply(Verdict::Safe, 60.0, "http://paypal-verify-login.net/reset");
        assert_eq!(verdict, Verdict::Phishing);
        assert_eq!(confidence, 80.0);
        assert!(!matched.is_empty());
    }

    #[test]
    fn test_keeps_higher_model_confidence() {
        let (verdict, confidence, _) = apply(Verdict::Safe, 95.5, "http://verify-account.example");
        assert_eq!(verdict, Verdict::Phishing);
        assert_eq!(confidence, 95.5);
    }

    #[test]
    fn test_clean_url_unchanged() {
        let (verdict, confidence, matched) = apply(Verdict::Safe, 70.0, "http://quiet.example.org/");
        assert_eq!(verdict, Verdict::Safe);
        assert_eq!(confidence, 70.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_never_touches_phishing_verdict() {
        let (verdict, confidence, matched) =
            apply(Verdict::Phishing, 91.0, "http://paypal-verify-login.net/");
        assert_eq!(verdict, Verdict::Phishing);
        assert_eq!(confidence, 91.0);
        assert!(matched.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let matched = matched_keywords("HTTP://PAYPAL-VERIFY.EXAMPLE");
        assert!(matched.contains(&"paypal"));
    }
}
