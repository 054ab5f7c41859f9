use lazy_static::lazy_static;
use std::collections::HashMap;

/// Brands commonly impersonated in phishing sender domains, with the
/// domains allowed to carry the name.
const PROTECTED_BRANDS: &[(&str, &[&str])] = &[
    ("amazon", &["amazon.com"]),
    ("paypal", &["paypal.com"]),
    ("apple", &["apple.com", "icloud.com"]),
    ("microsoft", &["microsoft.com", "outlook.com", "office.com"]),
    ("google", &["google.com", "gmail.com"]),
    ("netflix", &["netflix.com"]),
    ("facebook", &["facebook.com"]),
    ("ebay", &["ebay.com"]),
];

lazy_static! {
    /// Characters attackers substitute for Latin letters: digits and
    /// lookalikes from the Cyrillic and Greek blocks.
    static ref HOMOGLYPHS: HashMap<char, char> = {
        let mut map = HashMap::new();
        map.insert('0', 'o');
        map.insert('1', 'l');
        map.insert('3', 'e');
        map.insert('5', 's');
        map.insert('7', 't');
        // Cyrillic
        map.insert('а', 'a');
        map.insert('е', 'e');
        map.insert('о', 'o');
        map.insert('р', 'p');
        map.insert('с', 'c');
        map.insert('х', 'x');
        // Greek
        map.insert('α', 'a');
        map.insert('ο', 'o');
        map
    };
}

/// Fold homoglyphs to their Latin base and lowercase.
pub fn normalize_homoglyphs(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| HOMOGLYPHS.get(&c).copied().unwrap_or(c))
        .collect()
}

/// Check whether a sender domain impersonates a protected brand: after
/// homoglyph folding the domain embeds a brand name but is not one of
/// the brand's official domains (or a subdomain of one).
pub fn impersonated_brand(domain: &str) -> Option<&'static str> {
    let domain = domain.trim().to_lowercase();
    if domain.is_empty() {
        return None;
    }
    let normalized = normalize_homoglyphs(&domain);

    for (brand, official) in PROTECTED_BRANDS {
        if !normalized.contains(brand) {
            continue;
        }
        let is_official = official
            .iter()
            .any(|d| domain == *d || domain.ends_with(&format!(".{d}")));
        if !is_official {
            return Some(brand);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_homoglyphs() {
        assert_eq!(normalize_homoglyphs("amaz0n"), "amazon");
        assert_eq!(normalize_homoglyphs("PAYPA1"), "paypal");
        assert_eq!(normalize_homoglyphs("аmazon"), "amazon"); // Cyrillic а
    }

    #[test]
    fn test_homoglyph_spoof_flags() {
        assert_eq!(impersonated_brand("amaz0n-support.com"), Some("amazon"));
        assert_eq!(impersonated_brand("secure-paypa1.net"), Some("paypal"));
    }

    #[test]
    fn test_embedded_brand_flags() {
        assert_eq!(impersonated_brand("amazon-prizes.net"), Some("amazon"));
        assert_eq!(impersonated_brand("login.microsoft.example"), Some("microsoft"));
    }

    #[test]
    fn test_official_domains_pass() {
        assert_eq!(impersonated_brand("amazon.com"), None);
        assert_eq!(impersonated_brand("mail.amazon.com"), None);
        assert_eq!(impersonated_brand("outlook.com"), None);
    }

    #[test]
    fn test_unrelated_domain_passes() {
        assert_eq!(impersonated_brand("company.com"), None);
        assert_eq!(impersonated_brand(""), None);
    }
}
