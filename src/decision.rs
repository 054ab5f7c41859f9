use serde::Serialize;

use crate::classifier::LabelDistribution;

/// Terminal classification outcome. Never mutated after assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Phishing,
    Error,
}

impl Verdict {
    /// User-facing classification label. The email flow reports a safe
    /// verdict as "ham".
    pub fn label(&self, email_flow: bool) -> &'static str {
        match self {
            Verdict::Safe if email_flow => "ham",
            Verdict::Safe => "safe",
            Verdict::Phishing => "phishing",
            Verdict::Error => "error",
        }
    }
}

/// Converts a labeled distribution into a binary verdict using the
/// configured confidence threshold. The comparison is strict (`>`): a
/// score exactly at threshold does not escalate.
pub struct ThresholdDecision;

impl ThresholdDecision {
    /// Email flow: the winning label escalates to phishing when its name
    /// contains "phishing" and its confidence clears the threshold.
    /// Returns the verdict and the winning label's probability * 100,
    /// whichever verdict it produced.
    pub fn decide_email(dist: &LabelDistribution, threshold: f32) -> (Verdict, f32) {
        let Some((label, prob)) = dist.top() else {
            return (Verdict::Error, 0.0);
        };
        let confidence = prob * 100.0;

        if label.contains("phishing") && confidence > threshold {
            (Verdict::Phishing, confidence)
        } else {
            (Verdict::Safe, confidence)
        }
    }

    /// URL flow: the winning label escalates to phishing when it is the
    /// phishing label and its score clears the threshold.
    pub fn decide_url(dist: &LabelDistribution, threshold: f32) -> (Verdict, f32) {
        let Some((label, prob)) = dist.top() else {
            return (Verdict::Error, 0.0);
        };
        let confidence = prob * 100.0;

        if label == "phishing" && confidence > threshold {
            (Verdict::Phishing, confidence)
        } else {
            (Verdict::Safe, confidence)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dist(entries: &[(&str, f32)]) -> LabelDistribution {
        LabelDistribution::from_probabilities(
            entries.iter().map(|(l, p)| (l.to_string(), *p)).collect(),
        )
    }

    #[test]
    fn test_email_phishing_above_threshold() {
        let d = dist(&[
            ("legitimate_email", 0.05),
            ("phishing_url", 0.90),
            ("legitimate_url", 0.03),
            ("phishing_url_alt", 0.02),
        ]);
        let (verdict, confidence) = ThresholdDecision::decide_email(&d, 80.0);
        assert_eq!(verdict, Verdict::Phishing);
        assert!((confidence - 90.0).abs() < 1e-3);
    }

    #[test]
    fn test_email_phishing_label_below_threshold_stays_safe() {
        let d = dist(&[
            ("legitimate_email", 0.30),
            ("phishing_url", 0.70),
            ("legitimate_url", 0.0),
            ("phishing_url_alt", 0.0),
        ]);
        let (verdict, confidence) = ThresholdDecision::decide_email(&d, 80.0);
        assert_eq!(verdict, Verdict::Safe);
        assert!((confidence - 70.0).abs() < 1e-3);
    }

    #[test]
    fn test_email_legitimate_high_confidence_stays_safe() {
        let d = dist(&[
            ("legitimate_email", 0.99),
            ("phishing_url", 0.01),
            ("legitimate_url", 0.0),
            ("phishing_url_alt", 0.0),
        ]);
        let (verdict, _) = ThresholdDecision::decide_email(&d, 80.0);
        assert_eq!(verdict, Verdict::Safe);
    }

    #[test]
    fn test_threshold_boundary_is_strict() {
        // Exactly at threshold must not escalate.
        let d = dist(&[("safe", 0.20), ("phishing", 0.80)]);
        let (verdict, confidence) = ThresholdDecision::decide_url(&d, 80.0);
        assert_eq!(verdict, Verdict::Safe);
        assert_eq!(confidence, 80.0);

        // A hair above must.
        let d = dist(&[("safe", 0.1999999), ("phishing", 0.8000001)]);
        let (verdict, _) = ThresholdDecision::decide_url(&d, 80.0);
        assert_eq!(verdict, Verdict::Phishing);
    }

    #[test]
    fn test_url_safe_winner_reports_own_confidence() {
        let d = dist(&[("safe", 0.60), ("phishing", 0.40)]);
        let (verdict, confidence) = ThresholdDecision::decide_url(&d, 80.0);
        assert_eq!(verdict, Verdict::Safe);
        assert!((confidence - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::Safe.label(true), "ham");
        assert_eq!(Verdict::Safe.label(false), "safe");
        assert_eq!(Verdict::Phishing.label(true), "phishing");
        assert_eq!(Verdict::Error.label(false), "error");
    }
}
