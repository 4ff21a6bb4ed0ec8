use std::fmt;

use regex::Regex;

use crate::model::{MatchType, Targeting, TourStatus};

/// Resolved validity of the access credential. `Unknown` means the lookup has
/// not come back yet; callers with no credential configured pass `Valid`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStatus {
    Unknown,
    Valid,
    Invalid,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Credential validation is still in flight; rendering stays suppressed
    /// without recording a denial.
    Pending,
    Ineligible(IneligibleReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IneligibleReason {
    BadCredential,
    TourInactive,
    UrlMismatch,
    BadPattern,
    UnknownMatchType,
}

impl fmt::Display for IneligibleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IneligibleReason::BadCredential => "bad_credential",
            IneligibleReason::TourInactive => "tour_inactive",
            IneligibleReason::UrlMismatch => "url_mismatch",
            IneligibleReason::BadPattern => "bad_pattern",
            IneligibleReason::UnknownMatchType => "unknown_match_type",
        };
        f.write_str(label)
    }
}

/// Decides whether a tour may render for the current visitor and URL. An
/// invalid credential is terminal and short-circuits the rule check; a
/// malformed regex pattern is reported as data, never raised.
pub fn evaluate_access(
    key: KeyStatus,
    status: TourStatus,
    rule: Option<&Targeting>,
    url: &str,
) -> Eligibility {
    match key {
        KeyStatus::Unknown => return Eligibility::Pending,
        KeyStatus::Invalid => return Eligibility::Ineligible(IneligibleReason::BadCredential),
        KeyStatus::Valid => {}
    }
    if status != TourStatus::Active {
        return Eligibility::Ineligible(IneligibleReason::TourInactive);
    }
    let Some(rule) = rule else {
        return Eligibility::Eligible;
    };
    match url_matches(rule, url) {
        Ok(true) => Eligibility::Eligible,
        Ok(false) => Eligibility::Ineligible(IneligibleReason::UrlMismatch),
        Err(reason) => Eligibility::Ineligible(reason),
    }
}

fn url_matches(rule: &Targeting, url: &str) -> Result<bool, IneligibleReason> {
    let Some(match_type) = MatchType::parse(&rule.match_type) else {
        return Err(IneligibleReason::UnknownMatchType);
    };
    match match_type {
        MatchType::Exact => Ok(url == rule.pattern),
        MatchType::Contains => Ok(url.contains(&rule.pattern)),
        MatchType::Regex => match Regex::new(&rule.pattern) {
            Ok(pattern) => Ok(pattern.is_match(url)),
            Err(_) => Err(IneligibleReason::BadPattern),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Frequency, TriggerType};

    fn rule(match_type: &str, pattern: &str) -> Targeting {
        Targeting {
            match_type: match_type.to_string(),
            pattern: pattern.to_string(),
            trigger: TriggerType::Pageload,
            delay_ms: None,
            frequency: Frequency::Always,
        }
    }

    fn check(rule: Option<&Targeting>, url: &str) -> Eligibility {
        evaluate_access(KeyStatus::Valid, TourStatus::Active, rule, url)
    }

    #[test]
    fn no_rule_is_eligible() {
        assert_eq!(check(None, "https://x.com/anything"), Eligibility::Eligible);
    }

    #[test]
    fn contains_matches_substring() {
        let rule = rule("contains", "/pricing");
        assert_eq!(
            check(Some(&rule), "https://x.com/pricing?ref=a"),
            Eligibility::Eligible
        );
    }

    #[test]
    fn contains_rejects_other_paths() {
        let rule = rule("contains", "/checkout");
        assert_eq!(
            check(Some(&rule), "https://x.com/pricing?ref=a"),
            Eligibility::Ineligible(IneligibleReason::UrlMismatch)
        );
    }

    #[test]
    fn exact_requires_full_equality() {
        let rule = rule("exact", "https://x.com/pricing");
        assert_eq!(check(Some(&rule), "https://x.com/pricing"), Eligibility::Eligible);
        assert_eq!(
            check(Some(&rule), "https://x.com/pricing?ref=a"),
            Eligibility::Ineligible(IneligibleReason::UrlMismatch)
        );
    }

    #[test]
    fn regex_matches_and_rejects() {
        let rule = rule("regex", "^https://x\\.com/app/.*");
        assert_eq!(
            check(Some(&rule), "https://x.com/app/settings"),
            Eligibility::Eligible
        );
        assert_eq!(
            check(Some(&rule), "https://x.com/"),
            Eligibility::Ineligible(IneligibleReason::UrlMismatch)
        );
    }

    #[test]
    fn malformed_regex_is_bad_pattern_not_a_panic() {
        let rule = rule("regex", "([");
        assert_eq!(
            check(Some(&rule), "https://x.com/"),
            Eligibility::Ineligible(IneligibleReason::BadPattern)
        );
    }

    #[test]
    fn unrecognized_match_type_is_ineligible() {
        let rule = rule("glob", "whatever");
        assert_eq!(
            check(Some(&rule), "https://x.com/"),
            Eligibility::Ineligible(IneligibleReason::UnknownMatchType)
        );
    }

    #[test]
    fn pending_key_blocks_without_denial() {
        let rule = rule("contains", "/pricing");
        assert_eq!(
            evaluate_access(
                KeyStatus::Unknown,
                TourStatus::Active,
                Some(&rule),
                "https://x.com/pricing"
            ),
            Eligibility::Pending
        );
    }

    #[test]
    fn invalid_key_is_terminal_before_rule_evaluation() {
        // The malformed pattern must never be reached.
        let rule = rule("regex", "([");
        assert_eq!(
            evaluate_access(
                KeyStatus::Invalid,
                TourStatus::Active,
                Some(&rule),
                "https://x.com/"
            ),
            Eligibility::Ineligible(IneligibleReason::BadCredential)
        );
    }

    #[test]
    fn paused_tour_is_ineligible() {
        assert_eq!(
            evaluate_access(KeyStatus::Valid, TourStatus::Paused, None, "https://x.com/"),
            Eligibility::Ineligible(IneligibleReason::TourInactive)
        );
    }
}
