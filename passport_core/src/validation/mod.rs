//! Record validation
//!
//! A record is valid when all eight known fields pass their rules, or when
//! seven pass and `cid` is absent. Unknown keys are carried but never checked.

pub mod rules;

pub use rules::{check_field, FieldKey, HairColorMode};

use crate::config::ValidationPreferences;
use crate::record::Collection;
use serde::{Deserialize, Serialize};

/// Number of known keys
pub const KNOWN_FIELD_COUNT: usize = FieldKey::ALL.len();

/// Outcome of validating one record, with the reasons behind it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Known keys present whose rule passed
    pub matches: usize,
    pub cid_present: bool,
    /// Known keys present whose rule failed
    pub failed: Vec<FieldKey>,
    /// Known keys absent from the record
    pub missing: Vec<FieldKey>,
    pub valid: bool,
}

impl ValidationReport {
    pub fn summary(&self) -> String {
        let list = |keys: &[FieldKey]| {
            keys.iter()
                .map(FieldKey::as_str)
                .collect::<Vec<_>>()
                .join(",")
        };

        format!(
            "{} ({} of {} matched; failed: [{}]; missing: [{}])",
            if self.valid { "valid" } else { "invalid" },
            self.matches,
            KNOWN_FIELD_COUNT,
            list(&self.failed),
            list(&self.missing)
        )
    }
}

/// Completeness rule over a match count
pub fn is_complete(matches: usize, cid_present: bool) -> bool {
    matches == KNOWN_FIELD_COUNT || (matches == KNOWN_FIELD_COUNT - 1 && !cid_present)
}

/// Stateless record validator
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    hcl_mode: HairColorMode,
}

impl Validator {
    pub fn new(hcl_mode: HairColorMode) -> Self {
        Self { hcl_mode }
    }

    pub fn from_preferences(preferences: &ValidationPreferences) -> Self {
        Self::new(if preferences.strict_hair_color {
            HairColorMode::Strict
        } else {
            HairColorMode::Lenient
        })
    }

    pub fn hcl_mode(&self) -> HairColorMode {
        self.hcl_mode
    }

    /// Number of known keys present in `record` whose rule passes
    pub fn count_matches(&self, record: &Collection) -> usize {
        FieldKey::ALL
            .into_iter()
            .filter(|key| {
                record
                    .get(key.as_str())
                    .is_some_and(|value| check_field(*key, value, self.hcl_mode))
            })
            .count()
    }

    pub fn is_valid(&self, record: &Collection) -> bool {
        is_complete(
            self.count_matches(record),
            record.contains_key(FieldKey::Cid.as_str()),
        )
    }

    /// Validate `record` and explain the verdict
    pub fn evaluate(&self, record: &Collection) -> ValidationReport {
        let mut matches = 0;
        let mut failed = Vec::new();
        let mut missing = Vec::new();

        for key in FieldKey::ALL {
            match record.get(key.as_str()) {
                Some(value) if check_field(key, value, self.hcl_mode) => matches += 1,
                Some(_) => failed.push(key),
                None => missing.push(key),
            }
        }

        let cid_present = record.contains_key(FieldKey::Cid.as_str());

        ValidationReport {
            matches,
            cid_present,
            failed,
            missing,
            valid: is_complete(matches, cid_present),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> Collection {
        fields.iter().copied().collect()
    }

    const VALID: &[(&str, &str)] = &[
        ("ecl", "gry"),
        ("pid", "860033327"),
        ("eyr", "2020"),
        ("hcl", "#fffffd"),
        ("byr", "1937"),
        ("iyr", "2017"),
        ("cid", "147"),
        ("hgt", "183cm"),
    ];

    fn without(key: &str) -> Vec<(&'static str, &'static str)> {
        VALID.iter().copied().filter(|(k, _)| *k != key).collect()
    }

    fn with(key: &'static str, value: &'static str) -> Vec<(&'static str, &'static str)> {
        let mut fields = without(key);
        fields.push((key, value));
        fields
    }

    #[test]
    fn test_all_eight_valid() {
        let validator = Validator::default();
        let report = validator.evaluate(&record(VALID));
        assert_eq!(report.matches, 8);
        assert!(report.valid);
        assert!(validator.is_valid(&record(VALID)));
    }

    #[test]
    fn test_missing_cid_is_still_valid() {
        let report = Validator::default().evaluate(&record(&without("cid")));
        assert_eq!(report.matches, 7);
        assert!(!report.cid_present);
        assert_eq!(report.missing, vec![FieldKey::Cid]);
        assert!(report.valid);
    }

    #[test]
    fn test_one_invalid_value_rejects() {
        let report = Validator::default().evaluate(&record(&with("byr", "1919")));
        assert_eq!(report.matches, 7);
        assert!(report.cid_present);
        assert_eq!(report.failed, vec![FieldKey::Byr]);
        assert!(!report.valid);
    }

    #[test]
    fn test_missing_required_field_rejects() {
        let report = Validator::default().evaluate(&record(&without("hgt")));
        assert_eq!(report.matches, 7);
        assert!(!report.valid);
    }

    #[test]
    fn test_seven_matches_without_cid_but_one_failure() {
        let mut fields = without("cid");
        fields.retain(|(k, _)| *k != "pid");
        fields.push(("pid", "12"));
        let report = Validator::default().evaluate(&record(&fields));
        assert_eq!(report.matches, 6);
        assert!(!report.valid);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut fields = without("cid");
        fields.push(("zzz", "whatever"));
        assert!(Validator::default().is_valid(&record(&fields)));
    }

    #[test]
    fn test_empty_cid_counts_as_present() {
        let fields = with("cid", "");
        let report = Validator::default().evaluate(&record(&fields));
        assert!(report.cid_present);
        assert_eq!(report.matches, 8);
    }

    #[test]
    fn test_matches_monotonic_under_adding_valid_pairs() {
        let validator = Validator::default();
        let mut fields: Vec<(&str, &str)> = Vec::new();
        let mut previous = validator.count_matches(&record(&fields));

        for pair in VALID {
            fields.push(*pair);
            let current = validator.count_matches(&record(&fields));
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, 8);
    }

    #[test]
    fn test_strict_hair_color_preference() {
        let preferences = ValidationPreferences {
            strict_hair_color: true,
            collect_reports: false,
            warn_on_malformed_fields: true,
        };
        let strict = Validator::from_preferences(&preferences);
        let fields = with("hcl", "#1zzzzz");

        assert!(Validator::default().is_valid(&record(&fields)));
        assert!(!strict.is_valid(&record(&fields)));
    }

    #[test]
    fn test_completeness_rule() {
        assert!(is_complete(8, true));
        assert!(is_complete(7, false));
        assert!(!is_complete(7, true));
        assert!(!is_complete(6, false));
    }

    #[test]
    fn test_report_summary() {
        let report = Validator::default().evaluate(&record(&without("hgt")));
        assert_eq!(
            report.summary(),
            "invalid (7 of 8 matched; failed: []; missing: [hgt])"
        );
    }
}
