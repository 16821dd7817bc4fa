//! Per-field validation rules

use serde::{Deserialize, Serialize};
use std::fmt;

const EYE_COLORS: [&str; 7] = ["amb", "blu", "brn", "gry", "grn", "hzl", "oth"];

/// The eight keys that take part in validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Byr,
    Iyr,
    Eyr,
    Hgt,
    Hcl,
    Ecl,
    Pid,
    Cid,
}

impl FieldKey {
    pub const ALL: [FieldKey; 8] = [
        FieldKey::Byr,
        FieldKey::Iyr,
        FieldKey::Eyr,
        FieldKey::Hgt,
        FieldKey::Hcl,
        FieldKey::Ecl,
        FieldKey::Pid,
        FieldKey::Cid,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Byr => "byr",
            FieldKey::Iyr => "iyr",
            FieldKey::Eyr => "eyr",
            FieldKey::Hgt => "hgt",
            FieldKey::Hcl => "hcl",
            FieldKey::Ecl => "ecl",
            FieldKey::Pid => "pid",
            FieldKey::Cid => "cid",
        }
    }

    /// Known key for `key`, or `None` for keys that are stored but never validated
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How strictly `hcl` is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HairColorMode {
    /// `#`, byte length 7, first character after `#` a hex digit
    #[default]
    Lenient,
    /// `#` followed by exactly six hex digits
    Strict,
}

/// Whether `value` satisfies the rule for `key`
pub fn check_field(key: FieldKey, value: &str, hcl_mode: HairColorMode) -> bool {
    match key {
        FieldKey::Byr => year_in_range(value, 1920, 2002),
        FieldKey::Iyr => year_in_range(value, 2010, 2020),
        FieldKey::Eyr => year_in_range(value, 2020, 2030),
        FieldKey::Hgt => height_valid(value),
        FieldKey::Hcl => hair_color_valid(value, hcl_mode),
        FieldKey::Ecl => EYE_COLORS.contains(&value),
        FieldKey::Pid => passport_id_valid(value),
        FieldKey::Cid => true,
    }
}

fn year_in_range(value: &str, min: i64, max: i64) -> bool {
    value
        .parse::<i64>()
        .is_ok_and(|year| (min..=max).contains(&year))
}

/// `<integer><unit>` with unit `cm` (150..=193) or `in` (59..=76)
fn height_valid(value: &str) -> bool {
    let Some((height, unit)) = split_leading_integer(value) else {
        return false;
    };

    match unit {
        "cm" => (150..=193).contains(&height),
        "in" => (59..=76).contains(&height),
        _ => false,
    }
}

/// Split an optionally signed leading integer from the rest of `value`
fn split_leading_integer(value: &str) -> Option<(i64, &str)> {
    let sign_len = usize::from(value.starts_with(['+', '-']));
    let digits_end = value[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(value.len(), |i| i + sign_len);

    if digits_end == sign_len {
        return None;
    }

    let number = value[..digits_end].parse().ok()?;
    Some((number, &value[digits_end..]))
}

fn hair_color_valid(value: &str, mode: HairColorMode) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    if value.len() != 7 {
        return false;
    }

    match mode {
        HairColorMode::Lenient => digits.starts_with(|c: char| c.is_ascii_hexdigit()),
        HairColorMode::Strict => digits.chars().all(|c| c.is_ascii_hexdigit()),
    }
}

fn passport_id_valid(value: &str) -> bool {
    value.len() == 9 && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient(key: FieldKey, value: &str) -> bool {
        check_field(key, value, HairColorMode::Lenient)
    }

    #[test]
    fn test_year_ranges() {
        assert!(lenient(FieldKey::Byr, "1920"));
        assert!(lenient(FieldKey::Byr, "2002"));
        assert!(!lenient(FieldKey::Byr, "1919"));
        assert!(!lenient(FieldKey::Byr, "2003"));
        assert!(!lenient(FieldKey::Byr, "19x0"));
        assert!(!lenient(FieldKey::Byr, ""));

        assert!(lenient(FieldKey::Iyr, "2010"));
        assert!(!lenient(FieldKey::Iyr, "2021"));
        assert!(lenient(FieldKey::Eyr, "2030"));
        assert!(!lenient(FieldKey::Eyr, "2019"));
    }

    #[test]
    fn test_height() {
        assert!(lenient(FieldKey::Hgt, "150cm"));
        assert!(lenient(FieldKey::Hgt, "193cm"));
        assert!(!lenient(FieldKey::Hgt, "194cm"));
        assert!(lenient(FieldKey::Hgt, "59in"));
        assert!(lenient(FieldKey::Hgt, "76in"));
        assert!(!lenient(FieldKey::Hgt, "77in"));
        assert!(!lenient(FieldKey::Hgt, "190"));
        assert!(!lenient(FieldKey::Hgt, "190mm"));
        assert!(!lenient(FieldKey::Hgt, "cm"));
        assert!(!lenient(FieldKey::Hgt, "60incm"));
    }

    #[test]
    fn test_hair_color_lenient_and_strict() {
        assert!(lenient(FieldKey::Hcl, "#123abc"));
        assert!(lenient(FieldKey::Hcl, "#fffffd"));
        assert!(!lenient(FieldKey::Hcl, "123abc"));
        assert!(!lenient(FieldKey::Hcl, "#123ab"));
        assert!(!lenient(FieldKey::Hcl, "#123abcd"));
        assert!(!lenient(FieldKey::Hcl, "#z23abc"));

        // Only the first character after '#' is checked leniently
        assert!(lenient(FieldKey::Hcl, "#1zzzzz"));
        assert!(!check_field(FieldKey::Hcl, "#1zzzzz", HairColorMode::Strict));
        assert!(check_field(FieldKey::Hcl, "#a0B9fe", HairColorMode::Strict));
    }

    #[test]
    fn test_eye_color() {
        for color in EYE_COLORS {
            assert!(lenient(FieldKey::Ecl, color));
        }
        assert!(!lenient(FieldKey::Ecl, "wat"));
        assert!(!lenient(FieldKey::Ecl, "GRY"));
    }

    #[test]
    fn test_passport_id() {
        assert!(lenient(FieldKey::Pid, "000000001"));
        assert!(!lenient(FieldKey::Pid, "0123456789"));
        assert!(!lenient(FieldKey::Pid, "01234567"));
        assert!(!lenient(FieldKey::Pid, "01234567a"));
    }

    #[test]
    fn test_cid_always_passes() {
        assert!(lenient(FieldKey::Cid, ""));
        assert!(lenient(FieldKey::Cid, "anything"));
    }

    #[test]
    fn test_key_lookup() {
        assert_eq!(FieldKey::from_key("hgt"), Some(FieldKey::Hgt));
        assert_eq!(FieldKey::from_key("HGT"), None);
        assert_eq!(FieldKey::from_key("xyz"), None);
        assert_eq!(FieldKey::Ecl.to_string(), "ecl");
    }
}
