//! Best-effort cell coercion. Bad cells never raise: dates become `None`,
//! amounts become zero, flags become false.

use chrono::{NaiveDate, NaiveDateTime};
use copilot_core::Result;
use regex::Regex;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse an amount cell. Accepts `$`, thousands separators and
/// accounting-style parentheses for negatives.
pub fn parse_amount(s: &str) -> Option<f64> {
    let mut s = s.trim().replace([',', '$'], "");
    let mut negate = false;
    if s.starts_with('(') && s.ends_with(')') && s.len() > 2 {
        s = s[1..s.len() - 1].to_string();
        negate = true;
    }

    let v: f64 = s.trim().parse().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negate { -v } else { v })
}

pub fn parse_flag(s: &str) -> bool {
    matches!(
        s.trim().to_ascii_lowercase().as_str(),
        "true" | "t" | "1" | "yes" | "y"
    )
}

/// Uppercases merchant text, strips everything but letters, digits and
/// spaces, and collapses runs of whitespace.
#[derive(Debug, Clone)]
pub struct MerchantCanonicalizer {
    strip: Regex,
    spaces: Regex,
}

impl MerchantCanonicalizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            strip: Regex::new(r"[^A-Z0-9\s]")?,
            spaces: Regex::new(r"\s+")?,
        })
    }

    pub fn canonicalize(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        let stripped = self.strip.replace_all(&upper, "");
        self.spaces.replace_all(&stripped, " ").trim().to_string()
    }
}
