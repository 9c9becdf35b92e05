/// Data model for class sections, tags and conflicts
mod types;

pub use types::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A teaching day. Weekend meetings are not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
    ];

    /// Parses a single day code, case-insensitively.
    ///
    /// Accepts one-letter registrar codes (`M T W R F`), short names
    /// (`Tu`, `Th`, `Mon`) and full names (`Thursday`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "m" | "mo" | "mon" | "monday" => Some(Weekday::Mon),
            "t" | "tu" | "tue" | "tues" | "tuesday" => Some(Weekday::Tue),
            "w" | "we" | "wed" | "wednesday" => Some(Weekday::Wed),
            "r" | "th" | "thu" | "thur" | "thurs" | "thursday" => Some(Weekday::Thu),
            "f" | "fr" | "fri" | "friday" => Some(Weekday::Fri),
            _ => None,
        }
    }

    /// Parses a meeting pattern such as `"MWF"`, `"TuTh"`, `"MTWRF"` or
    /// `"Mon, Wed"`. Unrecognized tokens (e.g. `"Sa"`) are skipped.
    pub fn parse_pattern(pattern: &str) -> BTreeSet<Weekday> {
        if pattern.contains([',', ' ', '/']) {
            return pattern
                .split([',', ' ', '/'])
                .filter_map(Weekday::from_code)
                .collect();
        }

        // All-lowercase patterns ("mwf") are one letter per day
        let normalized = if pattern.chars().any(|c| c.is_ascii_uppercase()) {
            pattern.to_string()
        } else {
            pattern.to_ascii_uppercase()
        };

        let mut days = BTreeSet::new();
        let mut chars = normalized.chars().peekable();
        while let Some(c) = chars.next() {
            if !c.is_ascii_uppercase() {
                continue;
            }
            let mut token = String::from(c);
            while let Some(next) = chars.peek().copied().filter(char::is_ascii_lowercase) {
                token.push(next);
                chars.next();
            }
            if let Some(day) = Weekday::from_code(&token) {
                days.insert(day);
            }
        }
        days
    }

    pub fn short_name(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}
