use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::MAX_RATING;

/// An NPS rating, guaranteed to lie in 0..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    /// Accept `value` only if it is on the 0-10 scale
    pub fn new(value: u64) -> Option<Self> {
        (value <= MAX_RATING as u64).then_some(Self(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// One step of the rating cascade: a pattern whose first capture group is the candidate
#[derive(Debug)]
pub struct RatingRule {
    pub name: &'static str,
    pattern: Regex,
}

impl RatingRule {
    fn new(name: &'static str, pattern: &str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    /// Digits captured by the first match of this rule
    pub fn capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Rating produced by this rule, `None` if it does not match or is off-scale
    pub fn apply(&self, text: &str) -> Option<Rating> {
        self.capture(text)?.parse::<u64>().ok().and_then(Rating::new)
    }
}

// Most specific first; digits are ASCII only so Devanagari numerals never parse.
static RATING_RULES: Lazy<Vec<RatingRule>> = Lazy::new(|| {
    vec![
        RatingRule::new(
            "rate_out_of",
            r"(?i)\brate[ds]?\b.*?\b([0-9]+)\b.*?\bout\s+of\b.*?\b[0-9]+\b",
        ),
        RatingRule::new("rating", r"(?i)\brating\b.*?\b([0-9]+)\b"),
        RatingRule::new("score", r"(?i)\bscore[ds]?\b.*?\b([0-9]+)\b"),
        RatingRule::new("stars", r"(?i)\b([0-9]+)\b.*?\bstars?\b"),
        RatingRule::new("out_of", r"(?i)\b([0-9]+)\b.*?\bout\s+of\b.*?\b[0-9]+\b"),
        RatingRule::new("give", r"(?i)\bgive\b.*?\b([0-9]+)\b"),
        RatingRule::new("nps", r"(?i)\bnps\b.*?\b([0-9]+)\b"),
        RatingRule::new("satisfaction", r"(?i)\bsatisfaction\b.*?\b([0-9]+)\b"),
        RatingRule::new("on_a_scale", r"(?i)\b([0-9]+)\b.*?\bscale\b"),
        RatingRule::new("scale", r"(?i)\bscale\b.*?\b([0-9]+)\b"),
        RatingRule::new("around", r"(?i)\baround\b.*?\b([0-9]+)\b"),
        RatingRule::new("bare_number", r"\b([0-9]+)\b"),
    ]
});

/// The rating cascade in evaluation order
pub fn rating_rules() -> &'static [RatingRule] {
    &RATING_RULES
}

/// Find the satisfaction rating mentioned in a transcript
///
/// Rules are tried in order and the first one yielding an on-scale number
/// wins. A rule that matches an off-scale number (a duration, a phone
/// number) does not stop the cascade.
pub fn extract_rating(text: &str) -> Option<Rating> {
    rating_rules().iter().find_map(|rule| {
        let rating = rule.apply(text)?;
        debug!("Rating {} matched by rule {}", rating.value(), rule.name);
        Some(rating)
    })
}
