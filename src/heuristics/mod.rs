pub mod duration;
pub mod language;
pub mod rating;
pub mod topics;

pub use duration::*;
pub use language::*;
pub use rating::*;
pub use topics::*;

/// Configuration for the transcript heuristics
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Score a service topic as neutral when it is mentioned without
    /// sentiment; when false such a mention contributes no tally
    pub neutral_on_mention: bool,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            neutral_on_mention: true,
        }
    }
}

/// Everything the heuristics read out of one call
#[derive(Debug, Clone, PartialEq)]
pub struct CallObservation {
    pub rating: Option<Rating>,
    /// At most one verdict per topic; always one for `Overall`
    pub topics: Vec<TopicVerdict>,
    pub language: LanguageTag,
    pub duration: Option<DurationBucket>,
}

/// Run every heuristic over one call
///
/// The text-based heuristics all read the same normalized transcript and
/// are independent of each other; the duration bucket only reads
/// `duration_seconds`.
pub fn observe_call(
    text: &str,
    duration_seconds: Option<f64>,
    config: &AnalyticsConfig,
) -> CallObservation {
    CallObservation {
        rating: extract_rating(text),
        topics: classify_topics(text, config.neutral_on_mention),
        language: detect_language(text),
        duration: bucket_duration(duration_seconds),
    }
}
