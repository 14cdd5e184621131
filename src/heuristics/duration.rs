/// Calls shorter than this are short
pub const MEDIUM_FROM_SECS: f64 = 180.0;
/// Calls at least this long are long
pub const LONG_FROM_SECS: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DurationBucket {
    Short,
    Medium,
    Long,
}

impl DurationBucket {
    pub fn from_seconds(seconds: f64) -> Self {
        if seconds < MEDIUM_FROM_SECS {
            DurationBucket::Short
        } else if seconds < LONG_FROM_SECS {
            DurationBucket::Medium
        } else {
            DurationBucket::Long
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DurationBucket::Short => "Short (<3 min)",
            DurationBucket::Medium => "Medium (3-5 min)",
            DurationBucket::Long => "Long (>5 min)",
        }
    }
}

/// Bucket a call duration
///
/// Unknown durations have no bucket, and neither does a zero duration: the
/// provider reports 0 for calls it never timed.
pub fn bucket_duration(seconds: Option<f64>) -> Option<DurationBucket> {
    seconds
        .filter(|s| s.is_finite() && *s > 0.0)
        .map(DurationBucket::from_seconds)
}
