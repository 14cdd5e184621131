use serde::{Deserialize, Serialize};

/// Highest rating on the NPS scale
pub const MAX_RATING: u8 = 10;

/// One of the fixed service topics tracked for sentiment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Topic {
    Website,
    #[serde(rename = "SEO")]
    Seo,
    #[serde(rename = "Social Media")]
    SocialMedia,
    Content,
    Marketing,
    Overall,
}

impl Topic {
    /// All topics in report order
    pub const ALL: [Topic; 6] = [
        Topic::Website,
        Topic::Seo,
        Topic::SocialMedia,
        Topic::Content,
        Topic::Marketing,
        Topic::Overall,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Topic::Website => "Website",
            Topic::Seo => "SEO",
            Topic::SocialMedia => "Social Media",
            Topic::Content => "Content",
            Topic::Marketing => "Marketing",
            Topic::Overall => "Overall",
        }
    }

    /// Position of this topic in [`Topic::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

/// One histogram row of the rating distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingBucket {
    pub rating: u8,
    pub count: usize,
    /// Share of rated calls, rounded to a whole percent
    pub percent: u32,
}

/// Sentiment tallies for one topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicTally {
    pub name: Topic,
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
    pub total: usize,
}

impl TopicTally {
    pub fn empty(topic: Topic) -> Self {
        Self {
            name: topic,
            positive: 0,
            negative: 0,
            neutral: 0,
            total: 0,
        }
    }

    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Negative => self.negative += 1,
            Sentiment::Neutral => self.neutral += 1,
        }
        self.total += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageUsage {
    pub english: usize,
    pub hindi: usize,
    pub both: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBuckets {
    pub short: usize,
    pub medium: usize,
    pub long: usize,
}

/// Survey analytics computed over one snapshot of call executions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    /// Number of completed calls
    pub total_calls: usize,
    /// Mean rating over rated calls, one decimal place
    pub average_rating: f64,
    /// Positive overall sentiment per rated call, in percent
    pub satisfaction_rate: u32,
    /// Rated calls per completed call, in percent
    pub response_rate: u32,
    /// Exactly one row per rating 0..=10
    pub rating_histogram: Vec<RatingBucket>,
    /// Exactly one tally per topic, in [`Topic::ALL`] order
    pub topic_tallies: Vec<TopicTally>,
    pub language_usage: LanguageUsage,
    pub duration_buckets: DurationBuckets,
}

impl AnalyticsSummary {
    /// Number of calls that yielded a rating
    pub fn rated_calls(&self) -> usize {
        self.rating_histogram.iter().map(|b| b.count).sum()
    }

    pub fn tally(&self, topic: Topic) -> Option<&TopicTally> {
        self.topic_tallies.iter().find(|t| t.name == topic)
    }

    /// Short label for the typical call length
    pub fn typical_duration_label(&self) -> &'static str {
        if self.duration_buckets.medium > 0 {
            "3-5 min"
        } else if self.duration_buckets.short > 0 {
            "<3 min"
        } else {
            ">5 min"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_order_matches_index() {
        for (i, topic) in Topic::ALL.iter().enumerate() {
            assert_eq!(topic.index(), i);
        }
    }

    #[test]
    fn test_topic_serializes_display_name() {
        let json = serde_json::to_string(&TopicTally::empty(Topic::SocialMedia)).unwrap();
        assert!(json.contains(r#""name":"Social Media""#));
        assert_eq!(serde_json::to_string(&Topic::Seo).unwrap(), r#""SEO""#);
    }

    #[test]
    fn test_tally_record() {
        let mut tally = TopicTally::empty(Topic::Website);
        tally.record(Sentiment::Positive);
        tally.record(Sentiment::Neutral);

        assert_eq!(tally.positive, 1);
        assert_eq!(tally.negative, 0);
        assert_eq!(tally.neutral, 1);
        assert_eq!(tally.total, 2);
    }
}
