use tracing::{debug, info};

use crate::heuristics::{observe_call, AnalyticsConfig, CallObservation, DurationBucket, LanguageTag};
use crate::models::{
    AnalyticsSummary, CallExecutionRecord, DurationBuckets, LanguageUsage, RatingBucket, Topic,
    TopicTally, MAX_RATING,
};

use super::normalize::normalize;

const HISTOGRAM_LEN: usize = MAX_RATING as usize + 1;

/// Run the heuristics over one record's normalized transcript
pub fn observe_record(record: &CallExecutionRecord, config: &AnalyticsConfig) -> CallObservation {
    let transcript = normalize(record);
    let observation = observe_call(transcript.as_str(), record.duration_seconds, config);
    debug!(
        "Execution {}: source={:?}, rating={:?}, language={:?}, duration={:?}",
        record.id,
        transcript.source,
        observation.rating.map(|r| r.value()),
        observation.language,
        observation.duration
    );
    observation
}

/// Compute survey analytics over a snapshot of call executions
///
/// Only completed calls count. The summary is rebuilt from scratch on every
/// call, so running it twice over the same records gives the same result.
pub fn aggregate(records: &[CallExecutionRecord], config: &AnalyticsConfig) -> AnalyticsSummary {
    let summary = records
        .iter()
        .filter(|r| r.is_completed())
        .map(|r| observe_record(r, config))
        .fold(Accumulator::new(), Accumulator::absorb)
        .finish();

    info!(
        "Aggregated {} records: {} completed, {} rated",
        records.len(),
        summary.total_calls,
        summary.rated_calls()
    );

    summary
}

/// Running totals threaded through the fold
#[derive(Debug, Clone)]
struct Accumulator {
    completed: usize,
    rated: usize,
    rating_sum: u64,
    histogram: [usize; HISTOGRAM_LEN],
    topics: [TopicTally; 6],
    languages: LanguageUsage,
    durations: DurationBuckets,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            completed: 0,
            rated: 0,
            rating_sum: 0,
            histogram: [0; HISTOGRAM_LEN],
            topics: Topic::ALL.map(TopicTally::empty),
            languages: LanguageUsage::default(),
            durations: DurationBuckets::default(),
        }
    }

    fn absorb(mut self, observation: CallObservation) -> Self {
        self.completed += 1;

        if let Some(rating) = observation.rating {
            self.rated += 1;
            self.rating_sum += u64::from(rating.value());
            self.histogram[rating.value() as usize] += 1;
        }

        for verdict in &observation.topics {
            self.topics[verdict.topic.index()].record(verdict.sentiment);
        }

        match observation.language {
            LanguageTag::English => self.languages.english += 1,
            LanguageTag::Hindi => self.languages.hindi += 1,
            LanguageTag::Both => self.languages.both += 1,
        }

        match observation.duration {
            Some(DurationBucket::Short) => self.durations.short += 1,
            Some(DurationBucket::Medium) => self.durations.medium += 1,
            Some(DurationBucket::Long) => self.durations.long += 1,
            None => {}
        }

        self
    }

    fn finish(self) -> AnalyticsSummary {
        let overall_positive = self.topics[Topic::Overall.index()].positive;
        let average_rating = if self.rated > 0 {
            round_one_decimal(self.rating_sum as f64 / self.rated as f64)
        } else {
            0.0
        };

        let rating_histogram = self
            .histogram
            .iter()
            .enumerate()
            .map(|(rating, &count)| RatingBucket {
                rating: rating as u8,
                count,
                percent: percent(count, self.rated),
            })
            .collect();

        AnalyticsSummary {
            total_calls: self.completed,
            average_rating,
            satisfaction_rate: percent(overall_positive, self.rated),
            response_rate: percent(self.rated, self.completed),
            rating_histogram,
            topic_tallies: self.topics.to_vec(),
            language_usage: self.languages,
            duration_buckets: self.durations,
        }
    }
}

/// `part / whole` as a whole percent; zero when `whole` is zero
fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 * 100.0 / whole as f64).round() as u32
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallStatus;
    use serde_json::json;

    fn completed(transcript: &str, duration: Option<f64>) -> CallExecutionRecord {
        CallExecutionRecord {
            id: transcript.to_string(),
            phone_number: None,
            status: CallStatus::Completed,
            created_at: None,
            duration_seconds: duration,
            conversation: None,
            transcript: Some(transcript.to_string()),
        }
    }

    #[test]
    fn test_empty_snapshot_is_all_zero() {
        let summary = aggregate(&[], &AnalyticsConfig::default());

        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.satisfaction_rate, 0);
        assert_eq!(summary.response_rate, 0);
        assert_eq!(summary.rating_histogram.len(), 11);
        assert!(summary.rating_histogram.iter().all(|b| b.count == 0 && b.percent == 0));
        assert_eq!(summary.topic_tallies.len(), 6);
        assert!(summary.topic_tallies.iter().all(|t| t.total == 0));
        assert_eq!(summary.language_usage, LanguageUsage::default());
        assert_eq!(summary.duration_buckets, DurationBuckets::default());
    }

    #[test]
    fn test_only_completed_records_count() {
        let mut failed = completed("rating 3", Some(30.0));
        failed.status = CallStatus::Failed;
        let mut pending = completed("rating 4", None);
        pending.status = CallStatus::Pending;

        let summary = aggregate(
            &[failed, pending, completed("rating 9, very happy", Some(400.0))],
            &AnalyticsConfig::default(),
        );

        assert_eq!(summary.total_calls, 1);
        assert_eq!(summary.rated_calls(), 1);
        assert_eq!(summary.rating_histogram[9].count, 1);
        assert_eq!(summary.duration_buckets.long, 1);
        assert_eq!(summary.duration_buckets.short, 0);
    }

    #[test]
    fn test_rates_and_average() {
        let records = vec![
            completed("I would rate this 8 out of 10, I am happy", Some(100.0)),
            completed("rating 7, it was good", Some(200.0)),
            completed("rating 10 but there were problems", Some(250.0)),
            completed("no comment", None),
        ];

        let summary = aggregate(&records, &AnalyticsConfig::default());

        assert_eq!(summary.total_calls, 4);
        assert_eq!(summary.rated_calls(), 3);
        // (8 + 7 + 10) / 3 = 8.33
        assert_eq!(summary.average_rating, 8.3);
        assert_eq!(summary.response_rate, 75);
        // 2 positive overall out of 3 rated
        assert_eq!(summary.satisfaction_rate, 67);

        let overall = summary.tally(Topic::Overall).unwrap();
        assert_eq!(overall.positive, 2);
        assert_eq!(overall.negative, 1);
        assert_eq!(overall.neutral, 1);
        assert_eq!(overall.total, 4);

        assert_eq!(summary.duration_buckets.short, 1);
        assert_eq!(summary.duration_buckets.medium, 2);
        assert_eq!(summary.duration_buckets.long, 0);
        assert_eq!(summary.language_usage.english, 4);
    }

    #[test]
    fn test_no_ratings_means_zero_rates() {
        let summary = aggregate(&[completed("all good", None)], &AnalyticsConfig::default());

        assert_eq!(summary.total_calls, 1);
        assert_eq!(summary.average_rating, 0.0);
        assert_eq!(summary.satisfaction_rate, 0);
        assert_eq!(summary.response_rate, 0);
    }

    #[test]
    fn test_topic_tallies() {
        let records = vec![
            completed("the website was fantastic but SEO was poor", None),
            completed("website ok", None),
        ];

        let summary = aggregate(&records, &AnalyticsConfig::default());

        let website = summary.tally(Topic::Website).unwrap();
        assert_eq!((website.positive, website.negative, website.neutral), (1, 0, 1));
        let seo = summary.tally(Topic::Seo).unwrap();
        assert_eq!((seo.positive, seo.negative, seo.neutral), (0, 1, 0));
        assert_eq!(summary.tally(Topic::Marketing).unwrap().total, 0);

        let strict = aggregate(&records, &AnalyticsConfig { neutral_on_mention: false });
        assert_eq!(strict.tally(Topic::Website).unwrap().neutral, 0);
    }

    fn rated(ratings: &[u8]) -> Vec<CallExecutionRecord> {
        ratings
            .iter()
            .map(|r| completed(&format!("rating {}", r), None))
            .collect()
    }

    #[test]
    fn test_histogram_percent_sums_to_100() {
        let mut sets: Vec<Vec<u8>> = (0..=MAX_RATING).map(|r| vec![r]).collect();
        sets.push((0..=MAX_RATING).collect());
        sets.push(vec![1, 2, 2, 5, 7, 7, 7, 9, 10]);
        sets.push(vec![10, 10, 10, 10, 10, 10, 0]);
        sets.push(vec![3, 6, 9]);
        sets.push(vec![0, 0, 1, 1, 1, 4, 8, 8, 8, 8, 8, 8, 9]);

        for ratings in &sets {
            let summary = aggregate(&rated(ratings), &AnalyticsConfig::default());
            let total: u32 = summary.rating_histogram.iter().map(|b| b.percent).sum();
            let nonzero = summary.rating_histogram.iter().filter(|b| b.count > 0).count() as u32;

            assert_eq!(summary.rated_calls(), ratings.len(), "ratings {:?}", ratings);
            // Each non-empty row rounds independently, by at most half a point
            assert!(
                total.abs_diff(100) * 2 <= nonzero,
                "percent total was {} for {:?}",
                total,
                ratings
            );
        }
    }

    #[test]
    fn test_histogram_rows() {
        let summary = aggregate(&rated(&[1, 2, 2, 5, 7, 7, 7, 9, 10]), &AnalyticsConfig::default());

        assert_eq!(summary.rating_histogram[7].count, 3);
        assert_eq!(summary.rating_histogram[7].percent, 33);
        assert_eq!(summary.rating_histogram[2].percent, 22);
        assert_eq!(summary.rating_histogram[0].count, 0);
    }

    #[test]
    fn test_idempotent_and_reproducible() {
        let records: Vec<CallExecutionRecord> = serde_json::from_value(json!([
            {"execution_id": "a", "status": "completed", "duration": 120,
             "conversation": {"data": [
                {"component": "transcriber", "type": "response", "data": "वेबसाइट अच्छी है, 9"}
             ]}},
            {"execution_id": "b", "status": "completed", "duration": 320,
             "transcript": "website अच्छा है, rating 6"},
            {"execution_id": "c", "status": "failed"}
        ]))
        .unwrap();
        let config = AnalyticsConfig::default();

        let first = aggregate(&records, &config);
        let second = aggregate(&records, &config);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(first.language_usage.hindi, 1);
        assert_eq!(first.language_usage.both, 1);
        assert_eq!(first.average_rating, 7.5);
    }

    #[test]
    fn test_sparse_completed_record_still_counts() {
        let sparse: CallExecutionRecord =
            serde_json::from_value(json!({"status": "completed"})).unwrap();

        let summary = aggregate(&[sparse], &AnalyticsConfig::default());

        assert_eq!(summary.total_calls, 1);
        assert_eq!(summary.rated_calls(), 0);
        assert_eq!(summary.language_usage.english, 1);
        assert_eq!(summary.tally(Topic::Overall).unwrap().neutral, 1);
        assert_eq!(summary.duration_buckets, DurationBuckets::default());
    }

    #[test]
    fn test_zero_duration_has_no_bucket() {
        let summary = aggregate(
            &[completed("rating 5", Some(0.0)), completed("rating 6", Some(30.0))],
            &AnalyticsConfig::default(),
        );

        assert_eq!(summary.total_calls, 2);
        assert_eq!(summary.duration_buckets.short, 1);
        assert_eq!(summary.duration_buckets.medium + summary.duration_buckets.long, 0);
    }

    #[test]
    fn test_empty_conversation_string_still_rated() {
        let record: CallExecutionRecord = serde_json::from_value(json!({
            "execution_id": "e",
            "status": "completed",
            "conversation": "",
            "transcript": "rating 9, very happy"
        }))
        .unwrap();

        let summary = aggregate(&[record], &AnalyticsConfig::default());

        assert_eq!(summary.rated_calls(), 1);
        assert_eq!(summary.average_rating, 9.0);
        assert_eq!(summary.tally(Topic::Overall).unwrap().positive, 1);
    }

    #[test]
    fn test_output_shape() {
        let summary = aggregate(&[completed("rating 8", Some(10.0))], &AnalyticsConfig::default());
        let value = serde_json::to_value(&summary).unwrap();

        assert_eq!(value["rating_histogram"][8], json!({"rating": 8, "count": 1, "percent": 100}));
        assert_eq!(value["topic_tallies"][2]["name"], json!("Social Media"));
        assert_eq!(value["language_usage"], json!({"english": 1, "hindi": 0, "both": 0}));
        assert_eq!(value["duration_buckets"], json!({"short": 1, "medium": 0, "long": 0}));
        assert_eq!(value["average_rating"], json!(8.0));
    }
}
