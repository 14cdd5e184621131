use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{Sentiment, Topic};

const POSITIVE_WORDS: &str = r"good|great|excellent|amazing|wonderful|fantastic|perfect|well\s+done";
const NEGATIVE_WORDS: &str = r"bad|poor|terrible|awful|horrible|disappointing";

const OVERALL_POSITIVE: &str = r"(?i)\b(?:satisfied|happy|pleased|content|good|great|excellent|well\s+done|everything\s+was\s+good|no\s+issues)\b";
const OVERALL_NEGATIVE: &str =
    r"(?i)\b(?:dissatisfied|unhappy|disappointed|frustrated|bad|poor|issues|problems)\b";

/// What a topic scores when neither sentiment rule fires
#[derive(Debug)]
enum Fallback {
    /// Neutral only if the topic is mentioned
    Mention(Regex),
    /// Always neutral
    Neutral,
}

/// Keyword rules for one topic, evaluated positive, then negative, then fallback
#[derive(Debug)]
pub struct TopicRule {
    pub topic: Topic,
    positive: Vec<Regex>,
    negative: Vec<Regex>,
    fallback: Fallback,
}

impl TopicRule {
    /// A service topic: sentiment words must follow the subject
    fn service(topic: Topic, subject: &str) -> Self {
        Self {
            topic,
            positive: vec![subject_then(subject, POSITIVE_WORDS)],
            negative: vec![subject_then(subject, NEGATIVE_WORDS)],
            fallback: Fallback::Mention(Regex::new(&format!(r"(?i)\b(?:{})\b", subject)).unwrap()),
        }
    }

    /// Sentiment of `text` for this topic, `None` when the topic gets no tally
    pub fn classify(&self, text: &str, neutral_on_mention: bool) -> Option<Sentiment> {
        if self.positive.iter().any(|re| re.is_match(text)) {
            return Some(Sentiment::Positive);
        }
        if self.negative.iter().any(|re| re.is_match(text)) {
            return Some(Sentiment::Negative);
        }
        match &self.fallback {
            Fallback::Neutral => Some(Sentiment::Neutral),
            Fallback::Mention(re) if neutral_on_mention && re.is_match(text) => {
                Some(Sentiment::Neutral)
            }
            Fallback::Mention(_) => None,
        }
    }
}

fn subject_then(subject: &str, words: &str) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b.*?\b(?:{})\b", subject, words)).unwrap()
}

static TOPIC_RULES: Lazy<Vec<TopicRule>> = Lazy::new(|| {
    let mut seo = TopicRule::service(Topic::Seo, "seo");
    // Customers describe SEO by its effect on search visibility
    seo.positive.extend([
        Regex::new(r"(?i)\bgoogle\b.*?\b(?:see|visible|appear|show|find)").unwrap(),
        Regex::new(r"(?i)\bsearch\b.*?\b(?:result|appear|visible)").unwrap(),
    ]);
    seo.fallback = Fallback::Mention(Regex::new(r"(?i)\b(?:seo|google|search)\b").unwrap());

    vec![
        TopicRule::service(Topic::Website, r"websites?"),
        seo,
        TopicRule::service(Topic::SocialMedia, r"social\s+media"),
        TopicRule::service(Topic::Content, "content"),
        TopicRule::service(Topic::Marketing, "marketing"),
        TopicRule {
            topic: Topic::Overall,
            positive: vec![Regex::new(OVERALL_POSITIVE).unwrap()],
            negative: vec![Regex::new(OVERALL_NEGATIVE).unwrap()],
            fallback: Fallback::Neutral,
        },
    ]
});

/// Topic rules in [`Topic::ALL`] order
pub fn topic_rules() -> &'static [TopicRule] {
    &TOPIC_RULES
}

/// Sentiment verdict for one topic of one call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicVerdict {
    pub topic: Topic,
    pub sentiment: Sentiment,
}

/// Classify every topic for one transcript
///
/// `Overall` always yields exactly one verdict; the service topics yield
/// one only when they are discussed.
pub fn classify_topics(text: &str, neutral_on_mention: bool) -> Vec<TopicVerdict> {
    topic_rules()
        .iter()
        .filter_map(|rule| {
            rule.classify(text, neutral_on_mention)
                .map(|sentiment| TopicVerdict {
                    topic: rule.topic,
                    sentiment,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(text: &str, topic: Topic) -> Option<Sentiment> {
        classify_topics(text, true)
            .into_iter()
            .find(|v| v.topic == topic)
            .map(|v| v.sentiment)
    }

    #[test]
    fn test_rules_follow_topic_order() {
        let topics: Vec<Topic> = topic_rules().iter().map(|r| r.topic).collect();
        assert_eq!(topics, Topic::ALL.to_vec());
    }

    #[test]
    fn test_mixed_sentiment() {
        let text = "the website was fantastic but SEO was poor";
        assert_eq!(verdict(text, Topic::Website), Some(Sentiment::Positive));
        assert_eq!(verdict(text, Topic::Seo), Some(Sentiment::Negative));
        assert_eq!(verdict(text, Topic::SocialMedia), None);
        assert_eq!(verdict(text, Topic::Content), None);
        assert_eq!(verdict(text, Topic::Marketing), None);
    }

    #[test]
    fn test_positive_wins_over_negative() {
        let text = "the website was bad at first but now the website is great";
        assert_eq!(verdict(text, Topic::Website), Some(Sentiment::Positive));
    }

    #[test]
    fn test_seo_visibility_phrases() {
        assert_eq!(
            verdict("now people can find us on google and see us", Topic::Seo),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            verdict("we appear in search results now", Topic::Seo),
            Some(Sentiment::Positive)
        );
        assert_eq!(verdict("I searched on google", Topic::Seo), Some(Sentiment::Neutral));
    }

    #[test]
    fn test_bare_mention() {
        let text = "we talked about marketing for a while";
        assert_eq!(verdict(text, Topic::Marketing), Some(Sentiment::Neutral));

        let strict = classify_topics(text, false);
        assert!(strict.iter().all(|v| v.topic != Topic::Marketing));
    }

    #[test]
    fn test_sentiment_word_must_follow_subject() {
        // "good" precedes "social media", so it is only a mention
        assert_eq!(
            verdict("good morning, about your social media", Topic::SocialMedia),
            Some(Sentiment::Neutral)
        );
    }

    #[test]
    fn test_overall_always_present() {
        assert_eq!(verdict("", Topic::Overall), Some(Sentiment::Neutral));
        assert_eq!(verdict("I am very happy", Topic::Overall), Some(Sentiment::Positive));
        assert_eq!(verdict("there were problems", Topic::Overall), Some(Sentiment::Negative));
        assert_eq!(verdict("no issues at all", Topic::Overall), Some(Sentiment::Positive));
        assert_eq!(
            verdict("honestly I am dissatisfied", Topic::Overall),
            Some(Sentiment::Negative)
        );

        let only_overall = classify_topics("hello there", true);
        assert_eq!(only_overall.len(), 1);
        assert_eq!(only_overall[0].topic, Topic::Overall);
    }
}
