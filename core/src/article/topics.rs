// Topic hashtags attached to every posted article

use serde::{Deserialize, Serialize};

/// Topics used when the user has not configured any
pub const DEFAULT_TOPICS: &[&str] = &["web-archive", "budget-wayback-machine", "ReadToRelay"];

/// Ordered, de-duplicated list of topic hashtags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicSet {
    topics: Vec<String>,
}

impl TopicSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn defaults() -> Self {
        Self {
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Add a topic. Returns `false` for blanks and duplicates.
    pub fn add(&mut self, topic: &str) -> bool {
        let topic = topic.trim();
        if topic.is_empty() || self.contains(topic) {
            return false;
        }
        self.topics.push(topic.to_string());
        true
    }

    /// Remove a topic. Returns `false` if it was not present.
    pub fn remove(&mut self, topic: &str) -> bool {
        let before = self.topics.len();
        self.topics.retain(|t| t != topic.trim());
        self.topics.len() != before
    }

    /// Restore the default topics
    pub fn reset(&mut self) {
        *self = Self::defaults();
    }

    pub fn contains(&self, topic: &str) -> bool {
        self.topics.iter().any(|t| t == topic)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let topics = TopicSet::defaults();
        assert_eq!(topics.iter().collect::<Vec<_>>(), DEFAULT_TOPICS.to_vec());
    }

    #[test]
    fn test_add_rejects_blank_and_duplicate() {
        let mut topics = TopicSet::new();
        assert!(topics.add(" rust "));
        assert!(!topics.add("rust"));
        assert!(!topics.add("   "));
        assert_eq!(topics.len(), 1);
    }

    #[test]
    fn test_remove_and_reset() {
        let mut topics = TopicSet::defaults();
        assert!(topics.remove("web-archive"));
        assert!(!topics.remove("web-archive"));
        topics.add("extra");

        topics.reset();
        assert_eq!(topics, TopicSet::defaults());
    }
}
