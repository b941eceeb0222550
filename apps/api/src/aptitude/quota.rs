use std::collections::BTreeMap;

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
#[error("aptitude_config must be an object of topic counts, got {0}")]
pub struct InvalidQuotaConfig(pub String);

/// Requested number of questions per topic. Empty means "no constraint".
///
/// Entries whose count is not a non-negative integer are kept separately so
/// that the sampler can report them as failed topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicQuota {
    counts: BTreeMap<String, usize>,
    invalid: BTreeMap<String, String>,
}

impl TopicQuota {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, topic: impl Into<String>, count: usize) -> Self {
        self.counts.insert(topic.into(), count);
        self
    }

    /// Parses a company `aptitude_config` object of `topic → count`.
    ///
    /// `null`, `{}` and `[]` parse as an empty quota. Any other non-object
    /// value is rejected.
    pub fn from_config(config: &Value) -> Result<Self, InvalidQuotaConfig> {
        let map = match config {
            Value::Object(map) => map,
            Value::Null => return Ok(Self::default()),
            Value::Array(items) if items.is_empty() => return Ok(Self::default()),
            other => return Err(InvalidQuotaConfig(other.to_string())),
        };

        let mut quota = Self::default();
        for (topic, count) in map {
            match count.as_u64().and_then(|c| usize::try_from(c).ok()) {
                Some(c) => {
                    quota.counts.insert(topic.clone(), c);
                }
                None => {
                    warn!(topic = %topic, count = %count, "invalid topic count");
                    quota.invalid.insert(topic.clone(), count.to_string());
                }
            }
        }
        Ok(quota)
    }

    /// True only when the config named no topics at all.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() && self.invalid.is_empty()
    }

    pub fn len(&self) -> usize {
        self.counts.len() + self.invalid.len()
    }

    /// Topics with a usable count.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts
            .iter()
            .map(|(topic, count)| (topic.as_str(), *count))
    }

    /// Topics whose count could not be used, with the raw JSON count.
    pub fn invalid_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.invalid
            .iter()
            .map(|(topic, raw)| (topic.as_str(), raw.as_str()))
    }
}
