//! Question Sampler: assembles a randomized, quota-respecting, answer-redacted
//! assessment paper from the question bank.
//!
//! Pipeline:
//! 1. No quota (absent or empty): fetch up to 50 questions from any topic and
//!    sample `min(10, pool)` of them.
//! 2. Quota: per topic, fetch `max(count * 3, 50)` candidates and sample
//!    `min(count, pool)`. Topic fetches run concurrently. A failed fetch drops
//!    that topic (logged, recorded in `skipped_topics`) when
//!    `SamplingPolicy::tolerate_topic_failures` is set, and fails the paper
//!    otherwise. There is no retry. Topics whose configured count is not a
//!    non-negative integer are handled the same way as a failed fetch.
//! 3. Nothing selected → `SamplerError::NoQuestions`.
//! 4. One global shuffle so topics interleave, then redaction.
//!
//! Sampling is uniform over the fetched pool, not over the whole bank. The
//! bounded fetch is what keeps generation cost independent of bank size.

use futures_util::future::join_all;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::{info, warn};

use crate::aptitude::paper::{AssessmentPaper, QuestionRecord};
use crate::aptitude::quota::TopicQuota;
use crate::store::{QuestionBank, StoreError};

#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("No questions found matching this company's configuration.")]
    NoQuestions,

    #[error("Failed to fetch questions for topic '{topic}': {source}")]
    TopicFetch {
        topic: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Upstream(#[from] StoreError),
}

/// Knobs for paper assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingPolicy {
    /// Pool size fetched when there is no quota.
    pub unconstrained_pool_size: usize,
    /// Paper size when there is no quota.
    pub unconstrained_paper_size: usize,
    /// Per-topic over-fetch multiplier applied to the requested count.
    pub overfetch_factor: usize,
    /// Floor for the per-topic fetch size.
    pub min_topic_fetch: usize,
    /// Skip topics whose fetch fails instead of failing the paper.
    pub tolerate_topic_failures: bool,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            unconstrained_pool_size: 50,
            unconstrained_paper_size: 10,
            overfetch_factor: 3,
            min_topic_fetch: 50,
            tolerate_topic_failures: true,
        }
    }
}

impl SamplingPolicy {
    pub fn topic_fetch_limit(&self, count: usize) -> usize {
        count
            .saturating_mul(self.overfetch_factor)
            .max(self.min_topic_fetch)
    }
}

pub struct QuestionSampler<'a, B: QuestionBank + ?Sized> {
    bank: &'a B,
    policy: SamplingPolicy,
}

impl<'a, B: QuestionBank + ?Sized> QuestionSampler<'a, B> {
    pub fn new(bank: &'a B, policy: SamplingPolicy) -> Self {
        Self { bank, policy }
    }

    /// Generates a paper with an entropy-seeded RNG.
    pub async fn generate(
        &self,
        quota: Option<&TopicQuota>,
    ) -> Result<AssessmentPaper, SamplerError> {
        let mut rng = StdRng::from_entropy();
        self.generate_with_rng(quota, &mut rng).await
    }

    pub async fn generate_with_rng<R: Rng + Send>(
        &self,
        quota: Option<&TopicQuota>,
        rng: &mut R,
    ) -> Result<AssessmentPaper, SamplerError> {
        let (selected, skipped_topics) = match quota.filter(|q| !q.is_empty()) {
            None => (self.draw_unconstrained(rng).await?, Vec::new()),
            Some(quota) => self.draw_by_topic(quota, rng).await?,
        };

        if selected.is_empty() {
            return Err(SamplerError::NoQuestions);
        }

        Ok(finalize(selected, skipped_topics, rng))
    }

    async fn draw_unconstrained<R: Rng + Send>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<QuestionRecord>, SamplerError> {
        let pool = self
            .bank
            .question_pool(None, self.policy.unconstrained_pool_size)
            .await?;

        let take = self.policy.unconstrained_paper_size.min(pool.len());
        info!(pool = pool.len(), take, "Sampling unconstrained paper");
        Ok(sample(&pool, take, rng))
    }

    async fn draw_by_topic<R: Rng + Send>(
        &self,
        quota: &TopicQuota,
        rng: &mut R,
    ) -> Result<(Vec<QuestionRecord>, Vec<String>), SamplerError> {
        let fetches = quota
            .iter()
            .filter(|(_, count)| *count > 0)
            .map(|(topic, count)| async move {
                let limit = self.policy.topic_fetch_limit(count);
                let pool = self.bank.question_pool(Some(topic), limit).await;
                (topic, count, pool)
            });
        let results = join_all(fetches).await;

        let mut selected = Vec::new();
        let mut skipped_topics = Vec::new();

        for (topic, raw) in quota.invalid_entries() {
            let error =
                StoreError::Corrupt(format!("question count {raw} is not a non-negative integer"));
            self.skip_or_fail(topic, error, &mut skipped_topics)?;
        }

        for (topic, count, pool) in results {
            match pool {
                Ok(pool) => {
                    let take = count.min(pool.len());
                    if take < count {
                        info!(
                            topic,
                            requested = count,
                            available = pool.len(),
                            "Topic under-supplied; taking whole pool"
                        );
                    }
                    selected.extend(sample(&pool, take, rng));
                }
                Err(e) => self.skip_or_fail(topic, e, &mut skipped_topics)?,
            }
        }

        Ok((selected, skipped_topics))
    }

    /// Records a failed topic under the tolerant policy, otherwise fails the paper.
    fn skip_or_fail(
        &self,
        topic: &str,
        error: StoreError,
        skipped_topics: &mut Vec<String>,
    ) -> Result<(), SamplerError> {
        if !self.policy.tolerate_topic_failures {
            return Err(SamplerError::TopicFetch {
                topic: topic.to_string(),
                source: error,
            });
        }
        warn!(topic, error = %error, "Failed to load questions for topic; skipping");
        skipped_topics.push(topic.to_string());
        Ok(())
    }
}

/// Uniform sample of `take` questions without replacement.
fn sample<R: Rng + ?Sized>(
    pool: &[QuestionRecord],
    take: usize,
    rng: &mut R,
) -> Vec<QuestionRecord> {
    pool.choose_multiple(rng, take).cloned().collect()
}

fn finalize<R: Rng + ?Sized>(
    mut selected: Vec<QuestionRecord>,
    skipped_topics: Vec<String>,
    rng: &mut R,
) -> AssessmentPaper {
    selected.shuffle(rng);
    AssessmentPaper {
        questions: selected.into_iter().map(QuestionRecord::redact).collect(),
        skipped_topics,
    }
}
