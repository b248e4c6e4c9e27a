//! Task-driven tool selection.
//!
//! Discovery ranks registered providers by how many words their probe
//! instance's description and underscore-separated name share with a task
//! description. Matching is purely lexical; scores are not normalised by
//! length.
//!
//! Every failure degrades to returning fewer tools: probes or final builds that
//! fail are skipped and logged, and an empty task yields an empty selection.
//! Callers cannot tell "no match" apart from "every provider failed".

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ToolError, ToolResult};
use crate::provider::{Tool, ToolProvider};
use crate::registry::ToolRegistry;

const DEFAULT_MAX_RESULTS: usize = 5;

/// Configuration for [`ToolDiscovery`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    max_results: usize,
    min_score: usize,
}

impl DiscoveryConfig {
    /// Returns the number of tools [`ToolDiscovery::select`] returns at most.
    #[must_use]
    pub const fn max_results(self) -> usize {
        self.max_results
    }

    /// Returns the lowest score a candidate needs to be selected.
    #[must_use]
    pub const fn min_score(self) -> usize {
        self.min_score
    }

    /// Sets the default result limit.
    #[must_use]
    pub const fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets the minimum score. `0` keeps every candidate that could be probed.
    #[must_use]
    pub const fn with_min_score(mut self, min_score: usize) -> Self {
        self.min_score = min_score;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidConfig`] when `max_results` is zero.
    pub fn validate(self) -> ToolResult<()> {
        if self.max_results == 0 {
            return Err(ToolError::InvalidConfig(
                "discovery max_results must be greater than zero",
            ));
        }
        Ok(())
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            min_score: 0,
        }
    }
}

/// Relevance of one candidate for a task.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateScore {
    score: usize,
    name: String,
}

impl CandidateScore {
    /// Returns the word-overlap score.
    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the name declared by the candidate's probe instance.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

struct Ranked {
    score: CandidateScore,
    provider: Arc<dyn ToolProvider>,
}

/// Selects the registered tools most relevant to a task description.
#[derive(Debug, Clone)]
pub struct ToolDiscovery {
    registry: Arc<ToolRegistry>,
    config: DiscoveryConfig,
}

impl ToolDiscovery {
    /// Creates a discovery handle over `registry` with default configuration.
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self::with_config(registry, DiscoveryConfig::default())
    }

    /// Creates a discovery handle with the supplied configuration.
    #[must_use]
    pub fn with_config(registry: Arc<ToolRegistry>, config: DiscoveryConfig) -> Self {
        Self { registry, config }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> DiscoveryConfig {
        self.config
    }

    /// Selects up to the configured number of tools from every category.
    #[must_use]
    pub fn select(&self, task: &str) -> Vec<Box<dyn Tool>> {
        self.select_for_task::<&str>(task, &[], self.config.max_results)
    }

    /// Selects up to `max_results` tools for `task`.
    ///
    /// With a non-empty `categories` slice only providers in at least one of
    /// those categories are considered; otherwise every registered provider is.
    /// Each returned tool is freshly built and owned by the caller.
    #[must_use]
    pub fn select_for_task<S: AsRef<str>>(
        &self,
        task: &str,
        categories: &[S],
        max_results: usize,
    ) -> Vec<Box<dyn Tool>> {
        if max_results == 0 {
            return Vec::new();
        }

        self.ranked(task, categories)
            .into_iter()
            .take(max_results)
            .filter_map(|candidate| match candidate.provider.try_build_default() {
                Ok(tool) => Some(tool),
                Err(err) => {
                    warn!(
                        tool = candidate.score.name(),
                        %err,
                        "selected tool failed to build; skipping"
                    );
                    None
                }
            })
            .collect()
    }

    /// Scores every candidate for `task`, best first.
    ///
    /// Ties keep registration order. Candidates whose probe cannot be built
    /// or whose score is below the configured minimum are omitted.
    #[must_use]
    pub fn rank<S: AsRef<str>>(&self, task: &str, categories: &[S]) -> Vec<CandidateScore> {
        self.ranked(task, categories)
            .into_iter()
            .map(|candidate| candidate.score)
            .collect()
    }

    fn ranked<S: AsRef<str>>(&self, task: &str, categories: &[S]) -> Vec<Ranked> {
        let task_words = words(task);
        if task_words.is_empty() {
            debug!("empty task description; nothing to select");
            return Vec::new();
        }

        let entries = if categories.is_empty() {
            self.registry.entries()
        } else {
            self.registry.entries_in_categories(categories)
        };

        let mut ranked: Vec<Ranked> = entries
            .into_iter()
            .filter_map(|entry| {
                let probe = match entry.provider().try_build_default() {
                    Ok(probe) => probe,
                    Err(err) => {
                        debug!(tool = entry.name(), %err, "probe failed; excluding candidate");
                        return None;
                    }
                };
                let score = relevance(&task_words, probe.name(), probe.description());
                Some(Ranked {
                    score: CandidateScore {
                        score,
                        name: probe.name().to_owned(),
                    },
                    provider: Arc::clone(entry.provider()),
                })
            })
            .filter(|candidate| candidate.score.score >= self.config.min_score)
            .collect();

        // Stable sort: equal scores stay in registration order.
        ranked.sort_by(|a, b| b.score.score.cmp(&a.score.score));
        ranked
    }
}

/// Computes the overlap score of a tool against pre-tokenised task words.
///
/// The score is the number of task words found in the lower-cased,
/// whitespace-split description plus the number found in the lower-cased,
/// underscore-split name.
#[must_use]
pub fn relevance(task_words: &HashSet<String>, name: &str, description: &str) -> usize {
    let description_words = words(description);
    let name_words: HashSet<String> = name.to_lowercase().split('_').map(str::to_owned).collect();
    task_words.intersection(&description_words).count()
        + task_words.intersection(&name_words).count()
}

/// Lower-cases `text` and splits it on whitespace into a word set.
#[must_use]
pub fn words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}
