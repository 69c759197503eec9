use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::{error::CoreError, generator::FamilyGenerator};

/// Decides whether a metric family is exposed at all.
pub trait FamilyGeneratorFilter: Send + Sync {
    fn test(&self, name: &str, opt_in: bool) -> bool;
}

/// Keep only the generators passing `filter`.
pub fn filter_generators<K>(
    filter: &dyn FamilyGeneratorFilter,
    generators: Vec<FamilyGenerator<K>>,
) -> Vec<FamilyGenerator<K>> {
    generators
        .into_iter()
        .filter(|g| {
            let keep = filter.test(&g.name, g.opt_in);
            if !keep {
                debug!(family = %g.name, "metric family filtered out");
            }
            keep
        })
        .collect()
}

/// Passes only when every inner filter passes.
#[derive(Clone, Default)]
pub struct CompositeFamilyGeneratorFilter {
    filters: Vec<Arc<dyn FamilyGeneratorFilter>>,
}

impl CompositeFamilyGeneratorFilter {
    pub fn new(filters: Vec<Arc<dyn FamilyGeneratorFilter>>) -> Self {
        Self { filters }
    }
}

impl FamilyGeneratorFilter for CompositeFamilyGeneratorFilter {
    fn test(&self, name: &str, opt_in: bool) -> bool {
        self.filters.iter().all(|f| f.test(name, opt_in))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, CoreError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| CoreError::InvalidPattern {
                pattern: p.clone(),
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Metric name allow list or deny list, never both.
///
/// Patterns are regular expressions searched anywhere in the family name.
#[derive(Debug, Clone)]
pub struct AllowDenyList {
    patterns: Vec<Regex>,
    is_allow_list: bool,
}

impl AllowDenyList {
    pub fn new(allow: &[String], deny: &[String]) -> Result<Self, CoreError> {
        if !allow.is_empty() && !deny.is_empty() {
            return Err(CoreError::AllowDenyConflict);
        }
        let is_allow_list = !allow.is_empty();
        let patterns = compile(if is_allow_list { allow } else { deny })?;
        Ok(Self {
            patterns,
            is_allow_list,
        })
    }

    pub fn is_included(&self, item: &str) -> bool {
        let matched = self.patterns.iter().any(|r| r.is_match(item));
        if self.is_allow_list { matched } else { !matched }
    }

    /// Human readable summary for startup logs.
    pub fn status(&self) -> String {
        let items: Vec<&str> = self.patterns.iter().map(Regex::as_str).collect();
        if self.is_allow_list {
            format!("Including the following lists that were on allowlist: {}", items.join(", "))
        } else {
            format!("Excluding the following lists that were on denylist: {}", items.join(", "))
        }
    }
}

impl FamilyGeneratorFilter for AllowDenyList {
    fn test(&self, name: &str, _opt_in: bool) -> bool {
        self.is_included(name)
    }
}

/// Lets opt-in families through only when one of the patterns names them.
#[derive(Debug, Clone, Default)]
pub struct OptInFilter {
    patterns: Vec<Regex>,
}

impl OptInFilter {
    pub fn new(patterns: &[String]) -> Result<Self, CoreError> {
        Ok(Self {
            patterns: compile(patterns)?,
        })
    }

    pub fn count(&self) -> usize {
        self.patterns.len()
    }

    pub fn status(&self) -> String {
        let mut items: Vec<&str> = self.patterns.iter().map(Regex::as_str).collect();
        items.sort_unstable();
        items.join(", ")
    }
}

impl FamilyGeneratorFilter for OptInFilter {
    fn test(&self, name: &str, opt_in: bool) -> bool {
        !opt_in || self.patterns.iter().any(|r| r.is_match(name))
    }
}
