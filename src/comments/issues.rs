//! Issue existence lookups guarding comment creation.

use std::collections::HashSet;
use std::num::ParseIntError;
use std::sync::RwLock;

/// Answers whether an issue exists.
pub trait IssueDirectory: Send + Sync {
    fn exists(&self, issue_id: i64) -> bool;
}

impl<F> IssueDirectory for F
where
    F: Fn(i64) -> bool + Send + Sync,
{
    fn exists(&self, issue_id: i64) -> bool {
        self(issue_id)
    }
}

/// Issue ids kept in memory.
#[derive(Default)]
pub struct InMemoryIssues {
    ids: RwLock<HashSet<i64>>,
}

impl InMemoryIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: RwLock::new(ids.into_iter().collect()),
        }
    }

    /// Parse a comma-separated id list such as `"1, 2,9"`. Blank entries are
    /// skipped.
    pub fn parse_list(list: &str) -> Result<Self, ParseIntError> {
        let ids = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect::<Result<HashSet<i64>, _>>()?;
        Ok(Self::with_ids(ids))
    }

    pub fn add(&self, issue_id: i64) {
        if let Ok(mut ids) = self.ids.write() {
            ids.insert(issue_id);
        }
    }

    pub fn remove(&self, issue_id: i64) -> bool {
        self.ids
            .write()
            .map(|mut ids| ids.remove(&issue_id))
            .unwrap_or(false)
    }
}

impl IssueDirectory for InMemoryIssues {
    fn exists(&self, issue_id: i64) -> bool {
        self.ids
            .read()
            .map(|ids| ids.contains(&issue_id))
            .unwrap_or(false)
    }
}
