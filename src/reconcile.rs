use serde::Serialize;
use std::collections::HashSet;

/// Keyed difference between two visible lists, in the order an adapter should
/// apply it: `entered` and `updated` follow the new list, `exited` the old one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisibleDiff {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

impl VisibleDiff {
    pub fn is_empty(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

pub fn reconcile<S: AsRef<str>>(previous: &[S], next: &[S]) -> VisibleDiff {
    let previous: Vec<&str> = previous.iter().map(|id| id.as_ref()).collect();
    let next: Vec<&str> = next.iter().map(|id| id.as_ref()).collect();
    let old: HashSet<&str> = previous.iter().copied().collect();
    let new: HashSet<&str> = next.iter().copied().collect();

    let mut diff = VisibleDiff::default();
    for &id in &next {
        if old.contains(id) {
            diff.updated.push(id.to_string());
        } else {
            diff.entered.push(id.to_string());
        }
    }
    diff.exited = previous
        .iter()
        .filter(|id| !new.contains(*id))
        .map(|id| id.to_string())
        .collect();
    diff
}
