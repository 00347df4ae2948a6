//! Who is in the building right now.

use std::collections::BTreeSet;
use std::sync::{Mutex, PoisonError};

/// In-memory set of usernames currently inside.
///
/// Locks internally, so one instance can be shared by every request.
#[derive(Debug, Default)]
pub struct Inhabitants {
    inside: Mutex<BTreeSet<String>>,
}

impl Inhabitants {
    pub fn new() -> Self {
        Self::default()
    }

    /// `false` if `username` was already inside.
    pub fn add(&self, username: &str) -> bool {
        self.inside.lock().unwrap_or_else(PoisonError::into_inner).insert(username.to_owned())
    }

    /// `false` if `username` was not inside.
    pub fn remove(&self, username: &str) -> bool {
        self.inside.lock().unwrap_or_else(PoisonError::into_inner).remove(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.inside.lock().unwrap_or_else(PoisonError::into_inner).contains(username)
    }

    /// Sorted snapshot.
    pub fn list(&self) -> Vec<String> {
        self.inside.lock().unwrap_or_else(PoisonError::into_inner).iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_report_changes() {
        let i = Inhabitants::new();
        assert!(i.add("bob"));
        assert!(!i.add("bob"));
        assert!(i.add("alice"));
        assert_eq!(i.list(), vec!["alice", "bob"]);
        assert!(i.remove("bob"));
        assert!(!i.remove("bob"));
        assert!(!i.contains("bob"));
    }
}
