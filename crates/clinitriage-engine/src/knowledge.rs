//! Read-only lookup tables shared by every request.
//!
//! Built once at startup and passed by reference (or behind an `Arc`) to the
//! components; never mutated afterwards.

use crate::markov::TransitionTable;
use crate::range::ReferenceIntervals;
use crate::syndrome::SyndromeRules;

#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    pub intervals: ReferenceIntervals,
    pub rules: SyndromeRules,
    pub transitions: TransitionTable,
}

impl KnowledgeBase {
    pub fn standard() -> Self {
        Self {
            intervals: ReferenceIntervals::standard(),
            rules: SyndromeRules::standard(),
            transitions: TransitionTable::standard(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shareable_across_threads() {
        assert_send_sync::<KnowledgeBase>();
    }

    #[test]
    fn test_every_syndrome_has_a_projection() {
        let kb = KnowledgeBase::standard();
        for name in kb.rules.names() {
            assert!(kb.transitions.contains(name), "no transitions declared for {name}");
        }
        assert!(kb.transitions.contains("Normal"));
    }
}
