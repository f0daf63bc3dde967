//! Countdown budgets for capping repeated work across calls.

/// Remaining number of units (e.g. data frames) a task may still process.
///
/// The driver decrements it; tasks never keep hidden "already done" flags.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskBudget {
    remaining: usize,
}

impl TaskBudget {
    pub fn new(limit: usize) -> Self {
        TaskBudget { remaining: limit }
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }

    /// Take one unit if any is left.
    pub fn try_consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }

    /// Take up to `wanted` units at once, returning how many were granted.
    pub fn reserve(&mut self, wanted: usize) -> usize {
        let granted = wanted.min(self.remaining);
        self.remaining -= granted;
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_consume_until_exhausted() {
        let mut b = TaskBudget::new(2);
        assert!(b.try_consume());
        assert!(b.try_consume());
        assert!(!b.try_consume());
        assert!(b.is_exhausted());
        assert_eq!(b.remaining(), 0);
    }

    #[test]
    fn test_reserve_truncates() {
        let mut b = TaskBudget::new(5);
        assert_eq!(b.reserve(3), 3);
        assert_eq!(b.reserve(3), 2);
        assert_eq!(b.reserve(1), 0);
    }
}
