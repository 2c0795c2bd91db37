//! Fallible allocation against a per-store memory budget.

use crate::error::{StoreError, StoreResult};
use tracing::warn;

/// Tracks bytes held by a store's blocks, slot arrays and segment nodes.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryBudget {
    limit: Option<usize>,
    used: usize,
}

impl MemoryBudget {
    pub(crate) fn new(limit: Option<usize>) -> Self {
        Self { limit, used: 0 }
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    /// Bytes still available, or `None` when unbounded.
    pub(crate) fn remaining(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }

    /// Reserves `bytes` of the budget.
    pub(crate) fn charge(&mut self, bytes: usize) -> StoreResult<()> {
        let next = self
            .used
            .checked_add(bytes)
            .filter(|next| self.limit.map_or(true, |limit| *next <= limit))
            .ok_or_else(|| {
                warn!(
                    requested = bytes,
                    used = self.used,
                    limit = ?self.limit,
                    "memory limit reached"
                );
                StoreError::allocation_failure(bytes)
            })?;
        self.used = next;
        Ok(())
    }

    pub(crate) fn refund(&mut self, bytes: usize) {
        self.used = self.used.saturating_sub(bytes);
    }

    /// Forgets every charge; the chain it covered has been released.
    pub(crate) fn reset(&mut self) {
        self.used = 0;
    }
}

/// Allocates `len` elements filled by `fill`, charging `len * elem_bytes`.
///
/// Neither the budget nor the allocator is left changed on failure.
pub(crate) fn filled<T>(
    budget: &mut MemoryBudget,
    len: usize,
    elem_bytes: usize,
    fill: impl FnMut() -> T,
) -> StoreResult<Box<[T]>> {
    let bytes = len.saturating_mul(elem_bytes);
    budget.charge(bytes)?;

    let mut buf = Vec::new();
    if buf.try_reserve_exact(len).is_err() {
        budget.refund(bytes);
        warn!(requested = bytes, "allocator refused request");
        return Err(StoreError::allocation_failure(bytes));
    }
    buf.resize_with(len, fill);
    Ok(buf.into_boxed_slice())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_unbounded_accepts_everything() {
        let mut budget = MemoryBudget::new(None);
        budget.charge(1 << 40).unwrap();
        assert_eq!(budget.used(), 1 << 40);
    }

    #[test]
    fn budget_rejects_over_limit() {
        let mut budget = MemoryBudget::new(Some(100));
        budget.charge(60).unwrap();
        let err = budget.charge(41).unwrap_err();
        assert!(matches!(err, StoreError::AllocationFailure { requested: 41 }));
        assert_eq!(budget.used(), 60);
        budget.charge(40).unwrap();
        assert_eq!(budget.used(), 100);
        assert_eq!(budget.remaining(), Some(0));
        assert_eq!(MemoryBudget::new(None).remaining(), None);
    }

    #[test]
    fn budget_refund_and_reset() {
        let mut budget = MemoryBudget::new(Some(10));
        budget.charge(10).unwrap();
        budget.refund(4);
        assert_eq!(budget.used(), 6);
        budget.reset();
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn filled_charges_budget() {
        let mut budget = MemoryBudget::new(Some(64));
        let buf = filled(&mut budget, 16, 1, || 0u8).unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.iter().all(|b| *b == 0));
        assert_eq!(budget.used(), 16);

        assert!(filled(&mut budget, 64, 1, || 0u8).is_err());
        assert_eq!(budget.used(), 16);
    }
}
