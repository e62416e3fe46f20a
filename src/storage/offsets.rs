use crate::types::{PageRank, TupleIndex};

/// Cumulative tuple counts of the pages visited so far.
///
/// Entry 0 is a sentinel `0`; entry `k` is the number of tuples held by pages
/// `1..=k`. Pages are therefore addressed by 1-based rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageOffsets {
    cumulative: Vec<TupleIndex>,
}

impl Default for PageOffsets {
    fn default() -> Self {
        Self::new()
    }
}

impl PageOffsets {
    pub fn new() -> Self {
        Self {
            cumulative: vec![0],
        }
    }

    /// Record a newly fetched page holding `tuple_count` tuples.
    pub fn push_page(&mut self, tuple_count: usize) {
        let total = self.total() + tuple_count as TupleIndex;
        self.cumulative.push(total);
    }

    /// Tuples held by every recorded page.
    pub fn total(&self) -> TupleIndex {
        // The sentinel is never removed
        self.cumulative.last().copied().unwrap_or(0)
    }

    pub fn pages(&self) -> usize {
        self.cumulative.len() - 1
    }

    pub fn get(&self, rank: PageRank) -> Option<TupleIndex> {
        self.cumulative.get(rank).copied()
    }

    pub fn as_slice(&self) -> &[TupleIndex] {
        &self.cumulative
    }

    /// Tuples in the page of rank `rank`, if that page was recorded.
    pub fn tuples_in(&self, rank: PageRank) -> Option<usize> {
        if rank == 0 {
            return None;
        }
        let end = self.get(rank)?;
        Some((end - self.cumulative[rank - 1]) as usize)
    }

    /// Rank of the page holding tuple `index`: the smallest rank whose
    /// cumulative count is at least `index + 1`. Empty pages share their
    /// predecessor's count and are never selected.
    pub fn page_containing(&self, index: TupleIndex) -> Option<PageRank> {
        let target = index + 1;
        let rank = self.cumulative.partition_point(|&count| count < target);
        (rank < self.cumulative.len()).then_some(rank)
    }

    /// Forget every page from `rank` onwards; they are re-recorded when fetched again.
    pub fn truncate(&mut self, rank: PageRank) {
        self.cumulative.truncate(rank.max(1));
    }

    pub fn clear(&mut self) {
        self.cumulative.truncate(1);
    }
}
