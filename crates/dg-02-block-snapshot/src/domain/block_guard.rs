//! # Block Guard
//!
//! Skips cycles for a registry state that was already processed and tracks
//! where the "live" deposit window of the next cycle starts. A cycle that did
//! not finish keeps its window open until some later cycle does.

use shared_types::BlockRef;

/// Outcome of checking a new registry block against the last processed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCheck {
    /// New state; deposits at or after `live_from_block` count as live.
    Process { live_from_block: u64 },
    /// Same block hash as the last processed cycle.
    AlreadyProcessed,
    /// The registry reports a block older than the last processed one.
    Stale { last_processed: u64 },
}

/// Last processed block reference.
#[derive(Debug, Default)]
pub struct BlockGuard {
    last: Option<BlockRef>,
    /// Earliest live window start of cycles that did not finish.
    unfinished_live_from: Option<u64>,
}

impl BlockGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&self, block: &BlockRef) -> BlockCheck {
        match self.check_last(block) {
            BlockCheck::Process { live_from_block } => BlockCheck::Process {
                live_from_block: self
                    .unfinished_live_from
                    .map_or(live_from_block, |start| start.min(live_from_block)),
            },
            other => other,
        }
    }

    fn check_last(&self, block: &BlockRef) -> BlockCheck {
        match self.last {
            None => BlockCheck::Process {
                live_from_block: block.number,
            },
            Some(last) if block.number < last.number => BlockCheck::Stale {
                last_processed: last.number,
            },
            Some(last) if last.hash == block.hash => BlockCheck::AlreadyProcessed,
            Some(last) => BlockCheck::Process {
                live_from_block: (last.number + 1).min(block.number),
            },
        }
    }

    pub fn mark_processed(&mut self, block: BlockRef) {
        self.last = Some(block);
        self.unfinished_live_from = None;
    }

    /// Record a cycle that started at `live_from_block` but did not finish.
    pub fn mark_unfinished(&mut self, live_from_block: u64) {
        self.unfinished_live_from = Some(
            self.unfinished_live_from
                .map_or(live_from_block, |start| start.min(live_from_block)),
        );
    }

    pub fn last_processed(&self) -> Option<BlockRef> {
        self.last
    }
}
