//! Hand-off to the atmospherics solver

use std::collections::VecDeque;
use std::time::Duration;

use hashbrown::HashSet;

use crate::grid::Tile;

/// Receives tiles that need gas re-evaluation this frame
pub trait AtmosSolver {
    fn update_at(&mut self, tile: Tile);
}

/// Per-frame data handed to `tick` by the host scheduler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameContext {
    pub frame: u64,
    pub delta: Duration,
}

impl FrameContext {
    pub const fn new(frame: u64, delta: Duration) -> Self {
        Self { frame, delta }
    }
}

/// Deduplicating FIFO of tiles waiting for the solver
#[derive(Debug, Clone, Default)]
pub struct UpdateList {
    queue: VecDeque<Tile>,
    queued: HashSet<Tile>,
}

impl UpdateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn contains(&self, tile: Tile) -> bool {
        self.queued.contains(&tile)
    }

    pub fn pop(&mut self) -> Option<Tile> {
        let tile = self.queue.pop_front()?;
        self.queued.remove(&tile);
        Some(tile)
    }

    /// Take everything queued, in arrival order
    pub fn drain(&mut self) -> Vec<Tile> {
        self.queued.clear();
        self.queue.drain(..).collect()
    }
}

impl AtmosSolver for UpdateList {
    fn update_at(&mut self, tile: Tile) {
        if self.queued.insert(tile) {
            self.queue.push_back(tile);
        }
    }
}
