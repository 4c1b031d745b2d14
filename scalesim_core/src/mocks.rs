//! Test and helper mocks for scalesim_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use scalesim_traits::LineSink;

use crate::planner::Jitter;

/// A sink that records every line in memory. Clones share the same buffer,
/// so a clone kept by the test observes lines written by the transmit thread.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything written so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn line_count(&self) -> usize {
        self.lines.lock().map(|g| g.len()).unwrap_or(0)
    }
}

impl LineSink for MemorySink {
    fn write_line(
        &mut self,
        line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut lines = self
            .lines
            .lock()
            .map_err(|_| std::io::Error::other("memory sink poisoned"))?;
        lines.push(line.to_string());
        Ok(())
    }
}

/// A sink that fails every write; useful for exercising the transmitter's
/// fatal-fault path.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingSink;

impl LineSink for FailingSink {
    fn write_line(
        &mut self,
        _line: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Err(Box::new(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "failing sink",
        )))
    }
}

/// Scripted jitter: returns the queued picks in order, clamped into the
/// requested range; falls back to the lower bound when the script runs dry.
#[derive(Debug, Default)]
pub struct FixedJitter {
    picks: VecDeque<u64>,
}

impl FixedJitter {
    pub fn new(picks: impl IntoIterator<Item = u64>) -> Self {
        Self {
            picks: picks.into_iter().collect(),
        }
    }
}

impl Jitter for FixedJitter {
    fn pick(&mut self, lo: u64, hi: u64) -> u64 {
        debug_assert!(lo < hi);
        match self.picks.pop_front() {
            Some(v) => v.clamp(lo, hi - 1),
            None => lo,
        }
    }
}
