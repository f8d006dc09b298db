use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;

/// Observer of reconciliation progress. Implementations must not affect outcomes.
pub trait ProgressSink: Send + Sync {
    /// A chunk of `len` rows was handed to a worker
    fn start_chunk(&self, chunk: usize, len: usize);

    /// One row of `chunk` was processed
    fn increment(&self, chunk: usize);

    /// All workers have finished
    fn finish(&self);
}

/// Discards all progress events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn start_chunk(&self, _chunk: usize, _len: usize) {}
    fn increment(&self, _chunk: usize) {}
    fn finish(&self) {}
}

/// One progress bar per worker chunk, stacked in a terminal multi-bar
pub struct ChunkProgress {
    multi_progress: MultiProgress,
    bars: Mutex<Vec<ProgressBar>>,
    style: ProgressStyle,
}

impl ChunkProgress {
    pub fn new() -> Self {
        Self::with_draw_target(ProgressDrawTarget::stderr())
    }

    /// Bars that are tracked but never drawn
    pub fn hidden() -> Self {
        Self::with_draw_target(ProgressDrawTarget::hidden())
    }

    fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let style = ProgressStyle::default_bar()
            .template("{prefix:>10} {wide_bar} {pos}/{len} ({percent}%) | {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ ");

        Self {
            multi_progress: MultiProgress::with_draw_target(target),
            bars: Mutex::new(Vec::new()),
            style,
        }
    }

    /// Current position of each chunk's bar
    pub fn positions(&self) -> Vec<u64> {
        match self.bars.lock() {
            Ok(bars) => bars.iter().map(ProgressBar::position).collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Default for ChunkProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ChunkProgress {
    fn start_chunk(&self, chunk: usize, len: usize) {
        let bar = self.multi_progress.add(ProgressBar::new(len as u64));
        bar.set_style(self.style.clone());
        bar.set_prefix(format!("worker {}", chunk + 1));

        if let Ok(mut bars) = self.bars.lock() {
            if bars.len() <= chunk {
                bars.resize_with(chunk + 1, ProgressBar::hidden);
            }
            bars[chunk] = bar;
        }
    }

    fn increment(&self, chunk: usize) {
        if let Ok(bars) = self.bars.lock() {
            if let Some(bar) = bars.get(chunk) {
                bar.inc(1);
            }
        }
    }

    fn finish(&self) {
        if let Ok(bars) = self.bars.lock() {
            for bar in bars.iter() {
                bar.finish();
            }
        }
    }
}
