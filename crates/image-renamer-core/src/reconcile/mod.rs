//! Reconciliation of manifest rows against the image index.
//!
//! Unique rows are split into contiguous chunks and each chunk is resolved
//! by its own worker thread. Workers share the index and duplicate table
//! read-only and report every row's [`Outcome`] over a channel; the
//! coordinator drains that channel, drives progress, then joins every worker
//! before anything is aggregated.

mod chunking;
mod worker;

pub use chunking::split_into_chunks;
pub use worker::{resolve_row, run_worker, FileResolver, RowResolver, WorkerInput, WorkerMessage};

use crossbeam::channel;
use log::info;
use rayon::prelude::*;
use std::any::Any;
use std::collections::HashSet;
use std::path::Path;
use std::thread;

use crate::discovery::ImageIndex;
use crate::duplicates::DuplicateTable;
use crate::error::{Error, Result};
use crate::progress::ProgressSink;
use crate::types::{ImageRecord, ManifestRow, Outcome};

/// Outcomes of a reconciliation, grouped by chunk in worker order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub chunks: Vec<Vec<Outcome>>,
}

impl Reconciliation {
    /// All outcomes, chunk by chunk
    pub fn outcomes(&self) -> impl Iterator<Item = &Outcome> {
        self.chunks.iter().flatten()
    }

    /// Images consumed by a manifest row, renamed or not
    pub fn used_images(&self) -> Vec<&ImageRecord> {
        self.outcomes().filter_map(Outcome::used_image).collect()
    }

    /// Image names the manifest referenced but the index lacked
    pub fn unmatched_images(&self) -> Vec<&str> {
        self.outcomes()
            .filter_map(|outcome| match outcome {
                Outcome::NotFound { image_name } => Some(image_name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn renamed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Renamed { .. }))
    }

    pub fn copies(&self) -> usize {
        self.outcomes()
            .map(|outcome| match outcome {
                Outcome::Renamed { copies, .. } => *copies,
                _ => 0,
            })
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    fn count(&self, predicate: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes().filter(|o| predicate(o)).count()
    }
}

/// Resolve `rows` on `workers` threads and collect every outcome.
///
/// Per-row problems are part of the returned outcomes; an error means a
/// worker could not be started or terminated abnormally.
pub fn reconcile(
    rows: &[ManifestRow],
    index: &ImageIndex,
    duplicates: &DuplicateTable,
    workers: usize,
    dry_run: bool,
    progress: &dyn ProgressSink,
) -> Result<Reconciliation> {
    info!(
        "Reconciling {} rows against {} images",
        rows.len(),
        index.len()
    );
    let resolver = FileResolver {
        index,
        duplicates,
        dry_run,
    };
    reconcile_with(rows, workers, &resolver, progress)
}

/// Resolve `rows` with `resolver` on `workers` threads, in chunk order.
pub fn reconcile_with(
    rows: &[ManifestRow],
    workers: usize,
    resolver: &dyn RowResolver,
    progress: &dyn ProgressSink,
) -> Result<Reconciliation> {
    let chunks = split_into_chunks(rows, workers);
    info!("Dispatching {} chunks", chunks.len());

    let mut outcomes: Vec<Vec<Outcome>> = chunks
        .iter()
        .map(|rows| Vec::with_capacity(rows.len()))
        .collect();
    for (chunk, rows) in chunks.iter().enumerate() {
        progress.start_chunk(chunk, rows.len());
    }

    let (sender, receiver) = channel::unbounded::<WorkerMessage>();

    let joined = thread::scope(|scope| -> Result<Vec<thread::Result<Result<usize>>>> {
        let mut handles = Vec::with_capacity(chunks.len());
        for (chunk, rows) in chunks.iter().copied().enumerate() {
            let input = WorkerInput {
                chunk,
                rows,
                resolver,
            };
            let sender = sender.clone();
            let handle = thread::Builder::new()
                .name(format!("rename-worker-{}", chunk + 1))
                .spawn_scoped(scope, move || run_worker(input, &sender))?;
            handles.push(handle);
        }

        // Only the workers hold senders now, so the loop ends once all have exited
        drop(sender);
        for message in receiver.iter() {
            progress.increment(message.chunk);
            outcomes[message.chunk].push(message.outcome);
        }

        Ok(handles.into_iter().map(|handle| handle.join()).collect())
    });
    progress.finish();

    for (chunk, result) in joined?.into_iter().enumerate() {
        match result {
            Ok(Ok(processed)) => {
                info!("Worker {} processed {} rows", chunk + 1, processed);
            }
            Ok(Err(e)) => return Err(e),
            Err(panic) => {
                return Err(Error::Worker(format!(
                    "worker {} panicked: {}",
                    chunk + 1,
                    panic_message(panic.as_ref())
                )));
            }
        }
    }

    Ok(Reconciliation { chunks: outcomes })
}

/// Images in the index that no row consumed, in index order
pub fn leftover_images<'a>(index: &'a ImageIndex, used: &[&ImageRecord]) -> Vec<&'a ImageRecord> {
    let used: HashSet<&Path> = used.iter().map(|image| image.full_path.as_path()).collect();

    index
        .records()
        .par_iter()
        .filter(|image| !used.contains(image.full_path.as_path()))
        .collect()
}

/// Extract a readable message from a panic payload
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
