use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use vault_logging::{vault_debug, vault_error, vault_info, vault_warn};

use crate::archive::{ArchiveAssembler, ArchiveError};
use crate::filename::{archive_filename, entry_name};
use crate::progress::{ExportSink, ProgressSimulator};
use crate::resolve::{resolve_strategies, Strategy};
use crate::{
    ArchiveSaver, ExportEvent, ExportOptions, ExportReport, ExportSettings, FailedAttempt,
    FailureKind, ItemFailure, ItemOutcome, JobTally, SelectableItem, Transfer, TransferError,
};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: the selection is empty and no extra files were requested")]
    EmptySelection,
    #[error("could not build archive: {0}")]
    Assembly(#[from] ArchiveError),
    #[error("export stopped")]
    Cancelled,
}

/// Stops a running job from another task.
///
/// Outstanding transfers are aborted and the progress record returns to idle.
#[derive(Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
    progress: Arc<ProgressSimulator>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.cancel.cancel();
        self.progress.reset();
    }
}

struct Fetched {
    bytes: Vec<u8>,
    via: Strategy,
}

/// One export run over a frozen selection.
pub struct ExportJob {
    transfer: Arc<dyn Transfer>,
    saver: Arc<dyn ArchiveSaver>,
    sink: Arc<dyn ExportSink>,
    progress: Arc<ProgressSimulator>,
    cancel: CancellationToken,
    concurrency: usize,
    compression_level: i32,
}

impl ExportJob {
    pub fn new(
        settings: &ExportSettings,
        transfer: Arc<dyn Transfer>,
        saver: Arc<dyn ArchiveSaver>,
        sink: Arc<dyn ExportSink>,
    ) -> Self {
        let progress = Arc::new(ProgressSimulator::new(
            settings.progress_ceiling,
            settings.tick_interval(),
            Arc::clone(&sink),
        ));
        Self {
            transfer,
            saver,
            sink,
            progress,
            cancel: CancellationToken::new(),
            concurrency: settings.concurrency(),
            compression_level: settings.deflate_level(),
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
            progress: Arc::clone(&self.progress),
        }
    }

    pub fn progress(&self) -> Arc<ProgressSimulator> {
        Arc::clone(&self.progress)
    }

    /// Token cancelled by [`StopHandle::stop`]; lets callers tie preparatory
    /// requests (such as the licence fetch) to the job's lifetime.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetches every item, packs successes plus the synthetic entries into one
    /// archive and offers it to the saver.
    ///
    /// Per-item failures never fail the job; they are returned in the report.
    pub async fn run(
        self,
        items: Vec<SelectableItem>,
        options: ExportOptions,
    ) -> Result<ExportReport, ExportError> {
        if self.cancel.is_cancelled() {
            vault_warn!("Export stopped before it started");
            return Err(ExportError::Cancelled);
        }
        if items.is_empty() && options.synthetic_entries.is_empty() {
            let err = ExportError::EmptySelection;
            vault_error!("Export rejected: {}", err);
            self.progress.fail(err.to_string());
            return Err(err);
        }

        let total = items.len();
        let archive_name = archive_filename(&items, options.kind);
        vault_info!(
            "Export started: {} items, watermark={}, archive={}",
            total,
            options.watermark,
            archive_name
        );
        self.progress.start("Preparing download", size_hint(&items));
        self.progress.update_stats(0, total);

        let semaphore = Semaphore::new(self.concurrency);
        let mut pending: FuturesUnordered<_> = items
            .iter()
            .map(|item| self.settle_item(item, options.watermark, &semaphore))
            .collect();

        let mut assembler = ArchiveAssembler::new(self.compression_level);
        let mut tally = JobTally::default();
        let mut failures = Vec::new();

        while let Some((item, result)) = pending.next().await {
            tally.attempted += 1;
            let outcome = match result {
                Ok(fetched) => {
                    let stored = match assembler.add_entry(&entry_name(item), &fetched.bytes) {
                        Ok(stored) => stored,
                        Err(err) => return Err(self.fail(ExportError::Assembly(err))),
                    };
                    vault_debug!(
                        "Added {} ({} bytes) via {}",
                        stored,
                        fetched.bytes.len(),
                        fetched.via
                    );
                    tally.succeeded += 1;
                    self.progress.update_label(format!("Added {stored}"));
                    ItemOutcome::Added {
                        entry_name: stored,
                        via: fetched.via,
                    }
                }
                Err(attempts) => {
                    tally.failed += 1;
                    let failure = ItemFailure {
                        item_id: item.id.clone(),
                        name: item.name.clone(),
                        attempts,
                    };
                    if let Some(reason) = failure.reason() {
                        vault_warn!("Item {} ({}) skipped: {}", item.id, item.name, reason);
                    }
                    self.progress.update_label(format!("Skipped {}", item.name));
                    failures.push(failure);
                    ItemOutcome::Failed
                }
            };
            self.sink.emit(ExportEvent::ItemSettled {
                item_id: item.id.clone(),
                outcome,
            });
            self.progress.update_stats(tally.attempted, total);
        }
        drop(pending);

        if self.cancel.is_cancelled() {
            vault_warn!(
                "Export stopped after {} of {} items; archive discarded",
                tally.attempted,
                total
            );
            return Err(ExportError::Cancelled);
        }

        self.progress.update_label("Finalizing archive");
        for entry in &options.synthetic_entries {
            if let Err(err) = assembler.add_synthetic_entry(entry) {
                return Err(self.fail(ExportError::Assembly(err)));
            }
        }
        let entries = assembler.entries().to_vec();
        let offered = !assembler.is_empty();
        let archive = match assembler.finalize() {
            Ok(archive) => archive,
            Err(err) => return Err(self.fail(ExportError::Assembly(err))),
        };

        // A stop may land while the archive is being finalized.
        if self.cancel.is_cancelled() {
            vault_warn!("Export stopped while finalizing; archive discarded");
            return Err(ExportError::Cancelled);
        }
        self.progress.complete();

        if offered {
            self.saver.offer(&archive_name, &archive);
        } else {
            vault_warn!("Export produced an empty archive; nothing offered");
        }
        vault_info!(
            "Export finished: {} added, {} failed, {} entries, {} bytes",
            tally.succeeded,
            tally.failed,
            entries.len(),
            archive.len()
        );

        Ok(ExportReport {
            archive_name,
            archive,
            entries,
            tally,
            failures,
            offered,
        })
    }

    async fn settle_item<'a>(
        &self,
        item: &'a SelectableItem,
        watermark: bool,
        semaphore: &Semaphore,
    ) -> (&'a SelectableItem, Result<Fetched, Vec<FailedAttempt>>) {
        let strategies = resolve_strategies(item, watermark);
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            permit = semaphore.acquire() => permit.ok(),
        };
        if permit.is_none() {
            let attempts = strategies
                .into_iter()
                .take(1)
                .map(|strategy| FailedAttempt {
                    strategy,
                    error: TransferError::cancelled(),
                })
                .collect();
            return (item, Err(attempts));
        }
        (item, self.fetch_with_fallback(item, strategies).await)
    }

    /// Walks the fallback chain until one strategy yields bytes.
    async fn fetch_with_fallback(
        &self,
        item: &SelectableItem,
        strategies: Vec<Strategy>,
    ) -> Result<Fetched, Vec<FailedAttempt>> {
        let mut attempts = Vec::new();
        let mut chain = strategies.into_iter().peekable();
        while let Some(strategy) = chain.next() {
            match self.transfer.fetch(&strategy, &self.cancel).await {
                Ok(bytes) => {
                    return Ok(Fetched {
                        bytes,
                        via: strategy,
                    })
                }
                Err(error) => {
                    let cancelled = error.kind == FailureKind::Cancelled;
                    if let (false, Some(next)) = (cancelled, chain.peek()) {
                        vault_warn!(
                            "Item {} via {} failed ({}); falling back to {}",
                            item.id,
                            strategy,
                            error,
                            next
                        );
                        self.sink.emit(ExportEvent::Fallback {
                            item_id: item.id.clone(),
                            failed: strategy.clone(),
                            error: error.clone(),
                            next: next.clone(),
                        });
                    }
                    attempts.push(FailedAttempt { strategy, error });
                    if cancelled {
                        break;
                    }
                }
            }
        }
        Err(attempts)
    }

    fn fail(&self, err: ExportError) -> ExportError {
        vault_error!("Export failed: {}", err);
        self.progress.fail(err.to_string());
        err
    }
}

/// Sum of the known item sizes, if any are known.
fn size_hint(items: &[SelectableItem]) -> Option<u64> {
    items
        .iter()
        .filter_map(|item| item.size)
        .fold(None, |acc, size| Some(acc.unwrap_or(0) + size))
}
