use std::sync::Mutex;

use vault_export::{ExportEvent, ExportReport, ExportSink, ItemOutcome, ProgressView};
use vault_logging::vault_warn;

/// Prints a progress line whenever the visible percentage, label or counter changes.
#[derive(Default)]
pub struct TerminalSink {
    last: Mutex<Option<ProgressView>>,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExportSink for TerminalSink {
    fn emit(&self, event: ExportEvent) {
        match event {
            ExportEvent::Progress(state) => {
                let view = ProgressView::from(&state);
                let mut last = match self.last.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                if last.as_ref() == Some(&view) {
                    return;
                }
                println!("{}", progress_line(&view));
                *last = Some(view);
            }
            ExportEvent::Fallback {
                item_id, error, next, ..
            } => {
                vault_warn!("{}: {}; trying {}", item_id, error, next);
            }
            ExportEvent::ItemSettled {
                item_id,
                outcome: ItemOutcome::Failed,
            } => {
                vault_warn!("{} could not be fetched", item_id);
            }
            ExportEvent::ItemSettled { .. } => {}
        }
    }
}

pub fn progress_line(view: &ProgressView) -> String {
    let mut line = format!("[{:>3}%]", view.percent);
    if let Some(counter) = &view.counter {
        line.push(' ');
        line.push_str(counter);
    }
    if !view.label.is_empty() {
        line.push(' ');
        line.push_str(&view.label);
    }
    if let Some(error) = &view.error {
        line.push_str(" error: ");
        line.push_str(error);
    }
    line
}

pub fn summary(report: &ExportReport) -> String {
    let mut text = format!(
        "{}: {} of {} files added, {} entries, {} bytes",
        report.archive_name,
        report.tally.succeeded,
        report.tally.attempted,
        report.entries.len(),
        report.archive.len()
    );
    for failure in &report.failures {
        let reason = failure
            .reason()
            .map(ToString::to_string)
            .unwrap_or_else(|| "no source available".to_string());
        text.push_str(&format!("\n  failed: {} ({}): {}", failure.name, failure.item_id, reason));
    }
    text
}
