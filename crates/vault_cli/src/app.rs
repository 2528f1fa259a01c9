use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use vault_export::{
    DirectorySaver, ExportJob, ExportKind, ExportOptions, LicenseSource, ReqwestTransfer,
    SyntheticEntry,
};
use vault_logging::{vault_info, vault_warn};

use crate::cli::Cli;
use crate::{config, render};

pub async fn run(cli: Cli) -> Result<()> {
    let mut settings = config::load_settings(cli.config.as_deref())?;
    config::apply_overrides(&mut settings, cli.api_url, cli.token, cli.max_concurrent);

    let items = match cli.selection.as_deref() {
        Some(path) => config::load_selection(path)?,
        None => Vec::new(),
    };
    let transfer = Arc::new(ReqwestTransfer::new(&settings).context("building http client")?);

    let mut options = ExportOptions {
        watermark: cli.watermark,
        kind: if cli.account_data {
            ExportKind::AccountData
        } else {
            ExportKind::Selection
        },
        ..ExportOptions::default()
    };
    let job = ExportJob::new(
        &settings,
        transfer.clone(),
        Arc::new(DirectorySaver::new(cli.out.clone())),
        Arc::new(render::TerminalSink::new()),
    );
    let stop = job.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            vault_warn!("Interrupted; stopping export");
            stop.stop();
        }
    });

    if cli.licence {
        if let Some(entry) = fetch_licence(transfer.as_ref(), &job.cancellation()).await {
            options.push_synthetic(entry);
        }
    }
    for (name, path) in cli.extras {
        let bytes =
            fs::read(&path).with_context(|| format!("reading extra file {}", path.display()))?;
        options.push_synthetic(SyntheticEntry::binary(name, bytes));
    }

    let result = job.run(items, options).await;

    let report = result?;
    println!("{}", render::summary(&report));
    if report.offered {
        vault_info!("Archive written to {:?}", cli.out.join(&report.archive_name));
    }
    Ok(())
}

/// Fetches the licence text, or `None` when it is unavailable or the export was
/// stopped first.
async fn fetch_licence(
    source: &dyn LicenseSource,
    cancel: &CancellationToken,
) -> Option<SyntheticEntry> {
    match source.licence_entry(cancel).await {
        Ok(entry) => Some(entry),
        Err(err) => {
            vault_warn!("Licence text unavailable, exporting without it: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use vault_export::TransferError;

    use super::*;

    /// Never answers until the token is cancelled.
    struct HangingLicence;

    #[async_trait::async_trait]
    impl LicenseSource for HangingLicence {
        async fn licence_entry(
            &self,
            cancel: &CancellationToken,
        ) -> Result<SyntheticEntry, TransferError> {
            cancel.cancelled().await;
            Err(TransferError::cancelled())
        }
    }

    #[tokio::test]
    async fn licence_fetch_honours_stop() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let entry = tokio::time::timeout(
            Duration::from_secs(5),
            fetch_licence(&HangingLicence, &cancel),
        )
        .await
        .expect("licence fetch ignored the stop");

        assert!(entry.is_none());
    }
}
