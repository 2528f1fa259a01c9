use std::fmt;

use serde::Deserialize;
use vault_core::ProgressState;

use crate::resolve::Strategy;

pub type ItemId = String;

/// One file eligible for export, as listed by the file browser.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SelectableItem {
    pub id: ItemId,
    /// Display name; may lack an extension.
    pub name: String,
    pub media_type: String,
    /// Best-effort byte size; may be stale.
    #[serde(default)]
    pub size: Option<u64>,
    /// Direct (CDN) locator for the primary remote copy.
    #[serde(default)]
    pub url: Option<String>,
    /// Product identifier; required for watermark rendering.
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl SelectableItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            media_type: media_type.into(),
            size: None,
            url: None,
            fingerprint: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn is_image(&self) -> bool {
        essence(&self.media_type).starts_with("image/")
    }

    pub fn direct_url(&self) -> Option<&str> {
        self.url.as_deref().map(str::trim).filter(|u| !u.is_empty())
    }

    pub fn fingerprint(&self) -> Option<&str> {
        self.fingerprint.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

/// Lowercased media type without parameters (`image/png; q=1` -> `image/png`).
pub(crate) fn essence(media_type: &str) -> String {
    media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryContent {
    Text(String),
    Binary(Vec<u8>),
}

impl EntryContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            EntryContent::Text(text) => text.as_bytes(),
            EntryContent::Binary(bytes) => bytes,
        }
    }
}

/// A locally generated file injected into every archive of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticEntry {
    pub name: String,
    pub content: EntryContent,
}

impl SyntheticEntry {
    pub fn text(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: EntryContent::Text(content.into()),
        }
    }

    pub fn binary(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content: EntryContent::Binary(content),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportKind {
    /// A user selection from the file browser.
    #[default]
    Selection,
    /// Full-account data export; always uses a fixed archive name.
    AccountData,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub watermark: bool,
    pub synthetic_entries: Vec<SyntheticEntry>,
    pub kind: ExportKind,
}

impl ExportOptions {
    pub fn push_synthetic(&mut self, entry: SyntheticEntry) {
        self.synthetic_entries.push(entry);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct TransferError {
    pub kind: FailureKind,
    pub message: String,
}

impl TransferError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(FailureKind::Cancelled, "export stopped")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Network,
    NotFound,
    Unauthorized,
    Unknown,
    Cancelled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network error"),
            FailureKind::NotFound => write!(f, "not found"),
            FailureKind::Unauthorized => write!(f, "unauthorized"),
            FailureKind::Unknown => write!(f, "unknown error"),
            FailureKind::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedAttempt {
    pub strategy: Strategy,
    pub error: TransferError,
}

/// An item whose whole fallback chain failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    pub item_id: ItemId,
    pub name: String,
    pub attempts: Vec<FailedAttempt>,
}

impl ItemFailure {
    /// The failure of the last strategy tried.
    pub fn reason(&self) -> Option<&TransferError> {
        self.attempts.last().map(|attempt| &attempt.error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobTally {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub archive_name: String,
    pub archive: Vec<u8>,
    /// Stored entry names in insertion order.
    pub entries: Vec<String>,
    pub tally: JobTally,
    pub failures: Vec<ItemFailure>,
    /// Whether the archive was handed to the saver.
    pub offered: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Added { entry_name: String, via: Strategy },
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportEvent {
    Progress(ProgressState),
    Fallback {
        item_id: ItemId,
        failed: Strategy,
        error: TransferError,
        next: Strategy,
    },
    ItemSettled {
        item_id: ItemId,
        outcome: ItemOutcome,
    },
}
