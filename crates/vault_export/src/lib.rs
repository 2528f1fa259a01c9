//! Vault export engine: fetches a selection of stored files through a fallback
//! chain of sources and packs them into one zip archive.
mod archive;
mod filename;
mod job;
mod persist;
mod progress;
mod resolve;
mod settings;
mod transfer;
mod types;

pub use archive::{ArchiveAssembler, ArchiveError};
pub use filename::{
    archive_filename, entry_name, extension_for_media_type, sanitize_name, MediaCategory,
};
pub use job::{ExportError, ExportJob, StopHandle};
pub use persist::{ensure_output_dir, ArchiveSaver, AtomicFileWriter, DirectorySaver, PersistError};
pub use progress::{ChannelSink, ExportSink, NullSink, ProgressSimulator};
pub use resolve::{resolve_strategies, Strategy};
pub use settings::ExportSettings;
pub use transfer::{LicenseSource, ReqwestTransfer, Transfer, LICENCE_FILENAME};
pub use types::{
    EntryContent, ExportEvent, ExportKind, ExportOptions, ExportReport, FailedAttempt,
    FailureKind, ItemFailure, ItemId, ItemOutcome, JobTally, SelectableItem, SyntheticEntry,
    TransferError,
};
pub use vault_core::{JobPhase, ProgressState, ProgressStats, ProgressView};
