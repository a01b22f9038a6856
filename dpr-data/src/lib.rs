//! File-facing edge of the DPR wizard: layout configuration, asset import,
//! snapshots and payload output.

pub mod asset_import;
pub mod layout_config;
pub mod logging;
pub mod snapshot;

pub use asset_import::{AssetImportError, AssetRecord};
pub use layout_config::LayoutConfigError;
pub use snapshot::{PayloadWriter, SnapshotError, SnapshotWriter};
