pub mod manager;

pub use manager::{BackupError, BackupManager, BackupRecord};
