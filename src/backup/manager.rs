use chrono::{Local, NaiveDateTime};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::BackupConfig;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%6f";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Backup directory not found")]
    DirectoryNotFound,

    #[error("Backup not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a backup file: {0}")]
    UnrecognisedName(String),

    #[error("Backup I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One snapshot in the backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    pub original_path: PathBuf,
    pub backup_path: PathBuf,
    pub timestamp: NaiveDateTime,
    pub size: u64,
}

impl BackupRecord {
    /// Recover the record from a backup file's name
    ///
    /// Names look like `<encoded original path>.<timestamp>`.
    fn from_backup_path(backup_path: &Path) -> Option<Self> {
        let name = backup_path.file_name()?.to_str()?;
        let (encoded, stamp) = name.rsplit_once('.')?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        let size = fs::metadata(backup_path).ok()?.len();

        Some(Self {
            original_path: PathBuf::from(decode_path(encoded)),
            backup_path: backup_path.to_path_buf(),
            timestamp,
            size,
        })
    }
}

/// Snapshots files before a command modifies them
pub struct BackupManager {
    backup_dir: PathBuf,
}

impl BackupManager {
    /// Create a BackupManager with the default directory
    pub fn new() -> Result<Self, BackupError> {
        Ok(Self::with_dir(Self::default_backup_dir()?))
    }

    /// Create a BackupManager storing snapshots in `dir`
    ///
    /// The directory is created lazily on the first backup.
    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            backup_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Honour `backup.directory` when the config sets one
    pub fn from_config(config: &BackupConfig) -> Result<Self, BackupError> {
        match &config.directory {
            Some(dir) => Ok(Self::with_dir(shellexpand::tilde(&dir.to_string_lossy()).into_owned())),
            None => Self::new(),
        }
    }

    /// ~/.local/share/shellwarden/backups
    fn default_backup_dir() -> Result<PathBuf, BackupError> {
        let home = std::env::var("HOME").map_err(|_| BackupError::DirectoryNotFound)?;

        Ok(PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("shellwarden")
            .join("backups"))
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Snapshot `file_path`, returning `None` when there is nothing to back up
    ///
    /// The copy is staged in a temporary file inside the backup directory and
    /// renamed into place once complete, so an interrupted backup never shows
    /// up in `list_backups`.
    pub fn create_backup(&self, file_path: &str) -> Result<Option<BackupRecord>, BackupError> {
        let source = PathBuf::from(shellexpand::tilde(file_path).into_owned());
        if !source.is_file() {
            tracing::debug!(path = %source.display(), "nothing to back up");
            return Ok(None);
        }
        let source = fs::canonicalize(&source)?;

        fs::create_dir_all(&self.backup_dir)?;

        let timestamp = Local::now().naive_local();
        let name = format!(
            "{}.{}",
            encode_path(&source.to_string_lossy()),
            timestamp.format(TIMESTAMP_FORMAT)
        );
        let backup_path = self.backup_dir.join(name);

        copy_atomically(&source, &self.backup_dir, &backup_path, false)?;

        tracing::info!(
            source = %source.display(),
            backup = %backup_path.display(),
            "created backup"
        );

        BackupRecord::from_backup_path(&backup_path)
            .map(Some)
            .ok_or_else(|| BackupError::UnrecognisedName(backup_path.display().to_string()))
    }

    /// List backups, newest first, optionally only those of `original`
    pub fn list_backups(&self, original: Option<&Path>) -> Result<Vec<BackupRecord>, BackupError> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            let Some(record) = BackupRecord::from_backup_path(&path) else {
                continue;
            };
            if original.is_none_or(|wanted| record.original_path == wanted) {
                records.push(record);
            }
        }

        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Copy a backup back over its original, or over `target` when given
    ///
    /// An existing target is backed up first so a restore can itself be
    /// undone. Returns the path that was written.
    pub fn restore_backup(&self, backup_path: &Path, target: Option<&Path>) -> Result<PathBuf, BackupError> {
        if !backup_path.is_file() {
            return Err(BackupError::NotFound(backup_path.to_path_buf()));
        }

        let target = match target {
            Some(path) => PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned()),
            None => {
                BackupRecord::from_backup_path(backup_path)
                    .ok_or_else(|| {
                        BackupError::UnrecognisedName(backup_path.display().to_string())
                    })?
                    .original_path
            }
        };

        if target.is_file() {
            self.create_backup(&target.to_string_lossy())?;
        }

        let parent = match target.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)?;
        copy_atomically(backup_path, &parent, &target, true)?;

        tracing::info!(
            backup = %backup_path.display(),
            target = %target.display(),
            "restored backup"
        );

        Ok(target)
    }
}

/// Copy `source` to `dest` through a temp file in `staging_dir`
///
/// Without `overwrite`, an existing `dest` is an error rather than replaced.
fn copy_atomically(source: &Path, staging_dir: &Path, dest: &Path, overwrite: bool) -> Result<(), BackupError> {
    let mut staged = NamedTempFile::new_in(staging_dir)?;
    let mut reader = File::open(source)?;
    io::copy(&mut reader, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    fs::set_permissions(staged.path(), fs::metadata(source)?.permissions())?;
    let persisted = if overwrite {
        staged.persist(dest)
    } else {
        staged.persist_noclobber(dest)
    };
    persisted.map_err(|e| BackupError::Io(e.error))?;
    Ok(())
}

/// Flatten a path into one file name; reversed by `decode_path`
fn encode_path(path: &str) -> String {
    path.replace('%', "%25").replace('_', "%5F").replace('/', "_")
}

fn decode_path(encoded: &str) -> String {
    encoded.replace('_', "/").replace("%5F", "_").replace("%25", "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, BackupManager, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let manager = BackupManager::with_dir(temp_dir.path().join("backups"));
        let work = temp_dir.path().join("work");
        fs::create_dir_all(&work).unwrap();
        (temp_dir, manager, fs::canonicalize(work).unwrap())
    }

    #[test]
    fn test_encode_decode_path() {
        for path in ["/etc/hosts", "/home/me/my_file.conf", "/tmp/100%_done", "/a/%5F_b"] {
            assert_eq!(decode_path(&encode_path(path)), path);
        }
        assert_eq!(encode_path("/etc/nginx/nginx.conf"), "_etc_nginx_nginx.conf");
    }

    #[test]
    fn test_create_backup() {
        let (_temp, manager, work) = setup();
        let file = work.join("app_settings.conf");
        fs::write(&file, "port = 8080\n").unwrap();

        let record = manager.create_backup(&file.to_string_lossy()).unwrap().unwrap();
        assert_eq!(record.original_path, file);
        assert!(record.backup_path.starts_with(manager.backup_dir()));
        assert_eq!(record.size, 12);
        assert_eq!(fs::read_to_string(&record.backup_path).unwrap(), "port = 8080\n");
    }

    #[test]
    fn test_create_backup_missing_file() {
        let (_temp, manager, work) = setup();
        let result = manager.create_backup(&work.join("absent").to_string_lossy()).unwrap();
        assert!(result.is_none());
        assert!(!manager.backup_dir().exists());
    }

    #[test]
    fn test_create_backup_leaves_no_temp_files() {
        let (_temp, manager, work) = setup();
        let file = work.join("hosts");
        fs::write(&file, "127.0.0.1 localhost\n").unwrap();
        manager.create_backup(&file.to_string_lossy()).unwrap();

        let entries: Vec<_> = fs::read_dir(manager.backup_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (_temp, manager, work) = setup();
        let file = work.join("config.yml");
        fs::write(&file, "a: 1\n").unwrap();
        let first = manager.create_backup(&file.to_string_lossy()).unwrap().unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        fs::write(&file, "a: 2\n").unwrap();
        let second = manager.create_backup(&file.to_string_lossy()).unwrap().unwrap();

        let records = manager.list_backups(None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], second);
        assert_eq!(records[1], first);
    }

    #[test]
    fn test_list_backups_filter_and_ignore_stray_files() {
        let (_temp, manager, work) = setup();
        let a = work.join("a.conf");
        let b = work.join("b.conf");
        fs::write(&a, "a").unwrap();
        fs::write(&b, "b").unwrap();
        manager.create_backup(&a.to_string_lossy()).unwrap();
        manager.create_backup(&b.to_string_lossy()).unwrap();
        fs::write(manager.backup_dir().join("README"), "not a backup").unwrap();

        let only_a = manager.list_backups(Some(a.as_path())).unwrap();
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].original_path, a);
        assert_eq!(manager.list_backups(None).unwrap().len(), 2);
    }

    #[test]
    fn test_list_backups_without_directory() {
        let (_temp, manager, _work) = setup();
        assert!(manager.list_backups(None).unwrap().is_empty());
    }

    #[test]
    fn test_restore_to_original_location() {
        let (_temp, manager, work) = setup();
        let file = work.join("nginx.conf");
        fs::write(&file, "original").unwrap();
        let record = manager.create_backup(&file.to_string_lossy()).unwrap().unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));
        fs::write(&file, "broken").unwrap();
        let restored = manager.restore_backup(&record.backup_path, None).unwrap();

        assert_eq!(restored, file);
        assert_eq!(fs::read_to_string(&file).unwrap(), "original");
        // The broken version was snapshotted before being overwritten
        let snapshots = manager.list_backups(Some(file.as_path())).unwrap();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(fs::read_to_string(&snapshots[0].backup_path).unwrap(), "broken");
    }

    #[test]
    fn test_restore_to_explicit_target() {
        let (_temp, manager, work) = setup();
        let file = work.join("source.ini");
        fs::write(&file, "[core]\n").unwrap();
        let record = manager.create_backup(&file.to_string_lossy()).unwrap().unwrap();

        let target = work.join("restored").join("copy.ini");
        let restored = manager.restore_backup(&record.backup_path, Some(&target)).unwrap();
        assert_eq!(restored, target);
        assert_eq!(fs::read_to_string(&target).unwrap(), "[core]\n");
    }

    #[test]
    fn test_restore_missing_backup() {
        let (_temp, manager, work) = setup();
        let result = manager.restore_backup(&work.join("gone"), None);
        assert!(matches!(result, Err(BackupError::NotFound(_))));
    }

    #[test]
    fn test_restore_unrecognised_name() {
        let (_temp, manager, work) = setup();
        let stray = work.join("stray");
        fs::write(&stray, "x").unwrap();
        let result = manager.restore_backup(&stray, None);
        assert!(matches!(result, Err(BackupError::UnrecognisedName(_))));
    }
}
