//! # File I/O Module
//!
//! Reading and writing `.rsp` ruling-span documents.
//!
//! - **Atomic saves**: the document is written to `<name>.rsp.tmp`, synced,
//!   then renamed over the target
//! - **Advisory locking**: an OS lock plus a `<name>.rsp.lock` JSON file naming
//!   the holder, so a second engineer opening the file sees who has it
//! - **Schema check**: files from a newer or incompatible schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use catenary_core::document::RulingSpanDocument;
//! use catenary_core::file_io::{load_document, save_document, FileLock};
//! use catenary_core::units::UnitSystem;
//! use std::path::Path;
//!
//! let path = Path::new("feeder_12.rsp");
//! let document = RulingSpanDocument::new(UnitSystem::Imperial, "Engineer", "26-014");
//!
//! let lock = FileLock::acquire(path, "engineer@utility.com").unwrap();
//! save_document(&document, path).unwrap();
//! drop(lock);
//!
//! let reopened = load_document(path).unwrap();
//! assert_eq!(reopened.meta.job_id, "26-014");
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::document::{RulingSpanDocument, SCHEMA_VERSION};
use crate::errors::{CalcError, CalcResult};

/// Document file extension
pub const EXTENSION: &str = "rsp";

/// Locks older than this are taken over regardless of their holder
const STALE_LOCK_AGE_HOURS: i64 = 24;

fn io_error<'a>(operation: &'a str, path: &'a Path) -> impl FnOnce(std::io::Error) -> CalcError + 'a {
    move |e| CalcError::file_error(operation, path.display().to_string(), e.to_string())
}

fn serialization_error(e: serde_json::Error) -> CalcError {
    CalcError::SerializationError {
        reason: e.to_string(),
    }
}

// ============================================================================
// Locking
// ============================================================================

/// Contents of a `.rsp.lock` file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (email or user name)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for this process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }

    /// A lock is stale once its process is gone from this machine, or after
    /// a day on any machine.
    pub fn is_stale(&self) -> bool {
        if Utc::now() - self.locked_at > Duration::hours(STALE_LOCK_AGE_HOURS) {
            return true;
        }
        let same_machine = hostname().is_some_and(|machine| machine == self.machine);
        same_machine && !process_alive(self.pid)
    }
}

fn hostname() -> Option<String> {
    if cfg!(windows) {
        std::env::var("COMPUTERNAME").ok()
    } else {
        std::env::var("HOSTNAME").or_else(|_| std::env::var("HOST")).ok()
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// `feeder.rsp` -> `feeder.rsp.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    sibling_with_suffix(path, "lock")
}

/// `feeder.rsp` -> `feeder.rsp.<suffix>`
fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let extension = match path.extension() {
        Some(extension) => format!("{}.{suffix}", extension.to_string_lossy()),
        None => suffix.to_string(),
    };
    path.with_extension(extension)
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(io_error("read lock", lock_path))?;
    serde_json::from_str(&contents).map_err(serialization_error)
}

/// Exclusive hold on a document. Dropping it removes the lock file and
/// releases the OS lock.
#[derive(Debug)]
pub struct FileLock {
    document_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Lock `path` for `user_id`.
    ///
    /// Fails with [`CalcError::FileLocked`] when a live lock exists. Stale
    /// locks are taken over with a warning.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);

        if let Ok(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            log::warn!(
                "taking over stale lock on {} held by {}",
                path.display(),
                existing.holder()
            );
        }

        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(io_error("create lock", &lock_path))?;

        handle.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let info = LockInfo::new(user_id);
        let json = serde_json::to_string_pretty(&info).map_err(serialization_error)?;
        handle
            .write_all(json.as_bytes())
            .and_then(|_| handle.sync_all())
            .map_err(io_error("write lock", &lock_path))?;

        log::debug!("locked {} for {}", path.display(), info.user_id);
        Ok(FileLock {
            document_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// Current live lock on `path`, if any
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path))
            .ok()
            .filter(|info| !info.is_stale())
    }

    pub fn document_path(&self) -> &Path {
        &self.document_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Write `document` to `path` through a synced temporary file
pub fn save_document(document: &RulingSpanDocument, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(document).map_err(serialization_error)?;
    let tmp_path = sibling_with_suffix(path, "tmp");

    let mut tmp = File::create(&tmp_path).map_err(io_error("create temp file", &tmp_path))?;
    tmp.write_all(json.as_bytes())
        .and_then(|_| tmp.sync_all())
        .map_err(io_error("write temp file", &tmp_path))?;
    drop(tmp);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error("rename to final", path)(e));
    }
    log::info!("saved {} ({} spans)", path.display(), document.spans.len());
    Ok(())
}

/// Read and version-check a document
pub fn load_document(path: &Path) -> CalcResult<RulingSpanDocument> {
    let contents = fs::read_to_string(path).map_err(io_error("read", path))?;
    let document: RulingSpanDocument =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid document {}: {}", path.display(), e),
        })?;
    validate_version(&document.meta.version)?;
    Ok(document)
}

/// Load a document along with whoever currently holds its lock
pub fn load_document_with_lock_check(path: &Path) -> CalcResult<(RulingSpanDocument, Option<LockInfo>)> {
    let document = load_document(path)?;
    Ok((document, FileLock::check(path)))
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.').map(str::parse::<u32>);
    let major = parts.next()?.ok()?;
    let minor = match parts.next() {
        Some(minor) => minor.ok()?,
        None => 0,
    };
    Some((major, minor))
}

/// Major versions must match; while the schema is 0.x, files from a newer
/// minor version are refused too.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let (file_major, file_minor) = parse_version(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse_version(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector2;
    use crate::ruling_span::RulingSpan;
    use crate::units::UnitSystem;
    use std::env::temp_dir;

    fn temp_document_path(name: &str) -> PathBuf {
        temp_dir().join(format!("catenary_test_{}_{}.rsp", name, std::process::id()))
    }

    fn document() -> RulingSpanDocument {
        let steps = [Vector2::new(300.0, 0.0), Vector2::new(350.0, 12.0)];
        let section = RulingSpan::from_steps(Vector2::new(0.0, 30.0), &steps, 15.66, 20_000.0).unwrap();
        RulingSpanDocument::from_ruling_span(&section, UnitSystem::Metric, "Test Engineer", "TEST-001")
    }

    #[test]
    fn test_sibling_paths() {
        let path = Path::new("/lines/feeder.rsp");
        assert_eq!(lock_path_for(path), Path::new("/lines/feeder.rsp.lock"));
        assert_eq!(sibling_with_suffix(path, "tmp"), Path::new("/lines/feeder.rsp.tmp"));
        assert_eq!(lock_path_for(Path::new("feeder")), Path::new("feeder.lock"));
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_document_path("roundtrip");
        let original = document();
        save_document(&original, &path).unwrap();

        assert!(!sibling_with_suffix(&path, "tmp").exists());
        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(loaded.to_ruling_span().unwrap().len(), 2);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_document(&temp_document_path("missing")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let path = temp_document_path("newer");
        let mut newer = document();
        newer.meta.version = "0.9.0".to_string();
        save_document(&newer, &path).unwrap();

        let err = load_document(&path).unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_document_path("garbage");
        fs::write(&path, "<RulingSpan/>").unwrap();
        let err = load_document(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_lock_lifecycle() {
        let path = temp_document_path("lock");
        save_document(&document(), &path).unwrap();

        let lock = FileLock::acquire(&path, "first@utility.com").unwrap();
        assert_eq!(lock.document_path(), path.as_path());
        assert!(lock_path_for(&path).exists());

        let second = FileLock::acquire(&path, "second@utility.com").unwrap_err();
        assert_eq!(second.error_code(), "FILE_LOCKED");
        assert!(second.is_recoverable());

        let (_, holder) = load_document_with_lock_check(&path).unwrap();
        assert_eq!(holder.map(|info| info.user_id), Some("first@utility.com".to_string()));

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("someone");
        assert!(info.pid > 0);
        info.locked_at = Utc::now() - Duration::hours(STALE_LOCK_AGE_HOURS + 1);
        assert!(info.is_stale());
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.3").is_ok());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("latest").is_err());
    }
}
