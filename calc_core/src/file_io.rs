//! # Worksheet Files
//!
//! Saving and loading `.rkn` worksheets:
//! - **Atomic saves**: write a `.tmp` sibling, fsync, then rename over the target
//! - **File locking**: an OS lock plus a `.rkn.lock` file naming the holder
//! - **Version validation**: refuse files written by a newer schema
//!
//! ## Example
//!
//! ```rust,no_run
//! use calc_core::file_io::{save_worksheet, load_worksheet, FileLock};
//! use calc_core::worksheet::Worksheet;
//! use std::path::Path;
//!
//! let path = Path::new("remodel.rkn");
//! let lock = FileLock::acquire(path, "alex")?;
//! save_worksheet(&Worksheet::new("Remodel"), path)?;
//! drop(lock);
//!
//! let sheet = load_worksheet(path)?;
//! # Ok::<(), calc_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::worksheet::{Worksheet, SCHEMA_VERSION};

/// Locks older than this are taken over regardless of the holder.
const STALE_LOCK_HOURS: i64 = 24;

/// Metadata stored in the `.lock` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (user name or email)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Holder description used in error messages.
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

fn io_error(operation: &str, path: &Path, err: std::io::Error) -> CalcError {
    CalcError::file_error(operation, path.display().to_string(), err.to_string())
}

fn serialization_error(err: serde_json::Error) -> CalcError {
    CalcError::SerializationError { reason: err.to_string() }
}

/// Exclusive lock on a worksheet, released on drop.
///
/// Holds an fs2 OS lock on the `.lock` file and writes [`LockInfo`] into it
/// so other users can see who is editing.
pub struct FileLock {
    worksheet_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a worksheet file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(CalcError::FileLocked)` - A live holder already has it
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Ok(existing) = read_lock_info(&lock_path) {
            if !is_lock_stale(&existing) {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            tracing::warn!(path = %path.display(), holder = %existing.holder(), "taking over stale worksheet lock");
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| io_error("create lock", &lock_path, e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(serialization_error)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| io_error("write lock", &lock_path, e))?;
        lock_file.sync_all().map_err(|e| io_error("sync lock", &lock_path, e))?;

        tracing::debug!(path = %path.display(), user = %info.user_id, "worksheet lock acquired");

        Ok(FileLock {
            worksheet_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Current live holder of the lock, if any.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path))
            .ok()
            .filter(|info| !is_lock_stale(info))
    }

    pub fn worksheet_path(&self) -> &Path {
        &self.worksheet_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // OS lock goes with the file handle
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `sheet.rkn` -> `sheet.rkn.lock`
fn lock_path_for(worksheet_path: &Path) -> PathBuf {
    let mut lock_path = worksheet_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

/// `sheet.rkn` -> `sheet.rkn.tmp`
fn tmp_path_for(worksheet_path: &Path) -> PathBuf {
    let mut tmp_path = worksheet_path.to_path_buf();
    let extension = tmp_path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    tmp_path.set_extension(extension);
    tmp_path
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = fs::read_to_string(lock_path).map_err(|e| io_error("read lock", lock_path, e))?;
    serde_json::from_str(&contents).map_err(serialization_error)
}

/// A lock is stale when its process is gone (same machine) or it is too old.
fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(windows)]
        {
            use std::process::Command;
            if let Ok(output) = Command::new("tasklist")
                .args(["/FI", &format!("PID eq {}", info.pid), "/NH"])
                .output()
            {
                let stdout = String::from_utf8_lossy(&output.stdout);
                if !stdout.contains(&info.pid.to_string()) {
                    return true;
                }
            }
        }
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }

    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

/// Save a worksheet atomically.
///
/// Serializes to a `.tmp` sibling, fsyncs it and renames it over `path`, so
/// an interrupted save never leaves a truncated worksheet behind.
pub fn save_worksheet(worksheet: &Worksheet, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(worksheet).map_err(serialization_error)?;
    let tmp_path = tmp_path_for(path);

    let mut tmp_file = File::create(&tmp_path).map_err(|e| io_error("create temp file", &tmp_path, e))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| io_error("write temp file", &tmp_path, e))?;
    tmp_file.sync_all().map_err(|e| io_error("sync temp file", &tmp_path, e))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        io_error("rename to final", path, e)
    })?;

    tracing::debug!(path = %path.display(), entries = worksheet.entry_count(), "worksheet saved");
    Ok(())
}

/// Load a worksheet.
///
/// # Returns
///
/// * `Ok(Worksheet)` - Loaded worksheet
/// * `Err(CalcError::VersionMismatch)` - Written by an incompatible schema
/// * `Err(CalcError::SerializationError)` - Not a worksheet
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_worksheet(path: &Path) -> CalcResult<Worksheet> {
    let mut contents = String::new();
    File::open(path)
        .map_err(|e| io_error("open", path, e))?
        .read_to_string(&mut contents)
        .map_err(|e| io_error("read", path, e))?;

    let worksheet: Worksheet = serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
        reason: format!("Invalid worksheet JSON in {}: {}", path.display(), e),
    })?;

    validate_version(&worksheet.meta.version)?;
    Ok(worksheet)
}

/// Load a worksheet along with the live lock holder, if another user has it.
pub fn load_worksheet_with_lock_check(path: &Path) -> CalcResult<(Worksheet, Option<LockInfo>)> {
    let worksheet = load_worksheet(path)?;
    Ok((worksheet, FileLock::check(path)))
}

/// Major versions must match; in 0.x a newer minor is also rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    match (file_parts.as_slice(), current_parts.as_slice()) {
        ([file_major, ..], [current_major, ..]) if file_major != current_major => Err(mismatch()),
        ([0, file_minor, ..], [0, current_minor, ..]) if file_minor > current_minor => Err(mismatch()),
        ([_, ..], [_, ..]) => Ok(()),
        _ => Err(mismatch()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::CalculatorKind;
    use crate::input::CalculationInput;
    use crate::settings::CalculatorSettings;
    use std::env::temp_dir;

    fn temp_worksheet_path(name: &str) -> PathBuf {
        temp_dir().join(format!("reckon_test_{}_{}.rkn", name, std::process::id()))
    }

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/jobs/remodel.rkn");
        assert_eq!(lock_path_for(path), Path::new("/jobs/remodel.rkn.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/jobs/remodel.rkn.tmp"));
        assert_eq!(lock_path_for(Path::new("/jobs/remodel")), Path::new("/jobs/remodel.lock"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_worksheet_path("roundtrip");
        let mut sheet = Worksheet::new("Kitchen");
        let input = CalculationInput::new()
            .with_value("length", 12.0)
            .with_value("width", 10.0)
            .with_value("tileSize", "12x12");
        let id = sheet.record(CalculatorKind::Tile, "Floor", input, &CalculatorSettings::default());

        save_worksheet(&sheet, &path).unwrap();
        assert!(!tmp_path_for(&path).exists());

        let loaded = load_worksheet(&path).unwrap();
        assert_eq!(loaded.meta.title, "Kitchen");
        let entry = loaded.get_entry(&id).unwrap();
        assert_eq!(entry.calculator, CalculatorKind::Tile);
        assert_eq!(entry.result.number("baseTiles"), Some(120.0));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_garbage() {
        let path = temp_worksheet_path("garbage");
        fs::write(&path, "not json").unwrap();
        let err = load_worksheet(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);

        let missing = load_worksheet(&temp_worksheet_path("missing")).unwrap_err();
        assert_eq!(missing.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_worksheet_path("lock");
        save_worksheet(&Worksheet::default(), &path).unwrap();

        let lock = FileLock::acquire(&path, "alex").unwrap();
        assert_eq!(lock.info.user_id, "alex");
        assert_eq!(lock.worksheet_path(), path.as_path());
        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_old_lock_is_stale() {
        let mut info = LockInfo::new("sam");
        info.machine = "some-other-host".to_string();
        assert!(!is_lock_stale(&info));

        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        assert!(is_lock_stale(&info));
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_load_with_lock_check() {
        let path = temp_worksheet_path("lock_check");
        save_worksheet(&Worksheet::new("Deck"), &path).unwrap();

        let (loaded, holder) = load_worksheet_with_lock_check(&path).unwrap();
        assert_eq!(loaded.meta.title, "Deck");
        assert!(holder.is_none());

        let _ = fs::remove_file(&path);
    }
}
