//! Single-instance lock for the watcher process
//!
//! Two running watchers would record every visit twice, so `fp start`
//! holds an exclusive lock on `<db>.lock` for its whole life. The OS drops
//! the lock when the handle closes or the process dies. The file itself is
//! left in place: unlinking it while locked would let a waiter lock the
//! orphaned inode while a newcomer locks a fresh file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub struct InstanceLock {
    path: PathBuf,
    #[allow(dead_code)]
    file: File,
}

/// Lock file content, for the "already running" message
#[derive(Debug, Serialize, Deserialize)]
struct LockContent {
    pid: u32,
    started_at: String,
}

impl InstanceLock {
    /// Acquire the lock guarding `db_path`
    ///
    /// Fails if another process holds it.
    pub fn acquire(db_path: &Path) -> Result<Self> {
        let lock_path = lock_path_for(db_path);

        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create lock directory")?;
        }

        let Some(mut file) = try_lock_exclusive(&lock_path)? else {
            let holder = read_holder(&lock_path)
                .map(|c| format!("pid {} since {}", c.pid, c.started_at))
                .unwrap_or_else(|| "another process".to_string());
            anyhow::bail!(
                "Footprints is already running for {} ({})",
                db_path.display(),
                holder
            );
        };

        write_lock_content(&mut file)?;
        tracing::debug!("Acquired instance lock {}", lock_path.display());

        Ok(Self {
            path: lock_path,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn lock_path_for(db_path: &Path) -> PathBuf {
    let mut name = db_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn write_lock_content(file: &mut File) -> Result<()> {
    let content = LockContent {
        pid: std::process::id(),
        started_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    };
    let serialized =
        serde_json::to_string(&content).context("Failed to serialize lock content")?;

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(serialized.as_bytes())?;
    file.sync_all()?;
    Ok(())
}

fn read_holder(lock_path: &Path) -> Option<LockContent> {
    let text = std::fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&text).ok()
}

/// Open and lock the file; None when someone else holds it
#[cfg(unix)]
fn try_lock_exclusive(lock_path: &Path) -> Result<Option<File>> {
    use nix::fcntl::{flock, FlockArg};
    use std::os::unix::io::AsRawFd;

    let file = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(lock_path)
        .context("Failed to open lock file")?;

    match flock(file.as_raw_fd(), FlockArg::LockExclusiveNonblock) {
        Ok(()) => Ok(Some(file)),
        Err(nix::errno::Errno::EWOULDBLOCK) => Ok(None),
        Err(e) => Err(e).context("Failed to lock instance file"),
    }
}

#[cfg(windows)]
fn try_lock_exclusive(lock_path: &Path) -> Result<Option<File>> {
    use std::os::windows::fs::OpenOptionsExt;

    const ERROR_SHARING_VIOLATION: i32 = 32;

    // share_mode(0): nobody else may open the file while we hold it
    match OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .share_mode(0)
        .open(lock_path)
    {
        Ok(file) => Ok(Some(file)),
        Err(e) if e.raw_os_error() == Some(ERROR_SHARING_VIOLATION) => Ok(None),
        Err(e) => Err(e).context("Failed to open lock file"),
    }
}
