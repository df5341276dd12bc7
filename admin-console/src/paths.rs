//! Where the console keeps its config and logs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Log written to the working directory when there is no cache dir.
pub const FALLBACK_LOG: &str = "admin-console.log";

const LATEST: &str = "latest.log";
const KEEP_ARCHIVED: usize = 10;

fn project() -> Option<ProjectDirs> {
    ProjectDirs::from("dev", "admin-shell", "admin-console")
}

/// `config.json` under the platform config dir
/// (`~/.config/admin-console` on Linux).
pub fn config_file() -> Option<PathBuf> {
    project().map(|p| p.config_dir().join("config.json"))
}

/// Log directory under the platform cache dir, created on demand.
fn log_dir() -> Option<LogDir> {
    let dir = project()?.cache_dir().to_path_buf();
    fs::create_dir_all(&dir).ok()?;
    Some(LogDir::new(dir))
}

/// Archive the previous run's log and return the path for this run.
pub fn prepare_log_file() -> PathBuf {
    match log_dir() {
        Some(logs) => {
            if let Err(e) = logs.rotate() {
                eprintln!("log rotation failed: {}", e);
            }
            logs.latest()
        }
        None => PathBuf::from(FALLBACK_LOG),
    }
}

/// A directory of `latest.log` plus timestamped archives.
#[derive(Debug, Clone)]
pub struct LogDir {
    dir: PathBuf,
}

impl LogDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn latest(&self) -> PathBuf {
        self.dir.join(LATEST)
    }

    /// Move `latest.log` aside under a timestamp, then drop all but the
    /// newest archives.
    pub fn rotate(&self) -> io::Result<()> {
        let latest = self.latest();
        if latest.exists() {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S%3f");
            fs::rename(&latest, self.dir.join(format!("{stamp}.log")))?;
        }
        self.prune(KEEP_ARCHIVED)
    }

    fn prune(&self, keep: usize) -> io::Result<()> {
        let mut archived = self.archived()?;
        // Timestamped names sort chronologically.
        archived.sort();
        let excess = archived.len().saturating_sub(keep);
        for path in archived.into_iter().take(excess) {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn archived(&self) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if is_archive(&path) {
                out.push(path);
            }
        }
        Ok(out)
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "log")
        && path.file_name().is_some_and(|name| name != LATEST)
}
