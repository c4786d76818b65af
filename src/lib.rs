pub mod config;
pub mod craft_of_exile;
pub mod knowledge;
pub mod planner;
pub mod pob;
pub mod repoe;
pub mod strategy;
pub mod sync;

use std::path::{Path, PathBuf};

use config::KbConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "POE_KB_DATA_DIR";

/// How many rotated log files are kept next to the active one.
const LOG_ROTATIONS: u32 = 3;

/// Resolve the directory holding the curated datasets.
///
/// 1. `data_dir` from the config file.
/// 2. `POE_KB_DATA_DIR`.
/// 3. `./data` when it exists.
/// 4. The platform data directory (`$XDG_DATA_HOME/poe-craft-kb` on Linux,
///    `~/Library/Application Support/poe-craft-kb` on macOS).
pub fn data_dir(config: &KbConfig) -> PathBuf {
    pick_data_dir(
        config.data_dir.as_deref(),
        std::env::var(DATA_DIR_ENV_VAR).ok(),
        Path::new("data"),
    )
}

fn pick_data_dir(configured: Option<&Path>, env_value: Option<String>, local: &Path) -> PathBuf {
    if let Some(dir) = configured {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_value.filter(|value| !value.trim().is_empty()) {
        return PathBuf::from(config::expand_tilde(&dir));
    }
    if local.is_dir() {
        return local.to_path_buf();
    }
    if let Some(dir) = dirs::data_dir() {
        return dir.join("poe-craft-kb");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".poe-craft-kb")
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over `filter`. Logs go to stderr unless `log_file` is
/// set, in which case the previous files are rotated and each line is
/// flushed as it is written. Calling this twice is a no-op.
pub fn init_tracing(filter: &str, json: bool, log_file: Option<&Path>) -> std::io::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::fmt::writer::BoxMakeWriter;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    let (writer, ansi) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            rotate_log_file(path, LOG_ROTATIONS);
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            (BoxMakeWriter::new(FlushingWriter::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stderr), true),
    };

    let builder = fmt::fmt()
        .with_env_filter(env_filter)
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(false);

    // Already-initialised subscribers are left in place.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.with_ansi(ansi).try_init()
    };

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = ?log_file.map(Path::display),
        "tracing initialised"
    );
    Ok(())
}

/// Rotate log files: `poe-kb.log` → `poe-kb.log.1` → `.2` → … → `.{keep}`.
///
/// Oldest file beyond `keep` is deleted. Missing files in the chain are skipped.
fn rotate_log_file(base_path: &Path, keep: u32) {
    let oldest = format!("{}.{keep}", base_path.display());
    let _ = std::fs::remove_file(&oldest);

    for i in (1..keep).rev() {
        let from = format!("{}.{i}", base_path.display());
        let to = format!("{}.{}", base_path.display(), i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    if base_path.exists() {
        let to = format!("{}.1", base_path.display());
        let _ = std::fs::rename(base_path, &to);
    }
}

/// A writer that wraps `std::fs::File` and flushes after every write.
#[derive(Clone)]
struct FlushingWriter {
    file: std::sync::Arc<std::sync::Mutex<std::fs::File>>,
}

impl FlushingWriter {
    fn new(file: std::fs::File) -> Self {
        Self {
            file: std::sync::Arc::new(std::sync::Mutex::new(file)),
        }
    }
}

impl std::io::Write for FlushingWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        let n = std::io::Write::write(&mut *f, buf)?;
        std::io::Write::flush(&mut *f)?;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        let mut f = self
            .file
            .lock()
            .map_err(|e| std::io::Error::other(format!("lock poisoned: {e}")))?;
        std::io::Write::flush(&mut *f)
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for FlushingWriter {
    type Writer = FlushingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn configured_dir_beats_env_and_local() {
        let dir = TempDir::new().unwrap();
        let picked = pick_data_dir(Some(Path::new("/cfg")), Some("/env".into()), dir.path());
        assert_eq!(picked, PathBuf::from("/cfg"));
        let picked = pick_data_dir(None, Some("/env".into()), dir.path());
        assert_eq!(picked, PathBuf::from("/env"));
    }

    #[test]
    fn local_data_dir_used_when_present() {
        let dir = TempDir::new().unwrap();
        assert_eq!(pick_data_dir(None, Some("  ".into()), dir.path()), dir.path());
        let missing = dir.path().join("absent");
        let fallback = pick_data_dir(None, None, &missing);
        assert_ne!(fallback, missing);
        assert!(fallback.ends_with("poe-craft-kb") || fallback.ends_with(".poe-craft-kb"));
    }

    #[test]
    fn rotation_shifts_and_drops_oldest() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("poe-kb.log");
        for (name, body) in [("poe-kb.log", "current"), ("poe-kb.log.1", "one"), ("poe-kb.log.2", "two")] {
            std::fs::write(dir.path().join(name), body).unwrap();
        }

        rotate_log_file(&log, 2);

        assert!(!log.exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("poe-kb.log.1")).unwrap(), "current");
        assert_eq!(std::fs::read_to_string(dir.path().join("poe-kb.log.2")).unwrap(), "one");
    }

    #[test]
    fn flushing_writer_writes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = FlushingWriter::new(file);
        writer.write_all(b"line\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "line\n");
    }
}
