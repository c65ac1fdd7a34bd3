use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use ledger_api::{CommittedBlock, Journal, StateError};

use super::config::{DiskBlock, FileJournalConfig};

// ════════════════════════════════════════════════════════════════
//  FileJournal
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct FileJournal {
    path: PathBuf,
    sync: bool,
}

impl FileJournal {
    /// Create the data directory if needed. The journal file itself is created
    /// on first append.
    pub fn open(config: &FileJournalConfig) -> Result<Self, StateError> {
        std::fs::create_dir_all(&config.data_dir)
            .map_err(|e| StateError::io(format!("mkdir {}: {e}", config.data_dir)))?;
        let path = Path::new(&config.data_dir).join(&config.file_name);
        tracing::debug!(path = %path.display(), "file journal opened");
        Ok(Self {
            path,
            sync: config.sync,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, line: &str) -> Result<(), StateError> {
        self.append_line_with(line, |f| {
            if self.sync {
                f.sync_data()
                    .map_err(|e| StateError::io(format!("sync: {e}")))?;
            }
            Ok(())
        })
    }

    /// Append `line`, then run `finish` on the file. If either step fails the
    /// file is cut back to its previous length, so a failed append leaves no
    /// block behind for replay.
    fn append_line_with<F>(&self, line: &str, finish: F) -> Result<(), StateError>
    where
        F: FnOnce(&std::fs::File) -> Result<(), StateError>,
    {
        let mut f = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StateError::io(format!("open {}: {e}", self.path.display())))?;
        let prev_len = f
            .metadata()
            .map_err(|e| StateError::io(format!("stat {}: {e}", self.path.display())))?
            .len();

        let written = writeln!(f, "{line}")
            .map_err(|e| StateError::io(format!("write: {e}")))
            .and_then(|()| finish(&f));

        if let Err(e) = written {
            match f.set_len(prev_len) {
                Ok(()) => {
                    tracing::warn!(path = %self.path.display(), len = prev_len, error = %e, "journal append rolled back");
                }
                Err(trunc) => {
                    tracing::error!(path = %self.path.display(), error = %trunc, "failed to roll back journal append");
                }
            }
            return Err(e);
        }
        Ok(())
    }
}

impl Journal for FileJournal {
    fn load(&self) -> Result<Vec<CommittedBlock>, StateError> {
        let f = match std::fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StateError::io(format!("open {}: {e}", self.path.display())));
            }
        };
        let reader = std::io::BufReader::new(f);

        let mut blocks = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line.map_err(|e| StateError::io(format!("read line {line_no}: {e}")))?;
            if line.trim().is_empty() {
                continue;
            }

            let disk: DiskBlock = serde_json::from_str(&line)
                .map_err(|e| StateError::corrupt(format!("line {line_no}: {e}")))?;
            let block = CommittedBlock::try_from(disk)
                .map_err(|e| e.with_context(format!("line {line_no}")))?;
            blocks.push(block);
        }

        tracing::debug!(path = %self.path.display(), blocks = blocks.len(), "journal loaded");
        Ok(blocks)
    }

    fn append(&self, block: &CommittedBlock) -> Result<(), StateError> {
        let line = serde_json::to_string(&DiskBlock::from(block))
            .map_err(|e| StateError::corrupt(format!("json serialize: {e}")))?;
        self.append_line(&line)
    }
}
