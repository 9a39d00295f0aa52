//! CSV statistics sink
//!
//! Writes `agents.csv` and `global.csv` (`;` delimited) into one run
//! directory. Headers come from the row field names and are written with
//! the first row of each file.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use od_core::stats::{AgentEpisodeRow, GlobalEpisodeRow, StatsSink};

pub const AGENTS_FILE: &str = "agents.csv";
pub const GLOBAL_FILE: &str = "global.csv";

pub struct CsvStatsSink {
    dir: PathBuf,
    agents: csv::Writer<File>,
    global: csv::Writer<File>,
}

impl std::fmt::Debug for CsvStatsSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvStatsSink").field("dir", &self.dir).finish()
    }
}

impl CsvStatsSink {
    /// Creates `root/run_<timestamp>` and writes into it
    pub fn create(root: &Path) -> Result<Self> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        Self::in_dir(root.join(format!("run_{}", stamp)))
    }

    /// Writes into `dir`, creating it if needed; existing files are truncated
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create stats directory: {}", dir.display()))?;

        let agents = open_writer(&dir.join(AGENTS_FILE))?;
        let global = open_writer(&dir.join(GLOBAL_FILE))?;
        debug!("Writing episode statistics to {}", dir.display());

        Ok(Self { dir, agents, global })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn open_writer(path: &Path) -> Result<csv::Writer<File>> {
    csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))
}

impl StatsSink for CsvStatsSink {
    fn record_episode(&mut self, agents: &[AgentEpisodeRow], global: &GlobalEpisodeRow) -> od_core::Result<()> {
        for row in agents {
            self.agents.serialize(row).map_err(std::io::Error::from)?;
        }
        self.global.serialize(global).map_err(std::io::Error::from)?;
        // Rows are small and rare; keep the files readable mid-run
        self.flush()
    }

    fn flush(&mut self) -> od_core::Result<()> {
        self.agents.flush()?;
        self.global.flush()?;
        Ok(())
    }
}
