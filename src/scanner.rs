use crate::{
    config::Config,
    error::Result,
    file::FileRecord,
    filter::{ScanFilter, ScanFilterConfig},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ScanStats {
    /// Regular files visited
    visited_files: usize,

    /// Files passing extension and name checks
    candidates: usize,

    /// Candidates whose content matched the marker
    matched: usize,

    /// Candidates read but rejected by the content marker
    rejected_by_content: usize,

    /// Unreadable files and directories
    errors: usize,
}

/// Walks a directory tree and collects matching files.
pub struct Scanner {
    root_dir: PathBuf,
    filter: ScanFilter,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter patterns fail to compile.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_filter(&config.root_dir, &config.scan_filter)
    }

    /// Creates a scanner for `root_dir` with explicit filter settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter patterns fail to compile.
    pub fn with_filter(root_dir: impl Into<PathBuf>, filter: &ScanFilterConfig) -> Result<Self> {
        Ok(Self {
            root_dir: root_dir.into(),
            filter: ScanFilter::new(filter)?,
        })
    }

    /// Scans the root directory and returns every matching file.
    ///
    /// Unreadable files and directories are skipped; the walk never fails.
    /// Records are returned in traversal order.
    pub fn scan(&self) -> Vec<FileRecord> {
        let mut files = Vec::new();
        let mut stats = ScanStats::default();

        debug!("Starting scan of {}", self.root_dir.display());

        let walker = WalkDir::new(&self.root_dir)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| self.may_enter(entry));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }
            stats.visited_files += 1;

            if let Some(record) = self.process_entry(entry.path(), &mut stats) {
                files.push(record);
            }
        }

        debug!(
            "Scan complete: {} visited, {} candidates, {} matched, {} rejected by content, {} errors",
            stats.visited_files,
            stats.candidates,
            stats.matched,
            stats.rejected_by_content,
            stats.errors
        );

        files
    }

    /// Prunes excluded directories; the root itself is always entered.
    fn may_enter(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let allowed = self.filter.should_descend(entry.path());
        if !allowed {
            trace!("Pruning directory: {}", entry.path().display());
        }
        allowed
    }

    /// Applies the path checks, reads the file, then applies the content check.
    fn process_entry(&self, path: &Path, stats: &mut ScanStats) -> Option<FileRecord> {
        if !self.filter.accepts_path(path) {
            return None;
        }
        stats.candidates += 1;

        trace!("Reading candidate: {}", path.display());

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("Skipping unreadable file {}: {}", path.display(), e);
                stats.errors += 1;
                return None;
            }
        };

        if !self.filter.accepts_content(&content) {
            stats.rejected_by_content += 1;
            return None;
        }

        stats.matched += 1;
        Some(FileRecord::new(path, content))
    }
}

/// Scans `root_dir` with the given filter settings.
///
/// # Errors
///
/// Returns an error if the filter patterns fail to compile.
pub fn scan(root_dir: impl AsRef<Path>, filter: &ScanFilterConfig) -> Result<Vec<FileRecord>> {
    Ok(Scanner::with_filter(root_dir.as_ref(), filter)?.scan())
}
