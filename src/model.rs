use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

pub const SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_COUNT_LIMITATION: usize = 10;
pub const MAX_COUNT_LIMITATION: usize = 100;

/// One record as delivered by the stats provider.
///
/// The provider may send one record per commit or pre-aggregated bursts per
/// author; either way the record is read-only once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub author: String,
    #[serde(default)]
    pub commits: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl Commit {
    pub fn new(author: impl Into<String>, insertions: u64, deletions: u64, files_changed: u64) -> Self {
        Self {
            author: author.into(),
            commits: 1,
            insertions,
            deletions,
            files_changed,
        }
    }
}

/// Per-author totals derived from a commit list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedStat {
    pub author: String,
    pub commits: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub files_changed: u64,
}

impl AggregatedStat {
    pub fn lines_changed(&self) -> u64 {
        self.insertions + self.deletions
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Commits,
    Insertions,
    Deletions,
    #[serde(rename = "Files Changed")]
    FilesChanged,
    #[serde(rename = "Lines Changed")]
    LinesChanged,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Commits,
        SortKey::Insertions,
        SortKey::Deletions,
        SortKey::FilesChanged,
        SortKey::LinesChanged,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Commits => "Commits",
            SortKey::Insertions => "Insertions",
            SortKey::Deletions => "Deletions",
            SortKey::FilesChanged => "Files Changed",
            SortKey::LinesChanged => "Lines Changed",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Full view state. `commits` and `loading` live for one process only.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub repo: Option<PathBuf>,
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub sort_by: SortKey,
    pub count_limitation_enabled: bool,
    pub count_limitation: usize,
    pub loading: bool,
    pub commits: Vec<Commit>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo: None,
            included_paths: Vec::new(),
            excluded_paths: Vec::new(),
            sort_by: SortKey::Commits,
            count_limitation_enabled: true,
            count_limitation: DEFAULT_COUNT_LIMITATION,
            loading: false,
            commits: Vec::new(),
        }
    }
}

impl Settings {
    pub fn snapshot(&self) -> PersistedSettings {
        PersistedSettings {
            count_limitation_enabled: self.count_limitation_enabled,
            count_limitation: self.count_limitation,
            sort_by: self.sort_by,
            included_paths: self.included_paths.clone(),
            excluded_paths: self.excluded_paths.clone(),
            repo: self.repo.clone(),
        }
    }

    pub fn from_snapshot(snapshot: PersistedSettings) -> Self {
        Self {
            repo: snapshot.repo,
            included_paths: snapshot.included_paths,
            excluded_paths: snapshot.excluded_paths,
            sort_by: snapshot.sort_by,
            count_limitation_enabled: snapshot.count_limitation_enabled,
            count_limitation: snapshot.count_limitation,
            ..Self::default()
        }
    }
}

/// The durable part of [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSettings {
    pub count_limitation_enabled: bool,
    pub count_limitation: usize,
    pub sort_by: SortKey,
    pub included_paths: Vec<String>,
    pub excluded_paths: Vec<String>,
    pub repo: Option<PathBuf>,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Settings::default().snapshot()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub commits: u64,
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub lines_changed: u64,
}

impl Totals {
    pub fn of(stats: &[AggregatedStat]) -> Self {
        stats.iter().fold(Self::default(), |acc, s| Self {
            commits: acc.commits + s.commits,
            files_changed: acc.files_changed + s.files_changed,
            insertions: acc.insertions + s.insertions,
            deletions: acc.deletions + s.deletions,
            lines_changed: acc.lines_changed + s.lines_changed(),
        })
    }
}

/// Rounded percentage of `value` in `total`; zero when `total` is zero.
pub fn share(value: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    (value as f64 / total as f64 * 100.0).round() as u64
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorEntry {
    pub author: String,
    pub commits: u64,
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
    pub lines_changed: u64,
}

impl From<&AggregatedStat> for AuthorEntry {
    fn from(stat: &AggregatedStat) -> Self {
        Self {
            author: stat.author.clone(),
            commits: stat.commits,
            files_changed: stat.files_changed,
            insertions: stat.insertions,
            deletions: stat.deletions,
            lines_changed: stat.lines_changed(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub repository_path: String,
    pub pathspec: Vec<String>,
    pub sort_by: SortKey,
    pub limit: Option<usize>,
    pub totals: Totals,
    pub entries: Vec<AuthorEntry>,
}
