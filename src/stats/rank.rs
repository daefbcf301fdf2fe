use crate::model::{AggregatedStat, SortKey};

impl SortKey {
    /// The value this key ranks by.
    pub fn metric(self, stat: &AggregatedStat) -> u64 {
        match self {
            SortKey::Commits => stat.commits,
            SortKey::Insertions => stat.insertions,
            SortKey::Deletions => stat.deletions,
            SortKey::FilesChanged => stat.files_changed,
            SortKey::LinesChanged => stat.lines_changed(),
        }
    }
}

/// Order stats by `key`, largest first. The sort is stable, so equal values
/// keep their incoming order.
pub fn rank(mut stats: Vec<AggregatedStat>, key: SortKey) -> Vec<AggregatedStat> {
    stats.sort_by(|a, b| key.metric(b).cmp(&key.metric(a)));
    stats
}
