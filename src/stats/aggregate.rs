use crate::model::{AggregatedStat, Commit};
use std::collections::HashMap;

/// Group commit records by author.
///
/// Each input record counts as exactly one commit; the record's own `commits`
/// field is ignored. Authors are emitted in first-seen order, which the
/// ranking stage relies on for ties.
pub fn aggregate(commits: &[Commit]) -> Vec<AggregatedStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<AggregatedStat> = Vec::new();

    for commit in commits {
        match index.get(commit.author.as_str()) {
            Some(&i) => {
                let entry = &mut stats[i];
                entry.commits += 1;
                entry.insertions += commit.insertions;
                entry.deletions += commit.deletions;
                entry.files_changed += commit.files_changed;
            }
            None => {
                index.insert(commit.author.as_str(), stats.len());
                stats.push(AggregatedStat {
                    author: commit.author.clone(),
                    commits: 1,
                    insertions: commit.insertions,
                    deletions: commit.deletions,
                    files_changed: commit.files_changed,
                });
            }
        }
    }

    stats
}
