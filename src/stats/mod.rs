pub mod aggregate;
pub mod limit;
pub mod rank;

pub use aggregate::aggregate;
pub use limit::limit;
pub use rank::rank;

use crate::model::{AggregatedStat, Commit, Settings, SortKey};

/// Run aggregate, rank and limit over a commit list.
pub fn derive_view(commits: &[Commit], sort_by: SortKey, limit_enabled: bool, count: usize) -> Vec<AggregatedStat> {
    limit(rank(aggregate(commits), sort_by), limit_enabled, count)
}

/// The limited view for the current settings.
pub fn view_of(settings: &Settings) -> Vec<AggregatedStat> {
    derive_view(
        &settings.commits,
        settings.sort_by,
        settings.count_limitation_enabled,
        settings.count_limitation,
    )
}
