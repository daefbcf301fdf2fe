pub mod cli;
pub mod commands;
pub mod error;
pub mod input;
pub mod model;
pub mod observability;
pub mod output;
pub mod pathspec;
pub mod persist;
pub mod provider;
pub mod session;
pub mod stats;
pub mod store;
pub mod title;

pub use error::{Result, StatsError};
pub use model::{AggregatedStat, Commit, PersistedSettings, Settings, SortKey};
pub use pathspec::build_pathspec;
pub use provider::{CommandProvider, StatsProvider};
pub use session::{RepoPicker, RequestId, SessionController, SessionEvent};
pub use stats::{aggregate, derive_view, limit, rank};
pub use store::{PathEdit, PathList, SettingsStore};
