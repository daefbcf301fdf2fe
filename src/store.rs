//! View-state container for the statistics dashboard.
//!
//! All mutation goes through named methods; every method hands back the new
//! state and notifies subscribers. Derived values (aggregation, ranking,
//! limiting) are never stored and are recomputed from the current state on
//! each read.

use crate::error::{Result, StatsError};
use crate::model::{AggregatedStat, Commit, PersistedSettings, Settings, SortKey};
use crate::pathspec::{build_pathspec, is_blank};
use crate::stats;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathList {
    Included,
    Excluded,
}

impl fmt::Display for PathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathList::Included => f.write_str("included"),
            PathList::Excluded => f.write_str("excluded"),
        }
    }
}

/// Outcome of a path-list edit.
///
/// `refetch` holds the rebuilt pathspec when the edit changed what the
/// provider should be asked for; the caller issues the reopen.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PathEdit {
    pub refetch: Option<Vec<String>>,
}

type Observer = Box<dyn FnMut(&Settings)>;

pub struct SettingsStore {
    state: Settings,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsStore {
    pub fn new(state: Settings) -> Self {
        Self {
            state,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn restore(snapshot: PersistedSettings) -> Self {
        Self::new(Settings::from_snapshot(snapshot))
    }

    pub fn state(&self) -> &Settings {
        &self.state
    }

    pub fn persisted(&self) -> PersistedSettings {
        self.state.snapshot()
    }

    pub fn subscribe(&mut self, observer: impl FnMut(&Settings) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn commit(&mut self) -> &Settings {
        for (_, observer) in self.observers.iter_mut() {
            observer(&self.state);
        }
        &self.state
    }

    /// Replace the repository together with its commit snapshot.
    pub fn set_repo(&mut self, repo: PathBuf, commits: Vec<Commit>) -> &Settings {
        debug!(repo = %repo.display(), commits = commits.len(), "set repo");
        self.state.repo = Some(repo);
        self.state.commits = commits;
        self.commit()
    }

    pub fn set_loading(&mut self, loading: bool) -> &Settings {
        self.state.loading = loading;
        self.commit()
    }

    pub fn set_sort_by(&mut self, sort_by: SortKey) -> &Settings {
        debug!(%sort_by, "set sort key");
        self.state.sort_by = sort_by;
        self.commit()
    }

    pub fn set_count_limitation_enabled(&mut self, enabled: bool) -> &Settings {
        self.state.count_limitation_enabled = enabled;
        self.commit()
    }

    pub fn set_count_limitation(&mut self, count: usize) -> &Settings {
        debug!(count, "set count limitation");
        self.state.count_limitation = count;
        self.commit()
    }

    pub fn paths(&self, list: PathList) -> &[String] {
        match list {
            PathList::Included => &self.state.included_paths,
            PathList::Excluded => &self.state.excluded_paths,
        }
    }

    fn paths_mut(&mut self, list: PathList) -> &mut Vec<String> {
        match list {
            PathList::Included => &mut self.state.included_paths,
            PathList::Excluded => &mut self.state.excluded_paths,
        }
    }

    fn finish_edit(&mut self, list: PathList, changed: bool) -> PathEdit {
        self.commit();
        let refetch = changed.then(|| self.pathspec());
        debug!(%list, refetch = refetch.is_some(), "path list edited");
        PathEdit { refetch }
    }

    fn check_index(&self, list: PathList, index: usize) -> Result<()> {
        let len = self.paths(list).len();
        if index >= len {
            return Err(StatsError::InvalidInput(format!(
                "no {list} path at index {index} (list has {len})"
            )));
        }
        Ok(())
    }

    /// Append a path. Adding a blank entry only reserves a slot to edit later.
    pub fn add_path(&mut self, list: PathList, path: impl Into<String>) -> PathEdit {
        let path = path.into();
        let changed = !is_blank(&path);
        self.paths_mut(list).push(path);
        self.finish_edit(list, changed)
    }

    pub fn remove_path(&mut self, list: PathList, index: usize) -> Result<PathEdit> {
        self.check_index(list, index)?;
        let removed = self.paths_mut(list).remove(index);
        Ok(self.finish_edit(list, !is_blank(&removed)))
    }

    pub fn change_path(&mut self, list: PathList, index: usize, value: impl Into<String>) -> Result<PathEdit> {
        self.check_index(list, index)?;
        let value = value.into();
        let slot = &mut self.paths_mut(list)[index];
        let changed = *slot != value;
        *slot = value;
        Ok(self.finish_edit(list, changed))
    }

    pub fn add_included_path(&mut self, path: impl Into<String>) -> PathEdit {
        self.add_path(PathList::Included, path)
    }

    pub fn remove_included_path(&mut self, index: usize) -> Result<PathEdit> {
        self.remove_path(PathList::Included, index)
    }

    pub fn change_included_path(&mut self, index: usize, value: impl Into<String>) -> Result<PathEdit> {
        self.change_path(PathList::Included, index, value)
    }

    pub fn add_excluded_path(&mut self, path: impl Into<String>) -> PathEdit {
        self.add_path(PathList::Excluded, path)
    }

    pub fn remove_excluded_path(&mut self, index: usize) -> Result<PathEdit> {
        self.remove_path(PathList::Excluded, index)
    }

    pub fn change_excluded_path(&mut self, index: usize, value: impl Into<String>) -> Result<PathEdit> {
        self.change_path(PathList::Excluded, index, value)
    }

    pub fn pathspec(&self) -> Vec<String> {
        build_pathspec(&self.state.included_paths, &self.state.excluded_paths)
    }

    pub fn aggregated(&self) -> Vec<AggregatedStat> {
        stats::aggregate(&self.state.commits)
    }

    pub fn ranked(&self) -> Vec<AggregatedStat> {
        stats::rank(self.aggregated(), self.state.sort_by)
    }

    /// The ranked list after top-N limiting; what the shell renders.
    pub fn view(&self) -> Vec<AggregatedStat> {
        stats::view_of(&self.state)
    }
}
