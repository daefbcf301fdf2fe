use crate::cli::{CommonArgs, FormatArgs, PathAction};
use crate::input::CountInput;
use crate::model::SortKey;
use crate::output::{output_empty_state, output_error, output_json, output_ndjson, output_table};
use crate::persist::SettingsDb;
use crate::provider::CommandProvider;
use crate::session::{RepoPicker, SessionController, SessionEvent};
use crate::store::{PathEdit, PathList, SettingsStore};
use anyhow::{anyhow, Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Asks for a repository directory on the terminal.
pub struct PromptPicker;

impl RepoPicker for PromptPicker {
    fn pick(&mut self) -> Option<PathBuf> {
        let default = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match inquire::Text::new("Repository directory:")
            .with_default(&default)
            .prompt()
        {
            Ok(answer) if !answer.trim().is_empty() => Some(PathBuf::from(answer.trim())),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "repository prompt closed");
                None
            }
        }
    }
}

pub struct App {
    db: SettingsDb,
    store: SettingsStore,
    session: SessionController,
}

impl App {
    pub fn load(common: &CommonArgs) -> Result<Self> {
        let db = SettingsDb::open(common.state_dir.as_deref()).context("Failed to open settings store")?;
        let saved = db.load().context("Failed to load saved settings")?;
        let provider = Arc::new(CommandProvider::new(common.provider.clone()));
        Ok(Self {
            db,
            store: SettingsStore::restore(saved),
            session: SessionController::new(provider),
        })
    }

    fn save(&mut self) -> Result<()> {
        self.db
            .save(&self.store.persisted())
            .context("Failed to save settings")
    }

    /// Wait for pending requests, reporting failures as they land. Returns
    /// the last event applied.
    fn settle(&mut self) -> Option<SessionEvent> {
        if !self.session.is_busy() {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Loading");
        pb.enable_steady_tick(Duration::from_millis(100));

        let events = self.session.wait_all(&mut self.store);
        pb.finish_and_clear();

        for event in &events {
            if let SessionEvent::Failed { repo, message, .. } = event {
                output_error(repo, message);
            }
        }
        events.into_iter().last()
    }

    /// Settle pending work, persist, and render the current view.
    fn finish_and_render(&mut self, format: FormatArgs) -> Result<()> {
        let last = self.settle();
        self.save()?;

        if let Some(SessionEvent::Failed { repo, .. }) = &last {
            return Err(anyhow!("Failed to open {}", repo.display()));
        }

        let state = self.store.state();
        if state.repo.is_none() && !format.json && !format.ndjson {
            output_empty_state();
            return Ok(());
        }

        let view = self.store.view();
        if format.json {
            output_json(&view, state, &self.store.pathspec())
        } else if format.ndjson {
            output_ndjson(&view)
        } else {
            let title = last.as_ref().map(|e| e.title().to_string());
            output_table(&view, state, title.as_deref())
        }
    }

    pub fn open(&mut self, repo: Option<PathBuf>, format: FormatArgs) -> Result<()> {
        match repo {
            Some(repo) => {
                let pathspec = self.store.pathspec();
                self.session.open_repo(&mut self.store, repo, pathspec);
            }
            None => {
                if self
                    .session
                    .pick_repo(&mut self.store, &mut PromptPicker)
                    .is_none()
                {
                    return Ok(());
                }
            }
        }
        self.finish_and_render(format)
    }

    pub fn show(&mut self, format: FormatArgs) -> Result<()> {
        self.session.restore(&mut self.store);
        self.finish_and_render(format)
    }

    pub fn sort(&mut self, key: SortKey) -> Result<()> {
        self.store.set_sort_by(key);
        self.save()?;
        println!("Sort by: {}", style(key).bold());
        Ok(())
    }

    pub fn limit(&mut self, raw: Option<&str>, enabled: Option<bool>) -> Result<()> {
        if let Some(enabled) = enabled {
            self.store.set_count_limitation_enabled(enabled);
        }
        if let Some(raw) = raw {
            let mut input = CountInput::new(self.store.state().count_limitation);
            let value = input.confirm(raw);
            self.store.set_count_limitation(value);
        }
        self.save()?;

        let state = self.store.state();
        let status = if state.count_limitation_enabled {
            style("on").green()
        } else {
            style("off").dim()
        };
        println!("Top {} ({status})", style(state.count_limitation).bold());
        Ok(())
    }

    pub fn edit_paths(&mut self, list: PathList, action: PathAction) -> Result<()> {
        let edit: PathEdit = match action {
            PathAction::Add { path } => self.store.add_path(list, path),
            PathAction::Remove { index } => self.store.remove_path(list, index)?,
            PathAction::Change { index, value } => self.store.change_path(list, index, value)?,
        };
        self.save()?;

        for (i, path) in self.store.paths(list).iter().enumerate() {
            println!("{i:>3}  {path}");
        }

        if self.session.apply_edit(&mut self.store, edit).is_some() {
            return self.finish_and_render(FormatArgs::default());
        }
        Ok(())
    }

    pub fn print_pathspec(&self) -> Result<()> {
        for entry in self.store.pathspec() {
            println!("{entry}");
        }
        Ok(())
    }

    pub fn print_settings(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&self.store.persisted())?);
        Ok(())
    }

    pub fn files(&self) -> Result<()> {
        let repo = self
            .store
            .state()
            .repo
            .clone()
            .ok_or_else(|| anyhow!("No repository open"))?;
        let count = self
            .session
            .file_count(&repo, &self.store.pathspec())
            .context("Failed to count files")?;
        println!("{count}");
        Ok(())
    }
}
