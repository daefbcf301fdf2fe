//! Repository session control: ask the provider for a repository's commit
//! records off the event loop and fold the answers back into the store.
//!
//! Requests run on worker threads and report through a channel owned by the
//! controller. Nothing is applied to the store until the event loop calls
//! [`SessionController::pump`] or [`SessionController::wait`], so all store
//! writes stay on one thread. Overlapping requests are not cancelled: each
//! answer is applied as it arrives, and the last one to arrive wins even if
//! it belongs to an older request.

use crate::error::{Result, StatsError};
use crate::model::Commit;
use crate::provider::StatsProvider;
use crate::store::{PathEdit, SettingsStore};
use crate::title::window_title;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Opened {
        request: RequestId,
        repo: PathBuf,
        commits: Vec<Commit>,
        title: String,
    },
    Failed {
        request: RequestId,
        repo: PathBuf,
        message: String,
        title: String,
    },
}

impl SessionEvent {
    pub fn request(&self) -> RequestId {
        match self {
            SessionEvent::Opened { request, .. } | SessionEvent::Failed { request, .. } => *request,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SessionEvent::Opened { title, .. } | SessionEvent::Failed { title, .. } => title,
        }
    }
}

/// Something that lets the user choose a repository directory.
pub trait RepoPicker {
    fn pick(&mut self) -> Option<PathBuf>;
}

impl<F> RepoPicker for F
where
    F: FnMut() -> Option<PathBuf>,
{
    fn pick(&mut self) -> Option<PathBuf> {
        self()
    }
}

struct Completion {
    request: RequestId,
    repo: PathBuf,
    result: Result<Vec<Commit>>,
}

type Listener = Box<dyn FnMut(&SessionEvent)>;

pub struct SessionController {
    provider: Arc<dyn StatsProvider>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    next_request: u64,
    in_flight: usize,
    listeners: Vec<Listener>,
}

impl SessionController {
    pub fn new(provider: Arc<dyn StatsProvider>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            tx,
            rx,
            next_request: 0,
            in_flight: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a callback run for every applied event.
    pub fn on_event(&mut self, listener: impl FnMut(&SessionEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Start loading `repo`. Marks the store as loading right away; the result
    /// lands on the next `pump`/`wait`.
    pub fn open_repo(
        &mut self,
        store: &mut SettingsStore,
        repo: impl Into<PathBuf>,
        pathspec: Vec<String>,
    ) -> RequestId {
        let repo = repo.into();
        let request = RequestId(self.next_request);
        self.next_request += 1;

        store.set_loading(true);
        self.in_flight += 1;
        info!(request = request.0, repo = %repo.display(), ?pathspec, "opening repository");

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        let worker_repo = repo.clone();
        let spawned = thread::Builder::new()
            .name(format!("stats-request-{}", request.0))
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    provider.commit_stats(&worker_repo, &pathspec)
                }))
                .unwrap_or_else(|_| Err(StatsError::Provider("stats provider panicked".to_string())));
                let _ = tx.send(Completion {
                    request,
                    repo: worker_repo,
                    result,
                });
            });

        if let Err(e) = spawned {
            let _ = self.tx.send(Completion {
                request,
                repo,
                result: Err(StatsError::Provider(format!("failed to start request: {e}"))),
            });
        }

        request
    }

    /// Let the user choose a repository and open it with an empty pathspec.
    pub fn pick_repo(&mut self, store: &mut SettingsStore, picker: &mut dyn RepoPicker) -> Option<RequestId> {
        let Some(repo) = picker.pick() else {
            debug!("no repository picked");
            return None;
        };
        Some(self.open_repo(store, repo, Vec::new()))
    }

    /// Reopen the saved repository with the saved pathspec, if there is one.
    pub fn restore(&mut self, store: &mut SettingsStore) -> Option<RequestId> {
        let repo = store.state().repo.clone()?;
        let pathspec = store.pathspec();
        Some(self.open_repo(store, repo, pathspec))
    }

    /// Follow up a path-list edit by reopening the current repository.
    pub fn apply_edit(&mut self, store: &mut SettingsStore, edit: PathEdit) -> Option<RequestId> {
        let pathspec = edit.refetch?;
        let repo = store.state().repo.clone()?;
        Some(self.open_repo(store, repo, pathspec))
    }

    pub fn file_count(&self, repo: &Path, pathspec: &[String]) -> Result<u64> {
        self.provider.file_count(repo, pathspec)
    }

    /// Apply every finished request without blocking.
    pub fn pump(&mut self, store: &mut SettingsStore) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            events.push(self.apply(store, done));
        }
        events
    }

    /// Block until the next request finishes. `None` when nothing is pending.
    pub fn wait(&mut self, store: &mut SettingsStore) -> Option<SessionEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let done = self.rx.recv().ok()?;
        Some(self.apply(store, done))
    }

    pub fn wait_timeout(&mut self, store: &mut SettingsStore, timeout: Duration) -> Option<SessionEvent> {
        if self.in_flight == 0 {
            return None;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(done) => Some(self.apply(store, done)),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Block until every pending request has been applied.
    pub fn wait_all(&mut self, store: &mut SettingsStore) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.wait(store) {
            events.push(event);
        }
        events
    }

    fn apply(&mut self, store: &mut SettingsStore, done: Completion) -> SessionEvent {
        self.in_flight = self.in_flight.saturating_sub(1);
        let title = window_title(&done.repo);

        let event = match done.result {
            Ok(commits) => {
                info!(request = done.request.0, records = commits.len(), "repository loaded");
                store.set_repo(done.repo.clone(), commits.clone());
                SessionEvent::Opened {
                    request: done.request,
                    repo: done.repo,
                    commits,
                    title,
                }
            }
            Err(e) => {
                warn!(request = done.request.0, error = %e, "repository load failed");
                SessionEvent::Failed {
                    request: done.request,
                    repo: done.repo,
                    message: e.to_string(),
                    title,
                }
            }
        };

        store.set_loading(false);
        for listener in self.listeners.iter_mut() {
            listener(&event);
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeProvider {
        responses: HashMap<PathBuf, std::result::Result<Vec<Commit>, String>>,
        gates: Mutex<HashMap<PathBuf, Receiver<()>>>,
        calls: Mutex<Vec<(PathBuf, Vec<String>)>>,
    }

    impl FakeProvider {
        fn respond(mut self, repo: &str, result: std::result::Result<Vec<Commit>, &str>) -> Self {
            self.responses
                .insert(PathBuf::from(repo), result.map_err(str::to_string));
            self
        }

        fn gate(self, repo: &str) -> (Self, Sender<()>) {
            let (tx, rx) = mpsc::channel();
            self.gates.lock().unwrap().insert(PathBuf::from(repo), rx);
            (self, tx)
        }
    }

    impl StatsProvider for FakeProvider {
        fn commit_stats(&self, repo: &Path, pathspec: &[String]) -> Result<Vec<Commit>> {
            self.calls
                .lock()
                .unwrap()
                .push((repo.to_path_buf(), pathspec.to_vec()));
            let gate = self.gates.lock().unwrap().remove(repo);
            if let Some(gate) = gate {
                let _ = gate.recv();
            }
            match self.responses.get(repo) {
                Some(Ok(commits)) => Ok(commits.clone()),
                Some(Err(message)) => Err(StatsError::Provider(message.clone())),
                None => Err(StatsError::Provider(
                    "fatal: not a git repository (or any of the parent directories): .git".to_string(),
                )),
            }
        }

        fn file_count(&self, _repo: &Path, pathspec: &[String]) -> Result<u64> {
            Ok(pathspec.len() as u64)
        }
    }

    fn sample() -> Vec<Commit> {
        vec![Commit::new("A", 10, 2, 3), Commit::new("B", 1, 1, 1)]
    }

    fn controller(provider: FakeProvider) -> (SessionController, Arc<FakeProvider>) {
        let provider = Arc::new(provider);
        (SessionController::new(provider.clone()), provider)
    }

    #[test]
    fn open_sets_loading_then_stores_result() {
        let (mut session, _) = controller(FakeProvider::default().respond("/repo", Ok(sample())));
        let mut store = SettingsStore::default();

        session.open_repo(&mut store, "/repo", Vec::new());
        assert!(store.state().loading);
        assert!(session.is_busy());

        let event = session.wait(&mut store).unwrap();
        assert!(matches!(&event, SessionEvent::Opened { commits, .. } if *commits == sample()));
        assert!(event.title().starts_with("Git Statistics: "));
        assert_eq!(store.state().repo, Some(PathBuf::from("/repo")));
        assert_eq!(store.state().commits, sample());
        assert!(!store.state().loading);
        assert!(session.wait(&mut store).is_none());
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let (mut session, _) = controller(
            FakeProvider::default()
                .respond("/good", Ok(sample()))
                .respond("/bad", Err("no commits found")),
        );
        let mut store = SettingsStore::default();
        session.open_repo(&mut store, "/good", Vec::new());
        session.wait(&mut store);

        session.open_repo(&mut store, "/bad", Vec::new());
        let event = session.wait(&mut store).unwrap();

        match event {
            SessionEvent::Failed { message, repo, .. } => {
                assert_eq!(message, "no commits found");
                assert_eq!(repo, PathBuf::from("/bad"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
        assert_eq!(store.state().repo, Some(PathBuf::from("/good")));
        assert_eq!(store.state().commits, sample());
        assert!(!store.state().loading);
    }

    #[test]
    fn pathspec_reaches_provider() {
        let (mut session, provider) = controller(FakeProvider::default().respond("/repo", Ok(sample())));
        let mut store = SettingsStore::default();
        let _ = store.add_included_path("src");
        let _ = store.add_excluded_path("src/gen");

        let spec = store.pathspec();
        session.open_repo(&mut store, "/repo", spec);
        session.wait_all(&mut store);

        let calls = provider.calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![(PathBuf::from("/repo"), vec!["src".to_string(), ":!src/gen".to_string()])]
        );
    }

    #[test]
    fn pick_repo_without_choice_does_nothing() {
        let (mut session, provider) = controller(FakeProvider::default());
        let mut store = SettingsStore::default();
        let mut cancel = || -> Option<PathBuf> { None };

        assert!(session.pick_repo(&mut store, &mut cancel).is_none());
        assert!(!store.state().loading);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn pick_repo_opens_with_empty_pathspec() {
        let (mut session, provider) = controller(FakeProvider::default().respond("/picked", Ok(sample())));
        let mut store = SettingsStore::default();
        let _ = store.add_included_path("src");
        let mut choose = || Some(PathBuf::from("/picked"));

        assert!(session.pick_repo(&mut store, &mut choose).is_some());
        session.wait_all(&mut store);

        assert_eq!(provider.calls.lock().unwrap()[0].1, Vec::<String>::new());
        assert_eq!(store.state().repo, Some(PathBuf::from("/picked")));
    }

    #[test]
    fn restore_reopens_saved_repo_with_saved_pathspec() {
        let (mut session, provider) = controller(FakeProvider::default().respond("/saved", Ok(sample())));
        let mut store = SettingsStore::default();
        assert!(session.restore(&mut store).is_none());

        let mut saved = store.persisted();
        saved.repo = Some(PathBuf::from("/saved"));
        saved.excluded_paths = vec!["docs".to_string()];
        let mut store = SettingsStore::restore(saved);

        assert!(session.restore(&mut store).is_some());
        session.wait_all(&mut store);
        assert_eq!(provider.calls.lock().unwrap()[0].1, vec![":!docs".to_string()]);
        assert_eq!(store.state().commits, sample());
    }

    #[test]
    fn path_edits_reopen_only_when_needed() {
        let (mut session, provider) = controller(FakeProvider::default().respond("/repo", Ok(sample())));
        let mut store = SettingsStore::default();

        let edit = store.add_included_path("src");
        assert!(session.apply_edit(&mut store, edit).is_none(), "no repo open yet");

        session.open_repo(&mut store, "/repo", Vec::new());
        session.wait_all(&mut store);

        let edit = store.change_included_path(0, "src").unwrap();
        assert!(session.apply_edit(&mut store, edit).is_none());

        let edit = store.add_excluded_path("vendor");
        assert!(session.apply_edit(&mut store, edit).is_some());
        session.wait_all(&mut store);

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1, vec!["src".to_string(), ":!vendor".to_string()]);
    }

    #[test]
    fn last_response_to_arrive_wins() {
        let (provider, release_old) = FakeProvider::default()
            .respond("/old", Ok(vec![Commit::new("old", 1, 1, 1)]))
            .respond("/new", Ok(vec![Commit::new("new", 1, 1, 1)]))
            .gate("/old");
        let (mut session, _) = controller(provider);
        let mut store = SettingsStore::default();

        let first = session.open_repo(&mut store, "/old", Vec::new());
        let second = session.open_repo(&mut store, "/new", Vec::new());
        assert!(first < second);

        let event = session.wait(&mut store).unwrap();
        assert_eq!(event.request(), second);
        assert_eq!(store.state().repo, Some(PathBuf::from("/new")));

        release_old.send(()).unwrap();
        let event = session.wait(&mut store).unwrap();
        assert_eq!(event.request(), first);
        assert_eq!(store.state().repo, Some(PathBuf::from("/old")));
        assert_eq!(store.state().commits[0].author, "old");
    }

    #[test]
    fn listeners_receive_applied_events() {
        let (mut session, _) = controller(FakeProvider::default().respond("/repo", Ok(sample())));
        let mut store = SettingsStore::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        session.on_event(move |event| sink.borrow_mut().push(event.request()));

        let id = session.open_repo(&mut store, "/repo", Vec::new());
        session.open_repo(&mut store, "/missing", Vec::new());
        session.wait_all(&mut store);

        assert_eq!(seen.borrow().len(), 2);
        assert!(seen.borrow().contains(&id));
    }

    #[test]
    fn pump_without_results_is_empty() {
        let (mut session, _) = controller(FakeProvider::default());
        let mut store = SettingsStore::default();
        assert!(session.pump(&mut store).is_empty());
    }

    #[test]
    fn file_count_passes_through() {
        let (session, _) = controller(FakeProvider::default());
        let count = session
            .file_count(Path::new("/repo"), &["a".to_string(), "b".to_string()])
            .unwrap();
        assert_eq!(count, 2);
    }
}
