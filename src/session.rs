use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::{
    error::BrowseError,
    navigator::{Completion, Navigator, Snapshot, Transition},
    provider::TreeProvider,
    types::{Entry, RepositoryCoordinate},
};

/// User-initiated navigation events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEvent {
    Initialize(RepositoryCoordinate),
    OpenEntry(Entry),
    GoBack,
}

/// Drives a [`Navigator`] against a [`TreeProvider`] on the tokio runtime
///
/// Requests are spawned as tasks and their completions come back over a
/// channel. Completions are applied one at a time here, so the navigator is
/// only ever mutated from this value. A provider that panics surfaces as a
/// `TaskFailed` error instead of leaving the session loading. Observers get a
/// fresh [`Snapshot`] after every transition through
/// [`BrowserSession::subscribe`].
pub struct BrowserSession {
    navigator: Navigator,
    provider: Arc<dyn TreeProvider>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
    snapshot_tx: watch::Sender<Snapshot>,
}

impl BrowserSession {
    pub fn new(provider: Arc<dyn TreeProvider>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(Snapshot::default());

        Self {
            navigator: Navigator::new(),
            provider,
            completion_tx,
            completion_rx,
            snapshot_tx,
        }
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.navigator.snapshot()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn is_loading(&self) -> bool {
        self.navigator.is_loading()
    }

    /// Feed an event to the navigator, spawning its fetch if one is needed
    ///
    /// Returns `false` when the event was ignored.
    pub fn dispatch(&mut self, event: NavEvent) -> bool {
        let transition = match &event {
            NavEvent::Initialize(coordinate) => self.navigator.initialize(coordinate.clone()),
            NavEvent::OpenEntry(entry) => self.navigator.open_entry(entry),
            NavEvent::GoBack => self.navigator.go_back(),
        };

        match transition {
            Transition::Ignored => {
                log::debug!("Event ignored: {:?}", event);
                return false;
            }
            Transition::Applied => {}
            Transition::Fetch(request) => {
                let provider = Arc::clone(&self.provider);
                let tx = self.completion_tx.clone();
                let fallback = request.clone();
                let fetch =
                    tokio::spawn(async move { request.execute(provider.as_ref()).await });
                tokio::spawn(async move {
                    let completion = match fetch.await {
                        Ok(completion) => completion,
                        Err(e) => {
                            log::error!("Fetch task for {:?} failed: {}", fallback.target(), e);
                            fallback.resolve(Err(BrowseError::TaskFailed {
                                message: e.to_string(),
                            }))
                        }
                    };
                    // Receiver only goes away with the session
                    let _ = tx.send(completion);
                });
            }
        }

        self.publish();
        true
    }

    /// Wait for the next completion and apply it
    ///
    /// Returns `false` if it was stale.
    pub async fn process_next(&mut self) -> bool {
        let Some(completion) = self.completion_rx.recv().await else {
            return false;
        };
        let applied = self.navigator.apply(completion);
        if applied {
            self.publish();
        }
        applied
    }

    /// Apply completions until no fetch is outstanding
    pub async fn settle(&mut self) -> Snapshot {
        while self.navigator.is_loading() {
            self.process_next().await;
        }
        self.snapshot()
    }

    /// Dispatch an event and wait for it to resolve
    pub async fn dispatch_and_settle(&mut self, event: NavEvent) -> Snapshot {
        self.dispatch(event);
        self.settle().await
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.navigator.snapshot());
    }
}
