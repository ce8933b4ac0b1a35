/// Integration tests for repository navigation
///
/// These drive a `BrowserSession` against in-memory providers

use repo_browser::{
    BrowseError, BrowserSession, DirectoryListing, Entry, EntryKind, ErrorKind, NavEvent,
    RepositoryCoordinate, Status, TreeProvider,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

fn entry(name: &str, path: &str, kind: EntryKind) -> Entry {
    Entry {
        name: name.to_string(),
        path: path.to_string(),
        kind,
        fetch_url: format!("mock://{}", path),
        id: format!("sha-{}", path),
    }
}

// Mock provider for testing without network access
struct MockTreeProvider {
    dirs: HashMap<String, Vec<Entry>>,
    files: HashMap<String, String>,
    gates: HashMap<String, Arc<Notify>>,
    removed: Mutex<HashSet<String>>,
    offline: bool,
    calls: AtomicUsize,
}

impl MockTreeProvider {
    fn new() -> Self {
        Self {
            dirs: HashMap::new(),
            files: HashMap::new(),
            gates: HashMap::new(),
            removed: Mutex::new(HashSet::new()),
            offline: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// The `octo/demo` repository
    fn demo() -> Self {
        let mut provider = Self::new();
        provider.add_directory(
            "",
            vec![
                entry("src", "src", EntryKind::Directory),
                entry("README.md", "README.md", EntryKind::File),
            ],
        );
        provider.add_directory(
            "src",
            vec![entry("index.js", "src/index.js", EntryKind::File)],
        );
        provider.add_file("README.md", "Hello");
        provider
    }

    fn add_directory(&mut self, path: &str, entries: Vec<Entry>) {
        self.dirs.insert(path.to_string(), entries);
    }

    fn add_file(&mut self, path: &str, content: &str) {
        self.files
            .insert(format!("mock://{}", path), content.to_string());
    }

    /// Hold listings of `path` until the returned gate is notified
    fn gate(&mut self, path: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(path.to_string(), gate.clone());
        gate
    }

    /// Make `path` disappear from the remote tree
    fn remove_directory(&self, path: &str) {
        self.removed.lock().unwrap().insert(path.to_string());
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TreeProvider for MockTreeProvider {
    async fn list_directory(
        &self,
        _coordinate: &RepositoryCoordinate,
        path: &str,
    ) -> repo_browser::Result<DirectoryListing> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = self.gates.get(path) {
            gate.notified().await;
        }
        if self.removed.lock().unwrap().contains(path) {
            return Err(BrowseError::NotFound {
                path: path.to_string(),
            });
        }
        if self.offline {
            return Err(BrowseError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "offline",
            )));
        }
        self.dirs
            .get(path)
            .map(|entries| DirectoryListing::new(path, entries.clone()))
            .ok_or_else(|| BrowseError::NotFound {
                path: path.to_string(),
            })
    }

    async fn fetch_file_text(&self, fetch_url: &str) -> repo_browser::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.files
            .get(fetch_url)
            .cloned()
            .ok_or_else(|| BrowseError::NotFound {
                path: fetch_url.to_string(),
            })
    }

    fn identifier(&self) -> String {
        "mock".to_string()
    }
}

fn demo_coordinate() -> RepositoryCoordinate {
    RepositoryCoordinate::new("octo", "demo")
}

#[tokio::test]
async fn test_initialize_lists_root() {
    let provider = Arc::new(MockTreeProvider::demo());
    let mut session = BrowserSession::new(provider.clone());

    let snapshot = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;

    assert_eq!(snapshot.status, Status::Ready);
    assert_eq!(snapshot.current_path, "");
    let names: Vec<_> = snapshot
        .current_listing
        .entries
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(names, vec!["src", "README.md"]);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_enter_directory_then_back_to_root() {
    let provider = Arc::new(MockTreeProvider::demo());
    let mut session = BrowserSession::new(provider.clone());
    let root = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;

    let src = root.current_listing.entries[0].clone();
    let snapshot = session.dispatch_and_settle(NavEvent::OpenEntry(src)).await;
    assert_eq!(snapshot.current_path, "src");
    assert_eq!(snapshot.current_listing.len(), 1);
    assert_eq!(snapshot.current_listing.entries[0].path, "src/index.js");
    assert_eq!(snapshot.selected_file_content, None);
    assert_eq!(provider.calls(), 2);

    let snapshot = session.dispatch_and_settle(NavEvent::GoBack).await;
    assert_eq!(snapshot.current_path, "");
    assert_eq!(snapshot.current_listing, root.current_listing);
    assert_eq!(provider.calls(), 2, "returning to root must not fetch");
}

#[tokio::test]
async fn test_open_file_at_root() {
    let provider = Arc::new(MockTreeProvider::demo());
    let mut session = BrowserSession::new(provider);
    let root = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;

    let readme = root.current_listing.entries[1].clone();
    let snapshot = session
        .dispatch_and_settle(NavEvent::OpenEntry(readme))
        .await;

    assert_eq!(snapshot.selected_file_content.as_deref(), Some("Hello"));
    assert_eq!(snapshot.current_path, "");
    assert_eq!(snapshot.current_listing, root.current_listing);
}

#[tokio::test]
async fn test_failed_initialize_blocks_navigation() {
    let mut provider = MockTreeProvider::demo();
    provider.offline = true;
    let provider = Arc::new(provider);
    let mut session = BrowserSession::new(provider.clone());

    let snapshot = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;
    assert_eq!(snapshot.status, Status::Error);
    assert_eq!(
        snapshot.last_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::Network)
    );
    assert!(snapshot.current_listing.is_empty());
    assert!(session.navigator().root_listing().is_none());

    assert!(!session.dispatch(NavEvent::GoBack));
    assert!(!session.dispatch(NavEvent::OpenEntry(entry(
        "src",
        "src",
        EntryKind::Directory
    ))));
    assert_eq!(session.snapshot(), snapshot);
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_back_restores_every_ancestor() {
    let mut provider = MockTreeProvider::new();
    provider.add_directory("", vec![entry("a", "a", EntryKind::Directory)]);
    provider.add_directory("a", vec![entry("b", "a/b", EntryKind::Directory)]);
    provider.add_directory("a/b", vec![entry("c", "a/b/c", EntryKind::Directory)]);
    provider.add_directory("a/b/c", vec![]);
    let mut session = BrowserSession::new(Arc::new(provider));

    let mut snapshot = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;
    let mut visited = vec![snapshot.clone()];
    while let Some(dir) = snapshot.current_listing.entries.first().cloned() {
        snapshot = session.dispatch_and_settle(NavEvent::OpenEntry(dir)).await;
        visited.push(snapshot.clone());
    }
    assert_eq!(snapshot.current_path, "a/b/c");

    visited.pop();
    while let Some(expected) = visited.pop() {
        let snapshot = session.dispatch_and_settle(NavEvent::GoBack).await;
        assert_eq!(snapshot.current_path, expected.current_path);
        assert_eq!(snapshot.current_listing, expected.current_listing);
    }
    assert!(!session.dispatch(NavEvent::GoBack));
}

#[tokio::test]
async fn test_slow_response_is_superseded() {
    let mut provider = MockTreeProvider::new();
    provider.add_directory(
        "",
        vec![
            entry("slow", "slow", EntryKind::Directory),
            entry("fast", "fast", EntryKind::Directory),
        ],
    );
    provider.add_directory("slow", vec![entry("s.txt", "slow/s.txt", EntryKind::File)]);
    provider.add_directory("fast", vec![entry("f.txt", "fast/f.txt", EntryKind::File)]);
    let slow_gate = provider.gate("slow");
    let mut session = BrowserSession::new(Arc::new(provider));

    let root = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;
    let slow = root.current_listing.entries[0].clone();
    let fast = root.current_listing.entries[1].clone();

    assert!(session.dispatch(NavEvent::OpenEntry(slow)));
    assert!(session.dispatch(NavEvent::OpenEntry(fast)));
    assert!(session.is_loading());

    assert!(session.process_next().await);
    assert_eq!(session.snapshot().current_path, "fast");

    slow_gate.notify_one();
    assert!(!session.process_next().await);
    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_path, "fast");
    assert_eq!(snapshot.current_listing.entries[0].path, "fast/f.txt");
}

#[tokio::test]
async fn test_missing_directory_keeps_position() {
    let mut provider = MockTreeProvider::demo();
    provider.add_directory(
        "",
        vec![
            entry("src", "src", EntryKind::Directory),
            entry("deleted", "deleted", EntryKind::Directory),
        ],
    );
    let mut session = BrowserSession::new(Arc::new(provider));
    let root = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;

    let deleted = root.current_listing.entries[1].clone();
    let snapshot = session
        .dispatch_and_settle(NavEvent::OpenEntry(deleted))
        .await;

    assert_eq!(snapshot.status, Status::Error);
    assert_eq!(
        snapshot.last_error.map(|e| e.kind),
        Some(ErrorKind::NotFound)
    );
    assert_eq!(snapshot.current_path, "");
    assert_eq!(snapshot.current_listing, root.current_listing);
}

#[tokio::test]
async fn test_subscribers_see_each_transition() {
    let provider = Arc::new(MockTreeProvider::demo());
    let mut session = BrowserSession::new(provider);
    let mut rx = session.subscribe();

    assert!(session.dispatch(NavEvent::Initialize(demo_coordinate())));
    assert_eq!(rx.borrow_and_update().status, Status::Loading);

    session.settle().await;
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().status, Status::Ready);
}

#[tokio::test]
async fn test_failed_back_keeps_position() {
    let mut provider = MockTreeProvider::new();
    provider.add_directory("", vec![entry("a", "a", EntryKind::Directory)]);
    provider.add_directory("a", vec![entry("b", "a/b", EntryKind::Directory)]);
    provider.add_directory("a/b", vec![entry("x.txt", "a/b/x.txt", EntryKind::File)]);
    provider.add_file("a/b/x.txt", "x");
    let provider = Arc::new(provider);
    let mut session = BrowserSession::new(provider.clone());

    let root = session
        .dispatch_and_settle(NavEvent::Initialize(demo_coordinate()))
        .await;
    let a = root.current_listing.entries[0].clone();
    let inside_a = session.dispatch_and_settle(NavEvent::OpenEntry(a)).await;
    let b = inside_a.current_listing.entries[0].clone();
    let inside_b = session.dispatch_and_settle(NavEvent::OpenEntry(b)).await;
    let x = inside_b.current_listing.entries[0].clone();
    let before = session.dispatch_and_settle(NavEvent::OpenEntry(x)).await;
    assert_eq!(before.current_path, "a/b");
    assert_eq!(before.selected_file_content.as_deref(), Some("x"));

    provider.remove_directory("a");
    let calls = provider.calls();
    let snapshot = session.dispatch_and_settle(NavEvent::GoBack).await;

    assert_eq!(provider.calls(), calls + 1);
    assert_eq!(snapshot.status, Status::Error);
    assert_eq!(
        snapshot.last_error.as_ref().map(|e| e.kind),
        Some(ErrorKind::NotFound)
    );
    assert_eq!(snapshot.current_path, "a/b");
    assert_eq!(snapshot.current_listing, before.current_listing);
    assert_eq!(snapshot.selected_file_content, before.selected_file_content);

    // Going back is retried once the parent exists again
    provider.removed.lock().unwrap().clear();
    let snapshot = session.dispatch_and_settle(NavEvent::GoBack).await;
    assert_eq!(snapshot.status, Status::Ready);
    assert_eq!(snapshot.current_path, "a");
    assert_eq!(snapshot.current_listing, inside_a.current_listing);
}

// Provider whose directory listings panic
struct PanickingProvider;

#[async_trait::async_trait]
impl TreeProvider for PanickingProvider {
    async fn list_directory(
        &self,
        _coordinate: &RepositoryCoordinate,
        path: &str,
    ) -> repo_browser::Result<DirectoryListing> {
        panic!("listing {:?} blew up", path);
    }

    async fn fetch_file_text(&self, _fetch_url: &str) -> repo_browser::Result<String> {
        Ok(String::new())
    }

    fn identifier(&self) -> String {
        "panicking".to_string()
    }
}

#[tokio::test]
async fn test_panicking_provider_does_not_hang_session() {
    let mut session = BrowserSession::new(Arc::new(PanickingProvider));

    let snapshot = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        session.dispatch_and_settle(NavEvent::Initialize(demo_coordinate())),
    )
    .await
    .expect("session settled");

    assert_eq!(snapshot.status, Status::Error);
    let err = snapshot.last_error.unwrap();
    assert_eq!(err.kind, ErrorKind::Network);
    assert!(err.message.contains("Fetch task failed"));
    assert!(snapshot.current_listing.is_empty());
}
