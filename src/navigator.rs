//! Directory-navigation state machine.
//!
//! The [`Navigator`] tracks where the user is inside one repository's tree.
//! It performs no I/O: every event either updates the state directly or
//! hands back a [`Request`] for the caller to execute. The resulting
//! [`Completion`] is fed back through [`Navigator::apply`].
//!
//! Each accepted event bumps a generation counter and every request carries
//! the generation it was issued under. Only the completion matching the
//! current generation is applied, so when events overlap the latest one wins
//! and superseded responses are dropped on arrival.

use crate::{
    error::{BrowseError, FetchError, Result},
    path,
    provider::TreeProvider,
    types::{DirectoryListing, Entry, EntryKind, RepositoryCoordinate},
};

/// Lifecycle status of the navigator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    /// No repository yet
    #[default]
    Idle,
    /// A fetch is in flight
    Loading,
    /// A listing is displayed
    Ready,
    /// The latest fetch failed; any new event may leave this state
    Error,
}

/// Read-only view of the navigation state handed to observers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub coordinate: Option<RepositoryCoordinate>,
    pub current_path: String,
    pub current_listing: DirectoryListing,
    /// Path of the opened file, present together with its content
    pub selected_file_path: Option<String>,
    pub selected_file_content: Option<String>,
    pub status: Status,
    /// Present only while `status` is `Error`
    pub last_error: Option<FetchError>,
}

impl Snapshot {
    pub fn at_root(&self) -> bool {
        self.current_path.is_empty()
    }

    /// Whether `go_back` would do anything
    pub fn can_go_back(&self) -> bool {
        !self.at_root()
    }
}

/// What a request is fetching on behalf of the navigator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Repository root listing
    Root,
    /// A non-root directory listing, reached by descent or ascent
    Directory { path: String },
    /// Raw text of a file entry
    File { path: String, fetch_url: String },
}

/// Result body of a fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Listing(DirectoryListing),
    Text(String),
}

/// A fetch the navigator wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    generation: u64,
    coordinate: RepositoryCoordinate,
    target: Target,
}

impl Request {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn coordinate(&self) -> &RepositoryCoordinate {
        &self.coordinate
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Perform the single network call this request stands for
    pub async fn execute(self, provider: &dyn TreeProvider) -> Completion {
        let outcome = match &self.target {
            Target::Root => provider
                .list_directory(&self.coordinate, "")
                .await
                .map(Payload::Listing),
            Target::Directory { path } => provider
                .list_directory(&self.coordinate, path)
                .await
                .map(Payload::Listing),
            Target::File { fetch_url, .. } => provider
                .fetch_file_text(fetch_url)
                .await
                .map(Payload::Text),
        };
        self.resolve(outcome)
    }

    /// Pair this request with an outcome obtained elsewhere
    pub fn resolve(self, outcome: Result<Payload>) -> Completion {
        Completion {
            generation: self.generation,
            target: self.target,
            outcome,
        }
    }
}

/// Outcome of a request, ready to be applied
#[derive(Debug)]
pub struct Completion {
    generation: u64,
    target: Target,
    outcome: Result<Payload>,
}

impl Completion {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

/// Effect of an event on the navigator
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Transition {
    /// The caller must execute the request and apply its completion
    Fetch(Request),
    /// State was updated in place, no fetch needed
    Applied,
    /// Preconditions not met; nothing changed
    Ignored,
}

/// Navigation state machine for a single repository session
#[derive(Debug, Default)]
pub struct Navigator {
    state: Snapshot,
    root_listing: Option<DirectoryListing>,
    generation: u64,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a session on `coordinate`, discarding any previous state
    pub fn initialize(&mut self, coordinate: RepositoryCoordinate) -> Transition {
        if !coordinate.is_valid() {
            log::warn!("Ignoring initialize with incomplete coordinate {:?}", coordinate);
            return Transition::Ignored;
        }

        self.root_listing = None;
        self.state = Snapshot {
            coordinate: Some(coordinate),
            ..Snapshot::default()
        };
        self.issue(Target::Root)
    }

    /// Open a file or descend into a directory of the current listing
    pub fn open_entry(&mut self, entry: &Entry) -> Transition {
        if !self.state.current_listing.contains(entry) {
            log::debug!("Ignoring open of {:?}: not in current listing", entry.path);
            return Transition::Ignored;
        }

        let target = match entry.kind {
            EntryKind::Directory => Target::Directory {
                path: entry.path.clone(),
            },
            EntryKind::File => Target::File {
                path: entry.path.clone(),
                fetch_url: entry.fetch_url.clone(),
            },
        };
        self.issue(target)
    }

    /// Ascend to the parent of the current directory
    ///
    /// Returning to the root reuses the retained root listing without a fetch.
    pub fn go_back(&mut self) -> Transition {
        let parent = match path::parent_of(&self.state.current_path) {
            Some(parent) => parent.to_string(),
            None => return Transition::Ignored,
        };

        if !parent.is_empty() {
            return self.issue(Target::Directory { path: parent });
        }

        let Some(root) = self.root_listing.clone() else {
            return Transition::Ignored;
        };

        // Supersede anything still in flight
        self.generation += 1;
        log::debug!("Returning to root from cache (generation {})", self.generation);
        self.show_listing(String::new(), root);
        Transition::Applied
    }

    /// Apply a completion; returns `false` when it was stale and dropped
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            log::debug!(
                "Dropping stale completion for {:?} (generation {} != {})",
                completion.target,
                completion.generation,
                self.generation
            );
            return false;
        }

        match (completion.target, completion.outcome) {
            (Target::Root, Ok(Payload::Listing(listing))) => {
                self.root_listing = Some(listing.clone());
                self.show_listing(String::new(), listing);
            }
            (Target::Directory { path }, Ok(Payload::Listing(listing))) => {
                self.show_listing(path, listing);
            }
            (Target::File { path, .. }, Ok(Payload::Text(text))) => {
                self.state.selected_file_path = Some(path);
                self.state.selected_file_content = Some(text);
                self.state.status = Status::Ready;
                self.state.last_error = None;
            }
            (target, Ok(_)) => {
                self.fail(BrowseError::Malformed {
                    message: format!("unexpected payload for {:?}", target),
                });
            }
            (_, Err(err)) => self.fail(err),
        }
        true
    }

    fn issue(&mut self, target: Target) -> Transition {
        let Some(coordinate) = self.state.coordinate.clone() else {
            return Transition::Ignored;
        };

        self.generation += 1;
        self.state.status = Status::Loading;
        self.state.last_error = None;
        log::debug!("Issuing {:?} (generation {})", target, self.generation);

        Transition::Fetch(Request {
            generation: self.generation,
            coordinate,
            target,
        })
    }

    fn show_listing(&mut self, path: String, listing: DirectoryListing) {
        self.state.current_path = path;
        self.state.current_listing = listing;
        self.state.selected_file_path = None;
        self.state.selected_file_content = None;
        self.state.status = Status::Ready;
        self.state.last_error = None;
    }

    fn fail(&mut self, err: BrowseError) {
        log::warn!("Fetch failed: {}", err);
        self.state.status = Status::Error;
        self.state.last_error = Some(err.into());
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    pub fn status(&self) -> Status {
        self.state.status
    }

    pub fn is_loading(&self) -> bool {
        self.state.status == Status::Loading
    }

    pub fn current_path(&self) -> &str {
        &self.state.current_path
    }

    pub fn current_listing(&self) -> &DirectoryListing {
        &self.state.current_listing
    }

    pub fn root_listing(&self) -> Option<&DirectoryListing> {
        self.root_listing.as_ref()
    }

    pub fn selected_file_content(&self) -> Option<&str> {
        self.state.selected_file_content.as_deref()
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.state.last_error.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
