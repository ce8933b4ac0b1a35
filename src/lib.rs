pub mod config;
pub mod error;
pub mod github;
pub mod navigator;
pub mod path;
pub mod provider;
pub mod session;
pub mod types;
pub mod view;

pub use config::ProviderConfig;
pub use error::{BrowseError, ErrorKind, FetchError, Result};
pub use github::GitHubProvider;
pub use navigator::{Completion, Navigator, Payload, Request, Snapshot, Status, Target, Transition};
pub use provider::TreeProvider;
pub use session::{BrowserSession, NavEvent};
pub use types::{DirectoryListing, Entry, EntryKind, RepositoryCoordinate, RepositorySummary};
