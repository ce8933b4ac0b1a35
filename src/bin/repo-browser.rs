//! Interactive repository browser
//!
//! Reads commands from stdin:
//!
//! ```text
//! search <user>          list a user's repositories
//! view <n|owner/repo>    browse a repository
//! open <n>               open entry n of the current listing
//! back                   go to the parent directory
//! home                   leave the repository and return to search
//! quit
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use repo_browser::{
    view, BrowserSession, GitHubProvider, NavEvent, ProviderConfig, RepositoryCoordinate,
    RepositorySummary,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const DEFAULT_CONFIG: &str = "repo-browser.toml";

fn load_config() -> Result<ProviderConfig> {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let path = explicit
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = if explicit.is_some() || path.exists() {
        ProviderConfig::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        ProviderConfig::default()
    };

    Ok(match std::env::var("GITHUB_TOKEN") {
        Ok(token) => config.with_token(token),
        Err(_) => config,
    })
}

/// Resolve `view` arguments against the last search results
fn pick_repository(arg: &str, results: &[RepositorySummary]) -> Option<RepositoryCoordinate> {
    if let Ok(index) = arg.parse::<usize>() {
        return results
            .get(index.checked_sub(1)?)
            .map(RepositorySummary::coordinate);
    }
    RepositoryCoordinate::parse(arg)
}

fn print_help() {
    println!("Commands: search <user> | view <n|owner/repo> | open <n> | back | home | quit");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    let provider = Arc::new(GitHubProvider::new(config).context("Failed to build GitHub client")?);
    log::info!("Starting repo-browser against {}", provider.config().api_base_url);

    let mut results: Vec<RepositorySummary> = Vec::new();
    let mut session: Option<BrowserSession> = None;

    print_help();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, arg) = line.split_once(' ').unwrap_or((line, ""));
        let arg = arg.trim();

        match command {
            "quit" | "exit" => break,
            "search" => match provider.list_user_repositories(arg).await {
                Ok(found) => {
                    results = found;
                    print!("{}", view::render_repositories(&results));
                }
                Err(e) => println!("Error: {}", e),
            },
            "view" => {
                let Some(coordinate) = pick_repository(arg, &results) else {
                    println!("Unknown repository: {:?}", arg);
                    continue;
                };
                let mut browser = BrowserSession::new(provider.clone());
                let snapshot = browser
                    .dispatch_and_settle(NavEvent::Initialize(coordinate))
                    .await;
                print!("{}", view::render_snapshot(&snapshot));
                session = Some(browser);
            }
            "home" => {
                session = None;
                print!("{}", view::render_repositories(&results));
            }
            "open" | "back" => {
                let Some(browser) = session.as_mut() else {
                    println!("No repository open; use `view` first");
                    continue;
                };
                let event = if command == "back" {
                    NavEvent::GoBack
                } else {
                    let entry = arg
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| browser.snapshot().current_listing.entries.get(i).cloned());
                    match entry {
                        Some(entry) => NavEvent::OpenEntry(entry),
                        None => {
                            println!("No entry {:?}", arg);
                            continue;
                        }
                    }
                };
                let snapshot = browser.dispatch_and_settle(event).await;
                print!("{}", view::render_snapshot(&snapshot));
            }
            "" => {}
            _ => print_help(),
        }
    }

    Ok(())
}
