//! Plain-text rendering of navigation snapshots and search results.

use crate::{
    navigator::{Snapshot, Status},
    path,
    types::{EntryKind, RepositorySummary},
};

/// Render the repository view: location header, numbered listing, content pane
pub fn render_snapshot(snapshot: &Snapshot) -> String {
    let repo = snapshot
        .coordinate
        .as_ref()
        .map(|c| c.to_string())
        .unwrap_or_default();
    let location = path::ancestors(&snapshot.current_path)
        .into_iter()
        .skip(1)
        .filter_map(|p| p.rsplit('/').next())
        .fold(repo, |acc, segment| format!("{} / {}", acc, segment));
    let back = if snapshot.can_go_back() {
        "[back]"
    } else {
        "[back disabled]"
    };

    let mut lines = vec![format!("{}  {}", location, back)];

    match (snapshot.status, &snapshot.last_error) {
        (Status::Idle, _) => lines.push("No repository selected".to_string()),
        (Status::Loading, _) => lines.push("Loading...".to_string()),
        (Status::Error, Some(err)) => lines.push(format!("Error: {}", err)),
        (Status::Error, None) | (Status::Ready, _) => {}
    }

    lines.push("-- Repository Contents --".to_string());
    lines.extend(
        snapshot
            .current_listing
            .entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let label = match entry.kind {
                    EntryKind::Directory => "Directory",
                    EntryKind::File => "File",
                };
                format!("{:>3}. {}: {}", index + 1, label, entry.name)
            }),
    );

    if let Some(content) = &snapshot.selected_file_content {
        let title = snapshot.selected_file_path.as_deref().unwrap_or_default();
        lines.push(format!("-- File Content: {} --", title));
        lines.push(content.trim_end_matches('\n').to_string());
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Render a numbered list of repositories found by a user search
pub fn render_repositories(repos: &[RepositorySummary]) -> String {
    if repos.is_empty() {
        return "No repositories found\n".to_string();
    }

    repos
        .iter()
        .enumerate()
        .map(|(index, repo)| {
            let mut line = format!("{:>3}. @{} {}", index + 1, repo.owner, repo.name);
            if let Some(description) = repo.description.as_deref().filter(|d| !d.is_empty()) {
                line.push_str(&format!(" - {}", description));
            }
            line.push('\n');
            line
        })
        .collect()
}
