//! Format sync, install, and injection outcomes as text.

use crate::inject::{Collection, InjectionOutcome, InjectionReport};
use crate::install::InstallResult;
use crate::repo::SyncResult;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline. Respects NO_COLOR and TTY.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Format per-repository sync outcomes as human-readable text.
pub fn format_sync_results_text(results: &[SyncResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Repositories")));
    if results.is_empty() {
        out.push_str("No repositories configured.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec![
        "Repository",
        "Ref",
        "Updated",
        "Skills",
        "Agents",
        "Commands",
        "Plugins",
        "Instructions",
        "Status",
    ]);
    for row in results {
        let status = match &row.error {
            Some(e) => truncate(e, 48),
            None => "ok".to_string(),
        };
        table.add_row(vec![
            row.short_name.clone(),
            row.r#ref.clone().unwrap_or_else(|| "-".to_string()),
            if row.updated { "yes" } else { "no" }.to_string(),
            row.skills.len().to_string(),
            row.agents.len().to_string(),
            row.commands.len().to_string(),
            row.plugins.len().to_string(),
            row.instructions.len().to_string(),
            status,
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    let errored = results.iter().filter(|r| r.error.is_some()).count();
    out.push_str(&format!(
        "Total: {} repositories, {} with errors.\n",
        results.len(),
        errored
    ));
    out
}

/// Format install outcomes for one artifact family as human-readable text.
pub fn format_install_results_text(title: &str, results: &[InstallResult]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(title)));
    if results.is_empty() {
        out.push_str("Nothing to install.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "Target", "Changed", "Status"]);
    for row in results {
        let status = match &row.error {
            Some(e) => truncate(e, 48),
            None => "ok".to_string(),
        };
        table.add_row(vec![
            row.name.clone(),
            row.target_path.display().to_string(),
            if row.created { "yes" } else { "no" }.to_string(),
            status,
        ]);
    }
    out.push_str(&format!("{}\n\n", table));
    let failed = results.iter().filter(|r| r.error.is_some()).count();
    out.push_str(&format!(
        "Total: {} installed, {} failed.\n",
        results.len() - failed,
        failed
    ));
    out
}

/// Format the collection and injection summary as human-readable text.
pub fn format_injection_text(collection: &Collection, report: &InjectionReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Injection")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Section", "Added", "Kept (user)", "Status"]);
    table.add_row(injection_row("agents", &report.agents));
    table.add_row(injection_row("commands", &report.commands));
    table.add_row(injection_row("instructions", &report.instructions));
    out.push_str(&format!("{}\n\n", table));

    if !collection.superseded.is_empty() {
        out.push_str("Superseded by earlier repositories:\n");
        for entry in &collection.superseded {
            out.push_str(&format!(
                "  {} from {} (kept copy from {})\n",
                entry.name, entry.source, entry.winner
            ));
        }
    }
    out
}

fn injection_row(section: &str, outcome: &InjectionOutcome) -> Vec<String> {
    vec![
        section.to_string(),
        outcome.added.to_string(),
        outcome.skipped_existing.to_string(),
        if outcome.ok { "ok" } else { "skipped (shape)" }.to_string(),
    ]
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn result(repo: &str, error: Option<&str>) -> SyncResult {
        SyncResult {
            repo_id: repo.to_string(),
            repo_path: PathBuf::from("/cache").join(repo),
            short_name: repo.to_string(),
            r#ref: Some("main".to_string()),
            skills: Vec::new(),
            agents: Vec::new(),
            commands: Vec::new(),
            plugins: Vec::new(),
            instructions: Vec::new(),
            updated: true,
            error: error.map(String::from),
        }
    }

    #[test]
    fn sync_table_lists_each_repository() {
        let text = format_sync_results_text(&[
            result("alpha", None),
            result("beta", Some("fetch failed: no route to host")),
        ]);
        assert!(text.contains("alpha"));
        assert!(text.contains("beta"));
        assert!(text.contains("fetch failed"));
        assert!(text.contains("2 repositories, 1 with errors"));
    }

    #[test]
    fn empty_inputs_render_placeholders() {
        assert!(format_sync_results_text(&[]).contains("No repositories configured."));
        assert!(format_install_results_text("Skills", &[]).contains("Nothing to install."));
    }

    #[test]
    fn install_table_counts_failures() {
        let ok = InstallResult::ok(
            "writer",
            &PathBuf::from("/src/writer"),
            &PathBuf::from("/skills/remote/acme/writer"),
            true,
        );
        let bad = InstallResult::failed(
            "editor",
            &PathBuf::from("/src/editor"),
            &PathBuf::from("/skills/editor"),
            "conflicts with user skill",
        );
        let text = format_install_results_text("Skills", &[ok, bad]);
        assert!(text.contains("1 installed, 1 failed"));
        assert!(text.contains("conflicts with user skill"));
    }
}
