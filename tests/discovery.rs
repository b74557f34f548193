//! End-to-end discovery tests against realistic repository layouts.

use curator::discovery::{
    discover_agents, discover_commands, discover_instructions, discover_plugins, discover_skills,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

#[test]
fn singular_root_takes_precedence_over_plural() {
    let repo = TempDir::new().unwrap();
    write(
        repo.path(),
        "agent/solo.md",
        "---\ndescription: singular\n---\nbody\n",
    );
    write(
        repo.path(),
        "agents/ignored.md",
        "---\ndescription: plural\n---\nbody\n",
    );

    let agents = discover_agents(repo.path());
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "solo");
}

#[test]
fn nested_agents_keep_slash_identities() {
    let repo = TempDir::new().unwrap();
    write(
        repo.path(),
        "agents/review/code.md",
        "---\ndescription: nested\n---\nbody\n",
    );

    let agents = discover_agents(repo.path());
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "review/code");
}

#[test]
fn agent_without_front_matter_is_skipped_but_command_is_kept() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "agents/bare.md", "Just prose, no front matter.\n");
    write(repo.path(), "commands/bare.md", "Run the thing.\n");

    assert!(discover_agents(repo.path()).is_empty());
    let commands = discover_commands(repo.path());
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].config.template, "Run the thing.");
    assert!(commands[0].config.description.is_none());
}

#[test]
fn skill_directories_require_marker_and_claim_their_subtree() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "skills/csv/SKILL.md", "# CSV\n");
    write(repo.path(), "skills/csv/scripts/helper.py", "pass\n");
    // A marker nested under a claimed skill is part of that skill, not a
    // second skill.
    write(repo.path(), "skills/csv/inner/SKILL.md", "# inner\n");
    write(repo.path(), "skills/group/pdf/SKILL.md", "# PDF\n");
    write(repo.path(), "skills/empty/notes.md", "no marker here\n");

    let mut names: Vec<String> = discover_skills(repo.path())
        .into_iter()
        .map(|s| s.name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["csv".to_string(), "group-pdf".to_string()]);
}

#[test]
fn plugins_match_script_extensions_case_insensitively() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "plugins/on_start.ts", "export {}\n");
    write(repo.path(), "plugins/legacy.JS", "module.exports = {}\n");
    write(repo.path(), "plugins/readme.md", "not a plugin\n");
    write(repo.path(), "plugins/hooks/save.ts", "export {}\n");

    let mut plugins = discover_plugins(repo.path(), "acme");
    plugins.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(plugins.len(), 3);
    assert_eq!(plugins[0].name, "hooks_save");
    assert_eq!(plugins[1].name, "legacy");
    assert_eq!(plugins[1].extension, ".js");
    assert_eq!(plugins[2].name, "on_start");
    assert!(plugins.iter().all(|p| p.repo_short_name == "acme"));
}

#[test]
fn instructions_come_only_from_the_manifest() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "docs/style.md", "# Style\n");
    write(repo.path(), "docs/unlisted.md", "# Unlisted\n");
    write(
        repo.path(),
        "manifest.json",
        r#"{"instructions": ["docs/style.md", "docs/missing.md", "../escape.md"]}"#,
    );

    let instructions = discover_instructions(repo.path());
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].name, "docs/style");
    assert!(instructions[0].path.ends_with("docs/style.md"));
}

#[test]
fn instruction_identity_charset_is_enforced() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "docs/style.v2.md", "# Style v2\n");
    write(repo.path(), "docs/style.md", "# Style\n");
    write(
        repo.path(),
        "manifest.json",
        r#"{"instructions": ["docs/style.v2.md", "docs/style.md"]}"#,
    );

    // "docs/style.v2" carries a dot, which the identity charset forbids
    // even though the path itself validates.
    let instructions = discover_instructions(repo.path());
    assert_eq!(instructions.len(), 1);
    assert_eq!(instructions[0].name, "docs/style");
}

#[test]
fn repo_without_manifest_has_no_instructions() {
    let repo = TempDir::new().unwrap();
    write(repo.path(), "docs/style.md", "# Style\n");
    assert!(discover_instructions(repo.path()).is_empty());
}

#[test]
fn hidden_directories_are_not_scanned() {
    let repo = TempDir::new().unwrap();
    write(
        repo.path(),
        "agents/.drafts/wip.md",
        "---\ndescription: wip\n---\nbody\n",
    );
    write(
        repo.path(),
        "agents/live.md",
        "---\ndescription: live\n---\nbody\n",
    );

    let agents = discover_agents(repo.path());
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].name, "live");
}
