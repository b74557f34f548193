//! Full pipeline tests: sync, install, collect, inject against local
//! repository sources.

use curator::config::{InstallMethod, RepositoryConfig, SyncContext};
use curator::inject::{collect, inject_all};
use curator::install::{PluginInstaller, SkillInstaller};
use curator::repo::SyncCoordinator;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn seed_full_repo(base: &Path, name: &str) -> PathBuf {
    let repo = base.join(name);
    write(
        &repo,
        "agents/reviewer.md",
        &format!("---\ndescription: reviewer from {}\n---\nReview.\n", name),
    );
    write(&repo, "commands/deploy.md", "---\ndescription: ship\n---\nShip it.\n");
    write(&repo, "skills/writer/SKILL.md", "# Writer\n");
    write(&repo, "skills/writer/notes.md", "helper notes\n");
    write(&repo, "plugins/on_start.ts", &format!("// {}\n", name));
    write(&repo, "docs/style.md", "# Style\n");
    write(
        &repo,
        "manifest.json",
        r#"{"instructions": ["docs/style.md"]}"#,
    );
    repo
}

fn test_context(base: &Path, method: InstallMethod) -> SyncContext {
    let ctx = SyncContext::new(
        base.join("cache"),
        base.join("skills"),
        base.join("plugins"),
        method,
    );
    ctx.override_rsync(false);
    ctx
}

#[test]
fn sync_install_inject_end_to_end() {
    let base = TempDir::new().unwrap();
    let repo = seed_full_repo(base.path(), "acme");
    let ctx = test_context(base.path(), InstallMethod::Link);

    let coordinator = SyncCoordinator::new(&ctx);
    let results = coordinator.sync_all(&[RepositoryConfig::new(
        repo.to_string_lossy().to_string(),
    )]);
    assert_eq!(results.len(), 1);
    assert!(results[0].error.is_none());

    let skill_outcomes = SkillInstaller::new(&ctx).reconcile(&results);
    assert_eq!(skill_outcomes.len(), 1);
    assert!(skill_outcomes[0].error.is_none());
    let skill_target = ctx
        .skills_root
        .join("remote")
        .join("acme")
        .join("writer");
    assert!(skill_target.join("SKILL.md").is_file());

    let plugin_outcomes = PluginInstaller::new(&ctx).reconcile(&results);
    assert_eq!(plugin_outcomes.len(), 1);
    assert!(ctx.plugins_dir.join("_remote_acme_on_start.ts").exists());

    let collection = collect(&results);
    assert_eq!(collection.agents.len(), 1);
    assert_eq!(collection.commands.len(), 1);
    assert_eq!(collection.instructions.len(), 1);

    let mut host = serde_json::Map::new();
    let report = inject_all(&mut host, &collection);
    assert!(report.agents.ok && report.commands.ok && report.instructions.ok);
    assert_eq!(report.agents.added, 1);
    assert_eq!(
        host["agents"]["reviewer"]["description"],
        serde_json::json!("reviewer from acme")
    );
    assert_eq!(host["commands"]["deploy"]["description"], serde_json::json!("ship"));
    let instructions = host["instructions"].as_array().unwrap();
    assert_eq!(instructions.len(), 1);
    assert!(instructions[0].as_str().unwrap().ends_with("docs/style.md"));
}

#[test]
fn first_configured_repository_wins_collisions() {
    let base = TempDir::new().unwrap();
    let first = seed_full_repo(base.path(), "first");
    let second = seed_full_repo(base.path(), "second");
    let ctx = test_context(base.path(), InstallMethod::Link);

    let coordinator = SyncCoordinator::new(&ctx);
    let results = coordinator.sync_all(&[
        RepositoryConfig::new(first.to_string_lossy().to_string()),
        RepositoryConfig::new(second.to_string_lossy().to_string()),
    ]);

    let collection = collect(&results);
    assert_eq!(collection.agents.len(), 1);
    assert_eq!(collection.agents[0].1.source, "first");
    assert_eq!(collection.superseded.len(), 2); // reviewer and deploy

    // Same skill name in both repos: namespaced by repo, no collision.
    SkillInstaller::new(&ctx).reconcile(&results);
    assert!(ctx.skills_root.join("remote").join("first").join("writer").exists());
    assert!(ctx.skills_root.join("remote").join("second").join("writer").exists());
}

#[test]
fn removed_artifacts_are_cleaned_up_on_resync() {
    let base = TempDir::new().unwrap();
    let repo = seed_full_repo(base.path(), "acme");
    let ctx = test_context(base.path(), InstallMethod::Link);
    let coordinator = SyncCoordinator::new(&ctx);
    let config = vec![RepositoryConfig::new(repo.to_string_lossy().to_string())];

    let results = coordinator.sync_all(&config);
    SkillInstaller::new(&ctx).reconcile(&results);
    PluginInstaller::new(&ctx).reconcile(&results);
    assert!(ctx.skills_root.join("remote").join("acme").join("writer").exists());

    // The user keeps content of their own next to the managed entries.
    write(&ctx.skills_root, "my-skill/SKILL.md", "# Mine\n");
    write(&ctx.plugins_dir, "my_plugin.ts", "// mine\n");

    fs::remove_dir_all(repo.join("skills")).unwrap();
    fs::remove_file(repo.join("plugins").join("on_start.ts")).unwrap();

    let results = coordinator.sync_all(&config);
    SkillInstaller::new(&ctx).reconcile(&results);
    PluginInstaller::new(&ctx).reconcile(&results);

    assert!(!ctx.skills_root.join("remote").join("acme").exists());
    assert!(!ctx.plugins_dir.join("_remote_acme_on_start.ts").exists());
    assert!(ctx.skills_root.join("my-skill").join("SKILL.md").exists());
    assert!(ctx.plugins_dir.join("my_plugin.ts").exists());
}

#[test]
fn user_entries_survive_injection_and_conflicting_skill_is_reported() {
    let base = TempDir::new().unwrap();
    let repo = seed_full_repo(base.path(), "acme");
    let ctx = test_context(base.path(), InstallMethod::Link);

    // A user skill with the same name as the remote one.
    write(&ctx.skills_root, "writer/SKILL.md", "# My writer\n");

    let coordinator = SyncCoordinator::new(&ctx);
    let results = coordinator.sync_all(&[RepositoryConfig::new(
        repo.to_string_lossy().to_string(),
    )]);
    let outcomes = SkillInstaller::new(&ctx).reconcile(&results);
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].error.is_some());
    assert_eq!(
        fs::read_to_string(ctx.skills_root.join("writer").join("SKILL.md")).unwrap(),
        "# My writer\n"
    );

    // A pre-existing host config entry keeps its value through injection.
    let collection = collect(&results);
    let mut host = serde_json::Map::new();
    host.insert(
        "agents".to_string(),
        serde_json::json!({ "reviewer": { "description": "mine" } }),
    );
    let report = inject_all(&mut host, &collection);
    assert_eq!(report.agents.added, 0);
    assert_eq!(report.agents.skipped_existing, 1);
    assert_eq!(host["agents"]["reviewer"]["description"], serde_json::json!("mine"));
}

#[test]
fn copy_method_materializes_real_files() {
    let base = TempDir::new().unwrap();
    let repo = seed_full_repo(base.path(), "acme");
    let ctx = test_context(base.path(), InstallMethod::Copy);

    let coordinator = SyncCoordinator::new(&ctx);
    let results = coordinator.sync_all(&[RepositoryConfig::new(
        repo.to_string_lossy().to_string(),
    )]);
    SkillInstaller::new(&ctx).reconcile(&results);
    PluginInstaller::new(&ctx).reconcile(&results);

    let skill_target = ctx.skills_root.join("remote").join("acme").join("writer");
    assert!(!fs::symlink_metadata(&skill_target)
        .unwrap()
        .file_type()
        .is_symlink());
    assert!(skill_target.join("notes.md").is_file());

    let plugin_target = ctx.plugins_dir.join("_remote_acme_on_start.ts");
    assert!(!fs::symlink_metadata(&plugin_target)
        .unwrap()
        .file_type()
        .is_symlink());
    assert_eq!(fs::read_to_string(&plugin_target).unwrap(), "// acme\n");
}
