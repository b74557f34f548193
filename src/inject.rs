//! Collection & Injection Engine.
//!
//! Two deliberately separate precedence stages. Collection resolves
//! collisions *across repositories*: first configured repository wins for
//! agents and commands, instructions accumulate from every non-errored
//! repository. Injection resolves precedence *against the user*: a key the
//! user's configuration already carries is never overwritten, and presence
//! is judged by key existence so an explicit null or false sentinel counts
//! as a user decision.

use crate::discovery::{AgentConfig, CommandConfig, InstructionInfo};
use crate::repo::SyncResult;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// An agent definition that won collection, tagged with its source repo.
#[derive(Debug, Clone)]
pub struct RemoteAgent {
    pub config: AgentConfig,
    /// Short name of the repository whose copy won
    pub source: String,
}

/// A command definition that won collection, tagged with its source repo.
#[derive(Debug, Clone)]
pub struct RemoteCommand {
    pub config: CommandConfig,
    pub source: String,
}

/// A definition that lost a name collision during collection.
#[derive(Debug, Clone)]
pub struct Superseded {
    pub name: String,
    /// Repository whose copy was ignored
    pub source: String,
    /// Repository whose copy won
    pub winner: String,
}

/// Aggregated artifacts across all repositories, in precedence order.
#[derive(Debug, Default)]
pub struct Collection {
    pub agents: Vec<(String, RemoteAgent)>,
    pub commands: Vec<(String, RemoteCommand)>,
    pub instructions: Vec<InstructionInfo>,
    pub superseded: Vec<Superseded>,
}

/// Collect agents, commands, and instructions across repository results.
pub fn collect(results: &[SyncResult]) -> Collection {
    let mut collection = Collection::default();
    let mut agent_sources: Vec<(String, String)> = Vec::new();
    let mut command_sources: Vec<(String, String)> = Vec::new();
    let mut agent_names: HashSet<String> = HashSet::new();
    let mut command_names: HashSet<String> = HashSet::new();

    for result in results {
        for agent in &result.agents {
            if agent_names.insert(agent.name.clone()) {
                agent_sources.push((agent.name.clone(), result.short_name.clone()));
                collection.agents.push((
                    agent.name.clone(),
                    RemoteAgent {
                        config: agent.config.clone(),
                        source: result.short_name.clone(),
                    },
                ));
            } else {
                let winner = agent_sources
                    .iter()
                    .find(|(name, _)| *name == agent.name)
                    .map(|(_, source)| source.clone())
                    .unwrap_or_default();
                debug!(agent = %agent.name, repo = %result.short_name, winner = %winner, "Agent superseded by earlier repository");
                collection.superseded.push(Superseded {
                    name: agent.name.clone(),
                    source: result.short_name.clone(),
                    winner,
                });
            }
        }
        for command in &result.commands {
            if command_names.insert(command.name.clone()) {
                command_sources.push((command.name.clone(), result.short_name.clone()));
                collection.commands.push((
                    command.name.clone(),
                    RemoteCommand {
                        config: command.config.clone(),
                        source: result.short_name.clone(),
                    },
                ));
            } else {
                let winner = command_sources
                    .iter()
                    .find(|(name, _)| *name == command.name)
                    .map(|(_, source)| source.clone())
                    .unwrap_or_default();
                debug!(command = %command.name, repo = %result.short_name, winner = %winner, "Command superseded by earlier repository");
                collection.superseded.push(Superseded {
                    name: command.name.clone(),
                    source: result.short_name.clone(),
                    winner,
                });
            }
        }
        // Instructions are cumulative, never identity-keyed, but a repo
        // whose sync failed may be at a stale ref; skip its instructions.
        if result.error.is_none() {
            collection
                .instructions
                .extend(result.instructions.iter().cloned());
        }
    }
    collection
}

/// Outcome of injecting one artifact family into the host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionOutcome {
    /// Names inserted
    pub added: usize,
    /// Names left alone because the user already defines them
    pub skipped_existing: usize,
    /// False when the existing configuration value has an incompatible shape
    pub ok: bool,
}

impl InjectionOutcome {
    fn failed() -> Self {
        Self {
            added: 0,
            skipped_existing: 0,
            ok: false,
        }
    }
}

/// Aggregated injection outcomes.
#[derive(Debug, Clone, Copy)]
pub struct InjectionReport {
    pub agents: InjectionOutcome,
    pub commands: InjectionOutcome,
    pub instructions: InjectionOutcome,
}

/// Inject the whole collection into a host configuration object.
pub fn inject_all(host: &mut Map<String, Value>, collection: &Collection) -> InjectionReport {
    InjectionReport {
        agents: inject_named(
            host,
            "agents",
            collection
                .agents
                .iter()
                .map(|(name, agent)| (name.as_str(), &agent.config)),
        ),
        commands: inject_named(
            host,
            "commands",
            collection
                .commands
                .iter()
                .map(|(name, command)| (name.as_str(), &command.config)),
        ),
        instructions: inject_instructions(host, &collection.instructions),
    }
}

/// Insert named entries under `key`, deferring to every pre-existing name.
fn inject_named<'a, T, I>(host: &mut Map<String, Value>, key: &str, entries: I) -> InjectionOutcome
where
    T: serde::Serialize + 'a,
    I: Iterator<Item = (&'a str, &'a T)>,
{
    if let Some(existing) = host.get(key) {
        if !existing.is_object() {
            warn!(key, "Host configuration value is not an object, skipping injection");
            return InjectionOutcome::failed();
        }
    }
    let section = host
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    let section = match section.as_object_mut() {
        Some(section) => section,
        None => return InjectionOutcome::failed(),
    };

    let mut added = 0;
    let mut skipped = 0;
    for (name, config) in entries {
        // Key existence, not truthiness: a user's null/false sentinel is a
        // deliberate override and stays.
        if section.contains_key(name) {
            skipped += 1;
            continue;
        }
        match serde_json::to_value(config) {
            Ok(value) => {
                section.insert(name.to_string(), value);
                added += 1;
            }
            Err(e) => {
                warn!(name, "Failed to serialize artifact config: {}", e);
            }
        }
    }
    InjectionOutcome {
        added,
        skipped_existing: skipped,
        ok: true,
    }
}

/// Append instruction paths to the host's `instructions` value.
///
/// The existing value must be absent, a single string, or an array of
/// strings; any other shape aborts instruction injection, reported via
/// `ok: false` rather than an error.
pub fn inject_instructions(
    host: &mut Map<String, Value>,
    instructions: &[InstructionInfo],
) -> InjectionOutcome {
    let mut entries: Vec<String> = match host.get("instructions") {
        None => Vec::new(),
        Some(Value::String(existing)) => vec![existing.clone()],
        Some(Value::Array(existing)) => {
            let mut entries = Vec::with_capacity(existing.len());
            for value in existing {
                match value.as_str() {
                    Some(s) => entries.push(s.to_string()),
                    None => {
                        warn!("Host instructions array has a non-string member, skipping injection");
                        return InjectionOutcome::failed();
                    }
                }
            }
            entries
        }
        Some(_) => {
            warn!("Host instructions value has an incompatible shape, skipping injection");
            return InjectionOutcome::failed();
        }
    };

    let existing: HashSet<String> = entries.iter().cloned().collect();
    let mut added = 0;
    let mut skipped = 0;
    for instruction in instructions {
        let path = instruction.path.to_string_lossy().to_string();
        if existing.contains(&path) {
            skipped += 1;
            continue;
        }
        entries.push(path);
        added += 1;
    }
    // Nothing new: leave the user's value, whatever its shape, untouched.
    if added > 0 {
        host.insert(
            "instructions".to_string(),
            Value::Array(entries.into_iter().map(Value::String).collect()),
        );
    }
    InjectionOutcome {
        added,
        skipped_existing: skipped,
        ok: true,
    }
}
