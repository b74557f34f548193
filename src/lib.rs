//! Curator: Artifact Repository Synchronization
//!
//! Syncs agents, commands, skills, plugins, and instruction documents from
//! configured git or local repositories into a host application's
//! configuration and managed directories. Sync is best-effort per
//! repository; installation is a reconciliation that never touches user
//! content outside its managed namespace.

pub mod cli;
pub mod config;
pub mod discovery;
pub mod error;
pub mod inject;
pub mod install;
pub mod logging;
pub mod manifest;
pub mod repo;
pub mod report;
