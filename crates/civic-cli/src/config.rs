//! Command-line and environment configuration for the `civic` binary.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use civic_core::dashboard::{DEFAULT_RECENT_LIMIT, DEFAULT_TOP_CATEGORIES};
use civic_core::{PortalConfig, TransitionPolicy};

use crate::commands::Command;

/// Civic engagement portal: file complaints, join discussions, triage as a representative
#[derive(Parser, Debug)]
#[command(name = "civic", version)]
pub struct Args {
    /// SQLite file holding the session identity and both collections
    #[arg(long, env = "CIVIC_DB_PATH", default_value = "civic.db")]
    pub db_path: PathBuf,

    /// Seed example complaints and discussions into an empty store
    #[arg(long, env = "CIVIC_SEED", default_value_t = true, action = ArgAction::Set)]
    pub seed: bool,

    /// How many complaints the dashboard lists under "recent"
    #[arg(long, env = "CIVIC_RECENT_LIMIT", default_value_t = DEFAULT_RECENT_LIMIT)]
    pub recent_limit: usize,

    #[arg(long, env = "CIVIC_TOP_CATEGORIES", default_value_t = DEFAULT_TOP_CATEGORIES)]
    pub top_categories: usize,

    /// Only allow status changes along the triage workflow graph
    #[arg(long, env = "CIVIC_STRICT_TRANSITIONS", default_value = "false")]
    pub strict_transitions: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Args {
    pub fn portal_config(&self) -> PortalConfig {
        PortalConfig {
            seed_missing: self.seed,
            recent_limit: self.recent_limit,
            top_categories: self.top_categories,
            transition_policy: if self.strict_transitions {
                TransitionPolicy::Strict
            } else {
                TransitionPolicy::Permissive
            },
        }
    }
}
