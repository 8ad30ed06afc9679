//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for entity-tools
#[derive(Parser, Debug)]
#[command(name = "entity-tools")]
#[command(
    author,
    version,
    about = "Expose persisted entities to an LLM agent as transactional tools"
)]
#[command(long_about = r#"
entity-tools turns persisted entities into tools an LLM agent can call.

Every call reloads its entity inside a fresh transaction, runs the operation
through the entity's view and commits (or rolls back) before answering.
Finders and relation tools reveal further tools only once an entity is found.

The bundled hotel domain (Reservation, Room, Customer, Folio) is seeded in
memory on every run.

Configuration files are loaded from (in priority order):
1. ENTITY_TOOLS_<SECTION>__<KEY>          Environment
2. --config <path>                         Explicit config file
3. ./entity-tools.toml                     Project-level config
4. ~/.config/entity-tools/config.toml      Global config

Example:
  entity-tools tools reservation R-42
  entity-tools call reservation R-42 extendStay '{"nights": 2}'
  entity-tools find customer 7
  echo 'find_reservation "R-42"' | entity-tools session
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print full tool results as JSON instead of their text
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List registered views and entity types
    Views,

    /// Print the JSON schema of every tool an entity exposes
    Tools {
        /// Entity type (e.g. reservation)
        entity: String,
        /// Entity identifier
        id: String,
        /// Only tools that do not modify the entity
        #[arg(long)]
        read_only: bool,
    },

    /// Call one of an entity's tools
    Call {
        entity: String,
        id: String,
        /// Tool name (e.g. checkIn)
        tool: String,
        /// JSON arguments
        #[arg(default_value = "{}")]
        input: String,
    },

    /// Run a finder and list the tools it discloses
    Find {
        entity: String,
        /// Identifier, bare or as {"id": ...}
        input: String,
    },

    /// Read `<tool> [json]` lines from stdin against a shared tool set
    ///
    /// The set starts with one finder per entity type and grows as tools
    /// disclose more.
    Session,
}
