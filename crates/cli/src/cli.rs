//! Command-line arguments.
//!
//! Global flags fall back to `RAMDISK_*` environment variables. CLI
//! arguments override environment variables.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ramdisk_types::{Name, NodeId};

/// Operate on a local ramdisk volume database.
#[derive(Debug, Parser)]
#[command(name = "ramdisk", version, about)]
pub struct Cli {
    /// Data directory holding the database file. Created if missing.
    #[arg(long, env = "RAMDISK_DATA", default_value = ".", global = true)]
    pub data: PathBuf,

    /// TOML configuration file.
    #[arg(long, env = "RAMDISK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// TOML fixture listing existing accounts and name auction entries.
    #[arg(long, env = "RAMDISK_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// Account authorizing the operation. Repeatable.
    ///
    /// Without any, the acting account authorizes its own operation.
    #[arg(long = "auth", value_name = "ACCOUNT", global = true)]
    pub auth: Vec<Name>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Auto, global = true)]
    pub log_format: LogFormat,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// JSON when stderr is not a terminal, text otherwise.
    Auto,
    /// Human-readable text.
    Text,
    /// One JSON object per line.
    Json,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Claim a volume.
    Claim {
        /// Account claiming the volume.
        claimant: Name,
        /// Volume name.
        volume: Name,
    },
    /// Remove every node of a volume.
    Reset {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Remove a volume and all of its nodes.
    Delete {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Make a volume permanently immutable.
    Freeze {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
    },
    /// Create or overwrite a node.
    SetNode {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// Node id.
        id: NodeId,
        /// Node contents.
        #[command(flatten)]
        data: NodeData,
    },
    /// Remove a node if present.
    DeleteNode {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// Node id.
        id: NodeId,
    },
    /// Remove nodes with ids in [start, end].
    DeleteRange {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// First id (inclusive).
        start: NodeId,
        /// Last id (inclusive).
        end: NodeId,
    },
    /// Remove consecutive nodes from start, stopping at the first gap.
    DeleteContiguous {
        /// Volume owner.
        owner: Name,
        /// Volume name.
        volume: Name,
        /// First id.
        start: NodeId,
        /// Maximum number of nodes to remove.
        count: u64,
    },
    /// Show a volume record and its usage.
    Show {
        /// Volume name.
        volume: Name,
    },
    /// Show one node.
    GetNode {
        /// Volume name.
        volume: Name,
        /// Node id.
        id: NodeId,
    },
    /// List nodes in id order.
    ListNodes {
        /// Volume name.
        volume: Name,
        /// Only list ids greater than this.
        #[arg(long)]
        start_after: Option<NodeId>,
        /// Maximum number of nodes to list.
        #[arg(long, default_value_t = 100)]
        limit: usize,
    },
    /// Show database statistics.
    Stats,
    /// Configuration utilities.
    Config {
        /// Action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Node contents source. Exactly one is required.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct NodeData {
    /// Contents as a hex string.
    #[arg(long)]
    pub hex: Option<String>,
    /// Read contents from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Configuration subcommands.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration JSON schema.
    Schema,
    /// Print an example configuration file.
    Example,
}
