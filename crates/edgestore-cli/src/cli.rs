use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use edgestore_core::Direction;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Traversal direction as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DirectionArg {
    /// Follow edges from the node to the entities it points at
    #[default]
    Outgoing,
    /// Follow edges pointing at the node back to their sources
    Incoming,
    /// Both of the above
    Undirected,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Outgoing => Direction::Outgoing,
            DirectionArg::Incoming => Direction::Incoming,
            DirectionArg::Undirected => Direction::Undirected,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "edgestore")]
#[command(about = "edgestore - typed, directed relationship store")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, uses the config file value
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (TOML or YAML)
    #[arg(short = 'C', long, global = true, env = "EDGESTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite database path (overrides config file; implies the sqlite backend)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
}

impl Cli {
    /// Filter directive for the tracing subscriber, if the command line sets one
    pub fn log_filter(&self) -> Option<LevelFilter> {
        match (self.log_level, self.verbose) {
            (Some(level), _) => Some(level.into()),
            (None, true) => Some(LevelFilter::DEBUG),
            (None, false) => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Insert an edge, replacing its properties if it already exists
    AddEdge {
        /// Source URN, e.g. urn:li:dataset:orders
        source: String,
        /// Destination URN
        destination: String,
        /// Relationship type, e.g. DownstreamOf
        relationship_type: String,
        /// Edge property as key=value; the value is parsed as JSON when possible
        #[arg(short, long = "property", value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },

    /// Print URNs related to the anchor side of the query, one per line
    Related(RelatedArgs),

    /// Remove edges of the given types incident to a node
    RemoveEdges {
        /// Node URN
        node: String,
        /// Relationship types to remove (repeatable)
        #[arg(short = 't', long = "type", required = true)]
        relationship_types: Vec<String>,
        /// Which incident edges count, relative to the node
        #[arg(short, long, value_enum, default_value_t)]
        direction: DirectionArg,
        /// Only remove edges whose other endpoint has this entity type
        #[arg(long)]
        other_type: Option<String>,
    },

    /// Remove every edge touching a node
    RemoveNode {
        /// Node URN
        node: String,
    },

    /// Remove all edges
    Clear,

    /// List relationship types currently in use
    Types,
}

#[derive(Args, Debug)]
pub struct RelatedArgs {
    /// Relationship types to traverse (repeatable)
    #[arg(short = 't', long = "type", required = true)]
    pub relationship_types: Vec<String>,

    /// Anchor entity type
    #[arg(long)]
    pub source_type: Option<String>,

    /// Anchor URN
    #[arg(long)]
    pub source_urn: Option<String>,

    /// Result entity type
    #[arg(long)]
    pub destination_type: Option<String>,

    /// Result URN
    #[arg(long)]
    pub destination_urn: Option<String>,

    /// Traversal direction relative to the anchor
    #[arg(short, long, value_enum, default_value_t)]
    pub direction: DirectionArg,

    /// Skip this many results
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,

    /// Return at most this many results
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub count: i64,
}
