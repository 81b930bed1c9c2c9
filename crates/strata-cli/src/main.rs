//! Strata CLI - operate a sharded event store directory from the command line.

use clap::{Parser, Subcommand};

mod commands;
mod config;
mod output;

use commands::{
    associate, associations, get, info, init, maintenance, more, prune, related, scan_keys, store,
};

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "Sharded, replicated event log operations CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a store directory
    Init {
        /// Store directory
        dir: String,
        /// Number of shards
        #[arg(long, default_value_t = 4)]
        shards: u16,
        /// Number of replicas per shard
        #[arg(long, default_value_t = 1)]
        replicas: u16,
    },
    /// Store a batch of events atomically
    Store {
        /// Store directory
        dir: String,
        /// Replica to write to
        #[arg(long)]
        replica: u16,
        /// Store timestamp in milliseconds (default: now)
        #[arg(long)]
        timestamp: Option<i64>,
        /// Events file: a JSON event object or array of them (stdin if omitted)
        #[arg(long)]
        file: Option<String>,
    },
    /// Query events by type and key
    Get {
        /// Store directory
        dir: String,
        /// Event type
        #[arg(long = "type")]
        event_type: String,
        /// Key (UTF-8 text, or base64url with --key-b64)
        #[arg(long)]
        key: String,
        /// Treat --key as base64url-no-pad
        #[arg(long)]
        key_b64: bool,
        /// Replica to query
        #[arg(long)]
        replica: u16,
        /// Minimum timestamp (inclusive)
        #[arg(long, default_value_t = 0)]
        since: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Query events related to an event through type associations
    Related {
        /// Store directory
        dir: String,
        /// File holding the anchor event as JSON (stdin if omitted)
        #[arg(long)]
        file: Option<String>,
        /// Replica to query
        #[arg(long)]
        replica: u16,
        /// Minimum timestamp (inclusive)
        #[arg(long, default_value_t = 0)]
        since: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resume a paged query from a cursor
    More {
        /// Store directory
        dir: String,
        /// Cursor printed by a previous get/related/more
        #[arg(long)]
        cursor: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Associate two event types in one partition
    Associate {
        /// Store directory
        dir: String,
        /// Shard to write to
        #[arg(long)]
        shard: u16,
        /// Replica to write to
        #[arg(long)]
        replica: u16,
        /// First type
        type1: String,
        /// Second type
        type2: String,
    },
    /// List the types associated with a type
    Associations {
        /// Store directory
        dir: String,
        /// Shard to query
        #[arg(long)]
        shard: u16,
        /// Replica to query
        #[arg(long)]
        replica: u16,
        /// Event type
        event_type: String,
    },
    /// List the distinct keys in one partition
    ScanKeys {
        /// Store directory
        dir: String,
        /// Shard to query
        #[arg(long)]
        shard: u16,
        /// Replica to query
        #[arg(long)]
        replica: u16,
    },
    /// Compact cancelling pairs in one partition
    Maintenance {
        /// Store directory
        dir: String,
        /// Shard to maintain
        #[arg(long)]
        shard: u16,
        /// Replica to maintain
        #[arg(long)]
        replica: u16,
    },
    /// Delete every event and association of a type in one partition
    Prune {
        /// Store directory
        dir: String,
        /// Shard to prune
        #[arg(long)]
        shard: u16,
        /// Replica to prune
        #[arg(long)]
        replica: u16,
        /// Event type to prune
        event_type: String,
    },
    /// Show store configuration
    Info {
        /// Store directory
        dir: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init {
            dir,
            shards,
            replicas,
        } => init::run(dir, shards, replicas),
        Commands::Store {
            dir,
            replica,
            timestamp,
            file,
        } => store::run(dir, replica, timestamp, file),
        Commands::Get {
            dir,
            event_type,
            key,
            key_b64,
            replica,
            since,
            json,
        } => get::run(dir, event_type, key, key_b64, replica, since, json),
        Commands::Related {
            dir,
            file,
            replica,
            since,
            json,
        } => related::run(dir, file, replica, since, json),
        Commands::More { dir, cursor, json } => more::run(dir, cursor, json),
        Commands::Associate {
            dir,
            shard,
            replica,
            type1,
            type2,
        } => associate::run(dir, shard, replica, type1, type2),
        Commands::Associations {
            dir,
            shard,
            replica,
            event_type,
        } => associations::run(dir, shard, replica, event_type),
        Commands::ScanKeys {
            dir,
            shard,
            replica,
        } => scan_keys::run(dir, shard, replica),
        Commands::Maintenance {
            dir,
            shard,
            replica,
        } => maintenance::run(dir, shard, replica),
        Commands::Prune {
            dir,
            shard,
            replica,
            event_type,
        } => prune::run(dir, shard, replica, event_type),
        Commands::Info { dir } => info::run(dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
