use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the levelkeep binary.
#[derive(Debug, Parser)]
#[command(name = "levelkeep", version, about = "Hierarchical level store")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "LEVELKEEP_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print the merged view of a level.
    Get(LevelIdArgs),
    /// Print the merged views of the collection.
    List,
    /// Create or replace a level from a JSON payload.
    Put(PutArgs),
    /// Delete a level. Its children are left in place.
    Delete(LevelIdArgs),
    /// Serve `get|list|put|delete` lines from stdin against one store and
    /// one cache.
    Batch(BatchArgs),
    /// Apply database migrations.
    Migrate,
}

#[derive(Debug, Args, Clone, Default)]
pub struct BatchArgs {
    /// Use a store that lives only for this session instead of the database.
    #[arg(long = "ephemeral", action = clap::ArgAction::SetTrue)]
    pub ephemeral: bool,
}

#[derive(Debug, Args, Clone)]
pub struct LevelIdArgs {
    /// Level id.
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Debug, Args, Clone)]
pub struct PutArgs {
    /// Level id. Any `key` inside the payload is ignored.
    #[arg(value_name = "ID")]
    pub id: String,

    /// Payload file, or `-` for stdin.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath, default_value = "-")]
    pub payload: PathBuf,
}

impl PutArgs {
    pub fn reads_stdin(&self) -> bool {
        self.payload.as_os_str() == "-"
    }
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT", global = true)]
    pub database_max_connections: Option<u32>,

    /// Override the collection root that scopes every store query.
    #[arg(long = "collection-root", value_name = "KEY", global = true)]
    pub collection_root: Option<String>,

    /// Override the byte cache capacity.
    #[arg(long = "cache-capacity", value_name = "ENTRIES", global = true)]
    pub cache_capacity: Option<usize>,

    /// Override the listing page limit.
    #[arg(long = "page-limit", value_name = "COUNT", global = true)]
    pub page_limit: Option<u32>,
}
