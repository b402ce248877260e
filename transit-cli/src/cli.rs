use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "TRANSIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the auth API (overrides the configuration file)
    #[arg(long, global = true, env = "TRANSIT_BASE_URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (overrides the configuration file)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and store the issued tokens
    Login {
        /// Account username
        #[arg(short, long)]
        username: String,

        /// Account password
        #[arg(short, long, env = "TRANSIT_PASSWORD", hide_env_values = true)]
        password: String,

        /// Requested access token lifetime in minutes
        #[arg(long)]
        expires_in_mins: Option<u32>,
    },

    /// Show the user behind the stored access token
    Me,

    /// Send an authenticated request
    Request {
        /// HTTP method
        method: String,

        /// Path (relative to the base URL) or absolute URL
        path: String,

        /// JSON request body
        #[arg(long)]
        body: Option<String>,
    },

    /// Show whether credentials are stored
    Status,

    /// Forget the stored credentials
    Logout,

    /// Show or reset the configuration
    Config {
        /// Print the current configuration
        #[arg(long)]
        show: bool,

        /// Reset the configuration to defaults
        #[arg(long)]
        reset: bool,
    },

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    JsonCompact,
}
