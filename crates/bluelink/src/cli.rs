//! Clap derive structures for the `bluelink` CLI.
//!
//! Also compiled by `build.rs` for man pages and completions, so this
//! module depends on nothing but clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// bluelink -- remote control for Hyundai Blue Link vehicles
#[derive(Debug, Parser)]
#[command(
    name = "bluelink",
    version,
    about = "Remote control for Hyundai Blue Link vehicles",
    long_about = "Lock, unlock, remote-start and locate a Blue Link connected vehicle.\n\n\
        Every vehicle command logs in first, discovers the enrolled vehicle,\n\
        then sends exactly one remote action.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Account profile to use
    #[arg(long, short = 'p', env = "BLUELINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Config file (TOML, or JSON by extension)
    #[arg(long, env = "BLUELINK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Gateway dialect (overrides profile)
    #[arg(long, env = "BLUELINK_DIALECT", global = true)]
    pub dialect: Option<DialectArg>,

    /// Gateway root URL (overrides profile)
    #[arg(long, env = "BLUELINK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "BLUELINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', env = "BLUELINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "BLUELINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DialectArg {
    /// Mobile app API: client id/secret token exchange
    Token,
    /// Owners portal: anti-forgery token and cookie session
    Session,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    /// Full heat, heated seats
    Winter,
    /// Full heat, heated seats, defrost
    Winter2,
    /// Full cooling, ventilated seats
    Summer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecretArg {
    Password,
    Pin,
    ClientSecret,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and show the discovered vehicle
    Login,

    /// Lock the doors
    Lock,

    /// Unlock the doors
    Unlock,

    /// Start the engine with climate control
    #[command(alias = "remote-start")]
    Start(StartArgs),

    /// Stop a remote start
    Stop,

    /// Locate the vehicle
    #[command(alias = "locate")]
    Find,

    /// Manage configuration
    #[command(alias = "cfg")]
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  START
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct StartArgs {
    /// Outdoor temperature in °F; picks cabin target and seat setting
    #[arg(long, default_value_t = 70.0, allow_negative_numbers = true)]
    pub temp: f64,

    /// Turn on the defroster
    #[arg(long)]
    pub defrost: bool,

    /// Send a fixed climate preset instead
    #[arg(long, value_enum, conflicts_with_all = ["temp", "defrost"])]
    pub preset: Option<PresetArg>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the loaded configuration (secrets redacted)
    Show,

    /// Print the config file path
    Path,

    /// Store a secret in the system keyring
    SetSecret {
        /// Which secret to store
        #[arg(value_enum)]
        secret: SecretArg,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
