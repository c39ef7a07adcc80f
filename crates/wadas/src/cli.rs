//! Clap derive structures for the `wadas` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wadas -- admin console for the WADAS web server
#[derive(Debug, Parser)]
#[command(
    name = "wadas",
    version,
    about = "Administer a WADAS wild animal detection server from the command line",
    long_about = "Browse detection and actuation events, inspect cameras and actuators,\n\
        push actuator commands, export CSV reports and tail the server log.",
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
    /// Server profile to use
    #[arg(long, short = 'p', env = "WADAS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Web server URL (overrides profile)
    #[arg(long, short = 's', env = "WADAS_SERVER", global = true)]
    pub server: Option<String>,

    /// Login username (overrides profile)
    #[arg(long, short = 'u', env = "WADAS_USERNAME", global = true)]
    pub username: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WADAS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "WADAS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "WADAS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List cameras and their associated actuators
    #[command(alias = "cam")]
    Cameras(CamerasArgs),

    /// Inspect actuators and send them commands
    #[command(alias = "act")]
    Actuators(ActuatorsArgs),

    /// Browse and export detection events
    #[command(alias = "det")]
    Detections(DetectionsArgs),

    /// Browse and export actuation events
    Actuations(ActuationsArgs),

    /// Show or follow the server log
    Logs(LogsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Arguments ─────────────────────────────────────────────────

/// Page selection for event lists.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page to show (1-based)
    #[arg(long, default_value = "1")]
    pub page: u32,
}

/// Time window shared by both event filters.
#[derive(Debug, Args)]
pub struct DateRangeArgs {
    /// Only events at or after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,

    /// Only events at or before this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long)]
    pub until: Option<String>,
}

/// Where an export lands.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Target directory or file (default: current directory)
    #[arg(long, short = 'd')]
    pub dest: Option<PathBuf>,
}

// ── Cameras ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CamerasArgs {
    #[command(subcommand)]
    pub command: CamerasCommand,
}

#[derive(Debug, Subcommand)]
pub enum CamerasCommand {
    /// List cameras
    #[command(alias = "ls")]
    List,
}

// ── Actuators ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActuatorsArgs {
    #[command(subcommand)]
    pub command: ActuatorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ActuatorsCommand {
    /// List actuators
    #[command(alias = "ls")]
    List,

    /// Show an actuator's record and last reported telemetry
    Show {
        /// Actuator ID
        id: String,
    },

    /// Trigger the actuator's self-test
    Test {
        /// Actuator ID
        id: String,
    },

    /// Reboot the actuator
    Reboot {
        /// Actuator ID
        id: String,
    },

    /// Ask the actuator to upload a fresh log, then show it
    RefreshLog {
        /// Actuator ID
        id: String,
    },
}

// ── Detection events ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DetectionsArgs {
    #[command(subcommand)]
    pub command: DetectionsCommand,
}

#[derive(Debug, Subcommand)]
pub enum DetectionsCommand {
    /// List one page of detection events
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: DetectionFilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Export the matching detection events as CSV
    Export {
        #[command(flatten)]
        filter: DetectionFilterArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show the available filter values (cameras, animals)
    Options,
}

#[derive(Debug, Args)]
pub struct DetectionFilterArgs {
    /// Only events from this camera ID (repeatable)
    #[arg(long = "camera")]
    pub cameras: Vec<u64>,

    /// Only events where this animal was classified (repeatable)
    #[arg(long = "animal")]
    pub animals: Vec<String>,

    #[command(flatten)]
    pub range: DateRangeArgs,
}

// ── Actuation events ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ActuationsArgs {
    #[command(subcommand)]
    pub command: ActuationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ActuationsCommand {
    /// List one page of actuation events
    #[command(alias = "ls")]
    List {
        #[command(flatten)]
        filter: ActuationFilterArgs,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Export the matching actuation events as CSV
    Export {
        #[command(flatten)]
        filter: ActuationFilterArgs,

        #[command(flatten)]
        export: ExportArgs,
    },

    /// Show the available filter values (actuator types, commands)
    Options,
}

#[derive(Debug, Args)]
pub struct ActuationFilterArgs {
    /// Only events from this actuator type (repeatable)
    #[arg(long = "actuator-type")]
    pub actuator_types: Vec<String>,

    /// Only events carrying this command (repeatable)
    #[arg(long = "command")]
    pub commands: Vec<String>,

    #[command(flatten)]
    pub range: DateRangeArgs,
}

// ── Logs ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LogsArgs {
    /// Keep polling and print new lines until interrupted
    #[arg(long, short = 'f')]
    pub follow: bool,

    /// Poll period when following (e.g. "500ms", "2s")
    #[arg(long, value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Display the current configuration (passwords redacted)
    Show,

    /// Store a profile's password in the system keyring
    SetPassword,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Print the config file path
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
