//! Clap derive structures for the `netop` CLI.
//!
//! Defines the complete command tree, global flags, and shared value types.
//! Kept free of workspace-crate imports so `build.rs` can include it for
//! man page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netop -- network incident dashboard for the terminal
#[derive(Debug, Parser)]
#[command(
    name = "netop",
    version,
    about = "Track network incidents, sites and devices from the command line",
    long_about = "A command-line dashboard for NetOp network operations.\n\n\
        Lists and triages incidents, shows site and device health, and manages\n\
        notification preferences. Use --demo to explore a built-in dataset\n\
        without an account.",
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
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "NETOP_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Incident API base URL (overrides profile)
    #[arg(long, env = "NETOP_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Use the built-in demo dataset (persists until `auth logout`)
    #[arg(long, env = "NETOP_DEMO", global = true)]
    pub demo: bool,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETOP_OUTPUT",
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

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETOP_TIMEOUT", global = true)]
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

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SeverityArg {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum StatusArg {
    /// Every status
    #[default]
    All,
    #[value(alias = "active")]
    Open,
    #[value(alias = "in-progress", alias = "in_progress")]
    Investigating,
    Resolved,
    Closed,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CategoryArg {
    Operational,
    NetworkUtilization,
    NetworkPerformance,
    #[value(alias = "performance")]
    ServicePerformance,
    ResourceUtilization,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChannelArg {
    Push,
    Email,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GroupBy {
    Status,
    Severity,
    Category,
    Site,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect and triage incidents
    #[command(alias = "inc", alias = "i")]
    Incidents(IncidentsArgs),

    /// View sites
    Sites(SitesArgs),

    /// View monitored devices
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Manage notification preferences
    #[command(alias = "notif", alias = "n")]
    Notifications(NotificationsArgs),

    /// View and change app settings
    Settings(SettingsArgs),

    /// Headline numbers: active incidents, site and device health
    #[command(alias = "home")]
    Dashboard,

    /// Log in, log out and inspect the current session
    Auth(AuthArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INCIDENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IncidentsArgs {
    #[command(subcommand)]
    pub command: IncidentsCommand,
}

/// Filters shared by `incidents list` and `incidents counts`.
#[derive(Debug, Default, Args)]
pub struct IncidentFilterArgs {
    /// Only incidents in this status
    #[arg(long, value_enum, default_value_t = StatusArg::All)]
    pub status: StatusArg,

    /// Only incidents of this severity
    #[arg(long, value_enum)]
    pub severity: Option<SeverityArg>,

    /// Only incidents in this category
    #[arg(long, value_enum)]
    pub category: Option<CategoryArg>,

    /// Only incidents at this site (name or ID)
    #[arg(long)]
    pub site: Option<String>,

    /// Case-insensitive search over title, site and device
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum IncidentsCommand {
    /// List incidents
    #[command(alias = "ls")]
    List(IncidentFilterArgs),

    /// Show one incident
    Get {
        /// Incident ID
        id: String,
    },

    /// Mark an incident as reviewed
    Review {
        /// Incident ID
        id: String,
    },

    /// Move an incident forward in its lifecycle
    Status {
        /// Incident ID
        id: String,

        /// New status
        #[arg(value_enum)]
        status: StatusArg,
    },

    /// Attach an analysis note to an incident
    Insight {
        /// Incident ID
        id: String,

        /// Note text
        text: String,
    },

    /// Count incidents grouped by a field
    Counts {
        /// Field to group by
        #[arg(long, value_enum, default_value = "severity")]
        by: GroupBy,

        #[command(flatten)]
        filter: IncidentFilterArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SITES / DEVICES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites
    #[command(alias = "ls")]
    List,

    /// Show one site with its devices
    Get {
        /// Site ID
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct DevicesArgs {
    #[command(subcommand)]
    pub command: DevicesCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DeviceStatusArg {
    Online,
    Offline,
    Degraded,
}

#[derive(Debug, Subcommand)]
pub enum DevicesCommand {
    /// List devices
    #[command(alias = "ls")]
    List {
        /// Only devices at this site ID
        #[arg(long)]
        site: Option<String>,

        /// Only devices in this state
        #[arg(long, value_enum)]
        status: Option<DeviceStatusArg>,
    },

    /// Show one device
    Get {
        /// Device ID
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  NOTIFICATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct NotificationsArgs {
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// List notification preferences
    #[command(alias = "ls")]
    List {
        #[arg(long, value_enum)]
        category: Option<CategoryArg>,

        #[arg(long, value_enum)]
        severity: Option<SeverityArg>,
    },

    /// Enable notifications for a category and severity
    Enable {
        #[arg(value_enum)]
        category: CategoryArg,
        #[arg(value_enum)]
        severity: SeverityArg,
    },

    /// Disable notifications for a category and severity
    Disable {
        #[arg(value_enum)]
        category: CategoryArg,
        #[arg(value_enum)]
        severity: SeverityArg,
    },

    /// Switch a delivery channel of one preference on or off
    Channel {
        /// Preference ID
        id: String,
        #[arg(value_enum)]
        channel: ChannelArg,
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Turn on every channel for all critical alerts
    Critical,

    /// Switch every preference of one severity on or off
    Severity {
        #[arg(value_enum)]
        severity: SeverityArg,
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Count active rules and channels
    Summary,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SETTINGS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show app settings
    Show,

    /// Change one or more app settings
    #[command(arg_required_else_help = true)]
    Set {
        #[arg(long)]
        dark_mode: Option<bool>,
        #[arg(long)]
        auto_refresh: Option<bool>,
        #[arg(long)]
        notifications: Option<bool>,
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        vibration: Option<bool>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommand,
}

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Show who is signed in and how
    Status,

    /// Sign in through the identity provider
    Login {
        /// Authorization code from the redirect (skips the prompt)
        #[arg(long)]
        code: Option<String>,
    },

    /// Sign out, or leave demo mode
    Logout,

    /// Print a bearer token for the API
    Token,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store the identity client secret in the system keyring
    SetSecret {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
