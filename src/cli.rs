//! CLI argument parsing via clap.

use crate::output::OutputFormat;
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// A fast CLI for the Datadog API. Like dogshell, but better.
///
/// Query monitors, metrics, events, hosts, logs, and more from your terminal
/// with rich output and smart defaults.
///
/// Configuration: DD_API_KEY and DD_APP_KEY env vars, or profiles managed
/// with `dogctl config init`. DD_SITE selects the API site (default:
/// datadoghq.com; shortcuts us, eu, us3, us5, ap1, gov).
#[derive(Debug, Parser)]
#[command(
    name = "dogctl",
    version,
    long_version = Box::leak(crate::build_info::cli_version_text().into_boxed_str()) as &'static str,
    verbatim_doc_comment
)]
pub struct Cli {
    /// Credentials profile from ~/.config/dogctl/config.toml.
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Disable color output.
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Monitor management commands.
    #[command(subcommand)]
    Monitor(MonitorCommand),
    /// Metric query commands.
    #[command(subcommand)]
    Metric(MetricCommand),
    /// Event stream commands.
    #[command(subcommand)]
    Event(EventCommand),
    /// Host inventory commands.
    #[command(subcommand)]
    Host(HostCommand),
    /// Host tag commands.
    #[command(subcommand)]
    Tag(TagCommand),
    /// Downtime management commands.
    #[command(subcommand)]
    Downtime(DowntimeCommand),
    /// Log search commands.
    #[command(subcommand)]
    Logs(LogsCommand),
    /// Investigation workflows for troubleshooting.
    #[command(subcommand)]
    Investigate(InvestigateCommand),
    /// Configuration and profile management.
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate a shell completion script on stdout.
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Monitor state filter values, matching the API's `overall_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MonitorState {
    Alert,
    Warn,
    Ok,
    NoData,
}

impl MonitorState {
    /// The state string the API reports.
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Alert => "Alert",
            Self::Warn => "Warn",
            Self::Ok => "OK",
            Self::NoData => "No Data",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum MonitorCommand {
    /// List monitors.
    List {
        /// Filter by monitor tags (comma-separated).
        #[arg(long)]
        tags: Option<String>,
        /// Filter by state (repeatable).
        #[arg(long, value_enum)]
        state: Vec<MonitorState>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the raw JSON response to a file.
        #[arg(long)]
        output: Option<String>,
        /// Auto-refresh at intervals.
        #[arg(long)]
        watch: bool,
        /// Refresh interval in seconds.
        #[arg(long, default_value_t = 30)]
        interval: u64,
    },
    /// Get monitor details.
    Get {
        monitor_id: i64,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Create a monitor from inline flags or a JSON file.
    Create {
        /// Monitor type (e.g. "metric alert"). Required without -f.
        #[arg(long = "type")]
        monitor_type: Option<String>,
        /// Monitor query. Required without -f.
        #[arg(long)]
        query: Option<String>,
        /// Monitor name. Required without -f.
        #[arg(long)]
        name: Option<String>,
        /// Notification message.
        #[arg(long)]
        message: Option<String>,
        /// Tags (comma-separated).
        #[arg(long)]
        tags: Option<String>,
        /// Priority (1-5).
        #[arg(long)]
        priority: Option<i64>,
        /// JSON file with the monitor definition (`-` for stdin).
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Update a monitor by ID from inline flags or a JSON file.
    Update {
        monitor_id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        message: Option<String>,
        /// Tags (comma-separated).
        #[arg(long)]
        tags: Option<String>,
        /// Priority (1-5).
        #[arg(long)]
        priority: Option<i64>,
        /// JSON file with the update definition (`-` for stdin).
        #[arg(short = 'f', long = "file")]
        file: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Delete a monitor by ID.
    Delete {
        monitor_id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Mute a monitor.
    Mute {
        monitor_id: i64,
        /// Scope to mute (e.g. host:myhost).
        #[arg(long)]
        scope: Option<String>,
        /// Mute duration in seconds.
        #[arg(long)]
        duration: Option<i64>,
    },
    /// Unmute a monitor.
    Unmute {
        monitor_id: i64,
        /// Scope to unmute.
        #[arg(long)]
        scope: Option<String>,
    },
    /// Validate a monitor definition without creating it.
    Validate {
        /// Monitor type (e.g. "metric alert").
        #[arg(long = "type")]
        monitor_type: String,
        /// Monitor query.
        #[arg(long)]
        query: String,
    },
    /// Mute all monitors by creating a global downtime.
    MuteAll {
        /// Downtime message.
        #[arg(long)]
        message: Option<String>,
    },
    /// Unmute all monitors by cancelling global downtimes.
    UnmuteAll,
}

#[derive(Debug, Subcommand)]
pub enum MetricCommand {
    /// Run a metric query over a time range.
    Query {
        /// Query string, e.g. "avg:system.cpu.user{*}".
        query: String,
        /// Start time (e.g. 1h, 7d, 2026-02-10, now).
        #[arg(long, default_value = "1h")]
        from: String,
        /// End time.
        #[arg(long, default_value = "now")]
        to: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// List actively reporting metrics.
    List {
        /// How far back to look for activity.
        #[arg(long, default_value = "24h")]
        from: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EventPriority {
    Normal,
    Low,
}

impl EventPriority {
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AlertType {
    Error,
    Warning,
    Info,
    Success,
}

impl AlertType {
    pub fn api_name(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum EventCommand {
    /// List events in a time range.
    List {
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<EventPriority>,
        /// Filter by tags (comma-separated).
        #[arg(long)]
        tags: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the raw JSON response to a file.
        #[arg(long)]
        output: Option<String>,
    },
    /// Post a new event.
    Post {
        title: String,
        /// Event body text.
        #[arg(long)]
        text: Option<String>,
        /// Tags (comma-separated).
        #[arg(long)]
        tags: Option<String>,
        /// Alert type.
        #[arg(long, value_enum)]
        alert_type: Option<AlertType>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
pub enum HostCommand {
    /// List hosts.
    List {
        /// Host search filter (e.g. "env:prod").
        #[arg(long)]
        filter: Option<String>,
        /// Maximum hosts to return.
        #[arg(long, default_value_t = 100)]
        limit: u32,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the raw JSON response to a file.
        #[arg(long)]
        output: Option<String>,
    },
    /// Show total/up host counts.
    Totals {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Mute a host.
    Mute {
        hostname: String,
        /// Mute message.
        #[arg(long)]
        message: Option<String>,
        /// Epoch seconds when the mute ends.
        #[arg(long)]
        end: Option<i64>,
    },
    /// Unmute a host.
    Unmute { hostname: String },
}

#[derive(Debug, Subcommand)]
pub enum TagCommand {
    /// List all host tags.
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Get tags for one host.
    Get {
        hostname: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Add tags to a host.
    Add {
        hostname: String,
        /// Tags to add (comma-separated).
        tags: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DowntimeCommand {
    /// List downtimes.
    List {
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the raw JSON response to a file.
        #[arg(long)]
        output: Option<String>,
    },
    /// Schedule a downtime.
    Create {
        /// Scope to silence (e.g. "host:web-1" or "*").
        #[arg(long)]
        scope: String,
        /// Start time (defaults to now).
        #[arg(long)]
        from: Option<String>,
        /// End time (open-ended when omitted).
        #[arg(long)]
        to: Option<String>,
        /// Downtime message.
        #[arg(long)]
        message: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Cancel a downtime by ID.
    Cancel {
        downtime_id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum LogsCommand {
    /// Search logs.
    Search {
        /// Log search query, e.g. "status:error".
        query: String,
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        /// Maximum log events to return.
        #[arg(long, default_value_t = 50)]
        limit: u32,
        /// Restrict to one service.
        #[arg(long)]
        service: Option<String>,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
        /// Write the raw JSON response to a file.
        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum InvestigateCommand {
    /// Investigate high latency for a service.
    Latency {
        service: String,
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        /// Latency threshold in milliseconds.
        #[arg(long, default_value_t = 500)]
        threshold: u64,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Investigate error patterns for a service.
    Errors {
        service: String,
        #[arg(long, default_value = "1h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard to create a profile.
    Init,
    /// Create or update a profile.
    SetProfile {
        name: String,
        #[arg(long)]
        api_key: String,
        #[arg(long)]
        app_key: String,
        /// Site (us, eu, us3, us5, ap1, gov, or a full domain).
        #[arg(long, default_value = "us")]
        site: String,
    },
    /// Set the active profile.
    UseProfile { name: String },
    /// List configured profiles.
    List,
    /// Show the resolved configuration with keys masked.
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn monitor_list_parses_filters() {
        let cli = Cli::parse_from([
            "dogctl", "monitor", "list", "--tags", "env:prod", "--state", "alert", "--state",
            "no-data",
        ]);
        match cli.command {
            Command::Monitor(MonitorCommand::List { tags, state, .. }) => {
                assert_eq!(tags.as_deref(), Some("env:prod"));
                assert_eq!(state, [MonitorState::Alert, MonitorState::NoData]);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn global_profile_flag_works_after_subcommands() {
        let cli = Cli::parse_from(["dogctl", "host", "totals", "--profile", "prod"]);
        assert_eq!(cli.profile.as_deref(), Some("prod"));
    }

    #[test]
    fn metric_query_defaults_to_last_hour() {
        let cli = Cli::parse_from(["dogctl", "metric", "query", "avg:system.cpu.user{*}"]);
        match cli.command {
            Command::Metric(MetricCommand::Query { from, to, .. }) => {
                assert_eq!(from, "1h");
                assert_eq!(to, "now");
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn monitor_create_accepts_stdin_file_marker() {
        let cli = Cli::parse_from(["dogctl", "monitor", "create", "-f", "-"]);
        match cli.command {
            Command::Monitor(MonitorCommand::Create { file, .. }) => {
                assert_eq!(file.as_deref(), Some("-"));
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }

    #[test]
    fn monitor_state_maps_to_api_names() {
        assert_eq!(MonitorState::Ok.api_name(), "OK");
        assert_eq!(MonitorState::NoData.api_name(), "No Data");
    }

    #[test]
    fn investigate_latency_threshold_default() {
        let cli = Cli::parse_from(["dogctl", "investigate", "latency", "checkout"]);
        match cli.command {
            Command::Investigate(InvestigateCommand::Latency { threshold, .. }) => {
                assert_eq!(threshold, 500);
            }
            other => panic!("unexpected parse: {other:?}"),
        }
    }
}
