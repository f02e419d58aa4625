use crate::export::ExportFormat;
use clap::{Parser, Subcommand};

/// Command-line interface definition for teamdeck
#[derive(Parser)]
#[command(
    name = "teamdeck",
    version = env!("CARGO_PKG_VERSION"),
    about = "Team collaboration CLI: sign in with a second factor, track tasks and read your dashboard",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update, no lockout wait)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    /// Pretend the current time is this instant (RFC3339 or YYYY-MM-DD)
    #[arg(global = true, long = "now", hide = true)]
    pub now: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        /// Print the current configuration file to stdout
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        /// Edit the configuration file with your preferred editor
        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        /// Specify the editor to use (overrides $EDITOR/$VISUAL).
        #[arg(long = "editor", help = "Specify the editor to use (vim, nano, or custom path)")]
        editor: Option<String>,
    },

    /// Sign in: username/password, then the 6-digit code
    ///
    /// Missing values are read from stdin. At the code prompt, type
    /// `resend` to have the code delivered again.
    Login {
        #[arg(long, short = 'u')]
        username: Option<String>,

        #[arg(long, short = 'p')]
        password: Option<String>,
    },

    /// Sign out (revoke the current session)
    Logout,

    /// Show where the current session lands
    Whoami,

    /// Manage tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Show the dashboard for the signed-in user
    Dashboard {
        /// Workload window in days (default from config)
        #[arg(long, short = 'w')]
        window: Option<u32>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Keep refreshing: check for task changes every N seconds
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,

        /// Stop watching after N refreshes
        #[arg(long, requires = "watch", hide = true)]
        max_refreshes: Option<usize>,
    },

    /// Export the dashboard report
    Export {
        /// Export format: csv, json
        #[arg(long, value_name = "FORMAT", value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        /// Output file path
        #[arg(long, value_name = "FILE")]
        file: String,

        /// Workload window in days (default from config)
        #[arg(long, short = 'w')]
        window: Option<u32>,

        /// Overwrite output file without confirmation
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Print the internal log table
    Log {
        /// Print rows from the internal `log` table
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Database maintenance
    Db {
        #[arg(long, help = "Run pending schema migrations")]
        migrate: bool,

        #[arg(long, help = "Run PRAGMA integrity_check")]
        check: bool,

        #[arg(long, help = "Compact the database file")]
        vacuum: bool,

        #[arg(long, help = "Show database statistics")]
        info: bool,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task
    Add {
        title: String,

        /// backlog, todo, in-progress, review, done
        #[arg(long, default_value = "todo")]
        status: String,

        /// low, medium, high
        #[arg(long, default_value = "medium")]
        priority: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Assignee user id (default: the signed-in user)
        #[arg(long)]
        assignee: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },

    /// List tasks
    List {
        /// Only tasks assigned to the signed-in user
        #[arg(long)]
        mine: bool,

        #[arg(long)]
        status: Option<String>,

        #[arg(long)]
        project: Option<String>,
    },

    /// Change the status of a task
    Status { id: i64, status: String },

    /// Delete a task
    Del { id: i64 },
}
