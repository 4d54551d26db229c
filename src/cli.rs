//! CLI arguments for procls.

use clap::{Parser, ValueEnum};

/// Log level options for CLI parsing
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "procls",
    about = "List processes from one /proc snapshot",
    long_about = "List processes from one /proc snapshot.\n\n\
                  procls prints a table with one header row and one row per \
                  process. By default it lists the invoking user's processes, \
                  without procls itself, showing the pid and name columns. \
                  Filters narrow the listing; --cols, --full and --list-cols \
                  control which columns appear.",
    version
)]
pub struct Args {
    /// List processes from all users, including procls itself
    #[arg(short, long)]
    pub all: bool,

    /// Shorthand for --cols pid,ppid,user,cmdline
    #[arg(short, long, conflicts_with = "cols")]
    pub full: bool,

    /// Comma-separated list of columns to display (see --list-cols)
    #[arg(long, value_name = "COLS")]
    pub cols: Option<String>,

    /// Only list processes whose name matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub name: Option<String>,

    /// Only list processes whose command line matches this regular expression
    #[arg(long, value_name = "REGEX")]
    pub cmd: Option<String>,

    /// Only list the process with this process ID
    #[arg(long)]
    pub pid: Option<i32>,

    /// Only list processes with this parent process ID
    #[arg(long)]
    pub ppid: Option<i32>,

    /// Only list processes with this process group ID
    #[arg(long)]
    pub pgid: Option<i32>,

    /// Print the available columns and exit
    #[arg(long)]
    pub list_cols: bool,

    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, default_value = "warn")]
    pub log_level: LogLevel,
}
