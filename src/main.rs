//! procls - list processes from one /proc snapshot.
//!
//! The driver: parse arguments, initialize logging, take the snapshot,
//! filter it, and write the table.

use std::io;

use anyhow::{bail, Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::Level;

use procls::cli::{Args, LogLevel};
use procls::columns::{Column, ColumnSet};
use procls::filter::Filter;
use procls::process::Lister;
use procls::system;
use procls::table::Table;
use procls::users::UserCache;

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(&args);

    if args.list_cols {
        print_columns();
        return Ok(());
    }

    let cols = display_columns(&args)?;
    let (filter, need) = build_filter(&args, cols)?;

    let mut lister = Lister::new(need);
    let mut ps = lister.list().context("snapshotting /proc")?;
    ps.retain(|p| filter.include(p));

    let mut table = Table::new(cols, system::terminal_width());
    for p in &ps {
        table.push(p.cells(cols));
    }
    table
        .write_to(io::stdout().lock())
        .context("writing table")?;
    Ok(())
}

/// Initializes the tracing subscriber with the configured log level.
fn setup_logging(args: &Args) {
    let level = match args.log_level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// The columns to display, from --cols, --full, or the default set.
fn display_columns(args: &Args) -> Result<ColumnSet> {
    if let Some(spec) = &args.cols {
        let mut cols = ColumnSet::EMPTY;
        for name in spec.split(',') {
            let name = name.trim();
            match Column::by_name(name) {
                Some(col) => cols.insert(col),
                None => bail!("unknown column {name:?}; see --list-cols"),
            }
        }
        if cols.is_empty() {
            bail!("--cols needs at least one column");
        }
        Ok(cols)
    } else if args.full {
        Ok(ColumnSet::of(&[
            Column::Pid,
            Column::Ppid,
            Column::User,
            Column::Cmdline,
        ]))
    } else {
        Ok(ColumnSet::of(&[Column::Pid, Column::Name]))
    }
}

/// Builds the row filter and widens the displayed column set to everything
/// the active predicates need, so the engine parses no less and no more.
fn build_filter(args: &Args, cols: ColumnSet) -> Result<(Filter, ColumnSet)> {
    let mut need = cols;
    let mut filter = Filter::default();

    if !args.all {
        filter.self_pid = nix::unistd::getpid().as_raw();
        need.insert(Column::Pid);
        let mut users = UserCache::new();
        filter.user = users.current();
        if filter.user.is_empty() {
            bail!("cannot resolve the current user; use --all to list without an owner filter");
        }
        need.insert(Column::User);
    }
    if let Some(pat) = &args.name {
        filter.name = Some(Regex::new(pat).context("invalid --name pattern")?);
        need.insert(Column::Name);
    }
    if let Some(pat) = &args.cmd {
        filter.cmd = Some(Regex::new(pat).context("invalid --cmd pattern")?);
        need.insert(Column::Cmdline);
    }
    if let Some(pid) = args.pid {
        filter.pid = pid;
        need.insert(Column::Pid);
    }
    if let Some(ppid) = args.ppid {
        filter.ppid = ppid;
        need.insert(Column::Ppid);
    }
    if let Some(pgid) = args.pgid {
        filter.pgid = pgid;
        need.insert(Column::Pgid);
    }

    Ok((filter, need))
}

/// Prints the column registry for --list-cols.
fn print_columns() {
    let width = Column::ALL
        .iter()
        .map(|c| c.name().len())
        .max()
        .unwrap_or(0);
    for col in Column::ALL {
        println!("  {:width$}  {}", col.name(), col.description());
    }
}
