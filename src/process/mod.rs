//! The process-snapshot engine: enumerate the PID directories, parse each
//! process, and aggregate the results.

pub mod fd;
pub mod read;
pub mod stat;
pub mod tree;

use std::ffi::OsStr;
use std::fs::{self, File};
use std::os::unix::fs::MetadataExt;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

use crate::columns::{Column, ColumnSet};
use crate::error::Error;
use crate::system::{self, Units};
use crate::table::Cell;
use crate::users::UserCache;

use fd::FdCounter;
use read::ScratchReader;

/// One process's derived facts at the instant the snapshot read it.
///
/// A record is either fully populated for the requested columns or not
/// produced at all; the exceptions are `nfds` (unknown when the fd directory
/// is unreadable) and the tree counts, which stay zero unless a tree column
/// was requested. After aggregation a record is never mutated again.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i32,
    pub pgid: i32,
    pub name: String,
    pub cmdline: String,
    pub user: String,
    /// Resident set size in bytes.
    pub rss: u64,
    /// Wall-clock time since the process started.
    pub age: Duration,
    pub utime: Duration,
    pub stime: Duration,
    pub cutime: Duration,
    pub cstime: Duration,
    pub cpu_time: Duration,
    pub nthreads: i32,
    /// Open file descriptors; `None` when the fd directory was unreadable.
    pub nfds: Option<u64>,
    pub nchild: u64,
    pub ndesc: u64,
}

impl ProcessRecord {
    /// Produces this record's cells for `cols`, in canonical column order.
    /// Each value carries its formatting rule; the table never inspects a
    /// cell to decide how to render it.
    pub fn cells(&self, cols: ColumnSet) -> Vec<Cell> {
        cols.iter()
            .map(|col| match col {
                Column::Pid => Cell::Text(self.pid.to_string()),
                Column::Ppid => Cell::Text(self.ppid.to_string()),
                Column::User => Cell::Text(self.user.clone()),
                Column::Name => Cell::Text(self.name.clone()),
                Column::Pgid => Cell::Text(self.pgid.to_string()),
                Column::Rss => Cell::Size(self.rss),
                Column::Uptime => Cell::Duration(self.age),
                Column::Utime => Cell::Duration(self.utime),
                Column::Stime => Cell::Duration(self.stime),
                Column::Cutime => Cell::Duration(self.cutime),
                Column::Cstime => Cell::Duration(self.cstime),
                Column::CpuTime => Cell::Duration(self.cpu_time),
                Column::NThreads => Cell::Text(self.nthreads.to_string()),
                Column::NFds => Cell::Count(self.nfds),
                Column::NChild => Cell::Text(self.nchild.to_string()),
                Column::NDesc => Cell::Text(self.ndesc.to_string()),
                Column::Cmdline => Cell::Text(self.cmdline.clone()),
            })
            .collect()
    }
}

/// Drives one snapshot: enumeration, per-process parsing, and tree
/// aggregation when a tree column is requested. The scratch buffers live
/// here and are reused sequentially across processes.
pub struct Lister {
    proc_root: PathBuf,
    need: ColumnSet,
    last_stat_field: u32,
    units: Units,
    uptime: Duration,
    reader: ScratchReader,
    fds: FdCounter,
    users: UserCache,
}

impl Lister {
    /// Creates a lister over `/proc` with host-discovered unit constants.
    ///
    /// `need` is every column the caller will read, displayed or implied by
    /// a filter; the engine reads no more than it asks for.
    pub fn new(need: ColumnSet) -> Lister {
        Lister::with_root("/proc", need, Units::discover())
    }

    /// Creates a lister over an arbitrary proc root. Tests point this at a
    /// synthetic tree.
    pub fn with_root(root: impl Into<PathBuf>, need: ColumnSet, units: Units) -> Lister {
        Lister {
            proc_root: root.into(),
            need,
            // Name extraction doubles as the record-structure check, so the
            // parse always runs through field 2 even for bare column sets.
            last_stat_field: stat::last_field(need).max(2),
            units,
            uptime: Duration::ZERO,
            reader: ScratchReader::new(),
            fds: FdCounter::new(),
            users: UserCache::new(),
        }
    }

    /// Takes the snapshot.
    ///
    /// Vanished processes and unparseable stat records are skipped (the
    /// listing reflects expected churn, not a fault); any other error is
    /// fatal to the run. Tree aggregation runs once, after every record is
    /// fully populated.
    pub fn list(&mut self) -> Result<Vec<ProcessRecord>, Error> {
        self.uptime = system::read_uptime(&self.proc_root)?;
        let mut ps = Vec::new();
        for entry in fs::read_dir(&self.proc_root)? {
            let entry = entry?;
            let Some(pid) = numeric_name(&entry.file_name()) else {
                continue;
            };
            match self.load(pid, &entry) {
                Ok(p) => ps.push(p),
                Err(e) if e.is_vanished() => {
                    debug!(pid, "process vanished mid-snapshot: {e}");
                }
                Err(e @ Error::MalformedStat(_)) => {
                    warn!(pid, "skipping unparseable stat record: {e}");
                }
                Err(e) => return Err(e),
            }
        }
        if self
            .need
            .intersects(ColumnSet::of(&[Column::NChild, Column::NDesc]))
        {
            tree::fill_child_desc(&mut ps);
        }
        Ok(ps)
    }

    fn load(&mut self, pid: i32, entry: &fs::DirEntry) -> Result<ProcessRecord, Error> {
        let mut p = ProcessRecord {
            pid,
            ..Default::default()
        };

        if self.need.contains(Column::User) {
            let uid = entry.metadata()?.uid();
            p.user = self.users.name(uid).to_string();
        }

        let base = entry.path();

        let stat_file = File::open(base.join("stat"))?;
        let raw = self.reader.read_all(&stat_file)?;
        stat::parse(&mut p, raw, self.uptime, &self.units, self.last_stat_field)?;

        if self.need.contains(Column::Cmdline) {
            let f = File::open(base.join("cmdline"))?;
            let raw = self.reader.read_all(&f)?;
            p.cmdline = cmdline_string(raw);
        }

        if self.need.contains(Column::NFds) {
            p.nfds = self.fds.count(&base.join("fd"))?;
            if p.nfds.is_none() {
                debug!(pid, "fd directory unreadable, count unknown");
            }
        }

        Ok(p)
    }
}

/// Renders the null-separated argument vector as one space-joined string.
fn cmdline_string(raw: &[u8]) -> String {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|&b| if b == 0 { b' ' } else { b })
        .collect();
    String::from_utf8_lossy(&spaced).trim().to_string()
}

/// PID directory names are pure ASCII digits; everything else in the proc
/// root (self, uptime, sys, ...) is skipped.
fn numeric_name(name: &OsStr) -> Option<i32> {
    let name = name.to_str()?;
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cmdline_joins_null_separated_args() {
        assert_eq!(cmdline_string(b"/bin/sh\0-c\0sleep 1\0"), "/bin/sh -c sleep 1");
        assert_eq!(cmdline_string(b"bare"), "bare");
        assert_eq!(cmdline_string(b""), "");
        assert_eq!(cmdline_string(b"\0\0"), "");
    }

    #[test]
    fn numeric_names_only() {
        assert_eq!(numeric_name(OsStr::new("1")), Some(1));
        assert_eq!(numeric_name(OsStr::new("4711")), Some(4711));
        assert_eq!(numeric_name(OsStr::new("self")), None);
        assert_eq!(numeric_name(OsStr::new("12a")), None);
        assert_eq!(numeric_name(OsStr::new("-1")), None);
        assert_eq!(numeric_name(OsStr::new("")), None);
        // Larger than any real PID; must not wrap around.
        assert_eq!(numeric_name(OsStr::new("99999999999999999999")), None);
    }
}
