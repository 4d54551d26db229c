//! The column registry: everything the table can display, in canonical
//! order, with display names, descriptions, and alignment.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;

/// One displayable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Pid,
    Ppid,
    User,
    Name,
    Pgid,
    Rss,
    Uptime,
    Utime,
    Stime,
    Cutime,
    Cstime,
    CpuTime,
    NThreads,
    NFds,
    NChild,
    NDesc,
    Cmdline,
}

impl Column {
    /// Canonical display order. A `ColumnSet` always iterates in this order
    /// no matter how it was assembled.
    pub const ALL: [Column; 17] = [
        Column::Pid,
        Column::Ppid,
        Column::User,
        Column::Name,
        Column::Pgid,
        Column::Rss,
        Column::Uptime,
        Column::Utime,
        Column::Stime,
        Column::Cutime,
        Column::Cstime,
        Column::CpuTime,
        Column::NThreads,
        Column::NFds,
        Column::NChild,
        Column::NDesc,
        Column::Cmdline,
    ];

    fn bit(self) -> u32 {
        1 << self as u32
    }

    /// The display name, doubling as the `--cols` spelling.
    pub fn name(self) -> &'static str {
        match self {
            Column::Pid => "pid",
            Column::Ppid => "ppid",
            Column::User => "user",
            Column::Name => "name",
            Column::Pgid => "pgid",
            Column::Rss => "rss",
            Column::Uptime => "uptime",
            Column::Utime => "utime",
            Column::Stime => "stime",
            Column::Cutime => "cutime",
            Column::Cstime => "cstime",
            Column::CpuTime => "cputime",
            Column::NThreads => "nthreads",
            Column::NFds => "nfds",
            Column::NChild => "nchild",
            Column::NDesc => "ndesc",
            Column::Cmdline => "cmdline",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Column::Pid => "Process ID",
            Column::Ppid => "Parent process ID",
            Column::User => "Username of the process owner",
            Column::Name => "Executable name as the kernel reports it",
            Column::Pgid => "Process group ID",
            Column::Rss => "Resident set size, excluding children",
            Column::Uptime => "Wall-clock time since the process started",
            Column::Utime => "Time scheduled in user mode",
            Column::Stime => "Time scheduled in kernel mode",
            Column::Cutime => "User-mode time of reaped children",
            Column::Cstime => "Kernel-mode time of reaped children",
            Column::CpuTime => "Total CPU time (utime+stime+cutime+cstime)",
            Column::NThreads => "Number of threads",
            Column::NFds => "Number of open file descriptors",
            Column::NChild => "Number of child processes",
            Column::NDesc => "Number of descendant processes",
            Column::Cmdline => "Command line",
        }
    }

    /// Numeric columns are right-aligned; text columns left-aligned.
    pub fn right_aligned(self) -> bool {
        !matches!(self, Column::User | Column::Name | Column::Cmdline)
    }

    /// Looks up a column by its display name.
    pub fn by_name(name: &str) -> Option<Column> {
        static BY_NAME: Lazy<HashMap<&'static str, Column>> =
            Lazy::new(|| Column::ALL.iter().map(|&c| (c.name(), c)).collect());
        BY_NAME.get(name).copied()
    }
}

/// A set of columns, iterated in canonical order regardless of how it was
/// built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnSet(u32);

impl ColumnSet {
    pub const EMPTY: ColumnSet = ColumnSet(0);

    pub fn of(cols: &[Column]) -> ColumnSet {
        let mut set = ColumnSet::EMPTY;
        for &col in cols {
            set.insert(col);
        }
        set
    }

    pub fn insert(&mut self, col: Column) {
        self.0 |= col.bit();
    }

    pub fn contains(self, col: Column) -> bool {
        self.0 & col.bit() != 0
    }

    pub fn intersects(self, other: ColumnSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Column> {
        Column::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}
