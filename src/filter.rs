//! Post-aggregation row filtering.

use regex::Regex;

use crate::process::ProcessRecord;

/// A conjunction of optional predicates. A record must pass every active
/// predicate; zero or empty fields mean "not requested" and always pass.
///
/// Predicates are evaluated in a fixed order and short-circuit on the first
/// failure: self-exclusion, owner, name pattern, cmdline pattern, exact pid,
/// exact ppid, exact pgid.
#[derive(Debug, Default)]
pub struct Filter {
    /// Matched (unanchored) against the process name.
    pub name: Option<Regex>,
    /// Matched (unanchored) against the command line.
    pub cmd: Option<Regex>,
    pub pid: i32,
    pub ppid: i32,
    pub pgid: i32,
    /// A PID to exclude from the listing (the tool's own).
    pub self_pid: i32,
    /// Only include processes owned by this user.
    pub user: String,
}

impl Filter {
    pub fn include(&self, p: &ProcessRecord) -> bool {
        if self.self_pid != 0 && self.self_pid == p.pid {
            return false;
        }
        if !self.user.is_empty() && self.user != p.user {
            return false;
        }
        if let Some(re) = &self.name {
            if !re.is_match(&p.name) {
                return false;
            }
        }
        if let Some(re) = &self.cmd {
            if !re.is_match(&p.cmdline) {
                return false;
            }
        }
        if self.pid != 0 && self.pid != p.pid {
            return false;
        }
        if self.ppid != 0 && self.ppid != p.ppid {
            return false;
        }
        if self.pgid != 0 && self.pgid != p.pgid {
            return false;
        }
        true
    }
}
