//! Host constants and terminal queries backing one snapshot run.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::Error;

/// Unit constants captured once per run and applied uniformly to every
/// process in that snapshot. Mixing constants from different runs in one
/// report would skew every derived metric, so they travel together.
#[derive(Debug, Clone, Copy)]
pub struct Units {
    /// Real-time duration of one scheduler accounting tick.
    pub clock_tick: Duration,
    /// Memory page size in bytes.
    pub page_size: u64,
}

impl Units {
    /// Discovers the host's clock tick and page size.
    pub fn discover() -> Units {
        Units {
            clock_tick: Duration::from_nanos(1_000_000_000 / clk_tck()),
            page_size: page_size(),
        }
    }

    /// Converts a tick count from a stat record into real time.
    pub fn ticks(&self, n: u64) -> Duration {
        Duration::from_nanos(n.saturating_mul(self.clock_tick.as_nanos() as u64))
    }
}

/// Get system clock ticks per second (usually 100, but can vary).
fn clk_tck() -> u64 {
    // SAFETY: sysconf is safe to call with _SC_CLK_TCK.
    // Returns -1 on error, 0 if undefined; both are handled by the > 0 check.
    let tck = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
    if tck > 0 {
        tck as u64
    } else {
        100
    }
}

fn page_size() -> u64 {
    // SAFETY: sysconf is safe to call with _SC_PAGESIZE.
    let sz = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if sz > 0 {
        sz as u64
    } else {
        4096
    }
}

/// Reads system uptime from `<proc_root>/uptime`.
///
/// Format: "<uptime_seconds> <idle_seconds>", fractional seconds.
pub fn read_uptime(proc_root: &Path) -> Result<Duration, Error> {
    parse_uptime(&fs::read_to_string(proc_root.join("uptime"))?)
}

fn parse_uptime(content: &str) -> Result<Duration, Error> {
    let secs: f64 = content
        .split_whitespace()
        .next()
        .ok_or(Error::MalformedUptime)?
        .parse()
        .map_err(|_| Error::MalformedUptime)?;
    Duration::try_from_secs_f64(secs).map_err(|_| Error::MalformedUptime)
}

/// Returns the terminal width of stdout, or 0 if stdout is not a terminal.
pub fn terminal_width() -> usize {
    // SAFETY: TIOCGWINSZ only writes into the winsize struct we hand it.
    unsafe {
        let mut ws: libc::winsize = std::mem::zeroed();
        if libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) == 0 {
            return ws.ws_col as usize;
        }
    }
    0
}
