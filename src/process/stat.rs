//! Positional parsing of the kernel's per-process stat record.
//!
//! `/proc/[pid]/stat` is one line of space-separated positional fields. The
//! second field (the executable name) is free text wrapped in parentheses;
//! everything after it is numeric. Only the fields the caller asked for are
//! parsed, and the scan stops at the last one it needs, so cheap column sets
//! never pay for the expensive late fields.

use std::time::Duration;

use crate::columns::{Column, ColumnSet};
use crate::error::Error;
use crate::process::ProcessRecord;
use crate::system::Units;

/// The highest stat field needed to fill `cols`. Zero when no stat field is
/// involved at all.
pub fn last_field(cols: ColumnSet) -> u32 {
    let mut last = 0;
    for col in cols.iter() {
        let f = match col {
            Column::Name => 2,
            Column::Ppid => 4,
            Column::Pgid => 5,
            Column::Utime => 14,
            Column::Stime => 15,
            Column::Cutime => 16,
            Column::Cstime | Column::CpuTime => 17,
            Column::NThreads => 20,
            Column::Uptime => 22,
            Column::Rss => 24,
            _ => 0,
        };
        last = last.max(f);
    }
    last
}

/// Parses one stat record into `p`, consuming positional fields up to and
/// including `last_field`, then stopping.
///
/// Field 1 (the PID) is skipped; the caller already knows it from the
/// directory entry. Time fields are converted with the run's unit constants,
/// and the process age is clamped at zero in case the process started after
/// the uptime reference was sampled.
pub fn parse(
    p: &mut ProcessRecord,
    stat: &[u8],
    uptime: Duration,
    units: &Units,
    last_field: u32,
) -> Result<(), Error> {
    let mut rest = stat;
    for field in 1..=last_field {
        while rest.first() == Some(&b' ') {
            rest = &rest[1..];
        }
        if field == 2 {
            // The name may itself contain spaces and parentheses, so it runs
            // from the first '(' to the last ')' in the record, not to the
            // first matching pair.
            if rest.first() != Some(&b'(') {
                return Err(Error::MalformedStat("missing '(' before name"));
            }
            let close = rest
                .iter()
                .rposition(|&b| b == b')')
                .ok_or(Error::MalformedStat("missing ')' after name"))?;
            p.name = String::from_utf8_lossy(&rest[1..close]).into_owned();
            rest = &rest[close + 1..];
            continue;
        }
        let end = rest
            .iter()
            .position(|&b| b == b' ' || b == b'\n')
            .unwrap_or(rest.len());
        let token = &rest[..end];
        rest = &rest[end..];
        if token.is_empty() {
            return Err(Error::MalformedStat("record ends before last field"));
        }
        match field {
            1 => {} // pid, known from the directory entry
            4 => p.ppid = parse_i32(token)?,
            5 => p.pgid = parse_i32(token)?,
            14 => p.utime = units.ticks(parse_u64(token)?),
            15 => p.stime = units.ticks(parse_u64(token)?),
            16 => p.cutime = units.ticks(parse_u64(token)?),
            17 => {
                p.cstime = units.ticks(parse_u64(token)?);
                p.cpu_time = p.utime + p.stime + p.cutime + p.cstime;
            }
            20 => p.nthreads = parse_i32(token)?,
            22 => {
                let start = units.ticks(parse_u64(token)?);
                p.age = uptime.saturating_sub(start);
            }
            24 => p.rss = parse_u64(token)?.saturating_mul(units.page_size),
            _ => {} // positional field nothing asked for
        }
    }
    Ok(())
}

fn parse_i32(b: &[u8]) -> Result<i32, Error> {
    std::str::from_utf8(b)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::MalformedStat("expected integer field"))
}

fn parse_u64(b: &[u8]) -> Result<u64, Error> {
    std::str::from_utf8(b)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(Error::MalformedStat("expected unsigned field"))
}
