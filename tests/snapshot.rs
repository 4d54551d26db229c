//! Integration tests for the snapshot engine, against both a synthetic
//! proc root and the live /proc.

use std::fs;
use std::path::Path;
use std::time::Duration;

use procls::{Column, ColumnSet, Filter, Lister, Units};

fn test_units() -> Units {
    Units {
        clock_tick: Duration::from_millis(10),
        page_size: 4096,
    }
}

/// Writes one synthetic pid directory: a stat record, a cmdline blob, and an
/// fd directory with `nfds` entries.
fn add_process(root: &Path, pid: i32, name: &str, ppid: i32, cmdline: &[u8], nfds: usize) {
    let dir = root.join(pid.to_string());
    fs::create_dir(&dir).unwrap();
    let stat = format!(
        "{pid} ({name}) S {ppid} {pid} 0 0 -1 0 0 0 0 0 100 50 5 7 0 0 2 0 500 0 2 0 0\n"
    );
    fs::write(dir.join("stat"), stat).unwrap();
    fs::write(dir.join("cmdline"), cmdline).unwrap();
    let fd_dir = dir.join("fd");
    fs::create_dir(&fd_dir).unwrap();
    for i in 0..nfds {
        fs::write(fd_dir.join(i.to_string()), b"").unwrap();
    }
}

fn all_columns() -> ColumnSet {
    ColumnSet::of(&Column::ALL)
}

#[test]
fn synthetic_snapshot_end_to_end() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("uptime"), "1000.00 1234.56\n").unwrap();

    add_process(root, 1, "init", 0, b"/sbin/init\0", 3);
    add_process(root, 2, "worker", 1, b"worker\0--threads\0", 0);
    add_process(root, 3, "spawner", 1, b"spawner\0", 1);
    add_process(root, 4, "leaf", 3, b"leaf\0", 2);

    // Entries a snapshot must tolerate: a non-numeric name, a process that
    // vanished after enumeration, and an unparseable stat record.
    fs::create_dir(root.join("sys")).unwrap();
    fs::create_dir(root.join("99")).unwrap();
    let broken = root.join("100");
    fs::create_dir(&broken).unwrap();
    fs::write(broken.join("stat"), "100 no-parens-here S 1 1\n").unwrap();

    let mut lister = Lister::with_root(root, all_columns(), test_units());
    let mut ps = lister.list().unwrap();
    ps.sort_by_key(|p| p.pid);

    let pids: Vec<i32> = ps.iter().map(|p| p.pid).collect();
    assert_eq!(pids, vec![1, 2, 3, 4]);

    let init = &ps[0];
    assert_eq!(init.name, "init");
    assert_eq!(init.ppid, 0);
    assert_eq!(init.pgid, 1);
    assert_eq!(init.cmdline, "/sbin/init");
    assert_eq!(init.utime, Duration::from_millis(1000));
    assert_eq!(init.stime, Duration::from_millis(500));
    assert_eq!(init.cpu_time, Duration::from_millis(1620));
    assert_eq!(init.nthreads, 2);
    // uptime 1000s - 500 ticks (5s) start time
    assert_eq!(init.age, Duration::from_secs(995));
    assert_eq!(init.rss, 2 * 4096);
    assert_eq!(init.nfds, Some(3));

    // Tree counts: 1 -> {2, 3}, 3 -> {4}.
    assert_eq!((init.nchild, init.ndesc), (2, 3));
    let spawner = &ps[2];
    assert_eq!((spawner.nchild, spawner.ndesc), (1, 1));
    let leaf = &ps[3];
    assert_eq!((leaf.nchild, leaf.ndesc), (0, 0));
    assert_eq!(leaf.nfds, Some(2));

    assert_eq!(ps[1].cmdline, "worker --threads");
}

#[test]
fn snapshot_reads_only_requested_columns() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("uptime"), "50.00 0.00\n").unwrap();

    // No cmdline file and no fd directory: a lister that was not asked for
    // those columns must never touch them.
    let dir = root.join("7");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("stat"), "7 (lean) S 1 7 0 0 -1 0 0 0 0 0 1 1 0 0 0 0 1 0 100 0 1 0 0\n")
        .unwrap();

    let need = ColumnSet::of(&[Column::Pid, Column::Name, Column::Ppid]);
    let mut lister = Lister::with_root(root, need, test_units());
    let ps = lister.list().unwrap();
    assert_eq!(ps.len(), 1);
    assert_eq!(ps[0].name, "lean");
    assert_eq!(ps[0].ppid, 1);
    // Unrequested metrics keep their defaults.
    assert_eq!(ps[0].cmdline, "");
    assert_eq!(ps[0].nfds, None);
    assert_eq!((ps[0].nchild, ps[0].ndesc), (0, 0));
}

#[test]
fn missing_uptime_is_fatal() {
    let tmp = tempfile::tempdir().unwrap();
    let mut lister = Lister::with_root(tmp.path(), all_columns(), test_units());
    assert!(lister.list().is_err());
}

#[test]
fn filter_applies_after_aggregation() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path();
    fs::write(root.join("uptime"), "1000.00 0.00\n").unwrap();
    add_process(root, 1, "parent", 0, b"parent\0", 0);
    add_process(root, 2, "child", 1, b"child --verbose\0", 0);

    let mut lister = Lister::with_root(root, all_columns(), test_units());
    let mut ps = lister.list().unwrap();
    let filter = Filter {
        name: Some(regex::Regex::new("^par").unwrap()),
        ..Default::default()
    };
    ps.retain(|p| filter.include(p));

    // The surviving parent keeps tree counts computed over the whole
    // snapshot, including the filtered-out child.
    assert_eq!(ps.len(), 1);
    assert_eq!(ps[0].name, "parent");
    assert_eq!((ps[0].nchild, ps[0].ndesc), (1, 1));
}

#[test]
fn live_proc_includes_current_process() {
    let need = ColumnSet::of(&[
        Column::Pid,
        Column::Ppid,
        Column::Name,
        Column::Uptime,
        Column::CpuTime,
        Column::Rss,
        Column::NFds,
    ]);
    let mut lister = Lister::new(need);
    let ps = lister.list().expect("snapshotting live /proc failed");
    assert!(!ps.is_empty());

    let me = std::process::id() as i32;
    let p = ps
        .iter()
        .find(|p| p.pid == me)
        .expect("current process missing from snapshot");
    assert!(!p.name.is_empty());
    assert_eq!(p.cpu_time, p.utime + p.stime + p.cutime + p.cstime);
    assert!(p.ppid > 0);
    // Our own fd directory is always readable; stdio alone guarantees a few.
    assert!(p.nfds.expect("own fd count unknown") >= 1);
}
