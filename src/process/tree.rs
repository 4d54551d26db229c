//! Whole-snapshot parent/child aggregation.

use ahash::AHashMap as HashMap;

use crate::process::ProcessRecord;

/// Fills `nchild` and `ndesc` for every record in the snapshot.
///
/// The snapshot is not atomic, so the parent graph may be disconnected: a
/// record whose parent exited before enumeration simply contributes nothing
/// outside its fragment. Cycles cannot occur (a parent PID exists before any
/// of its children), so the generation walk below always terminates.
pub fn fill_child_desc(ps: &mut [ProcessRecord]) {
    let by_pid: HashMap<i32, usize> = ps.iter().enumerate().map(|(i, p)| (p.pid, i)).collect();

    for i in 0..ps.len() {
        let ppid = ps[i].ppid;
        if let Some(&parent) = by_pid.get(&ppid) {
            ps[parent].nchild += 1;
        }
    }

    // Generation walk: every record credits its parent, then the parent
    // stands in for it in the next generation, crediting the grandparent,
    // and so on up to the root set. Each (ancestor, descendant) pair is
    // counted exactly once at any depth.
    let mut current: Vec<usize> = (0..ps.len()).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &i in &current {
            if let Some(&parent) = by_pid.get(&ps[i].ppid) {
                ps[parent].ndesc += 1;
                next.push(parent);
            }
        }
        current = next;
    }
}
