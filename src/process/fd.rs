//! Open-descriptor counting via raw directory reads.
//!
//! Counting the entries of `/proc/[pid]/fd` is the hot path when the fd
//! column is requested for every process on a busy machine, so this reads
//! raw dirent records with `getdents64` and never materializes entry names.

use std::fs::File;
use std::io;
use std::os::fd::AsRawFd;
use std::path::Path;

/// One I/O block; getdents64 needs at least this much buffer space.
const BLOCK_SIZE: usize = 4096;

/// Fixed offsets into the kernel's linux_dirent64 layout.
const DIRENT_INO_OFFSET: usize = 0; // d_ino, u64
const DIRENT_RECLEN_OFFSET: usize = 16; // d_reclen, u16

/// Counts directory entries without allocating per-entry names.
///
/// The scratch buffer grows one block at a time and is retained across
/// calls, so counting descriptors for a whole snapshot settles into
/// zero-allocation steady state.
#[derive(Debug, Default)]
pub struct FdCounter {
    buf: Vec<u8>,
}

impl FdCounter {
    pub fn new() -> FdCounter {
        FdCounter::default()
    }

    /// Counts the entries of the directory at `path`, excluding "." and
    /// "..". Returns `Ok(None)` when the directory is unreadable for
    /// permission reasons; the caller reports the count as unknown.
    pub fn count(&mut self, path: &Path) -> io::Result<Option<u64>> {
        let dir = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => return Ok(None),
            Err(e) => return Err(e),
        };
        let filled = self.fill(&dir)?;
        Ok(Some(count_entries(&self.buf[..filled])))
    }

    /// Reads raw dirent records until end of stream. Returns the number of
    /// buffer bytes filled.
    fn fill(&mut self, dir: &File) -> io::Result<usize> {
        let mut filled = 0;
        loop {
            if self.buf.len() - filled < BLOCK_SIZE {
                // Linear growth; the buffer stops growing at the largest
                // directory seen in the run.
                self.buf.resize(self.buf.len() + BLOCK_SIZE, 0);
            }
            let avail = &mut self.buf[filled..];
            // SAFETY: the pointer and length describe a live writable slice,
            // and getdents64 writes at most `avail.len()` bytes into it.
            let n = unsafe {
                libc::syscall(
                    libc::SYS_getdents64,
                    dir.as_raw_fd(),
                    avail.as_mut_ptr() as *mut libc::c_void,
                    avail.len(),
                )
            };
            if n < 0 {
                return Err(io::Error::last_os_error());
            }
            if n == 0 {
                return Ok(filled);
            }
            filled += n as usize;
        }
    }
}

/// Walks the raw dirent records in `buf`, counting live entries. An inode of
/// zero marks a deleted-but-still-listed slot and does not count. The two
/// pseudo-entries every directory carries ("." and "..") are subtracted.
fn count_entries(buf: &[u8]) -> u64 {
    let mut count: i64 = 0;
    let mut rest = buf;
    while !rest.is_empty() {
        let Some(reclen) = read_u16(rest, DIRENT_RECLEN_OFFSET) else {
            break;
        };
        let reclen = reclen as usize;
        if reclen == 0 || reclen > rest.len() {
            break;
        }
        let Some(ino) = read_u64(rest, DIRENT_INO_OFFSET) else {
            break;
        };
        if ino != 0 {
            count += 1;
        }
        rest = &rest[reclen..];
    }
    (count - 2).max(0) as u64
}

fn read_u16(b: &[u8], off: usize) -> Option<u16> {
    Some(u16::from_ne_bytes(b.get(off..off + 2)?.try_into().ok()?))
}

fn read_u64(b: &[u8], off: usize) -> Option<u64> {
    Some(u64::from_ne_bytes(b.get(off..off + 8)?.try_into().ok()?))
}
