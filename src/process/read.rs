//! Whole-file reads through a reusable scratch buffer.

use std::fs::File;
use std::io::{self, Read, Seek};
use std::os::unix::fs::FileExt;

/// Reads small pseudo-files whole, in one positioned read where possible.
///
/// The buffer is retained between calls. Once it has grown past the largest
/// file seen, every later read completes in a single syscall.
#[derive(Debug, Default)]
pub struct ScratchReader {
    buf: Vec<u8>,
}

impl ScratchReader {
    pub fn new() -> ScratchReader {
        ScratchReader::default()
    }

    /// Reads the entire contents of `f`. The returned slice borrows the
    /// scratch buffer and is valid until the next call.
    pub fn read_all(&mut self, f: &File) -> io::Result<&[u8]> {
        self.buf.resize(self.buf.capacity(), 0);
        if !self.buf.is_empty() {
            let n = f.read_at(&mut self.buf, 0)?;
            if n < self.buf.len() {
                self.buf.truncate(n);
                return Ok(&self.buf);
            }
        }
        // The read filled the buffer completely (or the buffer is still
        // empty), so the file may hold more; stream the whole thing instead.
        self.buf.clear();
        let mut r: &File = f;
        r.rewind()?;
        r.read_to_end(&mut self.buf)?;
        Ok(&self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> File {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        File::open(path).unwrap()
    }

    #[test]
    fn reads_whole_file_and_reuses_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let small = write_file(&dir, "small", b"hello");
        let big_contents = vec![b'x'; 10_000];
        let big = write_file(&dir, "big", &big_contents);

        let mut reader = ScratchReader::new();
        assert_eq!(reader.read_all(&small).unwrap(), b"hello");
        assert_eq!(reader.read_all(&big).unwrap(), &big_contents[..]);
        // A second pass over the same files goes through the now-grown
        // buffer and must return identical contents.
        assert_eq!(reader.read_all(&small).unwrap(), b"hello");
        assert_eq!(reader.read_all(&big).unwrap(), &big_contents[..]);
    }

    #[test]
    fn reads_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(&dir, "empty", b"");
        let mut reader = ScratchReader::new();
        assert_eq!(reader.read_all(&empty).unwrap(), b"");
        assert_eq!(reader.read_all(&empty).unwrap(), b"");
    }
}
