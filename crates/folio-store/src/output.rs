//! Position-tracking output for a store.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Backing byte stream of a store.
enum Sink {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::File(file) => file.write(buf),
            Sink::Memory(cursor) => cursor.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::File(file) => file.flush(),
            Sink::Memory(cursor) => cursor.flush(),
        }
    }
}

impl Read for Sink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Sink::File(file) => file.read(buf),
            Sink::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for Sink {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Sink::File(file) => file.seek(pos),
            Sink::Memory(cursor) => cursor.seek(pos),
        }
    }
}

/// What a closed store leaves behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Output {
    File(PathBuf),
    Memory(Vec<u8>),
}

impl Output {
    /// The produced bytes of an in-memory store.
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Output::Memory(bytes) => Some(bytes),
            Output::File(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Output::File(path) => Some(path),
            Output::Memory(_) => None,
        }
    }
}

/// Buffered, append-only writer that always knows its byte position.
///
/// Random-access reads flush first so they see every appended byte.
pub(crate) struct OutputCursor {
    writer: BufWriter<Sink>,
    position: u64,
    path: Option<PathBuf>,
}

impl OutputCursor {
    /// Create (truncating) a file at `path`.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .read(true)
            .write(true)
            .open(path)?;
        Ok(Self {
            writer: BufWriter::new(Sink::File(file)),
            position: 0,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            writer: BufWriter::new(Sink::Memory(Cursor::new(Vec::new()))),
            position: 0,
            path: None,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Append `bytes`, returning the offset they start at.
    pub fn append(&mut self, bytes: &[u8]) -> io::Result<u64> {
        let start = self.position;
        self.writer.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(start)
    }

    /// Read `len` bytes at `offset` from what has been appended so far.
    pub fn read_at(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        self.writer.flush()?;
        let sink = self.writer.get_mut();
        sink.seek(SeekFrom::Start(offset))?;
        let mut bytes = vec![0u8; len];
        let read = sink.read_exact(&mut bytes);
        sink.seek(SeekFrom::Start(self.position))?;
        read?;
        Ok(bytes)
    }

    /// Flush everything and release the sink.
    pub fn finish(self) -> io::Result<Output> {
        let sink = self.writer.into_inner().map_err(|e| e.into_error())?;
        match sink {
            Sink::File(file) => {
                file.sync_all()?;
                Ok(Output::File(self.path.unwrap_or_default()))
            }
            Sink::Memory(cursor) => Ok(Output::Memory(cursor.into_inner())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_position() {
        let mut out = OutputCursor::in_memory();
        assert_eq!(out.append(b"hello ").unwrap(), 0);
        assert_eq!(out.append(b"world").unwrap(), 6);
        assert_eq!(out.position(), 11);
    }

    #[test]
    fn reads_back_and_keeps_appending() {
        let mut out = OutputCursor::in_memory();
        out.append(b"abc").unwrap();
        out.append(b"defg").unwrap();
        assert_eq!(out.read_at(3, 4).unwrap(), b"defg");
        out.append(b"h").unwrap();
        assert_eq!(out.finish().unwrap().into_bytes().unwrap(), b"abcdefgh");
    }

    #[test]
    fn read_past_end_fails_without_losing_position() {
        let mut out = OutputCursor::in_memory();
        out.append(b"ab").unwrap();
        assert!(out.read_at(1, 5).is_err());
        out.append(b"c").unwrap();
        assert_eq!(out.finish().unwrap().into_bytes().unwrap(), b"abc");
    }

    #[test]
    fn file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut out = OutputCursor::create(&path).unwrap();
        out.append(b"%PDF").unwrap();
        assert_eq!(out.read_at(0, 4).unwrap(), b"%PDF");
        let output = out.finish().unwrap();
        assert_eq!(output.path(), Some(path.as_path()));
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF");
    }
}
