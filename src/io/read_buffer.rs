use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

use bytes::Bytes;

/// A byte stream that starts forward-only and becomes seekable on demand.
///
/// Producers hand over arbitrary readers (sockets, decompressors, open
/// files). Decoders need random access, so the first operation other than
/// [`Read::read`] drains the wrapped reader into memory and switches to
/// serving from that buffer. The switch happens at most once and the original
/// reader is dropped afterwards. Files opened with [`ReadBuffer::open`] seek
/// natively and are never drained just to rewind.
///
/// # Example
///
/// ```
/// use std::io::{Read, Seek, SeekFrom};
/// use raster_compose::io::ReadBuffer;
///
/// let mut buf = ReadBuffer::new(&b"hello world"[..]);
/// assert!(!buf.is_buffered());
///
/// buf.seek(SeekFrom::Start(6)).unwrap();
/// assert!(buf.is_buffered());
///
/// let mut rest = String::new();
/// buf.read_to_string(&mut rest).unwrap();
/// assert_eq!(rest, "world");
/// ```
pub struct ReadBuffer {
    state: State,
}

enum State {
    /// Reading straight from the wrapped reader
    Streaming(Box<dyn Read + Send>),
    /// Open file, seekable in place
    File(BufReader<File>),
    /// Reader fully drained into memory
    Buffered(Cursor<Bytes>),
}

impl ReadBuffer {
    /// Wrap a forward-only reader.
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self {
            state: State::Streaming(Box::new(reader)),
        }
    }

    /// Wrap bytes that are already in memory. The result is seekable from
    /// the start.
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self {
            state: State::Buffered(Cursor::new(data.into())),
        }
    }

    /// Open a file for streaming. The file is read lazily and seeks without
    /// buffering.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            state: State::File(BufReader::new(file)),
        })
    }

    /// Whether the wrapped reader has been drained into memory.
    pub fn is_buffered(&self) -> bool {
        matches!(self.state, State::Buffered(_))
    }

    /// Whether [`Seek`] works without draining the reader first.
    pub fn is_seekable(&self) -> bool {
        !matches!(self.state, State::Streaming(_))
    }

    /// Drain the wrapped reader into memory if that has not happened yet.
    /// Files are already seekable and stay on disk.
    ///
    /// Bytes already consumed through [`Read::read`] are not recovered; the
    /// buffer holds whatever the reader had left.
    pub fn make_seekable(&mut self) -> io::Result<()> {
        if let State::Streaming(reader) = &mut self.state {
            let mut data = Vec::new();
            reader.read_to_end(&mut data)?;
            self.state = State::Buffered(Cursor::new(Bytes::from(data)));
        }
        Ok(())
    }

    /// Return the complete buffered content, draining the reader first if
    /// needed. The read position is left unchanged.
    ///
    /// A file is read whole from its start and kept in memory afterwards.
    pub fn to_bytes(&mut self) -> io::Result<Bytes> {
        if let State::File(file) = &mut self.state {
            let position = file.stream_position()?;
            file.rewind()?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            let mut cursor = Cursor::new(Bytes::from(data));
            cursor.set_position(position);
            self.state = State::Buffered(cursor);
        }
        self.make_seekable()?;
        match &self.state {
            State::Buffered(cursor) => Ok(cursor.get_ref().clone()),
            _ => Err(io::Error::other("read buffer is still streaming")),
        }
    }
}

impl Read for ReadBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.state {
            State::Streaming(reader) => reader.read(buf),
            State::File(file) => file.read(buf),
            State::Buffered(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for ReadBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.make_seekable()?;
        match &mut self.state {
            State::File(file) => file.seek(pos),
            State::Buffered(cursor) => cursor.seek(pos),
            State::Streaming(_) => Err(io::Error::other("read buffer is still streaming")),
        }
    }
}

impl fmt::Debug for ReadBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            State::Streaming(_) => f.write_str("ReadBuffer::Streaming"),
            State::File(_) => f.write_str("ReadBuffer::File"),
            State::Buffered(cursor) => f
                .debug_struct("ReadBuffer::Buffered")
                .field("len", &cursor.get_ref().len())
                .field("position", &cursor.position())
                .finish(),
        }
    }
}

impl From<Bytes> for ReadBuffer {
    fn from(data: Bytes) -> Self {
        Self::from_bytes(data)
    }
}

impl From<Vec<u8>> for ReadBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self::from_bytes(data)
    }
}
