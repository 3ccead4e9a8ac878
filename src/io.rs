use std::collections::VecDeque;
use std::io::{self, Read, Write};

/// The engine's connection to the outside world.
///
/// `input` returns `Ok(None)` when no byte is available yet; the engine then
/// reports that it is awaiting input instead of blocking.
pub trait Io {
    fn output(&mut self, byte: u8) -> io::Result<()>;

    fn input(&mut self) -> io::Result<Option<u8>>;
}

impl<T: Io + ?Sized> Io for &mut T {
    fn output(&mut self, byte: u8) -> io::Result<()> {
        (**self).output(byte)
    }

    fn input(&mut self) -> io::Result<Option<u8>> {
        (**self).input()
    }
}

/// In-memory adapter: a scripted input queue and a recorded output log.
#[derive(Clone, Debug, Default)]
pub struct BufferIo {
    input: VecDeque<u8>,
    output: Vec<u8>,
    input_requests: usize,
}

impl BufferIo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(bytes: &[u8]) -> Self {
        Self {
            input: bytes.iter().copied().collect(),
            ..Self::default()
        }
    }

    pub fn push_input(&mut self, bytes: &[u8]) {
        self.input.extend(bytes);
    }

    /// Bytes emitted so far, in call order.
    pub fn written(&self) -> &[u8] {
        &self.output
    }

    /// Number of times the engine asked for input, including unanswered requests.
    pub fn input_requests(&self) -> usize {
        self.input_requests
    }

    pub fn pending_input(&self) -> usize {
        self.input.len()
    }
}

impl Io for BufferIo {
    fn output(&mut self, byte: u8) -> io::Result<()> {
        self.output.push(byte);
        Ok(())
    }

    fn input(&mut self) -> io::Result<Option<u8>> {
        self.input_requests += 1;
        Ok(self.input.pop_front())
    }
}

/// Adapter over a reader and writer pair, such as stdin and stdout.
///
/// End of input is reported as "no byte available" and remembered in
/// [`StreamIo::exhausted`].
pub struct StreamIo<R, W> {
    reader: R,
    writer: W,
    exhausted: bool,
}

impl<R: Read, W: Write> StreamIo<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            exhausted: false,
        }
    }

    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Io for StreamIo<R, W> {
    fn output(&mut self, byte: u8) -> io::Result<()> {
        self.writer.write_all(&[byte])?;
        self.writer.flush()
    }

    fn input(&mut self) -> io::Result<Option<u8>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut buf = [0u8; 1];
        loop {
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.exhausted = true;
                    return Ok(None);
                }
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}
