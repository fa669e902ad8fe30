//! Output streams shared by flag sets and commands

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type Sink = Box<dyn Write + Send>;

/// Destination for usage, help and version output
///
/// Cloning an `Output` shares the underlying stream, which is how nested
/// commands inherit the stream of their parent.
#[derive(Clone)]
pub struct Output(Arc<Mutex<Sink>>);

impl Output {
    /// Wrap any writer
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Output(Arc::new(Mutex::new(Box::new(writer))))
    }

    pub fn stderr() -> Self {
        Output::new(io::stderr())
    }

    pub fn stdout() -> Self {
        Output::new(io::stdout())
    }

    /// Lock the stream for writing
    pub fn lock(&self) -> MutexGuard<'_, Sink> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a whole chunk of text at once
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut out = self.lock();
        out.write_all(text.as_bytes())?;
        out.flush()
    }
}

impl Default for Output {
    fn default() -> Self {
        Output::stderr()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Output")
    }
}

/// In-memory writer whose contents can be read back
#[derive(Clone, Default, Debug)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    fn buf(&self) -> MutexGuard<'_, Vec<u8>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything written so far, lossily decoded
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf()).into_owned()
    }

    pub fn clear(&self) {
        self.buf().clear();
    }

    /// An [`Output`] writing into this capture
    pub fn output(&self) -> Output {
        Output::new(self.clone())
    }
}

impl Write for Capture {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
