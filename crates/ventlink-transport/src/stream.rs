use std::io::{ErrorKind, Read, Write};

use bytes::{Buf, BytesMut};

use crate::error::Result;
use crate::traits::ByteTransport;

const READ_CHUNK_SIZE: usize = 256;

/// Byte transport over any `Read + Write` stream.
///
/// Intended for host-side use with a serial device, pipe or socket. Reads are
/// buffered in chunks; a stream that would block, times out or reaches EOF
/// simply yields no byte for this poll. Any other read error is recorded and
/// stops further reads; check [`read_failure`](Self::read_failure) to tell a
/// dead link from a quiet one.
pub struct StreamTransport<T> {
    inner: T,
    buf: BytesMut,
    eof: bool,
    failed: Option<ErrorKind>,
}

impl<T: Read + Write> StreamTransport<T> {
    /// Wrap a stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(READ_CHUNK_SIZE),
            eof: false,
            failed: None,
        }
    }

    /// Whether the stream has reported end of file.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// Kind of the read error that stopped this transport, if any.
    pub fn read_failure(&self) -> Option<ErrorKind> {
        self.failed
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn fill(&mut self) {
        if self.failed.is_some() {
            return;
        }
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    if !self.eof {
                        tracing::debug!("stream reached end of file");
                    }
                    self.eof = true;
                    return;
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return;
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stream read failed, link stopped");
                    self.failed = Some(err.kind());
                    return;
                }
            }
        }
    }
}

impl<T: Read + Write> ByteTransport for StreamTransport<T> {
    fn read_byte(&mut self) -> Option<u8> {
        if self.buf.is_empty() {
            self.fill();
        }
        if self.buf.is_empty() {
            return None;
        }
        Some(self.buf.get_u8())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.inner.flush()?;
        Ok(())
    }
}

impl<T> std::fmt::Debug for StreamTransport<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamTransport")
            .field("buffered", &self.buf.len())
            .field("eof", &self.eof)
            .field("failed", &self.failed)
            .finish()
    }
}
