use crate::error::Result;

/// A single-peer byte link.
///
/// Reads are non-blocking: `read_byte` returns `None` when nothing is
/// buffered and the caller polls again on its next scheduling slot.
pub trait ByteTransport {
    /// Take the next received byte, if one is available.
    fn read_byte(&mut self) -> Option<u8>;

    /// Queue bytes for transmission.
    ///
    /// Writes are all-or-nothing: on error no byte of `bytes` was queued.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

impl<T: ByteTransport + ?Sized> ByteTransport for &mut T {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }
}
