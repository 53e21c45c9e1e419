//! Host-side stream codec for `tokio_util::codec::Framed`.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::cobs;
use crate::frames::{ChunkBuffer, FrameSender, PayloadBuffer, DELIMITER, ENCODED_MAX_SIZE};

/// Splits a byte stream on `0x00` and yields decoded frame payloads.
///
/// Malformed, empty and over-long frames are logged and skipped; decoding
/// resumes after the next delimiter.
#[derive(Debug, Default)]
pub struct CobsCodec {
    discarding: bool,
    sender: FrameSender,
}

impl CobsCodec {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for CobsCodec {
    type Item = PayloadBuffer;
    type Error = std::io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(end) = src.iter().position(|&b| b == DELIMITER) else {
                if src.len() > ENCODED_MAX_SIZE {
                    tracing::warn!(len = src.len(), "discarding over-long frame");
                    self.discarding = true;
                    src.clear();
                }
                return Ok(None);
            };

            let chunk = src.split_to(end);
            src.advance(1);

            if std::mem::take(&mut self.discarding) || chunk.is_empty() {
                continue;
            }
            if chunk.len() > ENCODED_MAX_SIZE {
                tracing::warn!(len = chunk.len(), "discarding over-long frame");
                continue;
            }

            let mut payload = PayloadBuffer::new();
            match cobs::decode(&chunk, &mut payload) {
                Ok(()) => return Ok(Some(payload)),
                Err(err) => {
                    tracing::warn!(error = %err, "discarding malformed frame");
                }
            }
        }
    }
}

impl Encoder<&[u8]> for CobsCodec {
    type Error = std::io::Error;

    fn encode(&mut self, payload: &[u8], dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut wire = ChunkBuffer::new();
        self.sender
            .transform(payload, &mut wire)
            .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
        dst.extend_from_slice(&wire);
        Ok(())
    }
}
