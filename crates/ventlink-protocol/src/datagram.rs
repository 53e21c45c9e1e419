//! Sequenced datagram.
//!
//! ```text
//! ┌──────────┬────────────┬──────────────────┐
//! │ Seq (1B) │ Length (1B)│ Payload          │
//! └──────────┴────────────┴──────────────────┘
//! ```
//!
//! The length field is taken from the payload when a datagram is built and
//! stored verbatim when one is parsed. Whether it agrees with the received
//! payload is checked by [`DatagramReceiver`].

use heapless::Vec;

use crate::error::DatagramError;

/// Sequence plus length header size.
pub const HEADER_SIZE: usize = 2;

/// Largest datagram the one-byte length field can describe.
pub const MAX_SIZE: usize = HEADER_SIZE + u8::MAX as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram<P> {
    seq: u8,
    length: u8,
    payload: P,
}

/// A datagram that owns a copy of its payload.
pub type ParsedDatagram<const N: usize> = Datagram<Vec<u8, N>>;

impl<P: AsRef<[u8]>> Datagram<P> {
    /// Bind a payload with sequence number 0.
    pub fn new(payload: P) -> Self {
        let length = u8::try_from(payload.as_ref().len()).unwrap_or(u8::MAX);
        Self {
            seq: 0,
            length,
            payload,
        }
    }

    pub fn with_seq(mut self, seq: u8) -> Self {
        self.seq = seq;
        self
    }

    pub fn seq(&self) -> u8 {
        self.seq
    }

    /// The length field, as built or as received.
    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.as_ref()
    }

    /// Write `[seq][length][payload]` into `output`.
    ///
    /// Fails with [`DatagramError::InvalidLength`] if the datagram exceeds
    /// `M` or a payload is too long for the length field.
    pub fn write<const M: usize>(&self, output: &mut Vec<u8, M>) -> Result<(), DatagramError> {
        let payload = self.payload.as_ref();
        let size = HEADER_SIZE + payload.len();
        let capacity = M.min(MAX_SIZE);
        let overflow = DatagramError::InvalidLength { size, capacity };
        if size > capacity {
            return Err(overflow);
        }

        output.clear();
        output
            .extend_from_slice(&[self.seq, self.length])
            .map_err(|_| overflow)?;
        output.extend_from_slice(payload).map_err(|_| overflow)?;
        Ok(())
    }
}

impl<const N: usize> Datagram<Vec<u8, N>> {
    /// Read the header fields and copy the rest of `input` as the payload.
    pub fn parse(&mut self, input: &[u8]) -> Result<(), DatagramError> {
        let invalid = DatagramError::InvalidParse { len: input.len() };
        let Some(([seq, length], body)) = input.split_first_chunk::<HEADER_SIZE>() else {
            return Err(invalid);
        };

        self.payload.clear();
        self.payload.extend_from_slice(body).map_err(|_| invalid)?;
        self.seq = *seq;
        self.length = *length;
        Ok(())
    }
}

impl<const N: usize> Default for Datagram<Vec<u8, N>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Parses datagrams and tracks the expected sequence number.
///
/// Any sequence mismatch is reported once and the receiver resynchronizes
/// to the sequence it just saw, so a gap never locks the stream out.
#[derive(Debug, Clone, Default)]
pub struct DatagramReceiver {
    expected_seq: u8,
}

impl DatagramReceiver {
    pub const fn new() -> Self {
        Self { expected_seq: 0 }
    }

    /// Sequence number the next datagram should carry.
    pub fn expected_seq(&self) -> u8 {
        self.expected_seq
    }

    /// Parse `input` into `output` and check its length and sequence.
    ///
    /// On [`DatagramError::InvalidSequence`] the parsed datagram in `output`
    /// is complete and usable.
    pub fn transform<const N: usize>(
        &mut self,
        input: &[u8],
        output: &mut ParsedDatagram<N>,
    ) -> Result<(), DatagramError> {
        output.parse(input)?;

        let actual = output.payload().len();
        if usize::from(output.length()) != actual {
            return Err(DatagramError::LengthMismatch {
                declared: output.length(),
                actual,
            });
        }

        let expected = self.expected_seq;
        let received = output.seq();
        self.expected_seq = received.wrapping_add(1);
        if received != expected {
            tracing::debug!(expected, received, "datagram sequence resynchronized");
            return Err(DatagramError::InvalidSequence { expected, received });
        }
        Ok(())
    }
}

/// Wraps outgoing payloads with a rolling sequence number.
#[derive(Debug, Clone, Default)]
pub struct DatagramSender {
    next_seq: u8,
}

impl DatagramSender {
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// A sender whose first datagram carries `next_seq`.
    pub const fn starting_at(next_seq: u8) -> Self {
        Self { next_seq }
    }

    /// Sequence number the next datagram will carry.
    pub fn next_seq(&self) -> u8 {
        self.next_seq
    }

    /// Write the datagram for `payload`. The sequence only advances on success.
    pub fn transform<const M: usize>(
        &mut self,
        payload: &[u8],
        output: &mut Vec<u8, M>,
    ) -> Result<(), DatagramError> {
        Datagram::new(payload)
            .with_seq(self.next_seq)
            .write(output)?;
        self.next_seq = self.next_seq.wrapping_add(1);
        Ok(())
    }
}
