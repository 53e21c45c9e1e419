//! CRC-32C integrity element.
//!
//! ```text
//! ┌──────────────────┬────────────────────┐
//! │ CRC-32C (4B BE)  │ Payload            │
//! └──────────────────┴────────────────────┘
//! ```
//!
//! Parsing only extracts the checksum field. Comparing it against the
//! payload is the job of [`IntegrityReceiver`].

use heapless::Vec;

use crate::crc::Crc32;
use crate::error::IntegrityError;

/// Checksum header size.
pub const HEADER_SIZE: usize = 4;

/// A payload paired with its checksum.
///
/// `P` is a borrowed slice when building an element to write, or an owned
/// [`heapless::Vec`] when parsing (see [`ParsedIntegrity`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityElement<P> {
    crc: u32,
    payload: P,
}

/// An integrity element that owns a copy of its payload.
pub type ParsedIntegrity<const N: usize> = IntegrityElement<Vec<u8, N>>;

impl<P: AsRef<[u8]>> IntegrityElement<P> {
    /// Bind a payload. The checksum is zero until written or parsed.
    pub fn new(payload: P) -> Self {
        Self { crc: 0, payload }
    }

    /// The checksum last written or parsed.
    pub fn crc(&self) -> u32 {
        self.crc
    }

    pub fn payload(&self) -> &[u8] {
        self.payload.as_ref()
    }

    /// Checksum of the bound payload.
    pub fn compute_crc(&self, engine: &impl Crc32) -> u32 {
        engine.compute(self.payload.as_ref())
    }

    /// Compute the checksum and write `[crc][payload]` into `output`.
    pub fn write<const M: usize>(
        &mut self,
        output: &mut Vec<u8, M>,
        engine: &impl Crc32,
    ) -> Result<(), IntegrityError> {
        let payload = self.payload.as_ref();
        let size = HEADER_SIZE + payload.len();
        let overflow = IntegrityError::InvalidLength { size, capacity: M };
        if size > M {
            return Err(overflow);
        }

        self.crc = engine.compute(payload);
        output.clear();
        output
            .extend_from_slice(&self.crc.to_be_bytes())
            .map_err(|_| overflow)?;
        output.extend_from_slice(payload).map_err(|_| overflow)?;
        Ok(())
    }
}

impl<const N: usize> IntegrityElement<Vec<u8, N>> {
    /// Extract the checksum field and copy the rest of `input` as the payload.
    pub fn parse(&mut self, input: &[u8]) -> Result<(), IntegrityError> {
        let invalid = IntegrityError::InvalidParse { len: input.len() };
        let Some((header, body)) = input.split_first_chunk::<HEADER_SIZE>() else {
            return Err(invalid);
        };

        self.payload.clear();
        self.payload.extend_from_slice(body).map_err(|_| invalid)?;
        self.crc = u32::from_be_bytes(*header);
        Ok(())
    }
}

impl<const N: usize> Default for IntegrityElement<Vec<u8, N>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// Parses integrity elements and verifies their checksum.
#[derive(Debug, Clone, Default)]
pub struct IntegrityReceiver<C> {
    engine: C,
}

impl<C: Crc32> IntegrityReceiver<C> {
    pub fn new(engine: C) -> Self {
        Self { engine }
    }

    /// Parse `input` into `output` and check the checksum.
    ///
    /// On a mismatch the parsed checksum and payload stay in `output`.
    pub fn transform<const N: usize>(
        &self,
        input: &[u8],
        output: &mut ParsedIntegrity<N>,
    ) -> Result<(), IntegrityError> {
        output.parse(input)?;

        let computed = output.compute_crc(&self.engine);
        if computed != output.crc() {
            tracing::debug!(
                received = output.crc(),
                computed,
                len = output.payload().len(),
                "crc mismatch"
            );
            return Err(IntegrityError::InvalidCrc {
                received: output.crc(),
                computed,
            });
        }
        Ok(())
    }
}

/// Prepends the checksum to outgoing payloads.
#[derive(Debug, Clone, Default)]
pub struct IntegritySender<C> {
    engine: C,
}

impl<C: Crc32> IntegritySender<C> {
    pub fn new(engine: C) -> Self {
        Self { engine }
    }

    pub fn transform<const M: usize>(
        &self,
        payload: &[u8],
        output: &mut Vec<u8, M>,
    ) -> Result<(), IntegrityError> {
        IntegrityElement::new(payload).write(output, &self.engine)
    }
}
