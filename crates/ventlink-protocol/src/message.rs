//! Typed messages.
//!
//! A message body is a one-byte type code followed by the schema-encoded
//! payload. The type code indexes a descriptor table supplied by the
//! application, which maps each code either to a [`SchemaCodec`] or to
//! [`Descriptor::Unrecognized`]. Codes 0 and 1 are reserved and should map to
//! `Unrecognized`.

use core::fmt;

use heapless::Vec;

use crate::error::{CodecError, MessageError};

/// Type code header size.
pub const HEADER_SIZE: usize = 1;

/// A sum type over the state kinds a message can carry.
pub trait MessagePayload: Sized + 'static {
    /// Descriptor table index of the active kind. The unknown kind reports 0.
    fn type_code(&self) -> u8;

    /// The "no kind" value a payload is reset to when the type is unrecognized.
    fn unknown() -> Self;
}

/// Binary encoder/decoder for one state kind.
pub trait SchemaCodec<S>: Sync {
    /// Encode `payload` into `output`, returning the number of bytes written.
    ///
    /// Returns [`CodecError::BufferFull`] if `output` is too small and
    /// [`CodecError::KindMismatch`] if `payload` is not this codec's kind.
    fn encode(&self, payload: &S, output: &mut [u8]) -> Result<usize, CodecError>;

    /// Decode `input` into `payload`.
    ///
    /// `payload` already holds [`default_payload`](Self::default_payload) when
    /// this is called, so a failed decode still leaves this codec's kind active.
    fn decode(&self, input: &[u8], payload: &mut S) -> Result<(), CodecError>;

    /// An empty value of this codec's kind.
    fn default_payload(&self) -> S;
}

/// One entry of a descriptor table.
pub enum Descriptor<S: 'static> {
    Unrecognized,
    Schema(&'static dyn SchemaCodec<S>),
}

impl<S: 'static> Descriptor<S> {
    pub fn is_recognized(&self) -> bool {
        matches!(self, Self::Schema(_))
    }
}

impl<S: 'static> Clone for Descriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: 'static> Copy for Descriptor<S> {}

impl<S: 'static> fmt::Debug for Descriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unrecognized => f.write_str("Unrecognized"),
            Self::Schema(_) => f.write_str("Schema(..)"),
        }
    }
}

fn schema<S: 'static>(descriptors: &[Descriptor<S>], code: u8) -> Option<&'static dyn SchemaCodec<S>> {
    match descriptors.get(usize::from(code)) {
        Some(Descriptor::Schema(codec)) => Some(*codec),
        _ => None,
    }
}

/// A type code plus the payload it tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<S> {
    type_code: u8,
    payload: S,
}

impl<S: MessagePayload> Message<S> {
    pub fn new(payload: S) -> Self {
        Self {
            type_code: payload.type_code(),
            payload,
        }
    }

    /// The type code last written or read from the wire.
    pub fn type_code(&self) -> u8 {
        self.type_code
    }

    pub fn payload(&self) -> &S {
        &self.payload
    }

    pub fn payload_mut(&mut self) -> &mut S {
        &mut self.payload
    }

    pub fn into_payload(self) -> S {
        self.payload
    }

    /// Write `[type][encoded payload]` into `output`.
    ///
    /// The output is empty on any failure, though the type code is still
    /// updated when the active kind has a schema.
    pub fn write<const M: usize>(
        &mut self,
        output: &mut Vec<u8, M>,
        descriptors: &[Descriptor<S>],
    ) -> Result<(), MessageError> {
        output.clear();
        let code = self.payload.type_code();
        let codec = schema(descriptors, code).ok_or(MessageError::InvalidType(code))?;
        self.type_code = code;

        if M < HEADER_SIZE {
            return Err(MessageError::InvalidLength);
        }
        output
            .resize_default(M)
            .map_err(|_| MessageError::InvalidLength)?;
        output[0] = code;

        match codec.encode(&self.payload, &mut output[HEADER_SIZE..]) {
            Ok(written) => {
                output.truncate(HEADER_SIZE + written);
                Ok(())
            }
            Err(err) => {
                output.clear();
                Err(match err {
                    CodecError::BufferFull => MessageError::InvalidLength,
                    other => MessageError::InvalidEncoding(other),
                })
            }
        }
    }

    /// Read the type code and decode the rest of `input` with its schema.
    ///
    /// The type code always reflects the wire byte. An unrecognized type
    /// resets the payload to the unknown kind. A recognized type makes its kind
    /// active before decoding, so the payload matches the type code even when
    /// the body is malformed.
    pub fn parse(&mut self, input: &[u8], descriptors: &[Descriptor<S>]) -> Result<(), MessageError> {
        let Some((&code, body)) = input.split_first() else {
            return Err(MessageError::InvalidLength);
        };
        self.type_code = code;

        let Some(codec) = schema(descriptors, code) else {
            self.payload = S::unknown();
            return Err(MessageError::InvalidType(code));
        };
        self.payload = codec.default_payload();
        codec
            .decode(body, &mut self.payload)
            .map_err(MessageError::InvalidEncoding)
    }
}

impl<S: MessagePayload> Default for Message<S> {
    fn default() -> Self {
        Self::new(S::unknown())
    }
}

/// Parses message bodies against a fixed descriptor table.
#[derive(Debug)]
pub struct MessageReceiver<'a, S: 'static> {
    descriptors: &'a [Descriptor<S>],
}

impl<S: 'static> Clone for MessageReceiver<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: 'static> Copy for MessageReceiver<'_, S> {}

impl<'a, S: MessagePayload> MessageReceiver<'a, S> {
    pub const fn new(descriptors: &'a [Descriptor<S>]) -> Self {
        Self { descriptors }
    }

    pub fn transform(&self, input: &[u8], output: &mut Message<S>) -> Result<(), MessageError> {
        output.parse(input, self.descriptors)
    }
}

/// Writes message bodies against a fixed descriptor table.
#[derive(Debug)]
pub struct MessageSender<'a, S: 'static> {
    descriptors: &'a [Descriptor<S>],
}

impl<S: 'static> Clone for MessageSender<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: 'static> Copy for MessageSender<'_, S> {}

impl<'a, S: MessagePayload> MessageSender<'a, S> {
    pub const fn new(descriptors: &'a [Descriptor<S>]) -> Self {
        Self { descriptors }
    }

    pub fn transform<const M: usize>(
        &self,
        message: &mut Message<S>,
        output: &mut Vec<u8, M>,
    ) -> Result<(), MessageError> {
        message.write(output, self.descriptors)
    }
}
