//! Pumps a [`Backend`] over a byte transport.

use ventlink_frame::ChunkBuffer;
use ventlink_protocol::Crc32;
use ventlink_transport::ByteTransport;

use crate::backend::{Backend, OutputStatus, Received};
use crate::error::Result;
use crate::states::{MessageType, StateStore};

/// Connects a backend to a serial link.
///
/// Call [`receive`](Self::receive), [`update_clock`](Self::update_clock) and
/// [`send`](Self::send) from the control loop. None of them block.
#[derive(Debug)]
pub struct LinkDriver<T, C, S> {
    transport: T,
    backend: Backend<C, S>,
    send_buffer: ChunkBuffer,
}

impl<T: ByteTransport, C: Crc32 + Clone, S: StateStore> LinkDriver<T, C, S> {
    pub fn new(transport: T, backend: Backend<C, S>) -> Self {
        Self {
            transport,
            backend,
            send_buffer: ChunkBuffer::new(),
        }
    }

    /// Drain every byte currently available from the transport.
    ///
    /// Returns the number of messages applied to the state store.
    pub fn receive(&mut self) -> usize {
        self.receive_with(|_, _| {})
    }

    /// Like [`receive`](Self::receive), calling `on_applied` after each
    /// message is written to the state store.
    ///
    /// Rejected frames are logged and skipped.
    pub fn receive_with<F>(&mut self, mut on_applied: F) -> usize
    where
        F: FnMut(MessageType, &S),
    {
        let mut applied = 0;
        while let Some(byte) = self.transport.read_byte() {
            match self.backend.input(byte) {
                Ok(Received::Waiting) => {}
                Ok(Received::Applied(kind)) => {
                    applied += 1;
                    on_applied(kind, self.backend.states());
                }
                Err(err) => tracing::debug!(error = %err, "input rejected"),
            }
        }
        applied
    }

    /// Advance the broadcast schedule.
    pub fn update_clock(&mut self, current_time: u32) -> Option<MessageType> {
        self.backend.update_clock(current_time)
    }

    /// Write the pending frame, if any, to the transport.
    pub fn send(&mut self) -> Result<OutputStatus> {
        if self.backend.output(&mut self.send_buffer)? == OutputStatus::Waiting {
            return Ok(OutputStatus::Waiting);
        }
        self.transport.write(&self.send_buffer)?;
        tracing::trace!(len = self.send_buffer.len(), "frame sent");
        Ok(OutputStatus::Available)
    }

    pub fn backend(&self) -> &Backend<C, S> {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut Backend<C, S> {
        &mut self.backend
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_parts(self) -> (T, Backend<C, S>) {
        (self.transport, self.backend)
    }
}
