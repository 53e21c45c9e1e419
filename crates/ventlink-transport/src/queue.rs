use heapless::Deque;

use crate::error::{Result, TransportError};
use crate::traits::ByteTransport;

/// Bounded receive and transmit queues standing in for a buffered UART.
///
/// The receive queue is filled by whatever plays the role of the RX
/// interrupt ([`QueueTransport::push_received`] or [`bridge`]). When it is
/// full, further bytes are dropped, as a hardware overrun would drop them.
#[derive(Debug)]
pub struct QueueTransport<const N: usize> {
    rx: Deque<u8, N>,
    tx: Deque<u8, N>,
    dropped: usize,
}

impl<const N: usize> QueueTransport<N> {
    /// Create an empty transport.
    pub const fn new() -> Self {
        Self {
            rx: Deque::new(),
            tx: Deque::new(),
            dropped: 0,
        }
    }

    /// Deliver bytes to the receive queue. Returns how many were accepted.
    pub fn push_received(&mut self, bytes: &[u8]) -> usize {
        let mut accepted = 0;
        for &byte in bytes {
            if self.rx.push_back(byte).is_err() {
                break;
            }
            accepted += 1;
        }
        let overrun = bytes.len() - accepted;
        if overrun > 0 {
            self.dropped += overrun;
            tracing::warn!(overrun, capacity = N, "receive queue overrun");
        }
        accepted
    }

    /// Take the next byte waiting to be transmitted.
    pub fn pop_transmitted(&mut self) -> Option<u8> {
        self.tx.pop_front()
    }

    /// Drain every byte waiting to be transmitted.
    pub fn drain_transmitted(&mut self) -> impl Iterator<Item = u8> + '_ {
        std::iter::from_fn(move || self.tx.pop_front())
    }

    /// Number of received bytes not yet read.
    pub fn pending_received(&self) -> usize {
        self.rx.len()
    }

    /// Number of bytes queued for transmission.
    pub fn pending_transmitted(&self) -> usize {
        self.tx.len()
    }

    /// Total bytes dropped by receive overruns.
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

impl<const N: usize> Default for QueueTransport<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteTransport for QueueTransport<N> {
    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let available = N - self.tx.len();
        if bytes.len() > available {
            return Err(TransportError::Full {
                requested: bytes.len(),
                available,
            });
        }
        for &byte in bytes {
            // Capacity was checked above.
            let _ = self.tx.push_back(byte);
        }
        Ok(())
    }
}

/// Move transmitted bytes from each endpoint into the other's receive queue.
///
/// Returns the number of bytes moved in each direction as `(a_to_b, b_to_a)`.
pub fn bridge<const A: usize, const B: usize>(
    a: &mut QueueTransport<A>,
    b: &mut QueueTransport<B>,
) -> (usize, usize) {
    (transfer(a, b), transfer(b, a))
}

fn transfer<const FROM: usize, const TO: usize>(
    from: &mut QueueTransport<FROM>,
    to: &mut QueueTransport<TO>,
) -> usize {
    let mut moved = 0;
    while let Some(byte) = from.tx.pop_front() {
        if to.rx.push_back(byte).is_err() {
            to.dropped += 1;
            tracing::warn!(capacity = TO, "receive queue overrun while bridging");
            continue;
        }
        moved += 1;
    }
    moved
}
