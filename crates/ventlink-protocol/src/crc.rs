use ::crc::{Crc, CRC_32_ISCSI};

/// Checksum engine used by the integrity layer.
///
/// Firmware builds can back this with a hardware CRC unit; the software
/// [`Crc32c`] is the reference.
pub trait Crc32 {
    fn compute(&self, bytes: &[u8]) -> u32;
}

impl<T: Crc32 + ?Sized> Crc32 for &T {
    fn compute(&self, bytes: &[u8]) -> u32 {
        (**self).compute(bytes)
    }
}

static CASTAGNOLI: Crc<u32> = Crc::<u32>::new(&CRC_32_ISCSI);

/// Table-driven CRC-32C (Castagnoli, reflected).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32c;

impl Crc32 for Crc32c {
    fn compute(&self, bytes: &[u8]) -> u32 {
        CASTAGNOLI.checksum(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_vectors() {
        let crc = Crc32c;
        assert_eq!(crc.compute(b""), 0x0000_0000);
        assert_eq!(crc.compute(b"\x00"), 0x527d_5351);
        assert_eq!(crc.compute(b"\x01"), 0xa016_d052);
        assert_eq!(crc.compute(b"123456789"), 0xe306_9283);
    }

    #[test]
    fn distinguishes_ieee_polynomial() {
        // CRC-32 (IEEE) of "123456789" is 0xcbf43926.
        assert_ne!(Crc32c.compute(b"123456789"), 0xcbf4_3926);
    }

    #[test]
    fn engine_by_reference() {
        fn checksum(engine: impl Crc32) -> u32 {
            engine.compute(b"123456789")
        }
        let engine = Crc32c;
        assert_eq!(checksum(&engine), 0xe306_9283);
    }
}
