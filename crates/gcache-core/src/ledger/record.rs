//! Fixed-size binary ledger records.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::checksum::Sha1Digest;

/// On-disk record size: 20-byte checksum + 4-byte little-endian epoch seconds.
pub const RECORD_SIZE: usize = 24;

/// One verified-file record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerRecord {
    pub checksum: Sha1Digest,
    /// Verification time in epoch seconds.
    pub verified_at: u32,
}

impl LedgerRecord {
    /// Record stamped with the current time.
    pub fn now(checksum: Sha1Digest) -> Self {
        let verified_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        Self { checksum, verified_at }
    }

    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[..20].copy_from_slice(self.checksum.as_bytes());
        out[20..].copy_from_slice(&self.verified_at.to_le_bytes());
        out
    }

    pub fn decode(bytes: &[u8; RECORD_SIZE]) -> Self {
        let mut checksum = [0u8; 20];
        checksum.copy_from_slice(&bytes[..20]);
        let mut ts = [0u8; 4];
        ts.copy_from_slice(&bytes[20..]);
        Self {
            checksum: Sha1Digest::from_bytes(checksum),
            verified_at: u32::from_le_bytes(ts),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let record = LedgerRecord {
            checksum: Sha1Digest::from_hex("a568f68b14a8a9b91d5d26d1882e54c081e196ef")
                .unwrap(),
            verified_at: 1_700_000_000,
        };
        let bytes = record.encode();
        assert_eq!(bytes.len(), RECORD_SIZE);
        assert_eq!(LedgerRecord::decode(&bytes), record);
    }

    #[test]
    fn now_stamps_a_recent_time() {
        let record = LedgerRecord::now(
            Sha1Digest::from_hex("da39a3ee5e6b4b0d3255bfef95601890afd80709").unwrap(),
        );
        assert!(record.verified_at > 1_600_000_000);
    }
}
