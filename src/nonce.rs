//! Deterministic per-packet nonce construction.
//!
//! Every nonce used by the protocol layer is either a fixed 24-byte
//! constant, or a fixed 16-byte prefix followed by an 8-byte big-endian
//! counter. Centralizing the construction here means the counter
//! discipline (strictly increasing, starting at zero, one nonce per
//! packet) only has to be gotten right once.

/// Recipient payload-key box nonce prefix. Followed by `be64(recipient_index)`.
pub const RECIPIENT_BOX_PREFIX: &[u8; 16] = b"saltpack_recipsb";

/// Sender-identity secretbox nonce. Used whole, with no counter suffix.
pub const SENDER_SECRETBOX_NONCE: &[u8; 24] = b"saltpack_sender_key_sbox";

/// Payload chunk secretbox nonce prefix. Followed by `be64(packet_index)`.
pub const PAYLOAD_SECRETBOX_PREFIX: &[u8; 16] = b"saltpack_ploadsb";

/// Build a 24-byte nonce as `prefix || be64(counter)`.
#[must_use]
pub fn counter_nonce(prefix: &[u8; 16], counter: u64) -> [u8; 24] {
    let mut nonce = [0u8; 24];
    nonce[..16].copy_from_slice(prefix);
    nonce[16..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// The recipient box nonce for the recipient at `index` in header order.
#[must_use]
pub fn recipient_box_nonce(index: u64) -> [u8; 24] {
    counter_nonce(RECIPIENT_BOX_PREFIX, index)
}

/// The payload chunk secretbox nonce for the packet at `index`.
#[must_use]
pub fn payload_secretbox_nonce(index: u64) -> [u8; 24] {
    counter_nonce(PAYLOAD_SECRETBOX_PREFIX, index)
}
