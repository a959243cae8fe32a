//! Header assembly, recipient wrapping and chunked payload encryption.
//!
//! Streams plaintext the way the teacher's `encrypt_stream` does in
//! `cipher/hpke.rs`: a fixed-size buffer, a loop that reads until it sees
//! zero bytes, one packet written per read. The differences are the
//! chunk size (1 MiB, not the teacher's 4 KiB stream-cipher chunks), the
//! explicit big-endian counter nonce instead of `aead::stream`'s
//! `StreamBE32`, and a header written ahead of the first packet.

use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::header::{EncryptionHeader, RecipientEntry};
use crate::keys::EncryptionPublicKey;
use crate::nonce;
use crate::objpack::{self, array, bin};
use crate::primitives;

/// Maximum plaintext bytes per payload packet.
pub const CHUNK_SIZE: usize = 1024 * 1024;

/// A recipient of an encrypted message.
#[derive(Clone, Copy, Debug)]
pub struct Recipient {
    pub public_key: EncryptionPublicKey,
    /// Whether this recipient's public key is written into the header in
    /// the clear. `false` hides which of the listed entries belongs to
    /// them, at the cost of every recipient having to try every entry.
    pub visible: bool,
}

impl Recipient {
    #[must_use]
    pub fn new(public_key: EncryptionPublicKey) -> Self {
        Self { public_key, visible: true }
    }

    #[must_use]
    pub fn anonymous(public_key: EncryptionPublicKey) -> Self {
        Self { public_key, visible: false }
    }
}

/// Encrypt `plaintext` for `recipients`, writing an encryption-mode
/// saltpack message to `output`.
///
/// If `sender_identity` is `None`, the message is sent anonymously: the
/// header's sender secretbox contains 32 zero bytes instead of a real
/// public key, and recipients cannot learn who sent it.
///
/// # Errors
///
/// Returns `Error::InvalidArgument` if `recipients` is empty, and
/// `Error::Io` if reading `plaintext` or writing `output` fails.
pub fn encrypt(
    plaintext: &mut dyn Read,
    output: &mut dyn Write,
    recipients: &[Recipient],
    sender_identity: Option<EncryptionPublicKey>,
) -> Result<()> {
    if recipients.is_empty() {
        return Err(Error::InvalidArgument("at least one recipient is required".into()));
    }

    let (ephemeral_public, ephemeral_secret) = primitives::generate_encryption_keypair();
    let payload_key_bytes = primitives::random_bytes::<32>();

    let sender_plain = sender_identity.map_or([0u8; 32], |pk| *pk.as_bytes());
    let sender_secretbox =
        primitives::secretbox_seal(&sender_plain, nonce::SENDER_SECRETBOX_NONCE, &payload_key_bytes);

    let mut entries = Vec::with_capacity(recipients.len());
    for (index, recipient) in recipients.iter().enumerate() {
        let recipient_nonce = nonce::recipient_box_nonce(index as u64);
        let payload_key_box =
            primitives::box_seal(&payload_key_bytes, &recipient_nonce, &recipient.public_key, &ephemeral_secret);
        entries.push(RecipientEntry {
            recipient_public: recipient.visible.then_some(recipient.public_key),
            payload_key_box,
        });
    }

    let header = EncryptionHeader { ephemeral_public, sender_secretbox, recipients: entries };
    let (encoded_header, _header_hash) = header.encode();
    output.write_all(&encoded_header)?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut index: u64 = 0;
    loop {
        let n = read_full(plaintext, &mut buf)?;
        let packet_nonce = nonce::payload_secretbox_nonce(index);
        let ciphertext = primitives::secretbox_seal(&buf[..n], &packet_nonce, &payload_key_bytes);
        write_packet(output, &ciphertext)?;

        if n == 0 {
            break;
        }
        index += 1;
    }

    Ok(())
}

fn write_packet(output: &mut dyn Write, ciphertext: &[u8]) -> Result<()> {
    let packet = array(vec![bin(ciphertext)]);
    output.write_all(&objpack::encode(&packet))?;
    Ok(())
}

/// Read up to `buf.len()` bytes, looping on short reads, stopping only
/// at EOF (`Ok(0)`) or an error. Mirrors the teacher's `encrypt_stream`
/// read loop, which cannot rely on a single `read()` call filling the
/// buffer.
fn read_full(reader: &mut dyn Read, buf: &mut [u8]) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::primitives::generate_encryption_keypair;

    #[test]
    fn rejects_an_empty_recipient_list() {
        let mut input = Cursor::new(b"hello".to_vec());
        let mut output = Vec::new();
        let err = encrypt(&mut input, &mut output, &[], None).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn produces_a_header_followed_by_at_least_one_terminator_packet() {
        let (pk, _) = generate_encryption_keypair();
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();

        encrypt(&mut input, &mut output, &[Recipient::new(pk)], None).unwrap();

        let (header, _hash, consumed) = EncryptionHeader::decode(&output).unwrap();
        assert_eq!(header.recipients.len(), 1);

        let (packet_value, packet_len) = objpack::decode_one(&output[consumed..]).unwrap();
        let fields = objpack::as_array(&packet_value).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(consumed + packet_len, output.len());
    }

    #[test]
    fn chunks_plaintext_larger_than_one_packet() {
        let (pk, _) = generate_encryption_keypair();
        let plaintext = vec![0x42u8; CHUNK_SIZE + 100];
        let mut input = Cursor::new(plaintext);
        let mut output = Vec::new();

        encrypt(&mut input, &mut output, &[Recipient::new(pk)], None).unwrap();

        let (_, _, mut offset) = EncryptionHeader::decode(&output).unwrap();
        let mut packet_count = 0;
        while offset < output.len() {
            let (_, consumed) = objpack::decode_one(&output[offset..]).unwrap();
            offset += consumed;
            packet_count += 1;
        }
        // one full chunk + one partial chunk + the terminator.
        assert_eq!(packet_count, 3);
    }
}
