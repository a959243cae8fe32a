//! Decryption state machine.
//!
//! States: `AwaitHeader -> AwaitPayloadKey -> AwaitChunks -> Done`, with
//! any primitive failure moving to `Failed` and returning the triggering
//! error. Mirrors the read side of the teacher's `decrypt_stream`, but
//! fans out over a recipient list instead of a single shared key, and
//! enforces that a terminator packet was actually observed before
//! returning success (the teacher's chunked cipher enforces the same
//! anti-truncation discipline in `pipeline/cipher/chacha.rs`).

use std::io::{Read, Write};

use crate::error::{AuthSite, Error, Result};
use crate::header::EncryptionHeader;
use crate::keys::EncryptionSecretKey;
use crate::nonce;
use crate::objpack;
use crate::primitives;

/// The sender's revealed identity, if any.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SenderIdentity {
    Known(crate::keys::EncryptionPublicKey),
    Anonymous,
}

/// Decrypt an encryption-mode saltpack message from `input`, writing the
/// recovered plaintext to `output`.
///
/// Tries every recipient entry in the header against `recipient_secret`
/// in order; the first one that opens is used.
///
/// # Errors
///
/// - `Error::MalformedHeader` / `Error::UnsupportedVersion` if the
///   header is not a well-formed encryption header.
/// - `Error::NotARecipient` if no entry opens under `recipient_secret`.
/// - `Error::AuthFailure` if a payload chunk fails to authenticate.
/// - `Error::UnexpectedEof` if the stream ends before a terminator
///   packet.
pub fn decrypt(
    input: &mut dyn Read,
    output: &mut dyn Write,
    recipient_secret: &EncryptionSecretKey,
) -> Result<SenderIdentity> {
    let (header, _hash) = EncryptionHeader::decode_from_reader(input)?;

    let mut payload_key_bytes: Option<[u8; 32]> = None;
    for (raw_index, entry) in header.recipients.iter().enumerate() {
        let index = raw_index as u64;
        let recipient_nonce = nonce::recipient_box_nonce(index);
        match primitives::box_open(
            &entry.payload_key_box,
            &recipient_nonce,
            &header.ephemeral_public,
            recipient_secret,
            index,
        ) {
            Ok(opened) => {
                let key: [u8; 32] = opened
                    .try_into()
                    .map_err(|_| Error::MalformedHeader("payload key must be 32 bytes".into()))?;
                payload_key_bytes = Some(key);
                break;
            }
            Err(_) => continue,
        }
    }

    let payload_key_bytes = payload_key_bytes.ok_or(Error::NotARecipient)?;

    let sender_plain = primitives::secretbox_open(
        &header.sender_secretbox,
        nonce::SENDER_SECRETBOX_NONCE,
        &payload_key_bytes,
        AuthSite::SenderSecretbox,
        0,
    )?;
    let sender_identity = if sender_plain.as_slice() == [0u8; 32] {
        SenderIdentity::Anonymous
    } else {
        let bytes: [u8; 32] = sender_plain
            .try_into()
            .map_err(|_| Error::MalformedHeader("sender identity must be 32 bytes".into()))?;
        SenderIdentity::Known(crate::keys::EncryptionPublicKey::from(bytes))
    };

    let mut index: u64 = 0;
    let mut terminated = false;
    loop {
        let packet = match objpack::decode_one_from_reader(input) {
            Ok(Some(value)) => value,
            Ok(None) => break,
            Err(e) => return Err(e),
        };

        let fields = objpack::as_array(&packet)
            .ok_or_else(|| Error::MalformedHeader("payload packet is not an array".into()))?;
        if fields.len() != 1 {
            return Err(Error::MalformedHeader("payload packet must have 1 field".into()));
        }
        let ciphertext = objpack::as_bin(&fields[0])
            .ok_or_else(|| Error::MalformedHeader("payload ciphertext is not binary".into()))?;

        let packet_nonce = nonce::payload_secretbox_nonce(index);
        let plaintext = primitives::secretbox_open(
            ciphertext,
            &packet_nonce,
            &payload_key_bytes,
            AuthSite::PayloadSecretbox,
            index,
        )?;

        if plaintext.is_empty() {
            terminated = true;
            break;
        }

        output.write_all(&plaintext)?;
        index += 1;
    }

    if !terminated {
        return Err(Error::UnexpectedEof);
    }

    Ok(sender_identity)
}
