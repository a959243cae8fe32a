//! Header assembly, canonical encoding and the header hash.
//!
//! Both header kinds are object-packing arrays: the header hash binds to
//! the *exact bytes* the sender emitted, so decoding captures the bytes
//! actually consumed rather than re-encoding the parsed value to
//! recompute them — a re-encode is not guaranteed to reproduce
//! byte-identical output and would silently break authentication for
//! messages from other implementations. [`CapturingReader`] makes this
//! hold even when the header is read off a stream instead of a slice.

use std::io::{self, Read};

use rmpv::Value;

use crate::error::{Error, Result};
use crate::keys::{EncryptionPublicKey, SigningPublicKey};
use crate::objpack::{self, array, bin, str_, uint};
use crate::primitives::blake2b512;

const FORMAT_NAME: &str = "saltpack";
const VERSION_MAJOR: u64 = 2;
const VERSION_MINOR: u64 = 0;
const MODE_ENCRYPTION: u64 = 0;
const MODE_ATTACHED_SIGNING: u64 = 1;

/// The first 32 bytes of `blake2b512(encoded_header)`, bound into every
/// per-packet nonce and signing input so packets cannot be spliced
/// between messages.
pub type HeaderHash = [u8; 32];

fn compute_hash(encoded: &[u8]) -> HeaderHash {
    let digest = blake2b512(encoded);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest[..32]);
    hash
}

/// Records every byte read through it. Wrapping a reader in this before
/// handing it to the object-packing decoder recovers the exact bytes a
/// header value was parsed from, with no re-encoding step.
struct CapturingReader<'a> {
    inner: &'a mut dyn Read,
    captured: Vec<u8>,
}

impl Read for CapturingReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.captured.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

fn decode_value_from_reader(reader: &mut dyn Read) -> Result<(Value, HeaderHash)> {
    let mut capturing = CapturingReader { inner: reader, captured: Vec::new() };
    let value = rmpv::decode::read_value(&mut capturing)
        .map_err(|reason| Error::MalformedHeader(reason.to_string()))?;
    let hash = compute_hash(&capturing.captured);
    Ok((value, hash))
}

/// One recipient's wrapped payload key, as it appears in the encryption
/// header's recipient list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecipientEntry {
    /// `None` for anonymous recipients: the recipient's public key is
    /// never written to the header.
    pub recipient_public: Option<EncryptionPublicKey>,
    pub payload_key_box: Vec<u8>,
}

/// A fully assembled encryption header, ready to encode or as decoded
/// from the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EncryptionHeader {
    pub ephemeral_public: EncryptionPublicKey,
    pub sender_secretbox: Vec<u8>,
    pub recipients: Vec<RecipientEntry>,
}

impl EncryptionHeader {
    fn to_value(&self) -> Value {
        let recipients = self
            .recipients
            .iter()
            .map(|r| {
                array(vec![
                    match &r.recipient_public {
                        Some(pk) => bin(pk.as_bytes()),
                        None => Value::Nil,
                    },
                    bin(&r.payload_key_box),
                ])
            })
            .collect();

        array(vec![
            str_(FORMAT_NAME),
            array(vec![uint(VERSION_MAJOR), uint(VERSION_MINOR)]),
            uint(MODE_ENCRYPTION),
            bin(self.ephemeral_public.as_bytes()),
            bin(&self.sender_secretbox),
            array(recipients),
        ])
    }

    /// Encode to canonical bytes and compute the header hash over them.
    #[must_use]
    pub fn encode(&self) -> (Vec<u8>, HeaderHash) {
        let encoded = objpack::encode(&self.to_value());
        let hash = compute_hash(&encoded);
        (encoded, hash)
    }

    fn from_value(value: &Value) -> Result<Self> {
        let fields = objpack::as_array(value)
            .ok_or_else(|| Error::MalformedHeader("header is not an array".into()))?;
        if fields.len() != 6 {
            return Err(Error::MalformedHeader(format!(
                "expected 6 header fields, found {}",
                fields.len()
            )));
        }

        check_format_and_version(&fields[0], &fields[1])?;

        let mode = objpack::as_uint(&fields[2])
            .ok_or_else(|| Error::MalformedHeader("mode is not an integer".into()))?;
        if mode != MODE_ENCRYPTION {
            return Err(Error::MalformedHeader(format!(
                "expected encryption mode {MODE_ENCRYPTION}, found {mode}"
            )));
        }

        let ephemeral_public =
            EncryptionPublicKey::from(read_public_key_bytes(&fields[3], "ephemeral public key")?);
        let sender_secretbox = objpack::as_bin(&fields[4])
            .ok_or_else(|| Error::MalformedHeader("sender secretbox is not binary".into()))?
            .to_vec();

        let recipient_values = objpack::as_array(&fields[5])
            .ok_or_else(|| Error::MalformedHeader("recipient list is not an array".into()))?;
        let mut recipients = Vec::with_capacity(recipient_values.len());
        for entry in recipient_values {
            let entry_fields = objpack::as_array(entry)
                .ok_or_else(|| Error::MalformedHeader("recipient entry is not an array".into()))?;
            if entry_fields.len() != 2 {
                return Err(Error::MalformedHeader("recipient entry must have 2 fields".into()));
            }
            let recipient_public = match &entry_fields[0] {
                Value::Nil => None,
                value => {
                    Some(EncryptionPublicKey::from(read_public_key_bytes(value, "recipient public key")?))
                }
            };
            let payload_key_box = objpack::as_bin(&entry_fields[1])
                .ok_or_else(|| Error::MalformedHeader("payload key box is not binary".into()))?
                .to_vec();
            recipients.push(RecipientEntry { recipient_public, payload_key_box });
        }

        Ok(Self { ephemeral_public, sender_secretbox, recipients })
    }

    /// Decode an encryption header from the start of `bytes`.
    ///
    /// Returns the header, its hash, and the number of bytes consumed so
    /// the caller can locate the start of the first payload packet.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedHeader` if the shape does not match, and
    /// `Error::UnsupportedVersion` if the major version is not 2.
    pub fn decode(bytes: &[u8]) -> Result<(Self, HeaderHash, usize)> {
        let (value, consumed) = objpack::decode_one(bytes)?;
        let hash = compute_hash(&bytes[..consumed]);
        let header = Self::from_value(&value)?;
        Ok((header, hash, consumed))
    }

    /// Decode an encryption header directly from a stream, reading
    /// exactly as many bytes as the header occupies and no further.
    ///
    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub fn decode_from_reader(reader: &mut dyn Read) -> Result<(Self, HeaderHash)> {
        let (value, hash) = decode_value_from_reader(reader)?;
        let header = Self::from_value(&value)?;
        Ok((header, hash))
    }
}

/// A fully assembled attached-signing header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SigningHeader {
    pub signer_public: SigningPublicKey,
    pub nonce: [u8; 32],
}

impl SigningHeader {
    fn to_value(&self) -> Value {
        array(vec![
            str_(FORMAT_NAME),
            array(vec![uint(VERSION_MAJOR), uint(VERSION_MINOR)]),
            uint(MODE_ATTACHED_SIGNING),
            bin(self.signer_public.as_bytes()),
            bin(&self.nonce),
        ])
    }

    #[must_use]
    pub fn encode(&self) -> (Vec<u8>, HeaderHash) {
        let encoded = objpack::encode(&self.to_value());
        let hash = compute_hash(&encoded);
        (encoded, hash)
    }

    fn from_value(value: &Value) -> Result<Self> {
        let fields = objpack::as_array(value)
            .ok_or_else(|| Error::MalformedHeader("header is not an array".into()))?;
        if fields.len() != 5 {
            return Err(Error::MalformedHeader(format!(
                "expected 5 header fields, found {}",
                fields.len()
            )));
        }

        check_format_and_version(&fields[0], &fields[1])?;

        let mode = objpack::as_uint(&fields[2])
            .ok_or_else(|| Error::MalformedHeader("mode is not an integer".into()))?;
        if mode != MODE_ATTACHED_SIGNING {
            return Err(Error::MalformedHeader(format!(
                "expected signing mode {MODE_ATTACHED_SIGNING}, found {mode}"
            )));
        }

        let signer_public =
            SigningPublicKey::from(read_public_key_bytes(&fields[3], "signer public key")?);
        let nonce_bytes = objpack::as_bin(&fields[4])
            .ok_or_else(|| Error::MalformedHeader("nonce is not binary".into()))?;
        let nonce: [u8; 32] = nonce_bytes
            .try_into()
            .map_err(|_| Error::MalformedHeader("nonce must be 32 bytes".into()))?;

        Ok(Self { signer_public, nonce })
    }

    /// # Errors
    ///
    /// Returns `Error::MalformedHeader` if the shape does not match, and
    /// `Error::UnsupportedVersion` if the major version is not 2.
    pub fn decode(bytes: &[u8]) -> Result<(Self, HeaderHash, usize)> {
        let (value, consumed) = objpack::decode_one(bytes)?;
        let hash = compute_hash(&bytes[..consumed]);
        let header = Self::from_value(&value)?;
        Ok((header, hash, consumed))
    }

    /// # Errors
    ///
    /// Same as [`Self::decode`].
    pub fn decode_from_reader(reader: &mut dyn Read) -> Result<(Self, HeaderHash)> {
        let (value, hash) = decode_value_from_reader(reader)?;
        let header = Self::from_value(&value)?;
        Ok((header, hash))
    }
}

fn check_format_and_version(format: &Value, version: &Value) -> Result<()> {
    let format = objpack::as_str(format)
        .ok_or_else(|| Error::MalformedHeader("format name is not a string".into()))?;
    if format != FORMAT_NAME {
        return Err(Error::MalformedHeader(format!("unrecognized format name {format:?}")));
    }

    let version_fields = objpack::as_array(version)
        .ok_or_else(|| Error::MalformedHeader("version is not an array".into()))?;
    if version_fields.len() != 2 {
        return Err(Error::MalformedHeader("version must have 2 fields".into()));
    }
    let major = objpack::as_uint(&version_fields[0])
        .ok_or_else(|| Error::MalformedHeader("version major is not an integer".into()))?;
    if major != VERSION_MAJOR {
        return Err(Error::UnsupportedVersion(major));
    }
    Ok(())
}

fn read_public_key_bytes(value: &Value, what: &'static str) -> Result<[u8; 32]> {
    let bytes = objpack::as_bin(value).ok_or_else(|| Error::MalformedHeader(format!("{what} is not binary")))?;
    bytes
        .try_into()
        .map_err(|_| Error::MalformedHeader(format!("{what} must be 32 bytes")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_encryption_header() -> EncryptionHeader {
        EncryptionHeader {
            ephemeral_public: EncryptionPublicKey::from([1u8; 32]),
            sender_secretbox: vec![2u8; 48],
            recipients: vec![
                RecipientEntry {
                    recipient_public: Some(EncryptionPublicKey::from([3u8; 32])),
                    payload_key_box: vec![4u8; 48],
                },
                RecipientEntry { recipient_public: None, payload_key_box: vec![5u8; 48] },
            ],
        }
    }

    #[test]
    fn encryption_header_round_trips() {
        let header = sample_encryption_header();
        let (encoded, hash) = header.encode();

        let (decoded, decoded_hash, consumed) = EncryptionHeader::decode(&encoded).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded_hash, hash);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn encryption_header_round_trips_from_a_reader() {
        let header = sample_encryption_header();
        let (mut encoded, hash) = header.encode();
        encoded.extend_from_slice(b"trailing payload bytes the reader must not touch");

        let mut cursor = io::Cursor::new(encoded);
        let (decoded, decoded_hash) = EncryptionHeader::decode_from_reader(&mut cursor).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded_hash, hash);

        let mut rest = Vec::new();
        cursor.read_to_end(&mut rest).unwrap();
        assert_eq!(rest, b"trailing payload bytes the reader must not touch");
    }

    #[test]
    fn signing_header_round_trips() {
        let header = SigningHeader { signer_public: SigningPublicKey::from([9u8; 32]), nonce: [7u8; 32] };
        let (encoded, hash) = header.encode();

        let (decoded, decoded_hash, consumed) = SigningHeader::decode(&encoded).unwrap();

        assert_eq!(decoded, header);
        assert_eq!(decoded_hash, hash);
        assert_eq!(consumed, encoded.len());
    }

    #[test]
    fn decode_rejects_wrong_mode() {
        let header = sample_encryption_header();
        let (encoded, _) = header.encode();
        let err = SigningHeader::decode(&encoded).unwrap_err();
        assert!(matches!(err, Error::MalformedHeader(_)));
    }

    #[test]
    fn decode_leaves_trailing_payload_bytes_untouched() {
        let header = sample_encryption_header();
        let (mut encoded, hash) = header.encode();
        encoded.extend_from_slice(b"trailing payload packet");

        let (_, decoded_hash, consumed) = EncryptionHeader::decode(&encoded).unwrap();
        assert_eq!(decoded_hash, hash);
        assert_eq!(&encoded[consumed..], b"trailing payload packet");
    }
}
