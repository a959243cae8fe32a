//! Attached-signature verification state machine.
//!
//! Mirrors [`crate::decrypt::decrypt`]'s structure for the 5-field
//! signing header: parse header, bind the expected signer (if any),
//! verify each chunk's detached signature, and require that the final
//! (empty-chunk, `final = true`) packet was actually seen before
//! reporting success.

use std::io::{Read, Write};

use crate::error::{AuthSite, Error, Result};
use crate::header::SigningHeader;
use crate::keys::SigningPublicKey;
use crate::objpack;
use crate::primitives;

fn signing_input(header_hash: &[u8; 32], header_nonce: &[u8; 32], index: u64, is_final: bool, chunk: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(32 + 32 + 8 + 1 + chunk.len());
    input.extend_from_slice(header_hash);
    input.extend_from_slice(header_nonce);
    input.extend_from_slice(&index.to_be_bytes());
    input.push(u8::from(is_final));
    input.extend_from_slice(chunk);
    input
}

/// Verify an attached-signing message from `input`, writing the signed
/// message bytes to `output` and returning the signer's public key.
///
/// If `expected_signer` is `Some`, the header's signer key must match it
/// exactly or verification fails with `Error::WrongSigner` before any
/// chunk is read.
///
/// # Errors
///
/// - `Error::MalformedHeader` / `Error::UnsupportedVersion` if the
///   header is not a well-formed signing header.
/// - `Error::WrongSigner` if `expected_signer` does not match.
/// - `Error::AuthFailure` if a chunk's signature does not verify.
/// - `Error::UnexpectedEof` if the stream ends before the final packet.
pub fn verify(
    input: &mut dyn Read,
    output: &mut dyn Write,
    expected_signer: Option<SigningPublicKey>,
) -> Result<SigningPublicKey> {
    let (header, header_hash) = SigningHeader::decode_from_reader(input)?;

    if let Some(expected) = expected_signer {
        if expected.as_bytes() != header.signer_public.as_bytes() {
            return Err(Error::WrongSigner);
        }
    }

    let mut index: u64 = 0;
    let mut terminated = false;
    loop {
        let packet = match objpack::decode_one_from_reader(input)? {
            Some(value) => value,
            None => break,
        };

        let fields = objpack::as_array(&packet)
            .ok_or_else(|| Error::MalformedHeader("signed packet is not an array".into()))?;
        if fields.len() != 2 {
            return Err(Error::MalformedHeader("signed packet must have 2 fields".into()));
        }
        let signature_bytes = objpack::as_bin(&fields[0])
            .ok_or_else(|| Error::MalformedHeader("signature is not binary".into()))?;
        let signature: [u8; 64] = signature_bytes
            .try_into()
            .map_err(|_| Error::MalformedHeader("signature must be 64 bytes".into()))?;
        let chunk = objpack::as_bin(&fields[1])
            .ok_or_else(|| Error::MalformedHeader("chunk is not binary".into()))?;

        let is_final = chunk.is_empty();
        let input_bytes = signing_input(&header_hash, &header.nonce, index, is_final, chunk);

        primitives::verify_detached(&input_bytes, &signature, &header.signer_public).map_err(|_| {
            Error::AuthFailure { index, where_: AuthSite::Signature }
        })?;

        if is_final {
            terminated = true;
            break;
        }

        output.write_all(chunk)?;
        index += 1;
    }

    if !terminated {
        return Err(Error::UnexpectedEof);
    }

    Ok(header.signer_public)
}
