//! Attached-signing engine.
//!
//! Structurally this is the encryption payload encryptor's sibling: same
//! read-loop-until-EOF shape as `encrypt::encrypt`, but each packet
//! carries a detached signature over the chunk instead of ciphertext,
//! and the signing input additionally binds in the chunk's position and
//! whether it is the final one so packets cannot be reordered or have
//! their "last chunk" status forged.

use std::io::{Read, Write};

use crate::error::Result;
use crate::header::SigningHeader;
use crate::keys::SigningSecretKey;
use crate::objpack::{self, array, bin};
use crate::primitives;

/// Maximum plaintext bytes per signed chunk.
pub const CHUNK_SIZE: usize = 1024 * 1024;

fn signing_input(header_hash: &[u8; 32], header_nonce: &[u8; 32], index: u64, is_final: bool, chunk: &[u8]) -> Vec<u8> {
    let mut input = Vec::with_capacity(32 + 32 + 8 + 1 + chunk.len());
    input.extend_from_slice(header_hash);
    input.extend_from_slice(header_nonce);
    input.extend_from_slice(&index.to_be_bytes());
    input.push(u8::from(is_final));
    input.extend_from_slice(chunk);
    input
}

/// Sign `message` for attached signing, writing a signing-mode saltpack
/// message to `output`.
///
/// # Errors
///
/// Returns `Error::Io` if reading `message` or writing `output` fails.
pub fn sign(message: &mut dyn Read, output: &mut dyn Write, signing_secret: &SigningSecretKey) -> Result<()> {
    let mut public_bytes = [0u8; 32];
    public_bytes.copy_from_slice(&signing_secret.as_bytes()[32..]);

    let header_nonce = primitives::random_bytes::<32>();
    let header = SigningHeader {
        signer_public: crate::keys::SigningPublicKey::from(public_bytes),
        nonce: header_nonce,
    };
    let (encoded_header, header_hash) = header.encode();
    output.write_all(&encoded_header)?;

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut index: u64 = 0;
    loop {
        let n = read_full(message, &mut buf)?;
        let is_final = n == 0;
        let input = signing_input(&header_hash, &header_nonce, index, is_final, &buf[..n]);
        let signature = primitives::sign_detached(&input, signing_secret);
        write_packet(output, &signature, &buf[..n])?;

        if is_final {
            break;
        }
        index += 1;
    }

    Ok(())
}

fn write_packet(output: &mut dyn Write, signature: &[u8; 64], chunk: &[u8]) -> Result<()> {
    let packet = array(vec![bin(signature), bin(chunk)]);
    output.write_all(&objpack::encode(&packet))?;
    Ok(())
}

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
    use crate::primitives::generate_signing_keypair;

    #[test]
    fn produces_a_header_and_a_terminator_packet() {
        let (_, secret) = generate_signing_keypair();
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        sign(&mut input, &mut output, &secret).unwrap();

        let (_, _, consumed) = SigningHeader::decode(&output).unwrap();
        let (packet, packet_len) = objpack::decode_one(&output[consumed..]).unwrap();
        let fields = objpack::as_array(&packet).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(objpack::as_bin(&fields[1]).unwrap(), b"");
        assert_eq!(consumed + packet_len, output.len());
    }
}
