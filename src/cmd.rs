#![allow(clippy::unnecessary_wraps)]

pub mod cli;
pub mod ui;

use std::io::{self, Read, Write};

use saltpack::keys::{EncryptionPublicKey, EncryptionSecretKey, SigningPublicKey, SigningSecretKey};
use saltpack::{self, Recipient};

use ui::color::Color;

/// Strip a recognized key-type prefix (`0x`, `pk_0x`, `sk_0x`) before
/// hex-decoding. The prefix is cosmetic; it exists so a key printed by
/// `keygen` is self-describing when pasted back in.
fn strip_hex_prefix(raw: &str) -> &str {
    raw.strip_prefix("pk_0x")
        .or_else(|| raw.strip_prefix("sk_0x"))
        .or_else(|| raw.strip_prefix("0x"))
        .unwrap_or(raw)
}

fn decode_hex(raw: &str) -> Result<Vec<u8>, String> {
    let raw = strip_hex_prefix(raw);
    if raw.len() % 2 != 0 {
        return Err(format!("key '{raw}' has an odd number of hex digits"));
    }
    (0..raw.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&raw[i..i + 2], 16)
                .map_err(|_| format!("key '{raw}' is not valid hex"))
        })
        .collect()
}

fn decode_fixed_hex<const N: usize>(raw: &str) -> Result<[u8; N], String> {
    let bytes = decode_hex(raw)?;
    bytes
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected a {N}-byte key, got {} bytes", v.len()))
}

/// Resolve a key from an explicit `-k/--key` value, or fall back to the
/// named environment variable when no value was given on the command
/// line.
fn resolve_key(explicit: Option<&str>, env_var: &str) -> Result<String, String> {
    if let Some(value) = explicit {
        return Ok(value.to_string());
    }
    std::env::var(env_var).map_err(|_| {
        format!("no key given; pass '-k/--key' or set ${env_var}")
    })
}

pub fn genkey(json: bool) -> Result<(), i32> {
    run(|| {
        let (enc_pk, enc_sk) = saltpack::primitives::generate_encryption_keypair();
        let (sig_pk, sig_sk) = saltpack::primitives::generate_signing_keypair();

        let encryption_public = hex_string(enc_pk.as_bytes());
        let encryption_secret = hex_string(enc_sk.as_bytes());
        let signing_public = hex_string(sig_pk.as_bytes());
        let signing_secret = hex_string(sig_sk.as_bytes());

        if json {
            println!(
                "{{\"SALTPACK_ENCRYPT_PK\":\"pk_0x{encryption_public}\",\"SALTPACK_DECRYPT_SK\":\"sk_0x{encryption_secret}\",\"SALTPACK_VERIFY_PK\":\"pk_0x{signing_public}\",\"SALTPACK_SIGN_SK\":\"sk_0x{signing_secret}\"}}"
            );
        } else {
            println!("SALTPACK_ENCRYPT_PK=pk_0x{encryption_public}");
            println!("SALTPACK_DECRYPT_SK=sk_0x{encryption_secret}");
            println!("SALTPACK_VERIFY_PK=pk_0x{signing_public}");
            println!("SALTPACK_SIGN_SK=sk_0x{signing_secret}");
        }
        Ok(())
    })
}

pub fn encrypt(keys: &[String], armor: bool) -> Result<(), i32> {
    run(|| {
        if keys.is_empty() {
            return Err("encrypt requires at least one '-k/--key <recipient public key>'".to_string());
        }

        let recipients = keys
            .iter()
            .map(|raw| {
                let bytes = decode_fixed_hex::<32>(raw)?;
                Ok(Recipient::new(EncryptionPublicKey::from(bytes)))
            })
            .collect::<Result<Vec<_>, String>>()?;

        let mut plaintext = Vec::new();
        io::stdin()
            .read_to_end(&mut plaintext)
            .map_err(|e| e.to_string())?;

        let mut ciphertext = Vec::new();
        saltpack::encrypt(&mut io::Cursor::new(plaintext), &mut ciphertext, &recipients, None)
            .map_err(|e| e.to_string())?;

        write_output(&ciphertext, armor, saltpack::MessageType::Encrypted)
    })
}

pub fn decrypt(keys: &[String]) -> Result<(), i32> {
    run(|| {
        let raw = resolve_key(keys.first().map(String::as_str), "SALTPACK_DECRYPT_SK")?;
        let secret = EncryptionSecretKey::from_bytes(decode_fixed_hex::<32>(&raw)?);

        let mut input = Vec::new();
        io::stdin().read_to_end(&mut input).map_err(|e| e.to_string())?;
        let bytes = read_possibly_armored(&input)?;

        let mut plaintext = Vec::new();
        saltpack::decrypt(&mut io::Cursor::new(bytes), &mut plaintext, &secret)
            .map_err(|e| e.to_string())?;

        io::stdout().write_all(&plaintext).map_err(|e| e.to_string())?;
        Ok(())
    })
}

pub fn sign(keys: &[String], armor: bool) -> Result<(), i32> {
    run(|| {
        let raw = resolve_key(keys.first().map(String::as_str), "SALTPACK_SIGN_SK")?;
        let secret = SigningSecretKey::from_bytes(decode_fixed_hex::<64>(&raw)?);

        let mut message = Vec::new();
        io::stdin().read_to_end(&mut message).map_err(|e| e.to_string())?;

        let mut signed = Vec::new();
        saltpack::sign(&mut io::Cursor::new(message), &mut signed, &secret).map_err(|e| e.to_string())?;

        write_output(&signed, armor, saltpack::MessageType::Signed)
    })
}

pub fn verify(keys: &[String]) -> Result<(), i32> {
    run(|| {
        let expected = match keys.first() {
            Some(raw) => Some(SigningPublicKey::from(decode_fixed_hex::<32>(raw)?)),
            None => std::env::var("SALTPACK_VERIFY_PK")
                .ok()
                .map(|raw| decode_fixed_hex::<32>(&raw).map(SigningPublicKey::from))
                .transpose()?,
        };

        let mut input = Vec::new();
        io::stdin().read_to_end(&mut input).map_err(|e| e.to_string())?;
        let bytes = read_possibly_armored(&input)?;

        let mut output = Vec::new();
        saltpack::verify(&mut io::Cursor::new(bytes), &mut output, expected).map_err(|e| e.to_string())?;

        io::stdout().write_all(&output).map_err(|e| e.to_string())?;
        Ok(())
    })
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn write_output(bytes: &[u8], armor: bool, message_type: saltpack::MessageType) -> Result<(), String> {
    if armor {
        print!("{}", saltpack::armor(bytes, message_type));
    } else {
        io::stdout().write_all(bytes).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Try to dearmor; if the input doesn't look armored, pass it through
/// unchanged.
fn read_possibly_armored(input: &[u8]) -> Result<Vec<u8>, String> {
    let text = std::str::from_utf8(input);
    match text {
        Ok(text) if text.trim_start().starts_with("BEGIN SALTPACK ") => {
            saltpack::dearmor(text).map_err(|e| e.to_string())
        }
        _ => Ok(input.to_vec()),
    }
}

/// Run a command body, printing any error via [`Color::error`] and
/// translating it into the CLI's runtime-failure exit code.
fn run(body: impl FnOnce() -> Result<(), String>) -> Result<(), i32> {
    body().map_err(|err| {
        eprintln!("{}", Color::error(&format!("fatal: {err}.")));
        1
    })
}
