//! The primitive layer.
//!
//! Every call into an underlying crypto crate goes through one of these
//! functions. Nothing above this module touches `crypto_box`,
//! `xsalsa20poly1305`, `ed25519-dalek`, `blake2` or `rand_core` directly —
//! the same seam the teacher crate draws around its HPKE setup calls in
//! `cipher/hpke.rs`, just generalized to the four NaCl-shaped primitives
//! this protocol needs instead of one.

use blake2::{Blake2b512, Digest};
use crypto_box::aead::{Aead, AeadCore};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand_core::{OsRng, RngCore};
use xsalsa20poly1305::{KeyInit, XSalsa20Poly1305};

use crate::error::{AuthSite, Error, Result};
use crate::keys::{EncryptionPublicKey, EncryptionSecretKey, SigningPublicKey, SigningSecretKey};

/// Authenticated-encrypt `plaintext` so that only the holder of
/// `recipient_secret`'s matching public key (paired with `sender_secret`)
/// can open it. This is NaCl's `crypto_box`, by way of `crypto_box`'s
/// `SalsaBox`.
#[must_use]
pub fn box_seal(
    plaintext: &[u8],
    nonce: &[u8; 24],
    recipient_public: &EncryptionPublicKey,
    sender_secret: &EncryptionSecretKey,
) -> Vec<u8> {
    let public = crypto_box::PublicKey::from(*recipient_public.as_bytes());
    let secret = crypto_box::SecretKey::from(*sender_secret.as_bytes());
    let cipher = crypto_box::SalsaBox::new(&public, &secret);
    let nonce = crypto_box::Nonce::from(*nonce);
    cipher
        .encrypt(&nonce, plaintext)
        .expect("box encryption over in-memory buffers cannot fail")
}

/// Open a box sealed with [`box_seal`]. `index` is only used to label an
/// `Error::AuthFailure`.
pub fn box_open(
    ciphertext: &[u8],
    nonce: &[u8; 24],
    sender_public: &EncryptionPublicKey,
    recipient_secret: &EncryptionSecretKey,
    index: u64,
) -> Result<Vec<u8>> {
    let public = crypto_box::PublicKey::from(*sender_public.as_bytes());
    let secret = crypto_box::SecretKey::from(*recipient_secret.as_bytes());
    let cipher = crypto_box::SalsaBox::new(&public, &secret);
    let nonce = crypto_box::Nonce::from(*nonce);
    cipher.decrypt(&nonce, ciphertext).map_err(|_| Error::AuthFailure {
        index,
        where_: AuthSite::RecipientBox,
    })
}

/// Authenticated-encrypt `plaintext` under a shared symmetric `key`. This
/// is NaCl's `crypto_secretbox`.
#[must_use]
pub fn secretbox_seal(plaintext: &[u8], nonce: &[u8; 24], key: &[u8; 32]) -> Vec<u8> {
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce = xsalsa20poly1305::Nonce::from(*nonce);
    cipher
        .encrypt(&nonce, plaintext)
        .expect("secretbox encryption over in-memory buffers cannot fail")
}

/// Open a secretbox sealed with [`secretbox_seal`].
pub fn secretbox_open(
    ciphertext: &[u8],
    nonce: &[u8; 24],
    key: &[u8; 32],
    where_: AuthSite,
    index: u64,
) -> Result<Vec<u8>> {
    let cipher = XSalsa20Poly1305::new(key.into());
    let nonce = xsalsa20poly1305::Nonce::from(*nonce);
    cipher
        .decrypt(&nonce, ciphertext)
        .map_err(|_| Error::AuthFailure { index, where_ })
}

/// Produce a detached Ed25519 signature over `message`.
#[must_use]
pub fn sign_detached(message: &[u8], signing_secret: &SigningSecretKey) -> [u8; 64] {
    let signing_key = SigningKey::from_bytes(&signing_secret.seed());
    signing_key.sign(message).to_bytes()
}

/// Verify a detached Ed25519 signature produced by [`sign_detached`].
pub fn verify_detached(
    message: &[u8],
    signature: &[u8; 64],
    signing_public: &SigningPublicKey,
) -> Result<()> {
    let verifying_key = VerifyingKey::from_bytes(signing_public.as_bytes())
        .map_err(|_| Error::AuthFailure { index: 0, where_: AuthSite::Signature })?;
    let signature = Signature::from_bytes(signature);
    verifying_key
        .verify(message, &signature)
        .map_err(|_| Error::AuthFailure { index: 0, where_: AuthSite::Signature })
}

/// Hash `data` with BLAKE2b-512, returning the full 64-byte digest. The
/// header hash uses the first 32 bytes of this output.
#[must_use]
pub fn blake2b512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Generate a fresh X25519 encryption key pair.
#[must_use]
pub fn generate_encryption_keypair() -> (EncryptionPublicKey, EncryptionSecretKey) {
    let secret = crypto_box::SecretKey::generate(&mut OsRng);
    let public = secret.public_key();
    (
        EncryptionPublicKey::from(*public.as_bytes()),
        EncryptionSecretKey::from_bytes(secret.to_bytes()),
    )
}

/// Generate a fresh Ed25519 signing key pair. The returned secret key is
/// in expanded (seed || public key) form.
#[must_use]
pub fn generate_signing_keypair() -> (SigningPublicKey, SigningSecretKey) {
    let signing_key = SigningKey::generate(&mut OsRng);
    let verifying_key = signing_key.verifying_key();

    let mut expanded = [0u8; 64];
    expanded[..32].copy_from_slice(&signing_key.to_bytes());
    expanded[32..].copy_from_slice(verifying_key.as_bytes());

    (
        SigningPublicKey::from(verifying_key.to_bytes()),
        SigningSecretKey::from_bytes(expanded),
    )
}

/// Fill an `N`-byte array with CSPRNG output.
#[must_use]
pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}
