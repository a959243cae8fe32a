//! Key and message-scoped secret newtypes.
//!
//! Public keys are plain, `Copy` byte arrays — there is nothing secret to
//! protect. Secret-carrying types wrap `secrecy::SecretBox`, the same way
//! the teacher crate wraps its derived HPKE symmetric key in
//! `secrecy::zeroize::Zeroizing` / `secrecy::SecretSlice`: the bytes are
//! zeroized the moment the wrapper is dropped, and `expose_secret()` is
//! the only way to read them back out.

use secrecy::{ExposeSecret, SecretBox};

/// 32-byte X25519 public key used for recipient wrapping and sender
/// identification.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct EncryptionPublicKey(pub [u8; 32]);

impl EncryptionPublicKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for EncryptionPublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// 32-byte X25519 secret key.
pub struct EncryptionSecretKey(SecretBox<[u8; 32]>);

impl EncryptionSecretKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }
}

/// 32-byte Ed25519 public key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SigningPublicKey(pub [u8; 32]);

impl SigningPublicKey {
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for SigningPublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// 64-byte Ed25519 secret key in expanded (libsodium/NaCl) form: a
/// 32-byte seed followed by the 32-byte public key it derives. Only the
/// seed is cryptographically load-bearing; the trailing public key is
/// carried for on-wire format fidelity and is never read back out
/// independently — `signing_public_key()` always re-derives it.
pub struct SigningSecretKey(SecretBox<[u8; 64]>);

impl SigningSecretKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 64] {
        self.0.expose_secret()
    }

    #[must_use]
    pub fn seed(&self) -> [u8; 32] {
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&self.as_bytes()[..32]);
        seed
    }
}

/// Single-use, 32-byte symmetric payload key.
pub struct PayloadKey(SecretBox<[u8; 32]>);

impl PayloadKey {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }
}

/// Single-use X25519 ephemeral key pair generated per encryption message.
pub struct EphemeralKeyPair {
    pub public: EncryptionPublicKey,
    secret: EncryptionSecretKey,
}

impl EphemeralKeyPair {
    #[must_use]
    pub fn new(public: EncryptionPublicKey, secret: EncryptionSecretKey) -> Self {
        Self { public, secret }
    }

    #[must_use]
    pub fn secret(&self) -> &EncryptionSecretKey {
        &self.secret
    }
}

/// 32 random bytes used only by the signing header, to decorrelate the
/// signing input across messages signed by the same key.
pub struct HeaderNonce(SecretBox<[u8; 32]>);

impl HeaderNonce {
    #[must_use]
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(SecretBox::new(Box::new(bytes)))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.expose_secret()
    }
}
