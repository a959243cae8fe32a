//! Saltpack v2 authenticated encryption and attached signing.
//!
//! The public surface is five free functions operating over
//! [`std::io::Read`]/[`std::io::Write`] — [`encrypt`], [`decrypt`],
//! [`sign`], [`verify`] — plus [`armor`]/[`dearmor`] for the ASCII
//! wrapper, and the key newtypes in [`keys`]. Everything below that
//! (`objpack`, `primitives`, `nonce`, `header`) is the protocol's
//! internal seam and is exposed for advanced callers but not required
//! for ordinary use.

pub mod armor;
pub mod decrypt;
pub mod encrypt;
pub mod error;
pub mod header;
pub mod keys;
pub mod nonce;
pub mod objpack;
pub mod primitives;
pub mod sign;
pub mod verify;

pub use armor::{armor, dearmor, MessageType};
pub use decrypt::{decrypt, SenderIdentity};
pub use encrypt::{encrypt, Recipient};
pub use error::{AuthSite, Error, Result};
pub use sign::sign;
pub use verify::verify;
