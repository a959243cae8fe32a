use std::fmt;

/// Where an authentication failure occurred, for `Error::AuthFailure`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AuthSite {
    /// A recipient box (payload-key wrapping) failed to open.
    RecipientBox,
    /// The sender-identity secretbox failed to open.
    SenderSecretbox,
    /// A payload chunk secretbox failed to open.
    PayloadSecretbox,
    /// A per-chunk detached signature failed to verify.
    Signature,
}

impl fmt::Display for AuthSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::RecipientBox => "recipient box",
            Self::SenderSecretbox => "sender secretbox",
            Self::PayloadSecretbox => "payload secretbox",
            Self::Signature => "signature",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The header is not a well-formed object-packing value of the
    /// expected shape (wrong element count, wrong types, wrong format
    /// marker).
    MalformedHeader(String),
    /// The header's major version is not `2`.
    UnsupportedVersion(u64),
    /// No recipient entry in the header decrypts under the provided key.
    NotARecipient,
    /// A secretbox/box open or a signature verification failed.
    AuthFailure { index: u64, where_: AuthSite },
    /// The stream ended before a terminator packet was observed.
    UnexpectedEof,
    /// The header's signer public key does not match the caller-supplied
    /// expected key.
    WrongSigner,
    /// The ASCII armor wrapper is malformed, or its body is not valid
    /// base64.
    ArmorError(String),
    /// A caller-supplied argument is invalid (empty recipient list,
    /// short key, odd-length hex, ...).
    InvalidArgument(String),
    /// Reading from or writing to the underlying stream failed.
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedHeader(reason) => write!(f, "Malformed header: {reason}."),
            Self::UnsupportedVersion(major) => {
                write!(f, "Unsupported saltpack version: {major}.")
            }
            Self::NotARecipient => write!(
                f,
                "\
You are not a recipient of this message.
You are likely using the wrong key, or the message was not meant for you."
            ),
            Self::AuthFailure { index, where_ } => {
                write!(f, "Authentication failure in {where_} at index {index}.")
            }
            Self::UnexpectedEof => write!(
                f,
                "Message ended before its terminator packet; it is truncated or corrupted."
            ),
            Self::WrongSigner => write!(
                f,
                "The message was not signed by the expected signer."
            ),
            Self::ArmorError(reason) => write!(f, "Could not read armored message: {reason}."),
            Self::InvalidArgument(reason) => write!(f, "{reason}"),
            Self::Io(reason) => write!(f, "I/O error: {reason}."),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
