use thiserror::Error;

/// Errors that can occur while decoding or encoding an allocation message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// Payload ended before the message was complete
    #[error("Allocation message truncated: needed {needed} more bytes but only {remaining} remain")]
    Truncated {
        needed: usize,
        remaining: usize,
    },

    /// Unknown message discriminant (SECURITY: potentially malicious payload)
    #[error("Invalid allocation message tag {tag} (valid range: 1-7). This may indicate a malformed or malicious payload")]
    InvalidTag {
        tag: u8,
    },

    /// Unknown namespace discriminant
    #[error("Invalid namespace tag {tag} (valid range: 0-2)")]
    InvalidNamespace {
        tag: u8,
    },

    /// Bytes left over after a complete message was read
    #[error("Allocation message has {count} trailing bytes after a complete message")]
    TrailingBytes {
        count: usize,
    },

    /// A key list too long to fit its one-byte length prefix
    #[error("Cannot encode {count} keys in one message, the limit is 255")]
    TooManyKeys {
        count: usize,
    },
}
