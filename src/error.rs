use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Wire bytes violate a length or structure invariant. Fatal to the
    /// handshake; the connection must be torn down.
    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    /// The peers have no mutually acceptable protocol version.
    #[error("No overlapping protocol version")]
    NoOverlappingVersion,

    /// The peer chose a value it was not entitled to choose.
    #[error("Illegal parameter: {0}")]
    IllegalParameter(String),

    /// No security policy registered under the given name.
    #[error("Unknown security policy: {0}")]
    UnknownPolicy(String),

    /// A driver was called in the wrong mode or out of order.
    #[error("Unexpected message: {0}")]
    UnexpectedMessage(String),
}
