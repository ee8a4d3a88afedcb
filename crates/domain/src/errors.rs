use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid upstream: {0}")]
    InvalidUpstream(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("GeoIP error: {0}")]
    GeoIp(String),

    #[error("Public suffix list error: {0}")]
    PublicSuffixList(String),

    #[error("Failed to write result: {0}")]
    Output(String),

    #[error("Scan cancelled")]
    Cancelled,
}

/// Failure of a single DNS exchange.
///
/// Cloneable so that a transport closure cause can be handed to every
/// caller that was waiting when the socket went away.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("query must carry exactly one question")]
    InvalidQuestion,

    #[error("query tuple collision")]
    Collision,

    #[error("failed to pack query, {0}")]
    Encode(String),

    #[error("failed to parse message, {0}")]
    Decode(String),

    #[error("failed to send query, {0}")]
    Send(String),

    #[error("query timeout")]
    Timeout,

    #[error("transport closed, {0}")]
    Closed(String),

    #[error("query cancelled")]
    Cancelled,

    #[error("bad rcode {0}")]
    ResponseCode(u16),
}
