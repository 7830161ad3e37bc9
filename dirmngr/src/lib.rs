//! CRL, OCSP and keyserver directory service core.
//!
//! This crate implements the core of a certificate directory service:
//! a line-oriented inter-process command protocol with per-session
//! state and client call-backs (inquiries), the certificate
//! revocation decision flow over CRL and OCSP, per-session keyserver
//! list management, and the HKP keyserver actions.
//!
//! The heavy machinery lives elsewhere and is consumed through narrow
//! interfaces (see [`backend`]): the certificate and CRL caches, the
//! OCSP responder client, the X.509 chain validator, and the HTTP
//! transport.  This crate owns the protocol, the session state, and
//! the decision logic that ties those collaborators together.
//!
//! The command channel is a pipe between cooperating processes; it
//! carries no transport security of its own.
//!
//! [`backend`]: backend/index.html

#![warn(missing_docs)]

pub mod assuan;
pub mod backend;
pub mod keyserver;
pub mod server;
pub mod uri;

use std::time::Duration;

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

/// The keyserver used when a session has not configured any.
///
/// The installer may point this at a different pool; it is a
/// compile-time constant.
pub const DEFAULT_KEYSERVER: &str = "hkps://hkps.pool.sks-keyservers.net";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Errors returned by this crate.
///
/// These are the stable error kinds of the service surface; every
/// failure is translated into one of them before it reaches the
/// response line.
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Syntax error in the command line.
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// The input ends in the middle of a structure.
    #[error("Truncated input")]
    Truncated,

    /// A malformed OpenPGP packet.
    #[error("Invalid packet: {0}")]
    InvalidPacket(String),

    /// A malformed certificate.
    #[error("Invalid certificate: {0}")]
    InvalidCertificate(String),

    /// A required certificate was not found.
    #[error("Missing certificate: {0}")]
    MissingCertificate(String),

    /// There is no CRL for the certificate in question.
    #[error("No CRL known")]
    NoCrlKnown,

    /// The certificate has been revoked.
    #[error("Certificate revoked")]
    CertificateRevoked,

    /// The certificate chain does not end in a trusted anchor.
    #[error("Not trusted")]
    NotTrusted,

    /// The requested operation is not supported.
    #[error("Not supported")]
    NotSupported,

    /// An unknown session option.
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// An unknown command.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    /// A network operation missed the controller's deadline.
    #[error("Operation timed out")]
    Timeout,

    /// A network or channel transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The operation produced no data.
    #[error("No data")]
    NoData,

    /// The peer cancelled an inquiry.
    #[error("Operation cancelled")]
    Cancelled,

    /// An allocation failed; fatal to the command, not the session.
    #[error("Out of memory")]
    OutOfMemory,

    /// A bug.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the stable numeric code used on `ERR` response lines.
    pub fn code(&self) -> u32 {
        use self::Error::*;
        match self {
            InvalidArgument(_) => 11,
            Parameter(_) => 12,
            Truncated => 13,
            InvalidPacket(_) => 14,
            InvalidCertificate(_) => 21,
            MissingCertificate(_) => 22,
            NoCrlKnown => 23,
            CertificateRevoked => 24,
            NotTrusted => 25,
            NotSupported => 31,
            UnknownOption(_) => 32,
            UnknownCommand(_) => 33,
            Timeout => 41,
            Transport(_) => 42,
            NoData => 43,
            Cancelled => 44,
            OutOfMemory => 51,
            Internal(_) => 52,
        }
    }
}

/// Process-wide service configuration.
///
/// Resolved once at startup from whatever configuration mechanism the
/// embedding process uses, then shared read-only by every session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether OCSP may be used at all.  With this off, `ISVALID`
    /// falls back to its CRL path and OCSP requests fail with
    /// [`Error::NotSupported`].
    pub allow_ocsp: bool,
    /// Whether network traffic is routed over Tor.  Only reported via
    /// `GETINFO tor`; the routing itself is the transport's business.
    pub use_tor: bool,
    /// Deadline for outbound network operations.
    pub connect_timeout: Duration,
    /// Deadline used instead when a command passes `--quick`.
    pub connect_quick_timeout: Duration,
    /// Home directory for cache and configuration resolution, opaque
    /// to this crate and merely passed along to the collaborators.
    pub homedir: Option<std::path::PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            allow_ocsp: false,
            use_tor: false,
            connect_timeout: Duration::from_secs(15),
            connect_quick_timeout: Duration::from_secs(2),
            homedir: None,
        }
    }
}

/// Translates an arbitrary error into the stable kinds of [`Error`].
///
/// Errors that already are [`Error`]s pass through; codec errors keep
/// their meaning; everything else becomes an internal error.
pub(crate) fn map_err(e: anyhow::Error) -> Error {
    match e.downcast::<Error>() {
        Ok(e) => e,
        Err(e) => match e.downcast::<palisade_openpgp::Error>() {
            Ok(pgp) => match pgp {
                palisade_openpgp::Error::Truncated(_) => Error::Truncated,
                pgp => Error::InvalidPacket(pgp.to_string()),
            },
            Err(e) => Error::Internal(e.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_distinct() {
        let errors = [
            Error::InvalidArgument(String::new()),
            Error::Parameter(String::new()),
            Error::Truncated,
            Error::InvalidPacket(String::new()),
            Error::InvalidCertificate(String::new()),
            Error::MissingCertificate(String::new()),
            Error::NoCrlKnown,
            Error::CertificateRevoked,
            Error::NotTrusted,
            Error::NotSupported,
            Error::UnknownOption(String::new()),
            Error::UnknownCommand(String::new()),
            Error::Timeout,
            Error::Transport(String::new()),
            Error::NoData,
            Error::Cancelled,
            Error::OutOfMemory,
            Error::Internal(String::new()),
        ];
        let mut codes: Vec<u32> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn codec_errors_keep_their_meaning() {
        let e = anyhow::Error::new(palisade_openpgp::Error::Truncated(3));
        assert_eq!(map_err(e), Error::Truncated);

        let e = anyhow::Error::new(
            palisade_openpgp::Error::MalformedPacket("bad".into()));
        assert!(matches!(map_err(e), Error::InvalidPacket(_)));
    }
}
