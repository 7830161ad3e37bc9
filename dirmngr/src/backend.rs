//! Interfaces to the external collaborators.
//!
//! The heavy machinery lives outside this crate: the certificate
//! cache, the CRL cache with its storage engine, the OCSP responder
//! client, the X.509 chain validator, and the HTTP transport.  This
//! module defines the narrow interfaces the service consumes them
//! through, and the opaque certificate handle passed across them.
//!
//! The caches are process-wide and shared between sessions; an
//! implementation must serialize its writers with respect to its
//! readers internally.  The traits therefore take `&self`.

use std::sync::Arc;
use std::time::Duration;

use crate::Error;
use crate::Result;
use crate::uri::Uri;

/// Maximum size of a certificate accepted over the channel.
pub const MAX_CERT_SIZE: usize = 16 * 1024;

/// Maximum size of a PEM certificate list accepted over the channel,
/// roughly twenty PEM-encoded certificates.
pub const MAX_CERTLIST_SIZE: usize = 20 * (MAX_CERT_SIZE * 4 / 3);

/// An opaque certificate handle.
///
/// The service never looks inside a certificate; it hands the DER
/// blob to the collaborators, which run their own ASN.1 machinery.
/// The handle is cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cert {
    der: Arc<[u8]>,
}

impl Cert {
    /// Wraps a DER-encoded certificate.
    ///
    /// The blob is only checked for its bounds; parsing it is the
    /// collaborators' business.
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        if der.is_empty() {
            return Err(Error::MissingCertificate(
                "empty certificate".into()).into());
        }
        if der.len() > MAX_CERT_SIZE {
            return Err(Error::InvalidCertificate(format!(
                "certificate of {} bytes exceeds the {} byte bound",
                der.len(), MAX_CERT_SIZE)).into());
        }
        Ok(Cert { der: der.into() })
    }

    /// Returns the DER encoding.
    pub fn der(&self) -> &[u8] {
        &self.der
    }
}

/// The verdicts of the CRL cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrlStatus {
    /// The certificate is not listed in a current CRL.
    Valid,
    /// The certificate has been revoked.
    Revoked,
    /// There is no current CRL for the issuer.
    DontKnow,
    /// A CRL exists but cannot be used (expired, bad signature, …).
    CantUse,
}

/// The certificate cache.
pub trait CertCache {
    /// Looks up a certificate by its SHA-1 fingerprint.
    fn get_by_fpr(&self, fpr: &[u8; 20]) -> Option<Cert>;

    /// Streams every certificate matching `pattern` to `callback`.
    fn get_by_pattern(&self, pattern: &str,
                      callback: &mut dyn FnMut(&Cert) -> Result<()>)
                      -> Result<PatternResult>;

    /// Inserts a certificate.
    fn insert(&self, cert: Cert) -> Result<()>;
}

/// The outcome of a pattern lookup in the certificate cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternResult {
    /// Number of certificates streamed to the callback.
    pub count: usize,
    /// Whether the cache stopped before exhausting the matches.
    pub truncated: bool,
}

/// The CRL cache.
pub trait CrlCache {
    /// Consults the cache for the certificate identified by the hex
    /// SHA-1 hash of its issuer's DN and its hex serial number.
    fn isvalid(&self, issuer_hash: &str, serial: &str,
               force_refresh: bool) -> Result<CrlStatus>;

    /// Consults the cache for the given certificate.
    fn cert_isvalid(&self, cert: &Cert, force_refresh: bool)
                    -> Result<CrlStatus>;

    /// Fetches the CRLs the given certificate points at and loads
    /// them into the cache.
    fn reload_crl(&self, cert: &Cert) -> Result<()>;

    /// Loads a CRL from a local file.
    fn load(&self, path: &str) -> Result<()>;

    /// Writes a human readable dump of the cache contents.
    fn list(&self, out: &mut dyn std::io::Write) -> Result<()>;

    /// Inserts a CRL obtained from `url`.
    fn insert(&self, url: &str, data: &[u8]) -> Result<()>;
}

/// The OCSP responder client.
pub trait OcspClient {
    /// Asks the responsible responder about the certificate.
    ///
    /// Success means the responder vouched for the certificate;
    /// everything else surfaces as an error of the matching kind
    /// ([`Error::CertificateRevoked`], [`Error::NoData`] for an
    /// unknown certificate, …).
    fn isvalid(&self, cert: Option<&Cert>, issuer_cert: Option<&Cert>,
               force_default_responder: bool) -> Result<()>;
}

/// Flags steering a chain validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateFlags {
    /// Validate for TLS server use rather than S/MIME.
    pub tls: bool,
    /// Also accept the system's trust anchors.
    pub trust_system: bool,
    /// Skip the CRL check.
    pub no_crl: bool,
}

/// The client as a certificate source.
///
/// During a validation the client that asked for it may itself hold
/// certificates we are missing, and it knows which roots its user
/// trusts.  The command channel carries these call-backs as
/// inquiries; validators see them through this trait.
pub trait ClientSource {
    /// Asks the client for the certificate named by subject or
    /// fingerprint.  `None` if the client has nothing.
    fn send_cert(&mut self, name: &str) -> Result<Option<Cert>>;

    /// Asks the client for the certificate issuing `name`.
    fn send_issuer_cert(&mut self, name: &str) -> Result<Option<Cert>>;

    /// Asks the client for a certificate by subject key identifier,
    /// with the subject name as a hint.
    fn send_cert_ski(&mut self, keyid_hex: &str, subject: &str)
                     -> Result<Option<Cert>>;

    /// Asks whether the client trusts the root with the given hex
    /// fingerprint.
    fn is_trusted(&mut self, fpr_hex: &str) -> Result<bool>;
}

/// The X.509 chain validator.
pub trait ChainValidator {
    /// Validates the chain from `cert` to a trust anchor.
    ///
    /// Missing certificates are looked up in the certificate cache
    /// and, failing that, requested from the client; the client is
    /// also consulted for trust anchors beyond the implementation's
    /// own.
    fn validate_chain(&self, cert: &Cert, flags: ValidateFlags,
                      client: &mut dyn ClientSource) -> Result<()>;
}

/// The HTTP transport.
///
/// Implementations must observe the deadline and fail with
/// [`Error::Timeout`] when it expires; the service reports that
/// verbatim and never retries.
pub trait HttpFetcher {
    /// Fetches the document at `url`.
    fn fetch(&self, url: &Uri, timeout: Duration) -> Result<Vec<u8>>;

    /// Posts a form body to `url` and returns the response body.
    fn post(&self, url: &Uri, content_type: &str, body: &[u8],
            timeout: Duration) -> Result<Vec<u8>>;
}

/// The collaborators, bundled for handing into a session.
pub struct Backend<'a> {
    /// The process-wide certificate cache.
    pub certs: &'a dyn CertCache,
    /// The process-wide CRL cache.
    pub crls: &'a dyn CrlCache,
    /// The OCSP client.
    pub ocsp: &'a dyn OcspClient,
    /// The chain validator.
    pub validator: &'a dyn ChainValidator,
    /// The HTTP transport.
    pub http: &'a dyn HttpFetcher,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cert_bounds() {
        assert!(Cert::from_der(Vec::new()).is_err());
        assert!(Cert::from_der(vec![0x30; MAX_CERT_SIZE]).is_ok());
        assert!(Cert::from_der(vec![0x30; MAX_CERT_SIZE + 1]).is_err());
    }
}
