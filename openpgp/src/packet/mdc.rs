#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a modification detection code packet.
///
/// The body is exactly twenty octets: the SHA-1 hash of the plaintext
/// it protects.  See [Section 5.14 of RFC 4880] for details.  This
/// crate carries the digest; verifying it is the consumer's business.
///
///   [Section 5.14 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.14
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct MDC {
    pub(crate) common: packet::Common,
    /// Our SHA-1 hash.
    digest: [u8; 20],
}

impl MDC {
    /// Wraps the given digest.
    pub fn new(digest: [u8; 20]) -> Self {
        MDC {
            common: Default::default(),
            digest,
        }
    }

    /// Gets the digest.
    pub fn digest(&self) -> &[u8] {
        &self.digest
    }
}

impl From<MDC> for Packet {
    fn from(p: MDC) -> Self {
        Packet::MDC(p)
    }
}

#[cfg(test)]
impl Arbitrary for MDC {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut digest = [0u8; 20];
        for b in digest.iter_mut() {
            *b = u8::arbitrary(g);
        }
        MDC::new(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: MDC) -> bool {
            let q = MDC::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn parse_rejects_wrong_length() {
        // A 19 octet body is not an MDC.
        let mut data = vec![0xd3, 19];
        data.extend_from_slice(&[0; 19]);
        assert!(MDC::from_bytes(&data).is_err());
    }
}
