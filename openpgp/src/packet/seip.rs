use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds an encrypted data packet with a modification detection code.
///
/// The body starts with a one-octet version number, which must be 1,
/// followed by the ciphertext.  See [Section 5.13 of RFC 4880] for
/// details.
///
///   [Section 5.13 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.13
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct SEIP {
    pub(crate) common: packet::Common,
    /// The version number, always 1.
    version: u8,
    ciphertext: Vec<u8>,
}

impl SEIP {
    /// Wraps the given ciphertext.
    pub fn new(ciphertext: Vec<u8>) -> Self {
        SEIP {
            common: Default::default(),
            version: 1,
            ciphertext,
        }
    }

    /// Gets the version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Returns the ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Debug for SEIP {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SEIP")
            .field("version", &self.version)
            .field("ciphertext", &format!("{} bytes", self.ciphertext.len()))
            .finish()
    }
}

impl From<SEIP> for Packet {
    fn from(p: SEIP) -> Self {
        Packet::SEIP(p)
    }
}

#[cfg(test)]
impl Arbitrary for SEIP {
    fn arbitrary(g: &mut Gen) -> Self {
        SEIP::new(Vec::<u8>::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: SEIP) -> bool {
            let q = SEIP::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn parse_rejects_unknown_version() {
        // Version 2 is not a thing.
        assert!(SEIP::from_bytes(b"\xd2\x04\x02abc").is_err());
    }
}
