use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a symmetrically encrypted data packet.
///
/// A symmetrically encrypted data packet is a container.  The packet
/// is obsolete; the SEIP packet should be used instead.  See [Section
/// 5.7 of RFC 4880] for details.  The ciphertext is opaque to this
/// crate and preserved verbatim.
///
///   [Section 5.7 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.7
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct SED {
    pub(crate) common: packet::Common,
    ciphertext: Vec<u8>,
}

impl SED {
    /// Wraps the given ciphertext.
    pub fn new(ciphertext: Vec<u8>) -> Self {
        SED {
            common: Default::default(),
            ciphertext,
        }
    }

    /// Returns the ciphertext.
    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }
}

impl fmt::Debug for SED {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SED")
            .field("ciphertext", &format!("{} bytes", self.ciphertext.len()))
            .finish()
    }
}

impl From<SED> for Packet {
    fn from(p: SED) -> Self {
        Packet::SED(p)
    }
}

#[cfg(test)]
impl Arbitrary for SED {
    fn arbitrary(g: &mut Gen) -> Self {
        SED::new(Vec::<u8>::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: SED) -> bool {
            let q = SED::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
