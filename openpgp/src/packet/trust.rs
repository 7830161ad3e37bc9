use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a Trust packet.
///
/// Trust packets are used to hold implementation specific information
/// in a keyring.  They are not defined beyond that; see [Section 5.10
/// of RFC 4880].  The value is preserved verbatim.
///
///   [Section 5.10 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.10
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Trust {
    pub(crate) common: packet::Common,
    value: Vec<u8>,
}

impl Trust {
    /// Gets the trust packet's value.
    pub fn value(&self) -> &[u8] {
        self.value.as_slice()
    }
}

impl From<Vec<u8>> for Trust {
    fn from(u: Vec<u8>) -> Self {
        Trust {
            common: Default::default(),
            value: u,
        }
    }
}

impl fmt::Debug for Trust {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Trust")
            .field("value", &crate::fmt::hex::encode(&self.value))
            .finish()
    }
}

impl From<Trust> for Packet {
    fn from(p: Trust) -> Self {
        Packet::Trust(p)
    }
}

#[cfg(test)]
impl Arbitrary for Trust {
    fn arbitrary(g: &mut Gen) -> Self {
        Vec::<u8>::arbitrary(g).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: Trust) -> bool {
            let q = Trust::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
