use crate::Packet;
use crate::packet;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// Holds a Marker packet.
///
/// See [Section 5.8 of RFC 4880] for details.  The body is the three
/// octets `PGP`; anything else is rejected by the parser.
///
///   [Section 5.8 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.8
#[derive(PartialEq, Eq, Hash, Clone, Debug, Default)]
pub struct Marker {
    pub(crate) common: packet::Common,
}

impl Marker {
    /// The body of a marker packet.
    pub(crate) const BODY: &'static [u8] = b"PGP";
}

impl From<Marker> for Packet {
    fn from(p: Marker) -> Self {
        Packet::Marker(p)
    }
}

#[cfg(test)]
impl Arbitrary for Marker {
    fn arbitrary(_: &mut Gen) -> Self {
        Marker::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    #[test]
    fn roundtrip() {
        let p = Marker::default();
        let q = Marker::from_bytes(&p.to_vec().unwrap()).unwrap();
        assert_eq!(p, q);
    }

    #[test]
    fn parse_rejects_wrong_body() {
        // A new format marker packet with body "PG!".
        assert!(Marker::from_bytes(b"\xca\x03PG!").is_err());
    }
}
