use std::fmt;

use crate::Packet;
use crate::packet;
use crate::packet::Tag;

/// Holds an unknown packet.
///
/// This is used by the parser to hold packets whose tag we do not
/// understand, and packets whose type we understand but do not parse
/// (like secret keys).  The body is preserved verbatim, so an unknown
/// packet survives a round trip.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Unknown {
    pub(crate) common: packet::Common,
    /// The packet's tag.
    tag: Tag,
    /// The packet's body, verbatim.
    body: Vec<u8>,
}

impl Unknown {
    /// Returns a new `Unknown` packet.
    pub fn new(tag: Tag, body: Vec<u8>) -> Self {
        Unknown {
            common: Default::default(),
            tag,
            body,
        }
    }

    /// Gets the unknown packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Gets the unknown packet's body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl fmt::Debug for Unknown {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Unknown")
            .field("tag", &self.tag)
            .field("body", &format!("{} bytes", self.body.len()))
            .finish()
    }
}

impl From<Unknown> for Packet {
    fn from(p: Unknown) -> Self {
        Packet::Unknown(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    #[test]
    fn unknown_tag_roundtrip() {
        // Tag 39 is unassigned.
        let bytes = b"\xe7\x05hello";
        let p = Packet::from_bytes(bytes).unwrap();
        match &p {
            Packet::Unknown(u) => {
                assert_eq!(u.tag(), Tag::Unknown(39));
                assert_eq!(u.body(), b"hello");
            },
            other => panic!("expected an unknown packet, got {:?}", other),
        }
        assert_eq!(p.to_vec().unwrap(), bytes);
    }
}
