use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;

/// Holds a UserID packet.
///
/// The body of a User ID packet is by convention a UTF-8 encoded
/// RFC 2822 mailbox, but the standard does not require that, and
/// plenty of existing User IDs are not.  The value is therefore kept
/// as bytes and never validated.  See [Section 5.11 of RFC 4880].
///
///   [Section 5.11 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.11
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct UserID {
    pub(crate) common: packet::Common,
    /// The user id.
    value: Vec<u8>,
}

impl UserID {
    /// Gets the user ID packet's value, raw.
    pub fn value(&self) -> &[u8] {
        self.value.as_slice()
    }
}

impl From<Vec<u8>> for UserID {
    fn from(u: Vec<u8>) -> Self {
        UserID {
            common: Default::default(),
            value: u,
        }
    }
}

impl<'a> From<&'a str> for UserID {
    fn from(u: &'a str) -> Self {
        u.as_bytes().to_vec().into()
    }
}

impl fmt::Display for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let userid = String::from_utf8_lossy(&self.value);
        write!(f, "{}", userid)
    }
}

impl fmt::Debug for UserID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let userid = String::from_utf8_lossy(&self.value);
        f.debug_struct("UserID")
            .field("value", &userid)
            .finish()
    }
}

impl From<UserID> for Packet {
    fn from(p: UserID) -> Self {
        Packet::UserID(p)
    }
}

#[cfg(test)]
impl Arbitrary for UserID {
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
        fn roundtrip(p: UserID) -> bool {
            let q = UserID::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn non_utf8_value_is_preserved() {
        let p = UserID::from(vec![0xff, 0xfe, 0x00, 0x41]);
        assert_eq!(p.value(), &[0xff, 0xfe, 0x00, 0x41]);
    }
}
