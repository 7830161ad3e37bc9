//! User attribute packets and subpackets.
//!
//! See [Section 5.12 of RFC 4880] for details.
//!
//!   [Section 5.12 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.12

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;
use crate::packet::signature::subpacket::SubpacketLength;

/// Holds a UserAttribute packet.
///
/// A user attribute packet is a variation of the user ID packet whose
/// body is itself a sequence of subpackets.  Only one subpacket type
/// is defined, the image attribute; everything else is preserved as
/// an unknown subpacket.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct UserAttribute {
    pub(crate) common: packet::Common,
    /// The subpackets.
    subpackets: Vec<AttributeSubpacket>,
}

impl UserAttribute {
    /// Returns a new `UserAttribute` packet.
    pub fn new(subpackets: Vec<AttributeSubpacket>) -> Self {
        UserAttribute {
            common: Default::default(),
            subpackets,
        }
    }

    /// Gets the subpackets.
    pub fn subpackets(&self) -> &[AttributeSubpacket] {
        &self.subpackets
    }
}

impl fmt::Debug for UserAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.subpackets.iter())
            .finish()
    }
}

impl From<UserAttribute> for Packet {
    fn from(p: UserAttribute) -> Self {
        Packet::UserAttribute(p)
    }
}

#[cfg(test)]
impl Arbitrary for UserAttribute {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = usize::arbitrary(g) % 3;
        UserAttribute::new(
            (0..n).map(|_| AttributeSubpacket::arbitrary(g)).collect())
    }
}

/// A subpacket of a user attribute packet.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct AttributeSubpacket {
    /// The length of the subpacket on the wire.
    pub(crate) length: SubpacketLength,
    /// The value.
    value: AttributeValue,
}

impl AttributeSubpacket {
    /// Returns a new subpacket with a canonical length prefix.
    pub fn new(value: AttributeValue) -> Self {
        AttributeSubpacket {
            length: SubpacketLength::default(),
            value,
        }
    }

    pub(crate) fn with_length(length: SubpacketLength, value: AttributeValue)
                              -> Self {
        AttributeSubpacket { length, value }
    }

    /// Gets the subpacket's value.
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

/// The value of a user attribute subpacket.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[non_exhaustive]
pub enum AttributeValue {
    /// An image attribute, subpacket type 1.
    Image(ImageAttribute),
    /// An unknown subpacket type; the body is preserved verbatim.
    Unknown {
        /// The subpacket's type octet.
        tag: u8,
        /// The subpacket's body.
        body: Vec<u8>,
    },
}

#[cfg(test)]
impl Arbitrary for AttributeSubpacket {
    fn arbitrary(g: &mut Gen) -> Self {
        let value = if bool::arbitrary(g) {
            AttributeValue::Image(ImageAttribute::arbitrary(g))
        } else {
            AttributeValue::Unknown {
                // Stay clear of type 1, which parses as an image.
                tag: u8::arbitrary(g) | 0x02,
                body: Vec::<u8>::arbitrary(g),
            }
        };
        AttributeSubpacket::new(value)
    }
}

/// An image attribute.
///
/// The body starts with an image header: a little-endian(!) 16-bit
/// header length, a header version octet, and an image format octet.
/// A version 1 header is 16 octets long, but the length field rules,
/// and any octets between the fixed fields and the image data are
/// preserved verbatim.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct ImageAttribute {
    /// The image header version.
    version: u8,
    /// The image format; 1 is JPEG.
    format: u8,
    /// Header octets following the fixed fields, verbatim.
    header_rest: Vec<u8>,
    /// The image data.
    data: Vec<u8>,
}

impl ImageAttribute {
    /// The image format octet denoting JPEG.
    pub const FORMAT_JPEG: u8 = 1;

    /// Returns a version 1 image attribute with the given data.
    pub fn new(format: u8, data: Vec<u8>) -> Self {
        ImageAttribute {
            version: 1,
            format,
            // A v1 header is 16 octets, 12 of which are reserved.
            header_rest: vec![0; 12],
            data,
        }
    }

    pub(crate) fn with_header(version: u8, format: u8, header_rest: Vec<u8>,
                              data: Vec<u8>) -> Self {
        ImageAttribute { version, format, header_rest, data }
    }

    /// Gets the header version.
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Gets the image format octet.
    pub fn format(&self) -> u8 {
        self.format
    }

    /// Gets the header octets following the fixed fields.
    pub fn header_rest(&self) -> &[u8] {
        &self.header_rest
    }

    /// Gets the image data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the header length field value for this image.
    pub(crate) fn header_len(&self) -> usize {
        // Length field, version, format, then the preserved rest.
        2 + 1 + 1 + self.header_rest.len()
    }
}

impl fmt::Debug for ImageAttribute {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ImageAttribute")
            .field("version", &self.version)
            .field("format", &self.format)
            .field("data", &format!("{} bytes", self.data.len()))
            .finish()
    }
}

#[cfg(test)]
impl Arbitrary for ImageAttribute {
    fn arbitrary(g: &mut Gen) -> Self {
        ImageAttribute::new(u8::arbitrary(g), Vec::<u8>::arbitrary(g))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: UserAttribute) -> bool {
            let q = UserAttribute::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn oversized_image_header_is_preserved() {
        // An image subpacket whose header claims 20 octets: the four
        // fixed octets plus 16 preserved ones.
        let mut body = vec![
            20, 0, // header length, little-endian
            1,     // header version
            1,     // JPEG
        ];
        body.extend_from_slice(&[0xaa; 16]);
        body.extend_from_slice(b"not really a jpeg");

        let mut ua_body = Vec::new();
        ua_body.push(1 + body.len() as u8); // subpacket length
        ua_body.push(1); // image attribute
        ua_body.extend_from_slice(&body);

        let mut packet = vec![0xd1, ua_body.len() as u8];
        packet.extend_from_slice(&ua_body);

        let ua = UserAttribute::from_bytes(&packet).unwrap();
        match ua.subpackets()[0].value() {
            AttributeValue::Image(img) => {
                assert_eq!(img.version(), 1);
                assert_eq!(img.format(), 1);
                assert_eq!(img.header_rest(), &[0xaa; 16]);
                assert_eq!(img.data(), b"not really a jpeg");
            },
            other => panic!("expected an image, got {:?}", other),
        }

        assert_eq!(ua.to_vec().unwrap(), packet);
    }
}
