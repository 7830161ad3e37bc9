use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

/// The OpenPGP packet tags as defined in [Section 4.3 of RFC 4880].
///
///   [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
///
/// The values correspond to the serialized format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Tag {
    /// Reserved packet tag.
    Reserved,
    /// Public-Key Encrypted Session Key Packet.
    PKESK,
    /// Signature Packet.
    Signature,
    /// Symmetric-Key Encrypted Session Key Packet.
    SKESK,
    /// One-Pass Signature Packet.
    OnePassSig,
    /// Secret-Key Packet.
    SecretKey,
    /// Public-Key Packet.
    PublicKey,
    /// Secret-Subkey Packet.
    SecretSubkey,
    /// Compressed Data Packet.
    CompressedData,
    /// Symmetrically Encrypted Data Packet.
    SED,
    /// Marker Packet.
    Marker,
    /// Literal Data Packet.
    Literal,
    /// Trust Packet.
    Trust,
    /// User ID Packet.
    UserID,
    /// Public-Subkey Packet.
    PublicSubkey,
    /// User Attribute Packet.
    UserAttribute,
    /// Sym. Encrypted and Integrity Protected Data Packet.
    SEIP,
    /// Modification Detection Code Packet.
    MDC,
    /// Private or experimental packet tag.
    Private(u8),
    /// Unknown packet tag.
    Unknown(u8),
}

impl From<u8> for Tag {
    fn from(u: u8) -> Self {
        use self::Tag::*;
        match u {
            0 => Reserved,
            1 => PKESK,
            2 => Signature,
            3 => SKESK,
            4 => OnePassSig,
            5 => SecretKey,
            6 => PublicKey,
            7 => SecretSubkey,
            8 => CompressedData,
            9 => SED,
            10 => Marker,
            11 => Literal,
            12 => Trust,
            13 => UserID,
            14 => PublicSubkey,
            17 => UserAttribute,
            18 => SEIP,
            19 => MDC,
            60..=63 => Private(u),
            u => Unknown(u),
        }
    }
}

impl From<Tag> for u8 {
    fn from(t: Tag) -> u8 {
        use self::Tag::*;
        match t {
            Reserved => 0,
            PKESK => 1,
            Signature => 2,
            SKESK => 3,
            OnePassSig => 4,
            SecretKey => 5,
            PublicKey => 6,
            SecretSubkey => 7,
            CompressedData => 8,
            SED => 9,
            Marker => 10,
            Literal => 11,
            Trust => 12,
            UserID => 13,
            PublicSubkey => 14,
            UserAttribute => 17,
            SEIP => 18,
            MDC => 19,
            Private(u) => u,
            Unknown(u) => u,
        }
    }
}

impl Tag {
    /// Returns whether a packet with this tag may use partial body
    /// lengths or an indeterminate length.
    ///
    /// Per [Section 4.2.2.4 of RFC 4880] only packets whose bodies
    /// can be streamed may do so.
    ///
    ///   [Section 4.2.2.4 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2.2.4
    pub fn can_stream(&self) -> bool {
        use self::Tag::*;
        matches!(self, Literal | CompressedData | SED | SEIP)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Tag::*;
        match *self {
            Reserved =>
                f.write_str("Reserved - a packet tag MUST NOT have this value"),
            PKESK => f.write_str("Public-Key Encrypted Session Key Packet"),
            Signature => f.write_str("Signature Packet"),
            SKESK => f.write_str("Symmetric-Key Encrypted Session Key Packet"),
            OnePassSig => f.write_str("One-Pass Signature Packet"),
            SecretKey => f.write_str("Secret-Key Packet"),
            PublicKey => f.write_str("Public-Key Packet"),
            SecretSubkey => f.write_str("Secret-Subkey Packet"),
            CompressedData => f.write_str("Compressed Data Packet"),
            SED => f.write_str("Symmetrically Encrypted Data Packet"),
            Marker => f.write_str("Marker Packet"),
            Literal => f.write_str("Literal Data Packet"),
            Trust => f.write_str("Trust Packet"),
            UserID => f.write_str("User ID Packet"),
            PublicSubkey => f.write_str("Public-Subkey Packet"),
            UserAttribute => f.write_str("User Attribute Packet"),
            SEIP => f.write_str(
                "Sym. Encrypted and Integrity Protected Data Packet"),
            MDC => f.write_str("Modification Detection Code Packet"),
            Private(u) =>
                f.write_fmt(format_args!("Private/Experimental Packet {}", u)),
            Unknown(u) =>
                f.write_fmt(format_args!("Unknown Packet {}", u)),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Tag {
    fn arbitrary(g: &mut Gen) -> Self {
        (u8::arbitrary(g) % 64).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck::quickcheck! {
        fn roundtrip(tag: Tag) -> bool {
            let val: u8 = tag.into();
            tag == Tag::from(val)
        }
    }

    quickcheck::quickcheck! {
        fn parse(tag: Tag) -> bool {
            match tag {
                Tag::Private(u) => (60..=63).contains(&u),
                Tag::Unknown(u) => u == 15 || u == 16 || (20..60).contains(&u),
                _ => true,
            }
        }
    }
}
