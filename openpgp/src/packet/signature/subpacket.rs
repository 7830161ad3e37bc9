//! Signature subpackets.
//!
//! OpenPGP signature packets include a set of key-value attributes
//! called subpackets.  These subpackets are used to indicate when a
//! signature was created, who created the signature, user &
//! implementation preferences, etc.  The full details are in [Section
//! 5.2.3.1 of RFC 4880].
//!
//! [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1
//!
//! The standard assigns each subpacket a numeric id, and describes
//! the format of its value.  Subpackets can be marked as critical; an
//! implementation that encounters a critical subpacket it does not
//! understand is required to consider the signature invalid.  The
//! critical bit is the high bit of the type octet and is kept apart
//! from the type here.
//!
//! Unknown subpacket types are preserved verbatim, type octet and
//! body, so every subpacket survives a round trip.

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::KeyID;
use crate::packet::Signature;
use crate::types::{
    CompressionAlgorithm,
    HashAlgorithm,
    PublicKeyAlgorithm,
    ReasonForRevocation,
    SymmetricAlgorithm,
};

/// The subpacket types specified by [Section 5.2.3.1 of RFC 4880].
///
/// [Section 5.2.3.1 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2.3.1
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash)]
#[derive(Clone, Copy)]
#[non_exhaustive]
pub enum SubpacketTag {
    /// The time the signature was made.
    SignatureCreationTime,
    /// The validity period of the signature.
    SignatureExpirationTime,
    /// Whether a certification may be exported to other users.
    ExportableCertification,
    /// Signer asserts that the key is not only valid but also
    /// trustworthy at the specified level.
    TrustSignature,
    /// Used in conjunction with trust signatures (of level > 0) to
    /// limit the scope of trust that is extended.
    RegularExpression,
    /// Signature's revocability status.
    Revocable,
    /// The validity period of the key.
    KeyExpirationTime,
    /// Symmetric algorithm numbers that indicate which algorithms the
    /// key holder prefers to use.
    PreferredSymmetricAlgorithms,
    /// Authorizes the specified key to issue revocation signatures
    /// for this key.
    RevocationKey,
    /// The OpenPGP Key ID of the key issuing the signature.
    Issuer,
    /// A "notation" on the signature the issuer wishes to make.
    NotationData,
    /// Message digest algorithm numbers that indicate which
    /// algorithms the key holder prefers to receive.
    PreferredHashAlgorithms,
    /// Compression algorithm numbers that indicate which algorithms
    /// the key holder prefers to use.
    PreferredCompressionAlgorithms,
    /// A list of one-bit flags that indicate preferences the key
    /// holder has about how the key is handled on a key server.
    KeyServerPreferences,
    /// A URI of a key server that the key holder prefers be used for
    /// updates.
    PreferredKeyServer,
    /// A flag in a User ID's self-signature that states whether this
    /// User ID is the main User ID for this key.
    PrimaryUserID,
    /// A URI of a document that describes the policy under which the
    /// signature was issued.
    PolicyURI,
    /// A list of binary flags that hold information about a key.
    KeyFlags,
    /// States which User ID is responsible for the signing.
    SignersUserID,
    /// Used only in key revocation and certification revocation
    /// signatures.
    ReasonForRevocation,
    /// Denotes which advanced OpenPGP features a user's
    /// implementation supports.
    Features,
    /// Identifies a specific target signature to which a signature
    /// refers.
    SignatureTarget,
    /// Contains a complete signature packet body.
    EmbeddedSignature,
    /// Reserved subpacket tag.
    Reserved(u8),
    /// Private subpacket tag.
    Private(u8),
    /// Unknown subpacket tag.
    Unknown(u8),
}

impl From<u8> for SubpacketTag {
    fn from(u: u8) -> Self {
        match u {
            2 => SubpacketTag::SignatureCreationTime,
            3 => SubpacketTag::SignatureExpirationTime,
            4 => SubpacketTag::ExportableCertification,
            5 => SubpacketTag::TrustSignature,
            6 => SubpacketTag::RegularExpression,
            7 => SubpacketTag::Revocable,
            9 => SubpacketTag::KeyExpirationTime,
            11 => SubpacketTag::PreferredSymmetricAlgorithms,
            12 => SubpacketTag::RevocationKey,
            16 => SubpacketTag::Issuer,
            20 => SubpacketTag::NotationData,
            21 => SubpacketTag::PreferredHashAlgorithms,
            22 => SubpacketTag::PreferredCompressionAlgorithms,
            23 => SubpacketTag::KeyServerPreferences,
            24 => SubpacketTag::PreferredKeyServer,
            25 => SubpacketTag::PrimaryUserID,
            26 => SubpacketTag::PolicyURI,
            27 => SubpacketTag::KeyFlags,
            28 => SubpacketTag::SignersUserID,
            29 => SubpacketTag::ReasonForRevocation,
            30 => SubpacketTag::Features,
            31 => SubpacketTag::SignatureTarget,
            32 => SubpacketTag::EmbeddedSignature,
            0 | 1 | 8 | 10 | 13 | 14 | 15 | 17 | 18 | 19 =>
                SubpacketTag::Reserved(u),
            100..=110 => SubpacketTag::Private(u),
            _ => SubpacketTag::Unknown(u),
        }
    }
}

impl From<SubpacketTag> for u8 {
    fn from(t: SubpacketTag) -> Self {
        match t {
            SubpacketTag::SignatureCreationTime => 2,
            SubpacketTag::SignatureExpirationTime => 3,
            SubpacketTag::ExportableCertification => 4,
            SubpacketTag::TrustSignature => 5,
            SubpacketTag::RegularExpression => 6,
            SubpacketTag::Revocable => 7,
            SubpacketTag::KeyExpirationTime => 9,
            SubpacketTag::PreferredSymmetricAlgorithms => 11,
            SubpacketTag::RevocationKey => 12,
            SubpacketTag::Issuer => 16,
            SubpacketTag::NotationData => 20,
            SubpacketTag::PreferredHashAlgorithms => 21,
            SubpacketTag::PreferredCompressionAlgorithms => 22,
            SubpacketTag::KeyServerPreferences => 23,
            SubpacketTag::PreferredKeyServer => 24,
            SubpacketTag::PrimaryUserID => 25,
            SubpacketTag::PolicyURI => 26,
            SubpacketTag::KeyFlags => 27,
            SubpacketTag::SignersUserID => 28,
            SubpacketTag::ReasonForRevocation => 29,
            SubpacketTag::Features => 30,
            SubpacketTag::SignatureTarget => 31,
            SubpacketTag::EmbeddedSignature => 32,
            SubpacketTag::Reserved(u) => u,
            SubpacketTag::Private(u) => u,
            SubpacketTag::Unknown(u) => u,
        }
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketTag {
    fn arbitrary(g: &mut Gen) -> Self {
        u8::arbitrary(g).into()
    }
}

/// The length prefix of a subpacket.
///
/// Subpacket lengths use the new-format variable encoding without
/// partial bodies: one octet below 192, two octets up to 8383, five
/// octets beyond.  Small lengths may legally be framed with a wider
/// encoding; the original octets are recorded here so the serializer
/// can reproduce them.  Like a packet header, this is framing
/// metadata and does not contribute to a subpacket's value.
#[derive(Clone, Debug, Default)]
pub struct SubpacketLength {
    /// The length as parsed, covering the type octet and the body.
    pub(crate) len: u32,
    /// The original length octets, if a non-canonical encoding was
    /// used.
    pub(crate) raw: Option<Vec<u8>>,
}

impl SubpacketLength {
    pub(crate) fn new(len: u32, raw: Option<Vec<u8>>) -> Self {
        SubpacketLength { len, raw }
    }
}

impl PartialEq for SubpacketLength {
    // Framing metadata does not contribute to a subpacket's value.
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for SubpacketLength {}

impl std::hash::Hash for SubpacketLength {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {
    }
}

/// Holds an arbitrary subpacket.
///
/// The value is well formed; the critical flag is the high bit of the
/// wire type octet.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Subpacket {
    /// The subpacket's length prefix as seen on the wire.
    pub(crate) length: SubpacketLength,
    /// Critical flag.
    pub(crate) critical: bool,
    /// Packet value, must match the packet type.
    pub(crate) value: SubpacketValue,
}

impl Subpacket {
    /// Creates a new subpacket.
    pub fn new(value: SubpacketValue, critical: bool) -> Self {
        Subpacket {
            length: SubpacketLength::default(),
            critical,
            value,
        }
    }

    pub(crate) fn with_length(length: SubpacketLength, critical: bool,
                              value: SubpacketValue) -> Self {
        Subpacket { length, critical, value }
    }

    /// Returns whether the critical bit is set.
    pub fn critical(&self) -> bool {
        self.critical
    }

    /// Returns the subpacket's tag.
    pub fn tag(&self) -> SubpacketTag {
        self.value.tag()
    }

    /// Returns the subpacket's value.
    pub fn value(&self) -> &SubpacketValue {
        &self.value
    }
}

impl fmt::Debug for Subpacket {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut s = f.debug_struct("Subpacket");
        if self.critical {
            s.field("critical", &self.critical);
        }
        s.field("value", &self.value);
        s.finish()
    }
}

#[cfg(test)]
impl Arbitrary for Subpacket {
    fn arbitrary(g: &mut Gen) -> Self {
        Subpacket::new(SubpacketValue::arbitrary(g), bool::arbitrary(g))
    }
}

/// The values of subpackets.
///
/// The `Unknown` variant holds the body of subpackets with types we
/// do not know, with the 7-bit type preserved so the subpacket
/// round-trips.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[non_exhaustive]
pub enum SubpacketValue {
    /// The time the signature was made, in seconds since the Unix
    /// epoch.
    SignatureCreationTime(u32),
    /// The validity period of the signature, in seconds after the
    /// creation time.
    SignatureExpirationTime(u32),
    /// Whether a certification may be exported.
    ExportableCertification(bool),
    /// Level and amount of a trust signature.
    TrustSignature {
        /// Trust level, or depth.
        level: u8,
        /// Amount of trust, 0 to 255.
        trust: u8,
    },
    /// A regular expression limiting the scope of a trust signature.
    ///
    /// The standard says this is a NUL-terminated string; the bytes
    /// are kept verbatim, terminator included if present.
    RegularExpression(Vec<u8>),
    /// Whether the signature is revocable.
    Revocable(bool),
    /// The validity period of the key, in seconds after the key's
    /// creation time.
    KeyExpirationTime(u32),
    /// The symmetric algorithms the key holder prefers, in order.
    PreferredSymmetricAlgorithms(Vec<SymmetricAlgorithm>),
    /// A key authorized to issue revocations for this key.
    RevocationKey {
        /// Revocation key class.  Bit 0x80 must be set; 0x40 means
        /// the relation is sensitive.
        class: u8,
        /// The public key algorithm of the authorized key.
        pk_algo: PublicKeyAlgorithm,
        /// The fingerprint of the authorized key.
        fingerprint: Box<[u8]>,
    },
    /// The eight-octet key ID of the issuing key.
    Issuer(KeyID),
    /// A notation on the signature.
    NotationData(NotationData),
    /// The hash algorithms the key holder prefers, in order.
    PreferredHashAlgorithms(Vec<HashAlgorithm>),
    /// The compression algorithms the key holder prefers, in order.
    PreferredCompressionAlgorithms(Vec<CompressionAlgorithm>),
    /// Key server preference flags.
    KeyServerPreferences(Vec<u8>),
    /// The URI of the key holder's preferred key server.
    PreferredKeyServer(Vec<u8>),
    /// Whether the certified User ID is the primary one.
    PrimaryUserID(bool),
    /// The URI of the policy under which the signature was issued.
    PolicyURI(Vec<u8>),
    /// Key capability flags.
    KeyFlags(Vec<u8>),
    /// The User ID responsible for the signing.
    SignersUserID(Vec<u8>),
    /// Why the key or certification was revoked.
    ReasonForRevocation {
        /// Machine readable reason code.
        code: ReasonForRevocation,
        /// Human readable explanation, by convention UTF-8 but kept
        /// verbatim.
        reason: Vec<u8>,
    },
    /// Advanced feature flags.
    Features(Vec<u8>),
    /// The signature this signature refers to.
    SignatureTarget {
        /// Public key algorithm of the target signature.
        pk_algo: PublicKeyAlgorithm,
        /// Hash algorithm of the target signature.
        hash_algo: HashAlgorithm,
        /// Hash digest of the target signature.
        digest: Vec<u8>,
    },
    /// A complete signature packet body.
    EmbeddedSignature(Box<Signature>),
    /// An unknown subpacket, body preserved verbatim.
    Unknown {
        /// The subpacket's 7-bit type.
        tag: u8,
        /// The subpacket's body.
        body: Vec<u8>,
    },
}

impl SubpacketValue {
    /// Returns the subpacket tag for this value.
    pub fn tag(&self) -> SubpacketTag {
        use self::SubpacketValue::*;
        match self {
            SignatureCreationTime(_) => SubpacketTag::SignatureCreationTime,
            SignatureExpirationTime(_) =>
                SubpacketTag::SignatureExpirationTime,
            ExportableCertification(_) =>
                SubpacketTag::ExportableCertification,
            TrustSignature { .. } => SubpacketTag::TrustSignature,
            RegularExpression(_) => SubpacketTag::RegularExpression,
            Revocable(_) => SubpacketTag::Revocable,
            KeyExpirationTime(_) => SubpacketTag::KeyExpirationTime,
            PreferredSymmetricAlgorithms(_) =>
                SubpacketTag::PreferredSymmetricAlgorithms,
            RevocationKey { .. } => SubpacketTag::RevocationKey,
            Issuer(_) => SubpacketTag::Issuer,
            NotationData(_) => SubpacketTag::NotationData,
            PreferredHashAlgorithms(_) =>
                SubpacketTag::PreferredHashAlgorithms,
            PreferredCompressionAlgorithms(_) =>
                SubpacketTag::PreferredCompressionAlgorithms,
            KeyServerPreferences(_) => SubpacketTag::KeyServerPreferences,
            PreferredKeyServer(_) => SubpacketTag::PreferredKeyServer,
            PrimaryUserID(_) => SubpacketTag::PrimaryUserID,
            PolicyURI(_) => SubpacketTag::PolicyURI,
            KeyFlags(_) => SubpacketTag::KeyFlags,
            SignersUserID(_) => SubpacketTag::SignersUserID,
            ReasonForRevocation { .. } => SubpacketTag::ReasonForRevocation,
            Features(_) => SubpacketTag::Features,
            SignatureTarget { .. } => SubpacketTag::SignatureTarget,
            EmbeddedSignature(_) => SubpacketTag::EmbeddedSignature,
            Unknown { tag, .. } => (*tag).into(),
        }
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketValue {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::SubpacketValue::*;
        // EmbeddedSignature is deliberately left out: generating
        // signatures here would recurse.  It is covered by a
        // dedicated test in the parser.
        match u8::arbitrary(g) % 22 {
            0 => SignatureCreationTime(u32::arbitrary(g)),
            1 => SignatureExpirationTime(u32::arbitrary(g)),
            2 => ExportableCertification(bool::arbitrary(g)),
            3 => TrustSignature {
                level: u8::arbitrary(g),
                trust: u8::arbitrary(g),
            },
            4 => RegularExpression(Vec::<u8>::arbitrary(g)),
            5 => Revocable(bool::arbitrary(g)),
            6 => KeyExpirationTime(u32::arbitrary(g)),
            7 => PreferredSymmetricAlgorithms(
                Vec::<u8>::arbitrary(g).into_iter()
                    .map(|u| u.into()).collect()),
            8 => RevocationKey {
                class: 0x80 | (u8::arbitrary(g) & 0x40),
                pk_algo: PublicKeyAlgorithm::arbitrary(g),
                fingerprint: vec![u8::arbitrary(g); 20].into(),
            },
            9 => {
                let mut id = [0u8; 8];
                for b in id.iter_mut() {
                    *b = u8::arbitrary(g);
                }
                Issuer(KeyID::V4(id))
            },
            10 => NotationData(self::NotationData::arbitrary(g)),
            11 => PreferredHashAlgorithms(
                Vec::<u8>::arbitrary(g).into_iter()
                    .map(|u| u.into()).collect()),
            12 => PreferredCompressionAlgorithms(
                Vec::<u8>::arbitrary(g).into_iter()
                    .map(|u| u.into()).collect()),
            13 => KeyServerPreferences(Vec::<u8>::arbitrary(g)),
            14 => PreferredKeyServer(Vec::<u8>::arbitrary(g)),
            15 => PrimaryUserID(bool::arbitrary(g)),
            16 => PolicyURI(Vec::<u8>::arbitrary(g)),
            17 => KeyFlags(Vec::<u8>::arbitrary(g)),
            18 => SignersUserID(Vec::<u8>::arbitrary(g)),
            19 => ReasonForRevocation {
                code: crate::types::ReasonForRevocation::arbitrary(g),
                reason: Vec::<u8>::arbitrary(g),
            },
            20 => Features(Vec::<u8>::arbitrary(g)),
            21 => SignatureTarget {
                pk_algo: PublicKeyAlgorithm::arbitrary(g),
                hash_algo: HashAlgorithm::arbitrary(g),
                digest: Vec::<u8>::arbitrary(g),
            },
            _ => unreachable!(),
        }
    }
}

/// A notation, a key-value attribute the issuer wishes to attach.
///
/// The first flag octet's high bit marks the notation as human
/// readable; the name must be UTF-8 if and only if that bit is set.
/// With the bit clear both name and value are arbitrary bytes and are
/// never validated.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct NotationData {
    /// The four flag octets.
    flags: [u8; 4],
    /// The notation's name.
    name: Vec<u8>,
    /// The notation's value.
    value: Vec<u8>,
}

impl NotationData {
    /// The high bit of the first flag octet: the notation's value is
    /// human readable UTF-8.
    pub const FLAG_HUMAN_READABLE: u8 = 0x80;

    /// Creates a notation.
    pub fn new(flags: [u8; 4], name: Vec<u8>, value: Vec<u8>) -> Self {
        NotationData { flags, name, value }
    }

    /// Gets the flag octets.
    pub fn flags(&self) -> &[u8; 4] {
        &self.flags
    }

    /// Returns whether the human readable flag is set.
    pub fn human_readable(&self) -> bool {
        self.flags[0] & Self::FLAG_HUMAN_READABLE > 0
    }

    /// Gets the notation's name.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Gets the notation's value.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl fmt::Debug for NotationData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NotationData")
            .field("flags", &crate::fmt::hex::encode(self.flags))
            .field("name", &String::from_utf8_lossy(&self.name))
            .field("value", &String::from_utf8_lossy(&self.value))
            .finish()
    }
}

#[cfg(test)]
impl Arbitrary for NotationData {
    fn arbitrary(g: &mut Gen) -> Self {
        let human_readable = bool::arbitrary(g);
        let flags = [
            if human_readable { Self::FLAG_HUMAN_READABLE } else { 0 },
            0, 0, 0,
        ];
        let name = if human_readable {
            String::arbitrary(g).into_bytes()
        } else {
            Vec::<u8>::arbitrary(g)
        };
        NotationData::new(flags, name, Vec::<u8>::arbitrary(g))
    }
}

/// A subpacket area, the concatenation of the subpackets it holds.
///
/// The wire representation is a two-octet big-endian length followed
/// by the subpackets; the inner subpacket lengths must add up to
/// exactly the declared area length, which the parser enforces.
#[derive(PartialEq, Eq, Hash, Clone, Default)]
pub struct SubpacketArea {
    /// The subpackets.
    packets: Vec<Subpacket>,
}

impl SubpacketArea {
    /// Returns a new subpacket area holding `packets`.
    pub fn new(packets: Vec<Subpacket>) -> Self {
        SubpacketArea { packets }
    }

    /// Iterates over the subpackets.
    pub fn iter(&self) -> impl Iterator<Item = &Subpacket> {
        self.packets.iter()
    }

    /// Returns the number of subpackets in the area.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    /// Returns whether the area holds no subpackets.
    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Returns the last subpacket with the given tag, if any.
    ///
    /// A well formed signature has at most one subpacket per tag; for
    /// the others, the last occurrence wins, mirroring what existing
    /// implementations do.
    pub fn subpacket(&self, tag: SubpacketTag) -> Option<&Subpacket> {
        self.packets.iter().rev().find(|sp| sp.tag() == tag)
    }

    /// Adds the given subpacket to the area.
    pub fn add(&mut self, packet: Subpacket) {
        self.packets.push(packet);
    }
}

impl fmt::Debug for SubpacketArea {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list()
            .entries(self.iter())
            .finish()
    }
}

impl<'a> IntoIterator for &'a SubpacketArea {
    type Item = &'a Subpacket;
    type IntoIter = std::slice::Iter<'a, Subpacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}

#[cfg(test)]
impl Arbitrary for SubpacketArea {
    fn arbitrary(g: &mut Gen) -> Self {
        let n = usize::arbitrary(g) % 4;
        SubpacketArea::new(
            (0..n).map(|_| Subpacket::arbitrary(g)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    quickcheck::quickcheck! {
        fn tag_roundtrip(tag: SubpacketTag) -> bool {
            let val: u8 = tag.into();
            tag == SubpacketTag::from(val)
        }
    }

    quickcheck::quickcheck! {
        fn tag_parse(tag: SubpacketTag) -> bool {
            match tag {
                SubpacketTag::Reserved(u) =>
                    (u == 0 || u == 1 || u == 8 || u == 10
                     || u == 13 || u == 14 || u == 15
                     || u == 17 || u == 18 || u == 19),
                SubpacketTag::Private(u) => (100..=110).contains(&u),
                SubpacketTag::Unknown(u) => (u > 32 && u < 100) || u > 110,
                _ => true,
            }
        }
    }

    #[test]
    fn last_subpacket_wins() {
        let mut area = SubpacketArea::default();
        area.add(Subpacket::new(
            SubpacketValue::SignatureCreationTime(1), false));
        area.add(Subpacket::new(
            SubpacketValue::SignatureCreationTime(2), false));

        match area.subpacket(SubpacketTag::SignatureCreationTime) {
            Some(Subpacket {
                value: SubpacketValue::SignatureCreationTime(t), ..
            }) => assert_eq!(*t, 2),
            other => panic!("unexpected lookup result: {:?}", other),
        }
    }
}
