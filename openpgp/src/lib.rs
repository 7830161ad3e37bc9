//! OpenPGP packet data types and wire codec.
//!
//! This crate implements the packet layer of [RFC 4880]: framing,
//! every public packet type including signature and user-attribute
//! subpackets, and the per-algorithm key and signature material.  Both
//! directions are covered: parsing accepts every legal framing (old
//! and new header forms, indeterminate and partial lengths) and
//! serialization reproduces the original bytes of every successfully
//! parsed packet.
//!
//! Packets that carry secret material (secret keys, session keys) are
//! out of scope; their bodies are preserved verbatim in [`Unknown`]
//! packets.  Cryptographic operations are likewise out of scope: this
//! crate never hashes, decrypts, or verifies anything.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880
//! [`Unknown`]: packet/struct.Unknown.html

#![warn(missing_docs)]

pub mod fmt;
pub mod crypto;

pub mod packet;
use crate::packet::Tag;

pub mod parse;
pub mod serialize;

pub mod types;

/// Crate result specialization.
pub type Result<T> = ::std::result::Result<T, anyhow::Error>;

#[derive(thiserror::Error, Debug, Clone)]
/// Errors returned by this crate.
///
/// Note: This enum cannot be exhaustively matched to allow future
/// extensions.
#[non_exhaustive]
pub enum Error {
    /// Invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid operation.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A malformed packet.
    #[error("Malformed packet: {0}")]
    MalformedPacket(String),

    /// The input ends in the middle of a structure.
    #[error("Truncated input: {0} more bytes needed")]
    Truncated(usize),

    /// Malformed MPI.
    #[error("Malformed MPI: {0}")]
    MalformedMPI(String),

    /// Malformed object identifier.
    #[error("Malformed OID: {0}")]
    MalformedOid(String),

    /// Unsupported packet type.
    #[error("Unsupported packet type.  Tag: {0}")]
    UnsupportedPacketType(Tag),
}

/// The OpenPGP packets this crate understands.
///
/// The different OpenPGP packets are detailed in [Section 5 of RFC 4880].
///
/// The `Unknown` packet preserves packets with tags we do not
/// understand (and packets whose types we understand but do not
/// parse, like secret keys) as binary blobs that include the packet's
/// tag, so that they survive a round trip.
///
///   [Section 5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5
#[derive(Debug)]
#[derive(PartialEq, Eq, Hash, Clone)]
#[non_exhaustive]
pub enum Packet {
    /// Unknown packet.
    Unknown(packet::Unknown),
    /// Signature packet.
    Signature(packet::Signature),
    /// Public key packet.
    PublicKey(packet::Key),
    /// Public subkey packet.
    PublicSubkey(packet::Key),
    /// Marker packet.
    Marker(packet::Marker),
    /// Trust packet.
    Trust(packet::Trust),
    /// User ID packet.
    UserID(packet::UserID),
    /// User attribute packet.
    UserAttribute(packet::UserAttribute),
    /// Literal data packet.
    Literal(packet::Literal),
    /// Compressed data packet.
    CompressedData(packet::CompressedData),
    /// Symmetrically encrypted data packet.
    SED(packet::SED),
    /// Symmetric key encrypted, integrity protected data packet.
    SEIP(packet::SEIP),
    /// Modification detection code packet.
    MDC(packet::MDC),
}

impl Packet {
    /// Returns the `Packet's` corresponding OpenPGP tag.
    ///
    /// Tags are explained in [Section 4.3 of RFC 4880].
    ///
    ///   [Section 4.3 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.3
    pub fn tag(&self) -> Tag {
        match self {
            Packet::Unknown(packet) => packet.tag(),
            Packet::Signature(_) => Tag::Signature,
            Packet::PublicKey(_) => Tag::PublicKey,
            Packet::PublicSubkey(_) => Tag::PublicSubkey,
            Packet::Marker(_) => Tag::Marker,
            Packet::Trust(_) => Tag::Trust,
            Packet::UserID(_) => Tag::UserID,
            Packet::UserAttribute(_) => Tag::UserAttribute,
            Packet::Literal(_) => Tag::Literal,
            Packet::CompressedData(_) => Tag::CompressedData,
            Packet::SED(_) => Tag::SED,
            Packet::SEIP(_) => Tag::SEIP,
            Packet::MDC(_) => Tag::MDC,
        }
    }

    /// Returns the parsed `Packet's` corresponding OpenPGP tag.
    ///
    /// Returns the packet's tag, but only if it was successfully
    /// parsed into the corresponding packet type.  An `Unknown`
    /// packet has a `tag()`, but no `kind()`.
    pub fn kind(&self) -> Option<Tag> {
        match self {
            Packet::Unknown(_) => None,
            _ => Some(self.tag()),
        }
    }

    /// Returns a reference to the packet's framing metadata.
    pub(crate) fn common(&self) -> &packet::Common {
        match self {
            Packet::Unknown(p) => &p.common,
            Packet::Signature(p) => p.common(),
            Packet::PublicKey(p) => p.common(),
            Packet::PublicSubkey(p) => p.common(),
            Packet::Marker(p) => &p.common,
            Packet::Trust(p) => &p.common,
            Packet::UserID(p) => &p.common,
            Packet::UserAttribute(p) => &p.common,
            Packet::Literal(p) => &p.common,
            Packet::CompressedData(p) => &p.common,
            Packet::SED(p) => &p.common,
            Packet::SEIP(p) => &p.common,
            Packet::MDC(p) => &p.common,
        }
    }

    /// Returns a mutable reference to the packet's framing metadata.
    pub(crate) fn common_mut(&mut self) -> &mut packet::Common {
        match self {
            Packet::Unknown(p) => &mut p.common,
            Packet::Signature(p) => p.common_mut(),
            Packet::PublicKey(p) => p.common_mut(),
            Packet::PublicSubkey(p) => p.common_mut(),
            Packet::Marker(p) => &mut p.common,
            Packet::Trust(p) => &mut p.common,
            Packet::UserID(p) => &mut p.common,
            Packet::UserAttribute(p) => &mut p.common,
            Packet::Literal(p) => &mut p.common,
            Packet::CompressedData(p) => &mut p.common,
            Packet::SED(p) => &mut p.common,
            Packet::SEIP(p) => &mut p.common,
            Packet::MDC(p) => &mut p.common,
        }
    }

    /// Returns the header the packet was parsed with, if any.
    pub fn header(&self) -> Option<&packet::Header> {
        self.common().header()
    }
}

/// Holds a KeyID.
///
/// A KeyID is a fingerprint fragment.  It identifies a public key,
/// but is easy to forge.  For more details about how a KeyID is
/// generated, see [Section 12.2 of RFC 4880].
///
///   [Section 12.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-12.2
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub enum KeyID {
    /// Lower 8 bytes of a v4 fingerprint.
    V4([u8; 8]),
    /// Used for holding key IDs of unexpected length.  The Issuer
    /// subpacket may contain the wrong number of bytes; we preserve
    /// them so the subpacket survives a round trip.
    Invalid(Box<[u8]>),
}

impl KeyID {
    /// Reads a key ID from `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        if bytes.len() == 8 {
            let mut id = [0u8; 8];
            id.copy_from_slice(bytes);
            KeyID::V4(id)
        } else {
            KeyID::Invalid(bytes.to_vec().into_boxed_slice())
        }
    }

    /// Returns the raw bytes of the key ID.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            KeyID::V4(id) => id,
            KeyID::Invalid(bytes) => bytes,
        }
    }
}

impl std::fmt::Display for KeyID {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", crate::fmt::hex::encode(self.as_bytes()))
    }
}

impl std::fmt::Debug for KeyID {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_tuple("KeyID")
            .field(&format!("{}", self))
            .finish()
    }
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn keyid_from_bytes() {
        let id = KeyID::from_bytes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(id, KeyID::V4([1, 2, 3, 4, 5, 6, 7, 8]));
        assert_eq!(id.to_string(), "0102030405060708");

        let odd = KeyID::from_bytes(&[1, 2, 3]);
        assert_eq!(odd.as_bytes(), &[1, 2, 3]);
        assert!(matches!(odd, KeyID::Invalid(_)));
    }
}
