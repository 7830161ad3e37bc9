//! Signature packets.
//!
//! Signature packets are used both for certification purposes as well
//! as for document signing purposes.  See [Section 5.2 of RFC 4880]
//! for details.
//!
//!   [Section 5.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.2

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::KeyID;
use crate::Packet;
use crate::crypto::mpi;
use crate::packet;
use crate::types::{
    HashAlgorithm,
    PublicKeyAlgorithm,
    SignatureType,
};

pub mod subpacket;
use self::subpacket::{Subpacket, SubpacketArea, SubpacketTag, SubpacketValue};

/// Holds a signature packet.
///
/// This crate parses the two deployed versions: the deprecated v3
/// format with its fixed fields, and the v4 format with hashed and
/// unhashed subpacket areas.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[non_exhaustive]
pub enum Signature {
    /// A version 3 signature.
    V3(Signature3),
    /// A version 4 signature.
    V4(Signature4),
}

impl Signature {
    /// Gets the version of this signature packet.
    pub fn version(&self) -> u8 {
        match self {
            Signature::V3(_) => 3,
            Signature::V4(_) => 4,
        }
    }

    /// Gets the signature type.
    pub fn sigtype(&self) -> SignatureType {
        match self {
            Signature::V3(s) => s.sigtype,
            Signature::V4(s) => s.sigtype,
        }
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        match self {
            Signature::V3(s) => s.pk_algo,
            Signature::V4(s) => s.pk_algo,
        }
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        match self {
            Signature::V3(s) => s.hash_algo,
            Signature::V4(s) => s.hash_algo,
        }
    }

    /// Gets the left two octets of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        match self {
            Signature::V3(s) => &s.digest_prefix,
            Signature::V4(s) => &s.digest_prefix,
        }
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        match self {
            Signature::V3(s) => &s.mpis,
            Signature::V4(s) => &s.mpis,
        }
    }

    /// Gets the issuer, either from the v3 fixed field or from the
    /// last Issuer subpacket of a v4 signature.
    pub fn issuer(&self) -> Option<&KeyID> {
        match self {
            Signature::V3(s) => Some(&s.issuer),
            Signature::V4(s) => s.issuer(),
        }
    }

    pub(crate) fn common(&self) -> &packet::Common {
        match self {
            Signature::V3(s) => &s.common,
            Signature::V4(s) => &s.common,
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut packet::Common {
        match self {
            Signature::V3(s) => &mut s.common,
            Signature::V4(s) => &mut s.common,
        }
    }
}

impl From<Signature3> for Signature {
    fn from(s: Signature3) -> Self {
        Signature::V3(s)
    }
}

impl From<Signature4> for Signature {
    fn from(s: Signature4) -> Self {
        Signature::V4(s)
    }
}

impl From<Signature> for Packet {
    fn from(s: Signature) -> Self {
        Packet::Signature(s)
    }
}

/// Holds a version 3 signature packet.
///
/// All fields are fixed size; the wire format carries a one-octet
/// count of the hashed material, which must be 5 (type plus creation
/// time).
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Signature3 {
    pub(crate) common: packet::Common,
    /// Type of signature.
    sigtype: SignatureType,
    /// When the signature was made, in seconds since the Unix epoch.
    creation_time: u32,
    /// The eight-octet key ID of the issuer.
    issuer: KeyID,
    /// Public key algorithm used to make the signature.
    pk_algo: PublicKeyAlgorithm,
    /// Hash algorithm the signed hash was computed with.
    hash_algo: HashAlgorithm,
    /// Left 16 bits of the signed hash value.
    digest_prefix: [u8; 2],
    /// The signature.
    mpis: mpi::Signature,
}

impl Signature3 {
    /// Creates a v3 signature.
    pub fn new(sigtype: SignatureType, creation_time: u32, issuer: KeyID,
               pk_algo: PublicKeyAlgorithm, hash_algo: HashAlgorithm,
               digest_prefix: [u8; 2], mpis: mpi::Signature) -> Self {
        Signature3 {
            common: Default::default(),
            sigtype,
            creation_time,
            issuer,
            pk_algo,
            hash_algo,
            digest_prefix,
            mpis,
        }
    }

    /// Gets the signature type.
    pub fn sigtype(&self) -> SignatureType {
        self.sigtype
    }

    /// Gets the creation time, in seconds since the Unix epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Gets the issuer's key ID.
    pub fn issuer(&self) -> &KeyID {
        &self.issuer
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets the left two octets of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        &self.mpis
    }
}

impl fmt::Debug for Signature3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signature3")
            .field("sigtype", &self.sigtype)
            .field("creation_time", &self.creation_time)
            .field("issuer", &self.issuer)
            .field("pk_algo", &self.pk_algo)
            .field("hash_algo", &self.hash_algo)
            .field("digest_prefix",
                   &crate::fmt::hex::encode(&self.digest_prefix))
            .field("mpis", &self.mpis)
            .finish()
    }
}

/// Holds a version 4 signature packet.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Signature4 {
    pub(crate) common: packet::Common,
    /// Type of signature.
    sigtype: SignatureType,
    /// Public key algorithm used to make the signature.
    pk_algo: PublicKeyAlgorithm,
    /// Hash algorithm the signed hash was computed with.
    hash_algo: HashAlgorithm,
    /// Subpackets that are part of the signed hash.
    hashed_area: SubpacketArea,
    /// Subpackets that are not hashed and hence unprotected.
    unhashed_area: SubpacketArea,
    /// Left 16 bits of the signed hash value.
    digest_prefix: [u8; 2],
    /// The signature.
    mpis: mpi::Signature,
}

impl Signature4 {
    /// Creates a v4 signature.
    pub fn new(sigtype: SignatureType, pk_algo: PublicKeyAlgorithm,
               hash_algo: HashAlgorithm, hashed_area: SubpacketArea,
               unhashed_area: SubpacketArea, digest_prefix: [u8; 2],
               mpis: mpi::Signature) -> Self {
        Signature4 {
            common: Default::default(),
            sigtype,
            pk_algo,
            hash_algo,
            hashed_area,
            unhashed_area,
            digest_prefix,
            mpis,
        }
    }

    /// Gets the signature type.
    pub fn sigtype(&self) -> SignatureType {
        self.sigtype
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the hash algorithm.
    pub fn hash_algo(&self) -> HashAlgorithm {
        self.hash_algo
    }

    /// Gets a reference to the hashed area.
    pub fn hashed_area(&self) -> &SubpacketArea {
        &self.hashed_area
    }

    /// Gets a reference to the unhashed area.
    pub fn unhashed_area(&self) -> &SubpacketArea {
        &self.unhashed_area
    }

    /// Gets the left two octets of the signed hash value.
    pub fn digest_prefix(&self) -> &[u8; 2] {
        &self.digest_prefix
    }

    /// Gets the signature packet's MPIs.
    pub fn mpis(&self) -> &mpi::Signature {
        &self.mpis
    }

    /// Gets the signature's creation time, if it carries one.
    ///
    /// Looks for a creation time subpacket in the hashed area.
    pub fn signature_creation_time(&self) -> Option<u32> {
        match self.hashed_area.subpacket(SubpacketTag::SignatureCreationTime) {
            Some(Subpacket {
                value: SubpacketValue::SignatureCreationTime(t), ..
            }) => Some(*t),
            _ => None,
        }
    }

    /// Gets the issuer's key ID, if the signature carries one.
    ///
    /// Looks in the hashed area first, then in the unhashed area,
    /// which is where most implementations put the Issuer subpacket.
    pub fn issuer(&self) -> Option<&KeyID> {
        self.hashed_area.subpacket(SubpacketTag::Issuer)
            .or_else(|| self.unhashed_area.subpacket(SubpacketTag::Issuer))
            .and_then(|sp| match &sp.value {
                SubpacketValue::Issuer(id) => Some(id),
                _ => None,
            })
    }
}

impl fmt::Debug for Signature4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Signature4")
            .field("sigtype", &self.sigtype)
            .field("pk_algo", &self.pk_algo)
            .field("hash_algo", &self.hash_algo)
            .field("hashed_area", &self.hashed_area)
            .field("unhashed_area", &self.unhashed_area)
            .field("digest_prefix",
                   &crate::fmt::hex::encode(&self.digest_prefix))
            .field("mpis", &self.mpis)
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn arbitrary_mpis(g: &mut Gen) -> (PublicKeyAlgorithm,
                                              mpi::Signature) {
    let mpis = mpi::Signature::arbitrary(g);
    let pk_algo = match mpis {
        mpi::Signature::RSA { .. } => PublicKeyAlgorithm::RSAEncryptSign,
        mpi::Signature::DSA { .. } => PublicKeyAlgorithm::DSA,
        mpi::Signature::ECDSA { .. } => PublicKeyAlgorithm::ECDSA,
        mpi::Signature::EdDSA { .. } => PublicKeyAlgorithm::EdDSA,
        mpi::Signature::Unknown { .. } => unreachable!(),
    };
    (pk_algo, mpis)
}

#[cfg(test)]
impl Arbitrary for Signature {
    fn arbitrary(g: &mut Gen) -> Self {
        let (pk_algo, mpis) = arbitrary_mpis(g);
        if bool::arbitrary(g) {
            let mut issuer = [0u8; 8];
            for b in issuer.iter_mut() {
                *b = u8::arbitrary(g);
            }
            Signature3::new(
                SignatureType::arbitrary(g),
                u32::arbitrary(g),
                KeyID::V4(issuer),
                pk_algo,
                HashAlgorithm::arbitrary(g),
                [u8::arbitrary(g), u8::arbitrary(g)],
                mpis).into()
        } else {
            Signature4::new(
                SignatureType::arbitrary(g),
                pk_algo,
                HashAlgorithm::arbitrary(g),
                SubpacketArea::arbitrary(g),
                SubpacketArea::arbitrary(g),
                [u8::arbitrary(g), u8::arbitrary(g)],
                mpis).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(s: Signature) -> bool {
            let q = Signature::from_bytes(&s.to_vec().unwrap()).unwrap();
            s == q
        }
    }
}
