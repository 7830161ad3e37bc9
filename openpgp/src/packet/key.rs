//! Public key packets.

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Result;
use crate::crypto::mpi;
use crate::packet;
use crate::types::PublicKeyAlgorithm;

/// Holds a public key or public subkey packet.
///
/// The same key data appears under two tags: tag 6 frames a primary
/// key, tag 14 a subkey.  Which one a `Key` is, is decided by the
/// [`Packet`] variant wrapping it.  See [Section 5.5 of RFC 4880] for
/// details.
///
///   [`Packet`]: ../enum.Packet.html
///   [Section 5.5 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
#[non_exhaustive]
pub enum Key {
    /// A version 3 key.
    V3(Key3),
    /// A version 4 key.
    V4(Key4),
}

impl Key {
    /// Gets the version of this key packet.
    pub fn version(&self) -> u8 {
        match self {
            Key::V3(_) => 3,
            Key::V4(_) => 4,
        }
    }

    /// Gets the key's creation time, in seconds since the Unix epoch.
    pub fn creation_time(&self) -> u32 {
        match self {
            Key::V3(k) => k.creation_time,
            Key::V4(k) => k.creation_time,
        }
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        match self {
            Key::V3(k) => k.pk_algo,
            Key::V4(k) => k.pk_algo,
        }
    }

    /// Gets the key's public key material.
    pub fn mpis(&self) -> &mpi::PublicKey {
        match self {
            Key::V3(k) => &k.mpis,
            Key::V4(k) => &k.mpis,
        }
    }

    pub(crate) fn common(&self) -> &packet::Common {
        match self {
            Key::V3(k) => &k.common,
            Key::V4(k) => &k.common,
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut packet::Common {
        match self {
            Key::V3(k) => &mut k.common,
            Key::V4(k) => &mut k.common,
        }
    }
}

impl From<Key3> for Key {
    fn from(k: Key3) -> Self {
        Key::V3(k)
    }
}

impl From<Key4> for Key {
    fn from(k: Key4) -> Self {
        Key::V4(k)
    }
}

/// Holds a version 3 public key packet.
///
/// V3 keys are deprecated, carry an expiration period of their own,
/// and are only defined for the RSA variants.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Key3 {
    pub(crate) common: packet::Common,
    /// When the key was created, in seconds since the Unix epoch.
    creation_time: u32,
    /// Number of days until the key expires; zero means never.
    days_valid: u16,
    /// Public key algorithm of this key; one of the RSA variants.
    pk_algo: PublicKeyAlgorithm,
    /// The key's public key material.
    mpis: mpi::PublicKey,
}

impl Key3 {
    /// Creates a v3 key.
    ///
    /// Fails unless the algorithm is an RSA variant; v3 keys are not
    /// defined for anything else.
    pub fn new(creation_time: u32, days_valid: u16,
               pk_algo: PublicKeyAlgorithm, mpis: mpi::PublicKey)
               -> Result<Self> {
        if !pk_algo.is_rsa() {
            return Err(Error::MalformedPacket(
                format!("v3 keys are only defined for RSA, got {}", pk_algo))
                       .into());
        }
        Ok(Key3 {
            common: Default::default(),
            creation_time,
            days_valid,
            pk_algo,
            mpis,
        })
    }

    /// Gets the key's creation time, in seconds since the Unix epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Gets the number of days until the key expires; zero means
    /// never.
    pub fn days_valid(&self) -> u16 {
        self.days_valid
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key's public key material.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }
}

impl fmt::Debug for Key3 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key3")
            .field("creation_time", &self.creation_time)
            .field("days_valid", &self.days_valid)
            .field("pk_algo", &self.pk_algo)
            .field("mpis", &self.mpis)
            .finish()
    }
}

/// Holds a version 4 public key packet.
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Key4 {
    pub(crate) common: packet::Common,
    /// When the key was created, in seconds since the Unix epoch.
    creation_time: u32,
    /// Public key algorithm of this key.
    pk_algo: PublicKeyAlgorithm,
    /// The key's public key material.
    mpis: mpi::PublicKey,
}

impl Key4 {
    /// Creates a v4 key.
    pub fn new(creation_time: u32, pk_algo: PublicKeyAlgorithm,
               mpis: mpi::PublicKey) -> Self {
        Key4 {
            common: Default::default(),
            creation_time,
            pk_algo,
            mpis,
        }
    }

    /// Gets the key's creation time, in seconds since the Unix epoch.
    pub fn creation_time(&self) -> u32 {
        self.creation_time
    }

    /// Gets the public key algorithm.
    pub fn pk_algo(&self) -> PublicKeyAlgorithm {
        self.pk_algo
    }

    /// Gets the key's public key material.
    pub fn mpis(&self) -> &mpi::PublicKey {
        &self.mpis
    }
}

impl fmt::Debug for Key4 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Key4")
            .field("creation_time", &self.creation_time)
            .field("pk_algo", &self.pk_algo)
            .field("mpis", &self.mpis)
            .finish()
    }
}

#[cfg(test)]
impl Arbitrary for Key {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            let mpis = mpi::PublicKey::RSA {
                n: mpi::MPI::arbitrary(g),
                e: mpi::MPI::arbitrary(g),
            };
            Key3::new(u32::arbitrary(g), u16::arbitrary(g),
                      PublicKeyAlgorithm::RSAEncryptSign, mpis)
                .expect("RSA is a legal v3 algorithm")
                .into()
        } else {
            let mpis = mpi::PublicKey::arbitrary(g);
            let pk_algo = match mpis {
                mpi::PublicKey::RSA { .. } =>
                    PublicKeyAlgorithm::RSAEncryptSign,
                mpi::PublicKey::DSA { .. } => PublicKeyAlgorithm::DSA,
                mpi::PublicKey::Elgamal { .. } =>
                    PublicKeyAlgorithm::ElgamalEncrypt,
                mpi::PublicKey::ECDSA { .. } => PublicKeyAlgorithm::ECDSA,
                mpi::PublicKey::ECDH { .. } => PublicKeyAlgorithm::ECDH,
                mpi::PublicKey::EdDSA { .. } => PublicKeyAlgorithm::EdDSA,
                mpi::PublicKey::Unknown { .. } => unreachable!(),
            };
            Key4::new(u32::arbitrary(g), pk_algo, mpis).into()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Packet;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(k: Key) -> bool {
            let p = Packet::PublicKey(k.clone());
            let q = Packet::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    quickcheck::quickcheck! {
        fn subkey_roundtrip(k: Key) -> bool {
            let p = Packet::PublicSubkey(k.clone());
            let q = Packet::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }

    #[test]
    fn v3_requires_rsa() {
        let mpis = mpi::PublicKey::DSA {
            p: mpi::MPI::new(b"\x07"),
            q: mpi::MPI::new(b"\x05"),
            g: mpi::MPI::new(b"\x02"),
            y: mpi::MPI::new(b"\x03"),
        };
        assert!(Key3::new(0, 0, PublicKeyAlgorithm::DSA, mpis).is_err());
    }
}
