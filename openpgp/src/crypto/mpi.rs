//! Multi precision integers and related low-level wire types.

use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::types::{
    HashAlgorithm,
    SymmetricAlgorithm,
};

/// Holds a single MPI.
///
/// On the wire an MPI is a two-octet big-endian bit count followed by
/// exactly `ceil(bits / 8)` value octets, most significant first.
/// The value is stored in normalized form: no leading zero octets,
/// so the bit count is derivable from the value and the two
/// representations cannot disagree.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MPI {
    /// Integer value as big-endian.
    value: Box<[u8]>,
}

impl MPI {
    /// Creates a new MPI.
    ///
    /// This function takes care of leading zeros.
    pub fn new(value: &[u8]) -> Self {
        let offset = value.iter().take_while(|&&b| b == 0).count();
        MPI {
            value: Vec::from(&value[offset..]).into_boxed_slice(),
        }
    }

    /// Returns the length of the MPI in bits.
    pub fn bits(&self) -> usize {
        self.value.first()
            .map(|&b| self.value.len() * 8 - b.leading_zeros() as usize)
            .unwrap_or(0)
    }

    /// Returns the value of this MPI.
    pub fn value(&self) -> &[u8] {
        &self.value
    }
}

impl From<Vec<u8>> for MPI {
    fn from(v: Vec<u8>) -> Self {
        Self::new(&v)
    }
}

impl fmt::Debug for MPI {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_fmt(format_args!(
            "{} bits: {}", self.bits(),
            crate::fmt::hex::encode(&*self.value)))
    }
}

#[cfg(test)]
impl Arbitrary for MPI {
    fn arbitrary(g: &mut Gen) -> Self {
        MPI::new(&Vec::<u8>::arbitrary(g))
    }
}

/// Holds a curve object identifier.
///
/// On the wire an OID is a one-octet length followed by the DER
/// content octets of the identifier.  The length octets 0 and 0xFF
/// are reserved and rejected by the parser.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Oid {
    bytes: Box<[u8]>,
}

/// The OID of Curve25519 as used for EdDSA, for Debug output.
const OID_ED25519: &[u8] = &[0x2B, 0x06, 0x01, 0x04, 0x01, 0xDA, 0x47, 0x0F, 0x01];
/// The OID of NIST P-256, for Debug output.
const OID_NIST_P256: &[u8] = &[0x2A, 0x86, 0x48, 0xCE, 0x3D, 0x03, 0x01, 0x07];

impl Oid {
    /// Wraps the given DER content octets.
    ///
    /// Returns an error if the blob cannot be framed with a one-octet
    /// length, i.e. if it is empty or 255 octets or longer.
    pub fn new(bytes: &[u8]) -> crate::Result<Self> {
        if bytes.is_empty() || bytes.len() >= 0xFF {
            return Err(crate::Error::MalformedOid(
                format!("reserved length {}", bytes.len())).into());
        }
        Ok(Oid { bytes: bytes.to_vec().into_boxed_slice() })
    }

    /// Returns the DER content octets.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &*self.bytes {
            b if b == OID_ED25519 => f.write_str("Oid(Ed25519)"),
            b if b == OID_NIST_P256 => f.write_str("Oid(NIST P-256)"),
            b => f.write_fmt(format_args!(
                "Oid({})", crate::fmt::hex::encode(b))),
        }
    }
}

#[cfg(test)]
impl Arbitrary for Oid {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut bytes = Vec::<u8>::arbitrary(g);
        if bytes.is_empty() {
            bytes.push(0x2b);
        }
        bytes.truncate(0xFE);
        Oid::new(&bytes).expect("within the encodable range")
    }
}

/// Holds the public material of a key.
///
/// Provides a typed and structured way of storing multiple MPIs (and
/// the occasional elliptic curve) in key packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum PublicKey {
    /// RSA public key.
    RSA {
        /// Public modulo N = pq.
        n: MPI,
        /// Public exponent.
        e: MPI,
    },

    /// NIST DSA public key.
    DSA {
        /// Prime of the ring Zp.
        p: MPI,
        /// Order of `g` in Zp.
        q: MPI,
        /// Public generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },

    /// Elgamal public key.
    Elgamal {
        /// Prime of the ring Zp.
        p: MPI,
        /// Generator of Zp.
        g: MPI,
        /// Public key g^x mod p.
        y: MPI,
    },

    /// NIST elliptic curve DSA public key.
    ECDSA {
        /// Curve we're using.
        curve: Oid,
        /// Public point.
        q: MPI,
    },

    /// Elliptic curve Elgamal public key.
    ECDH {
        /// Curve we're using.
        curve: Oid,
        /// Public point.
        q: MPI,
        /// Reserved octet of the KDF parameters field.  1 in all
        /// known implementations; preserved so unusual values survive
        /// a round trip.
        reserved: u8,
        /// Hash algorithm used for key derivation.
        hash: HashAlgorithm,
        /// Algorithm used with the derived key.
        sym: SymmetricAlgorithm,
    },

    /// DJB's "Twisted" Edwards curve DSA public key.
    EdDSA {
        /// Curve we're using.  Must be Ed25519.
        curve: Oid,
        /// Public point.
        q: MPI,
    },

    /// Raw material for an unknown algorithm.
    Unknown {
        /// The remaining packet body, verbatim.
        rest: Box<[u8]>,
    },
}

#[cfg(test)]
impl Arbitrary for PublicKey {
    fn arbitrary(g: &mut Gen) -> Self {
        use self::PublicKey::*;
        match u8::arbitrary(g) % 6 {
            0 => RSA {
                n: MPI::arbitrary(g),
                e: MPI::arbitrary(g),
            },

            1 => DSA {
                p: MPI::arbitrary(g),
                q: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },

            2 => Elgamal {
                p: MPI::arbitrary(g),
                g: MPI::arbitrary(g),
                y: MPI::arbitrary(g),
            },

            3 => ECDSA {
                curve: Oid::arbitrary(g),
                q: MPI::arbitrary(g),
            },

            4 => ECDH {
                curve: Oid::arbitrary(g),
                q: MPI::arbitrary(g),
                reserved: 1,
                hash: HashAlgorithm::arbitrary(g),
                sym: SymmetricAlgorithm::arbitrary(g),
            },

            5 => EdDSA {
                curve: Oid::arbitrary(g),
                q: MPI::arbitrary(g),
            },

            _ => unreachable!(),
        }
    }
}

/// Holds the algorithm dependent material of a signature.
///
/// Provides a typed and structured way of storing multiple MPIs in
/// signature packets.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub enum Signature {
    /// RSA signature.
    RSA {
        /// Signature m^d mod N.
        m_d: MPI,
    },

    /// NIST's DSA signature.
    DSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// NIST's elliptic curve DSA signature.
    ECDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// DJB's "Twisted" Edwards curve DSA signature.
    EdDSA {
        /// `r` value.
        r: MPI,
        /// `s` value.
        s: MPI,
    },

    /// Raw material for an unknown algorithm.
    Unknown {
        /// The remaining packet body, verbatim.
        rest: Box<[u8]>,
    },
}

#[cfg(test)]
impl Arbitrary for Signature {
    fn arbitrary(g: &mut Gen) -> Self {
        match u8::arbitrary(g) % 4 {
            0 => Signature::RSA {
                m_d: MPI::arbitrary(g),
            },

            1 => Signature::DSA {
                r: MPI::arbitrary(g),
                s: MPI::arbitrary(g),
            },

            2 => Signature::ECDSA {
                r: MPI::arbitrary(g),
                s: MPI::arbitrary(g),
            },

            3 => Signature::EdDSA {
                r: MPI::arbitrary(g),
                s: MPI::arbitrary(g),
            },

            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mpi_normalization() {
        let mpi = MPI::new(b"\x00\x00\x01\xff");
        assert_eq!(mpi.value(), b"\x01\xff");
        assert_eq!(mpi.bits(), 9);

        let zero = MPI::new(b"\x00\x00");
        assert_eq!(zero.value(), b"");
        assert_eq!(zero.bits(), 0);
    }

    #[test]
    fn oid_reserved_lengths() {
        assert!(Oid::new(b"").is_err());
        assert!(Oid::new(&[0u8; 255]).is_err());
        assert!(Oid::new(&[0u8; 254]).is_ok());
    }

    quickcheck::quickcheck! {
        fn mpi_bits_value_agree(mpi: MPI) -> bool {
            mpi.value().len() == (mpi.bits() + 7) / 8
        }
    }
}
