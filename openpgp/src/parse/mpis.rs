//! Functions for parsing MPIs and algorithm material.

use crate::Error;
use crate::Result;
use crate::crypto::mpi::{self, MPI, Oid};
use crate::parse::Reader;
use crate::types::PublicKeyAlgorithm;

impl MPI {
    /// Parses an OpenPGP MPI.
    ///
    /// See [Section 3.2 of RFC 4880] for details.
    ///
    ///   [Section 3.2 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-3.2
    pub(crate) fn parse(r: &mut Reader) -> Result<Self> {
        let bits = r.be_u16()? as usize;
        let value = r.bytes((bits + 7) / 8)?;

        // The declared bit count must be the true bit length of the
        // value: no leading zero octets, no set bits above the count.
        let true_bits = match value.first() {
            Some(0) => return Err(Error::MalformedMPI(
                "leading zero octet".into()).into()),
            Some(&b) => value.len() * 8 - b.leading_zeros() as usize,
            None => 0,
        };
        if true_bits != bits {
            return Err(Error::MalformedMPI(format!(
                "declared {} bits, got {}", bits, true_bits)).into());
        }

        Ok(MPI::new(value))
    }

    /// Parses an MPI taking up the whole slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let mpi = Self::parse(&mut r)?;
        r.exhausted("MPI")?;
        Ok(mpi)
    }
}

impl Oid {
    /// Parses a length-prefixed curve OID.
    ///
    /// See [Section 9 of RFC 6637] for details.
    ///
    ///   [Section 9 of RFC 6637]: https://tools.ietf.org/html/rfc6637#section-9
    pub(crate) fn parse(r: &mut Reader) -> Result<Self> {
        let len = r.u8()?;
        if len == 0 || len == 0xFF {
            return Err(Error::MalformedOid(
                format!("reserved length octet 0x{:02x}", len)).into());
        }
        Oid::new(r.bytes(len as usize)?)
    }

    /// Parses an OID taking up the whole slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let oid = Self::parse(&mut r)?;
        r.exhausted("OID")?;
        Ok(oid)
    }
}

impl mpi::PublicKey {
    /// Parses a set of OpenPGP MPIs representing a public key.
    ///
    /// Material for algorithms outside the tables of [RFC 4880] and
    /// [RFC 6637] is kept as raw bytes.
    ///
    ///   [RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.5.2
    ///   [RFC 6637]: https://tools.ietf.org/html/rfc6637
    pub(crate) fn parse(algo: PublicKeyAlgorithm, r: &mut Reader)
                        -> Result<Self> {
        use crate::types::PublicKeyAlgorithm::*;

        match algo {
            RSAEncryptSign | RSAEncrypt | RSASign => {
                let n = MPI::parse(r)?;
                let e = MPI::parse(r)?;
                Ok(mpi::PublicKey::RSA { n, e })
            },

            DSA => {
                let p = MPI::parse(r)?;
                let q = MPI::parse(r)?;
                let g = MPI::parse(r)?;
                let y = MPI::parse(r)?;
                Ok(mpi::PublicKey::DSA { p, q, g, y })
            },

            ElgamalEncrypt | ElgamalEncryptSign => {
                let p = MPI::parse(r)?;
                let g = MPI::parse(r)?;
                let y = MPI::parse(r)?;
                Ok(mpi::PublicKey::Elgamal { p, g, y })
            },

            ECDSA => {
                let curve = Oid::parse(r)?;
                let q = MPI::parse(r)?;
                Ok(mpi::PublicKey::ECDSA { curve, q })
            },

            ECDH => {
                let curve = Oid::parse(r)?;
                let q = MPI::parse(r)?;

                let kdf_len = r.u8()?;
                if kdf_len != 3 {
                    return Err(Error::MalformedPacket(
                        "wrong KDF parameters length".into()).into());
                }
                let reserved = r.u8()?;
                let hash = r.u8()?.into();
                let sym = r.u8()?.into();
                Ok(mpi::PublicKey::ECDH { curve, q, reserved, hash, sym })
            },

            EdDSA => {
                let curve = Oid::parse(r)?;
                let q = MPI::parse(r)?;
                Ok(mpi::PublicKey::EdDSA { curve, q })
            },

            Unknown(_) | Private(_) => {
                Ok(mpi::PublicKey::Unknown {
                    rest: r.rest().to_vec().into_boxed_slice(),
                })
            },
        }
    }

    /// Parses public key material taking up the whole slice.
    pub fn from_bytes(algo: PublicKeyAlgorithm, data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let mpis = Self::parse(algo, &mut r)?;
        r.exhausted("public key material")?;
        Ok(mpis)
    }
}

impl mpi::Signature {
    /// Parses a set of OpenPGP MPIs representing a signature.
    ///
    /// Material for algorithms that cannot sign, or that we do not
    /// know, is kept as raw bytes.
    pub(crate) fn parse(algo: PublicKeyAlgorithm, r: &mut Reader)
                        -> Result<Self> {
        use crate::types::PublicKeyAlgorithm::*;

        match algo {
            RSAEncryptSign | RSASign => {
                let m_d = MPI::parse(r)?;
                Ok(mpi::Signature::RSA { m_d })
            },

            DSA => {
                let r_ = MPI::parse(r)?;
                let s = MPI::parse(r)?;
                Ok(mpi::Signature::DSA { r: r_, s })
            },

            ECDSA => {
                let r_ = MPI::parse(r)?;
                let s = MPI::parse(r)?;
                Ok(mpi::Signature::ECDSA { r: r_, s })
            },

            EdDSA => {
                let r_ = MPI::parse(r)?;
                let s = MPI::parse(r)?;
                Ok(mpi::Signature::EdDSA { r: r_, s })
            },

            _ => {
                Ok(mpi::Signature::Unknown {
                    rest: r.rest().to_vec().into_boxed_slice(),
                })
            },
        }
    }

    /// Parses signature material taking up the whole slice.
    pub fn from_bytes(algo: PublicKeyAlgorithm, data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data);
        let mpis = Self::parse(algo, &mut r)?;
        r.exhausted("signature material")?;
        Ok(mpis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::SerializeInto;

    #[test]
    fn mpi_parse() {
        // A dummy RSA public key: n = 1, e = 2.
        let mpis = mpi::PublicKey::from_bytes(
            PublicKeyAlgorithm::RSAEncryptSign,
            b"\x00\x01\x01\x00\x02\x02").unwrap();
        match &mpis {
            mpi::PublicKey::RSA { n, e } => {
                assert_eq!(n.bits(), 1);
                assert_eq!(n.value(), b"\x01");
                assert_eq!(e.bits(), 2);
                assert_eq!(e.value(), b"\x02");
            },
            _ => unreachable!(),
        }

        // The number 511.
        let mpi = MPI::from_bytes(b"\x00\x09\x01\xff").unwrap();
        assert_eq!(mpi.value(), b"\x01\xff");
        assert_eq!(mpi.bits(), 9);

        // The number 1, incorrectly encoded (the bit count should be
        // 1, not 2).
        assert!(MPI::from_bytes(b"\x00\x02\x01").is_err());

        // A leading zero octet is not minimal either.
        assert!(MPI::from_bytes(b"\x00\x09\x00\xff").is_err());

        // Too short.
        assert!(MPI::from_bytes(b"\x00\x09\x01").is_err());
    }

    #[test]
    fn oid_parse() {
        let oid = Oid::from_bytes(b"\x03\x2b\x65\x70").unwrap();
        assert_eq!(oid.as_bytes(), b"\x2b\x65\x70");

        // Reserved length octets.
        assert!(Oid::from_bytes(b"\x00").is_err());
        let mut blob = vec![0xff];
        blob.extend_from_slice(&[0x2b; 255]);
        assert!(Oid::from_bytes(&blob).is_err());
    }

    #[test]
    fn ecdh_kdf_length_must_be_three() {
        // Curve OID, point, then a KDF field claiming 4 parameter
        // octets.
        let blob = b"\x03\x2b\x65\x6e\x00\x02\x03\x04\x01\x08\x09";
        assert!(mpi::PublicKey::from_bytes(
            PublicKeyAlgorithm::ECDH, blob).is_err());
    }

    quickcheck::quickcheck! {
        fn mpi_roundtrip(mpi: MPI) -> bool {
            MPI::from_bytes(&mpi.to_vec().unwrap()).unwrap() == mpi
        }
    }

    quickcheck::quickcheck! {
        fn oid_roundtrip(oid: Oid) -> bool {
            Oid::from_bytes(&oid.to_vec().unwrap()).unwrap() == oid
        }
    }

    quickcheck::quickcheck! {
        fn pk_roundtrip(pk: mpi::PublicKey) -> bool {
            use crate::types::PublicKeyAlgorithm::*;

            let buf = pk.to_vec().unwrap();
            let algo = match &pk {
                mpi::PublicKey::RSA { .. } => RSAEncryptSign,
                mpi::PublicKey::DSA { .. } => DSA,
                mpi::PublicKey::Elgamal { .. } => ElgamalEncrypt,
                mpi::PublicKey::ECDSA { .. } => ECDSA,
                mpi::PublicKey::ECDH { .. } => ECDH,
                mpi::PublicKey::EdDSA { .. } => EdDSA,
                mpi::PublicKey::Unknown { .. } => unreachable!(),
            };
            mpi::PublicKey::from_bytes(algo, &buf).unwrap() == pk
        }
    }

    quickcheck::quickcheck! {
        fn sig_roundtrip(sig: mpi::Signature) -> bool {
            use crate::types::PublicKeyAlgorithm::*;

            let buf = sig.to_vec().unwrap();
            let algo = match &sig {
                mpi::Signature::RSA { .. } => RSAEncryptSign,
                mpi::Signature::DSA { .. } => DSA,
                mpi::Signature::ECDSA { .. } => ECDSA,
                mpi::Signature::EdDSA { .. } => EdDSA,
                mpi::Signature::Unknown { .. } => unreachable!(),
            };
            mpi::Signature::from_bytes(algo, &buf).unwrap() == sig
        }
    }
}
