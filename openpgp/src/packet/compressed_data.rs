use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Packet;
use crate::packet;
use crate::types::CompressionAlgorithm;

/// Holds a compressed data packet.
///
/// A compressed data packet contains a compressed stream of OpenPGP
/// packets.  See [Section 5.6 of RFC 4880] for details.  This crate
/// does not decompress; the compressed stream is preserved verbatim
/// so the packet can be round-tripped or handed to a decompressor.
///
///   [Section 5.6 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.6
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct CompressedData {
    pub(crate) common: packet::Common,
    algo: CompressionAlgorithm,
    /// The compressed stream, verbatim.
    data: Vec<u8>,
}

impl CompressedData {
    /// Returns a new `CompressedData` packet.
    pub fn new(algo: CompressionAlgorithm) -> Self {
        CompressedData {
            common: Default::default(),
            algo,
            data: Vec::new(),
        }
    }

    /// Returns the compression algorithm used.
    pub fn algo(&self) -> CompressionAlgorithm {
        self.algo
    }

    /// Returns the compressed stream.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sets the compressed stream.
    pub fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

impl fmt::Debug for CompressedData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CompressedData")
            .field("algo", &self.algo)
            .field("data", &format!("{} bytes", self.data.len()))
            .finish()
    }
}

impl From<CompressedData> for Packet {
    fn from(p: CompressedData) -> Self {
        Packet::CompressedData(p)
    }
}

#[cfg(test)]
impl Arbitrary for CompressedData {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut p = CompressedData::new(CompressionAlgorithm::arbitrary(g));
        p.set_data(Vec::<u8>::arbitrary(g));
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: CompressedData) -> bool {
            let q = CompressedData::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
