use std::fmt;

#[cfg(test)]
use quickcheck::{Arbitrary, Gen};

use crate::Error;
use crate::Packet;
use crate::Result;
use crate::packet;
use crate::types::DataFormat;

/// Holds a literal data packet.
///
/// A literal data packet contains unstructured data.  Since the
/// content is unstructured, it is not normally useful on its own.
/// However, it is meant to carry the payload of a message, and
/// accompanying metadata: a format hint, an optional file name, and a
/// date.  See [Section 5.9 of RFC 4880] for details.
///
///   [Section 5.9 of RFC 4880]: https://tools.ietf.org/html/rfc4880#section-5.9
#[derive(PartialEq, Eq, Hash, Clone)]
pub struct Literal {
    pub(crate) common: packet::Common,
    /// A one-octet field that describes how the data is formatted.
    format: DataFormat,
    /// Filename, at most 255 octets long.
    filename: Option<Vec<u8>>,
    /// A four-octet number that indicates a date associated with the
    /// literal data.
    date: u32,
    /// The literal data itself.
    data: Vec<u8>,
}

impl Literal {
    /// Returns a new `Literal` packet.
    pub fn new(format: DataFormat) -> Literal {
        Literal {
            common: Default::default(),
            format,
            filename: None,
            date: 0,
            data: Vec::new(),
        }
    }

    /// Gets the literal packet's format.
    pub fn format(&self) -> DataFormat {
        self.format
    }

    /// Gets the literal packet's filename.
    ///
    /// Note: when a literal data packet is protected by a signature,
    /// only the literal data is protected, not the filename.
    pub fn filename(&self) -> Option<&[u8]> {
        self.filename.as_deref()
    }

    /// Sets the literal packet's filename field.
    ///
    /// The standard does not specify the filename's encoding.  There
    /// is no guarantee that the filename has any sensible chars,
    /// let alone is valid UTF-8.
    pub fn set_filename(&mut self, filename: &[u8]) -> Result<()> {
        if filename.len() > 255 {
            return Err(Error::InvalidArgument(
                "filename too long".into()).into());
        }
        self.filename = if filename.is_empty() {
            None
        } else {
            Some(filename.to_vec())
        };
        Ok(())
    }

    /// Gets the literal packet's date field.
    ///
    /// Seconds since the Unix epoch; zero means unset.
    pub fn date(&self) -> u32 {
        self.date
    }

    /// Sets the literal packet's date field.
    pub fn set_date(&mut self, date: u32) {
        self.date = date;
    }

    /// Gets the literal packet's body.
    pub fn body(&self) -> &[u8] {
        &self.data
    }

    /// Sets the literal packet's body.
    pub fn set_body(&mut self, data: Vec<u8>) {
        self.data = data;
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let filename = self.filename.as_ref()
            .map(|f| String::from_utf8_lossy(f));

        let threshold = 36;
        let prefix = &self.data[..std::cmp::min(threshold, self.data.len())];
        let mut prefix_fmt = crate::fmt::hex::encode(prefix);
        if self.data.len() > threshold {
            prefix_fmt.push_str("...");
        }
        prefix_fmt.push_str(&format!(" ({} bytes)", self.data.len()));

        f.debug_struct("Literal")
            .field("format", &self.format)
            .field("filename", &filename)
            .field("date", &self.date)
            .field("data", &prefix_fmt)
            .finish()
    }
}

impl From<Literal> for Packet {
    fn from(p: Literal) -> Self {
        Packet::Literal(p)
    }
}

#[cfg(test)]
impl Arbitrary for Literal {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut l = Literal::new(DataFormat::arbitrary(g));
        l.set_date(u32::arbitrary(g));
        let mut filename = Vec::<u8>::arbitrary(g);
        filename.truncate(255);
        l.set_filename(&filename).expect("no more than 255 octets");
        l.set_body(Vec::<u8>::arbitrary(g));
        l
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Parse;
    use crate::serialize::SerializeInto;

    quickcheck::quickcheck! {
        fn roundtrip(p: Literal) -> bool {
            let q = Literal::from_bytes(&p.to_vec().unwrap()).unwrap();
            p == q
        }
    }
}
