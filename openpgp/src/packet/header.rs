//! Packet headers.
//!
//! An OpenPGP packet starts with a cipher type byte (CTB) carrying
//! the packet's tag, followed by the length of the body.  There are
//! two framings: the old format of RFC 1991, which encodes the tag in
//! four bits and selects among four length encodings, and the new
//! format of [RFC 4880], which encodes the tag in six bits and uses a
//! variable length encoding that also supports streaming via partial
//! body lengths.
//!
//! [RFC 4880]: https://tools.ietf.org/html/rfc4880#section-4.2

use crate::Error;
use crate::Result;
use crate::packet::Tag;

/// A packet's header.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Header {
    /// The packet's CTB.
    ctb: CTB,
    /// The packet's body length.
    length: BodyLength,
}

impl Header {
    /// Creates a new header.
    pub fn new(ctb: CTB, length: BodyLength) -> Self {
        Header { ctb, length }
    }

    /// Returns the header's CTB.
    pub fn ctb(&self) -> &CTB {
        &self.ctb
    }

    /// Returns the header's body length.
    pub fn length(&self) -> &BodyLength {
        &self.length
    }

    /// Returns the tag of the framed packet.
    pub fn tag(&self) -> Tag {
        self.ctb.tag()
    }

    /// Checks the header for validity.
    ///
    /// In particular, partial body lengths and indeterminate lengths
    /// are only allowed for the streamable packet types.
    pub fn valid(&self) -> Result<()> {
        let streaming = match self.length {
            BodyLength::Full(_) => false,
            BodyLength::Partial(_) | BodyLength::Indeterminate => true,
        };

        if streaming && !self.tag().can_stream() {
            return Err(Error::MalformedPacket(format!(
                "Partial body or indeterminate length for non-streamable \
                 packet: {}", self.tag())).into());
        }

        Ok(())
    }
}

/// A packet's CTB.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CTB {
    /// An old format CTB: `10xxxxyy`.
    Old(CTBOld),
    /// A new format CTB: `11tttttt`.
    New(CTBNew),
}

impl CTB {
    /// Returns the tag encoded in this CTB.
    pub fn tag(&self) -> Tag {
        match self {
            CTB::Old(ctb) => ctb.tag,
            CTB::New(ctb) => ctb.tag,
        }
    }
}

/// An old format CTB.
///
/// The tag must fit in four bits; the length type selects among the
/// four old-style length encodings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CTBOld {
    /// The packet's tag, 0 to 15.
    tag: Tag,
    /// The length encoding selected by the two low bits.
    length_type: PacketLengthType,
}

impl CTBOld {
    /// Creates an old format CTB.
    ///
    /// Fails if the tag does not fit in four bits or the length type
    /// is not expressible in the old format.
    pub fn new(tag: Tag, length_type: PacketLengthType) -> Result<Self> {
        let raw: u8 = tag.into();
        if raw > 15 {
            return Err(Error::InvalidArgument(
                format!("Only tags 0 to 15 are expressible in the old \
                         format, got {}", raw)).into());
        }
        match length_type {
            PacketLengthType::Partial =>
                return Err(Error::InvalidArgument(
                    "The old format has no partial body lengths".into())
                           .into()),
            PacketLengthType::FiveOctets =>
                return Err(Error::InvalidArgument(
                    "The old format's long length is four octets".into())
                           .into()),
            _ => (),
        }
        Ok(CTBOld { tag, length_type })
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the selected length encoding.
    pub fn length_type(&self) -> PacketLengthType {
        self.length_type
    }
}

/// A new format CTB.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CTBNew {
    /// The packet's tag, 0 to 63.
    tag: Tag,
    /// The length encoding actually used on the wire.
    ///
    /// The new format derives the encoding from the first length
    /// octet, and small lengths may legally be framed with the wider
    /// five-octet encoding.  Recording the encoding lets the
    /// serializer reproduce the input bytes.
    length_type: PacketLengthType,
}

impl CTBNew {
    /// Creates a new format CTB.
    pub fn new(tag: Tag, length_type: PacketLengthType) -> Result<Self> {
        match length_type {
            PacketLengthType::Indeterminate =>
                return Err(Error::InvalidArgument(
                    "The new format has no indeterminate length".into())
                           .into()),
            PacketLengthType::FourOctets =>
                return Err(Error::InvalidArgument(
                    "The new format's long length is five octets".into())
                           .into()),
            _ => (),
        }
        Ok(CTBNew { tag, length_type })
    }

    /// Returns the packet's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the length encoding used on the wire.
    pub fn length_type(&self) -> PacketLengthType {
        self.length_type
    }
}

/// The length encodings of the packet framings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PacketLengthType {
    /// A one-octet length.
    ///
    /// Old format: lengths up to 255.  New format: lengths up to 191.
    OneOctet,
    /// A two-octet length.
    ///
    /// Old format: a big-endian u16.  New format: lengths 192 to
    /// 8383, encoded as `((o1 - 192) << 8) + o2 + 192`.
    TwoOctets,
    /// A four-octet length: a big-endian u32 after the CTB.  Old
    /// format only.
    FourOctets,
    /// A five-octet length: a 0xFF octet followed by a big-endian
    /// u32.  New format only.
    FiveOctets,
    /// A partial body length octet, new format only.
    Partial,
    /// No length at all; the body extends to the end of the input.
    /// Old format only.
    Indeterminate,
}

impl PacketLengthType {
    /// Returns whether a body of `len` octets can be framed with this
    /// encoding in the old format.
    pub(crate) fn old_can_encode(&self, len: u32) -> bool {
        match self {
            PacketLengthType::OneOctet => len <= 0xFF,
            PacketLengthType::TwoOctets => len <= 0xFFFF,
            PacketLengthType::FourOctets => true,
            PacketLengthType::FiveOctets | PacketLengthType::Partial => false,
            PacketLengthType::Indeterminate => true,
        }
    }

    /// Returns whether a body of `len` octets can be framed with this
    /// encoding in the new format.
    pub(crate) fn new_can_encode(&self, len: u32) -> bool {
        match self {
            PacketLengthType::OneOctet => len < 192,
            PacketLengthType::TwoOctets => (192..=8383).contains(&len),
            PacketLengthType::FiveOctets => true,
            PacketLengthType::FourOctets
                | PacketLengthType::Partial
                | PacketLengthType::Indeterminate => false,
        }
    }
}

/// The length of a packet's body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyLength {
    /// The packet's body is this many octets.
    Full(u32),
    /// The packet is chunked; this is the size of the first chunk.
    /// Further length headers follow the chunk, until a non-partial
    /// length closes the body.  New format only.
    Partial(u32),
    /// The packet extends to the end of the input.  Old format only.
    Indeterminate,
}
