//! Packet parsing.
//!
//! OpenPGP data is a sequence of packets: a header carrying the tag
//! and the body length, followed by the body.  [`PacketParser`] pulls
//! packets one at a time from a byte source, reassembling bodies
//! split over partial-body chunks, so the per-packet parsers always
//! see a flat body.  Parse errors are fatal for a stream; there is no
//! resynchronization.
//!
//! Parsing never reads past the data it was given: if the input ends
//! in the middle of a structure, the parser fails with
//! [`Error::Truncated`].
//!
//! [`PacketParser`]: struct.PacketParser.html
//! [`Error::Truncated`]: ../enum.Error.html

use std::io;

use buffered_reader::BufferedReader;

use crate::Error;
use crate::KeyID;
use crate::Packet;
use crate::Result;
use crate::packet::header::{
    BodyLength,
    CTB,
    CTBNew,
    CTBOld,
    Header,
    PacketLengthType,
};
use crate::packet::signature::subpacket::{
    NotationData,
    Subpacket,
    SubpacketArea,
    SubpacketLength,
    SubpacketTag,
    SubpacketValue,
};
use crate::packet::{
    AttributeSubpacket,
    AttributeValue,
    CompressedData,
    ImageAttribute,
    Key,
    Key3,
    Key4,
    Literal,
    Marker,
    MDC,
    SED,
    SEIP,
    Signature,
    Signature3,
    Signature4,
    Tag,
    Trust,
    Unknown,
    UserAttribute,
    UserID,
};
use crate::types::{
    CompressionAlgorithm,
    DataFormat,
    HashAlgorithm,
    PublicKeyAlgorithm,
    ReasonForRevocation,
    SignatureType,
    SymmetricAlgorithm,
};

mod mpis;

/// Conversion from binary representations.
pub trait Parse: Sized {
    /// Reads from the given slice.
    fn from_bytes(data: &[u8]) -> Result<Self>;

    /// Reads from the given reader.
    fn from_reader<R: io::Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Self::from_bytes(&buf)
    }
}

/// A length-checked cursor over a byte slice.
///
/// Every read advances the cursor; a read crossing the end of the
/// slice fails with `Error::Truncated` carrying the shortfall.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader { buf, pos: 0 }
    }

    /// Returns the number of bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns whether the input is exhausted.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn require(&self, amount: usize) -> Result<()> {
        if self.remaining() < amount {
            Err(Error::Truncated(amount - self.remaining()).into())
        } else {
            Ok(())
        }
    }

    /// Reads `amount` bytes.
    pub fn bytes(&mut self, amount: usize) -> Result<&'a [u8]> {
        self.require(amount)?;
        let slice = &self.buf[self.pos..self.pos + amount];
        self.pos += amount;
        Ok(slice)
    }

    /// Reads the rest of the input.
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.buf[self.pos..];
        self.pos = self.buf.len();
        slice
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn be_u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn be_u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn le_u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Fails unless the input is exhausted.
    pub fn exhausted(&self, what: &str) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::MalformedPacket(format!(
                "{} bytes of trailing junk after {}",
                self.remaining(), what)).into())
        }
    }
}

/// Parses a variable-length field length as used by new-format packet
/// bodies, signature subpackets, and user attribute subpackets.
///
/// Partial body octets are not valid here; the caller handles them
/// where they are allowed.
fn parse_subpacket_length(r: &mut Reader) -> Result<SubpacketLength> {
    let o1 = r.u8()?;
    match o1 {
        0..=191 => Ok(SubpacketLength::new(o1 as u32, None)),
        192..=254 => {
            let o2 = r.u8()?;
            Ok(SubpacketLength::new(
                ((o1 as u32 - 192) << 8) + o2 as u32 + 192, None))
        },
        255 => {
            let len = r.be_u32()?;
            // Record the wire encoding if a shorter one exists, so
            // the serializer can reproduce it.
            let raw = if len < 8384 {
                Some(vec![255,
                          (len >> 24) as u8, (len >> 16) as u8,
                          (len >> 8) as u8, len as u8])
            } else {
                None
            };
            Ok(SubpacketLength::new(len, raw))
        },
    }
}

/// Parses a packet header from the byte source.
fn parse_header(bio: &mut dyn BufferedReader<()>) -> Result<Header> {
    let ctb = read_octet(bio)?;
    if ctb & 0x80 == 0 {
        return Err(Error::MalformedPacket(
            format!("invalid CTB 0x{:02x}: bit 7 is clear", ctb)).into());
    }

    let header = if ctb & 0x40 != 0 {
        // New format.
        let tag: Tag = (ctb & 0x3f).into();
        let (length_type, length) = match read_octet(bio)? {
            o1 @ 0..=191 =>
                (PacketLengthType::OneOctet, BodyLength::Full(o1 as u32)),
            o1 @ 192..=223 => {
                let o2 = read_octet(bio)?;
                (PacketLengthType::TwoOctets,
                 BodyLength::Full(((o1 as u32 - 192) << 8) + o2 as u32 + 192))
            },
            255 =>
                (PacketLengthType::FiveOctets,
                 BodyLength::Full(read_be_u32(bio)?)),
            o1 =>
                (PacketLengthType::Partial,
                 BodyLength::Partial(1u32 << (o1 & 0x1f))),
        };
        Header::new(CTB::New(CTBNew::new(tag, length_type)?), length)
    } else {
        // Old format.
        let tag: Tag = ((ctb >> 2) & 0xf).into();
        let (length_type, length) = match ctb & 0x3 {
            0 => (PacketLengthType::OneOctet,
                  BodyLength::Full(read_octet(bio)? as u32)),
            1 => {
                let b = [read_octet(bio)?, read_octet(bio)?];
                (PacketLengthType::TwoOctets,
                 BodyLength::Full(u16::from_be_bytes(b) as u32))
            },
            2 => (PacketLengthType::FourOctets,
                  BodyLength::Full(read_be_u32(bio)?)),
            _ => (PacketLengthType::Indeterminate, BodyLength::Indeterminate),
        };
        Header::new(CTB::Old(CTBOld::new(tag, length_type)?), length)
    };

    header.valid()?;
    Ok(header)
}

fn read_octet(bio: &mut dyn BufferedReader<()>) -> Result<u8> {
    let data = bio.data(1)?;
    if data.is_empty() {
        return Err(Error::Truncated(1).into());
    }
    let octet = data[0];
    bio.consume(1);
    Ok(octet)
}

fn read_be_u32(bio: &mut dyn BufferedReader<()>) -> Result<u32> {
    let b = [read_octet(bio)?, read_octet(bio)?,
             read_octet(bio)?, read_octet(bio)?];
    Ok(u32::from_be_bytes(b))
}

/// Takes exactly `amount` bytes from the source, or fails with
/// `Truncated` without consuming past the end.
fn steal_exact(bio: &mut dyn BufferedReader<()>, amount: usize)
               -> Result<Vec<u8>> {
    let available = bio.data(amount)?.len();
    if available < amount {
        return Err(Error::Truncated(amount - available).into());
    }
    Ok(bio.steal(amount)?)
}

/// An iterator over the packets in a byte source.
///
/// Bodies framed with partial lengths are reassembled before the
/// per-packet parser runs.  The first error ends the iteration.
pub struct PacketParser<'a> {
    bio: Box<dyn BufferedReader<()> + 'a>,
    done: bool,
}

impl<'a> PacketParser<'a> {
    /// Starts parsing packets from the given slice.
    pub fn from_bytes(data: &'a [u8]) -> Self {
        PacketParser {
            bio: Box::new(buffered_reader::Memory::new(data)),
            done: false,
        }
    }

    /// Starts parsing packets from the given reader.
    pub fn from_reader<R>(reader: R) -> Self
        where R: io::Read + Send + Sync + 'a,
    {
        PacketParser {
            bio: Box::new(buffered_reader::Generic::new(reader, None)),
            done: false,
        }
    }

    /// Parses the next packet, `Ok(None)` at the end of the input.
    fn parse_one(&mut self) -> Result<Option<Packet>> {
        if self.bio.data(1)?.is_empty() {
            return Ok(None);
        }

        let header = parse_header(self.bio.as_mut())?;
        let body = match *header.length() {
            BodyLength::Full(n) => steal_exact(self.bio.as_mut(), n as usize)?,
            BodyLength::Indeterminate => self.bio.steal_eof()?,
            BodyLength::Partial(first) => {
                let mut body = steal_exact(self.bio.as_mut(), first as usize)?;
                // Chunks follow until a definite length closes the
                // body.
                loop {
                    match read_octet(self.bio.as_mut())? {
                        o1 @ 0..=191 => {
                            body.extend_from_slice(&steal_exact(
                                self.bio.as_mut(), o1 as usize)?);
                            break;
                        },
                        o1 @ 192..=223 => {
                            let o2 = read_octet(self.bio.as_mut())?;
                            let n = ((o1 as u32 - 192) << 8) + o2 as u32 + 192;
                            body.extend_from_slice(&steal_exact(
                                self.bio.as_mut(), n as usize)?);
                            break;
                        },
                        255 => {
                            let n = read_be_u32(self.bio.as_mut())?;
                            body.extend_from_slice(&steal_exact(
                                self.bio.as_mut(), n as usize)?);
                            break;
                        },
                        o1 => {
                            let n = 1usize << (o1 & 0x1f);
                            body.extend_from_slice(&steal_exact(
                                self.bio.as_mut(), n)?);
                        },
                    }
                }
                body
            },
        };

        let mut packet = parse_body(header.tag(), &body)?;
        packet.common_mut().set_header(header);
        Ok(Some(packet))
    }
}

impl<'a> Iterator for PacketParser<'a> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parse_one() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            },
        }
    }
}

/// Parses a packet body that has already been reassembled.
fn parse_body(tag: Tag, body: &[u8]) -> Result<Packet> {
    let mut r = Reader::new(body);
    match tag {
        Tag::Signature => Ok(parse_signature(&mut r)?.into()),
        Tag::PublicKey => Ok(Packet::PublicKey(parse_key(&mut r)?)),
        Tag::PublicSubkey => Ok(Packet::PublicSubkey(parse_key(&mut r)?)),
        Tag::Marker => Ok(parse_marker(&mut r)?.into()),
        Tag::Literal => Ok(parse_literal(&mut r)?.into()),
        Tag::CompressedData => Ok(parse_compressed_data(&mut r)?.into()),
        Tag::SED => Ok(SED::new(r.rest().to_vec()).into()),
        Tag::SEIP => Ok(parse_seip(&mut r)?.into()),
        Tag::MDC => Ok(parse_mdc(&mut r)?.into()),
        Tag::Trust => Ok(Trust::from(r.rest().to_vec()).into()),
        Tag::UserID => Ok(UserID::from(r.rest().to_vec()).into()),
        Tag::UserAttribute => Ok(parse_user_attribute(&mut r)?.into()),
        // Everything else, including the secret key packets this
        // crate deliberately does not parse, is preserved verbatim.
        tag => Ok(Unknown::new(tag, body.to_vec()).into()),
    }
}

fn parse_marker(r: &mut Reader) -> Result<Marker> {
    if r.bytes(Marker::BODY.len())? != Marker::BODY {
        return Err(Error::MalformedPacket(
            "marker body is not \"PGP\"".into()).into());
    }
    r.exhausted("marker body")?;
    Ok(Marker::default())
}

fn parse_literal(r: &mut Reader) -> Result<Literal> {
    let format: DataFormat = r.u8()?.into();
    let filename_len = r.u8()? as usize;
    let filename = r.bytes(filename_len)?.to_vec();
    let date = r.be_u32()?;

    let mut literal = Literal::new(format);
    literal.set_filename(&filename)?;
    literal.set_date(date);
    literal.set_body(r.rest().to_vec());
    Ok(literal)
}

fn parse_compressed_data(r: &mut Reader) -> Result<CompressedData> {
    let algo: CompressionAlgorithm = r.u8()?.into();
    let mut packet = CompressedData::new(algo);
    packet.set_data(r.rest().to_vec());
    Ok(packet)
}

fn parse_seip(r: &mut Reader) -> Result<SEIP> {
    let version = r.u8()?;
    if version != 1 {
        return Err(Error::MalformedPacket(
            format!("unknown SEIP version {}", version)).into());
    }
    Ok(SEIP::new(r.rest().to_vec()))
}

fn parse_mdc(r: &mut Reader) -> Result<MDC> {
    let mut digest = [0u8; 20];
    digest.copy_from_slice(r.bytes(20)?);
    r.exhausted("MDC digest")?;
    Ok(MDC::new(digest))
}

fn parse_user_attribute(r: &mut Reader) -> Result<UserAttribute> {
    let mut subpackets = Vec::new();
    while !r.is_empty() {
        let length = parse_subpacket_length(r)?;
        if length.len < 1 {
            return Err(Error::MalformedPacket(
                "zero-length user attribute subpacket".into()).into());
        }
        let tag = r.u8()?;
        let body = r.bytes(length.len as usize - 1)?;

        let value = match tag {
            1 => AttributeValue::Image(parse_image(&mut Reader::new(body))?),
            tag => AttributeValue::Unknown { tag, body: body.to_vec() },
        };
        subpackets.push(AttributeSubpacket::with_length(length, value));
    }
    Ok(UserAttribute::new(subpackets))
}

fn parse_image(r: &mut Reader) -> Result<ImageAttribute> {
    // The header length is, uniquely in OpenPGP, little-endian.
    let header_len = r.le_u16()? as usize;
    if header_len < 4 {
        return Err(Error::MalformedPacket(format!(
            "image header length {} shorter than its fixed fields",
            header_len)).into());
    }
    let version = r.u8()?;
    let format = r.u8()?;
    let header_rest = r.bytes(header_len - 4)?.to_vec();
    Ok(ImageAttribute::with_header(version, format, header_rest,
                                   r.rest().to_vec()))
}

fn parse_key(r: &mut Reader) -> Result<Key> {
    let version = r.u8()?;
    match version {
        3 => {
            let creation_time = r.be_u32()?;
            let days_valid = r.be_u16()?;
            let pk_algo: PublicKeyAlgorithm = r.u8()?.into();
            if !pk_algo.is_rsa() {
                return Err(Error::MalformedPacket(format!(
                    "v3 keys are only defined for RSA, got {}", pk_algo))
                           .into());
            }
            let mpis = crate::crypto::mpi::PublicKey::parse(pk_algo, r)?;
            r.exhausted("v3 key material")?;
            Ok(Key3::new(creation_time, days_valid, pk_algo, mpis)?.into())
        },
        4 => {
            let creation_time = r.be_u32()?;
            let pk_algo: PublicKeyAlgorithm = r.u8()?.into();
            let mpis = crate::crypto::mpi::PublicKey::parse(pk_algo, r)?;
            r.exhausted("v4 key material")?;
            Ok(Key4::new(creation_time, pk_algo, mpis).into())
        },
        version => Err(Error::MalformedPacket(
            format!("unknown key packet version {}", version)).into()),
    }
}

fn parse_signature(r: &mut Reader) -> Result<Signature> {
    let version = r.u8()?;
    match version {
        3 => {
            let hashed_len = r.u8()?;
            if hashed_len != 5 {
                return Err(Error::MalformedPacket(format!(
                    "v3 signature hashed length is {}, must be 5",
                    hashed_len)).into());
            }
            let sigtype: SignatureType = r.u8()?.into();
            let creation_time = r.be_u32()?;
            let issuer = KeyID::from_bytes(r.bytes(8)?);
            let pk_algo: PublicKeyAlgorithm = r.u8()?.into();
            let hash_algo: HashAlgorithm = r.u8()?.into();
            let mut digest_prefix = [0u8; 2];
            digest_prefix.copy_from_slice(r.bytes(2)?);
            let mpis = crate::crypto::mpi::Signature::parse(pk_algo, r)?;
            r.exhausted("v3 signature material")?;
            Ok(Signature3::new(sigtype, creation_time, issuer, pk_algo,
                               hash_algo, digest_prefix, mpis).into())
        },
        4 => {
            let sigtype: SignatureType = r.u8()?.into();
            let pk_algo: PublicKeyAlgorithm = r.u8()?.into();
            let hash_algo: HashAlgorithm = r.u8()?.into();

            let hashed_len = r.be_u16()? as usize;
            let hashed_area =
                parse_subpacket_area(&mut Reader::new(r.bytes(hashed_len)?))?;
            let unhashed_len = r.be_u16()? as usize;
            let unhashed_area =
                parse_subpacket_area(&mut Reader::new(r.bytes(unhashed_len)?))?;

            let mut digest_prefix = [0u8; 2];
            digest_prefix.copy_from_slice(r.bytes(2)?);
            let mpis = crate::crypto::mpi::Signature::parse(pk_algo, r)?;
            r.exhausted("v4 signature material")?;
            Ok(Signature4::new(sigtype, pk_algo, hash_algo, hashed_area,
                               unhashed_area, digest_prefix, mpis).into())
        },
        version => Err(Error::MalformedPacket(
            format!("unknown signature packet version {}", version)).into()),
    }
}

/// Parses a subpacket area.
///
/// The reader covers exactly the declared area; the inner subpacket
/// lengths must consume it fully, which the loop enforces: a
/// subpacket reaching beyond the area fails with `Truncated`, and a
/// short final subpacket leaves bytes that fail the next length
/// parse.
fn parse_subpacket_area(r: &mut Reader) -> Result<SubpacketArea> {
    let mut area = SubpacketArea::default();
    while !r.is_empty() {
        area.add(parse_subpacket(r)?);
    }
    Ok(area)
}

fn parse_subpacket(r: &mut Reader) -> Result<Subpacket> {
    let length = parse_subpacket_length(r)?;
    if length.len < 1 {
        return Err(Error::MalformedPacket(
            "zero-length subpacket".into()).into());
    }
    let type_octet = r.u8()?;
    let critical = type_octet & 0x80 != 0;
    let tag = type_octet & 0x7f;
    let body = r.bytes(length.len as usize - 1)?;

    let value = parse_subpacket_value(tag.into(), tag, body)?;
    Ok(Subpacket::with_length(length, critical, value))
}

fn parse_subpacket_value(tag: SubpacketTag, raw_tag: u8, body: &[u8])
                         -> Result<SubpacketValue> {
    let mut r = Reader::new(body);
    let value = match tag {
        SubpacketTag::SignatureCreationTime =>
            SubpacketValue::SignatureCreationTime(r.be_u32()?),
        SubpacketTag::SignatureExpirationTime =>
            SubpacketValue::SignatureExpirationTime(r.be_u32()?),
        SubpacketTag::ExportableCertification =>
            SubpacketValue::ExportableCertification(parse_bool(&mut r)?),
        SubpacketTag::TrustSignature =>
            SubpacketValue::TrustSignature {
                level: r.u8()?,
                trust: r.u8()?,
            },
        SubpacketTag::RegularExpression =>
            SubpacketValue::RegularExpression(r.rest().to_vec()),
        SubpacketTag::Revocable =>
            SubpacketValue::Revocable(parse_bool(&mut r)?),
        SubpacketTag::KeyExpirationTime =>
            SubpacketValue::KeyExpirationTime(r.be_u32()?),
        SubpacketTag::PreferredSymmetricAlgorithms =>
            SubpacketValue::PreferredSymmetricAlgorithms(
                r.rest().iter().map(|&u| SymmetricAlgorithm::from(u))
                    .collect()),
        SubpacketTag::RevocationKey => {
            let class = r.u8()?;
            let pk_algo: PublicKeyAlgorithm = r.u8()?.into();
            SubpacketValue::RevocationKey {
                class,
                pk_algo,
                fingerprint: r.rest().to_vec().into(),
            }
        },
        SubpacketTag::Issuer =>
            SubpacketValue::Issuer(KeyID::from_bytes(r.rest())),
        SubpacketTag::NotationData => {
            let mut flags = [0u8; 4];
            flags.copy_from_slice(r.bytes(4)?);
            let name_len = r.be_u16()? as usize;
            let value_len = r.be_u16()? as usize;
            let name = r.bytes(name_len)?.to_vec();
            let value = r.bytes(value_len)?.to_vec();

            let notation = NotationData::new(flags, name, value);
            // The name must be UTF-8 exactly when the notation says
            // it is human readable; with the flag clear it is
            // arbitrary bytes and is not inspected.
            if notation.human_readable()
                && std::str::from_utf8(notation.name()).is_err()
            {
                return Err(Error::MalformedPacket(
                    "human-readable notation name is not UTF-8".into())
                           .into());
            }
            SubpacketValue::NotationData(notation)
        },
        SubpacketTag::PreferredHashAlgorithms =>
            SubpacketValue::PreferredHashAlgorithms(
                r.rest().iter().map(|&u| HashAlgorithm::from(u)).collect()),
        SubpacketTag::PreferredCompressionAlgorithms =>
            SubpacketValue::PreferredCompressionAlgorithms(
                r.rest().iter().map(|&u| CompressionAlgorithm::from(u))
                    .collect()),
        SubpacketTag::KeyServerPreferences =>
            SubpacketValue::KeyServerPreferences(r.rest().to_vec()),
        SubpacketTag::PreferredKeyServer =>
            SubpacketValue::PreferredKeyServer(r.rest().to_vec()),
        SubpacketTag::PrimaryUserID =>
            SubpacketValue::PrimaryUserID(parse_bool(&mut r)?),
        SubpacketTag::PolicyURI =>
            SubpacketValue::PolicyURI(r.rest().to_vec()),
        SubpacketTag::KeyFlags =>
            SubpacketValue::KeyFlags(r.rest().to_vec()),
        SubpacketTag::SignersUserID =>
            SubpacketValue::SignersUserID(r.rest().to_vec()),
        SubpacketTag::ReasonForRevocation =>
            SubpacketValue::ReasonForRevocation {
                code: ReasonForRevocation::from(r.u8()?),
                reason: r.rest().to_vec(),
            },
        SubpacketTag::Features =>
            SubpacketValue::Features(r.rest().to_vec()),
        SubpacketTag::SignatureTarget =>
            SubpacketValue::SignatureTarget {
                pk_algo: r.u8()?.into(),
                hash_algo: r.u8()?.into(),
                digest: r.rest().to_vec(),
            },
        SubpacketTag::EmbeddedSignature => {
            // The body is a complete signature packet body, without
            // the outer framing.
            let sig = parse_signature(&mut r)?;
            SubpacketValue::EmbeddedSignature(Box::new(sig))
        },
        SubpacketTag::Reserved(_)
            | SubpacketTag::Private(_)
            | SubpacketTag::Unknown(_) =>
            SubpacketValue::Unknown {
                tag: raw_tag,
                body: r.rest().to_vec(),
            },
    };
    r.exhausted("subpacket body")?;
    Ok(value)
}

fn parse_bool(r: &mut Reader) -> Result<bool> {
    Ok(r.u8()? != 0)
}

impl Parse for Packet {
    /// Reads exactly one packet from the given slice.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut pp = PacketParser::from_bytes(data);
        let packet = pp.next().transpose()?
            .ok_or_else(|| Error::Truncated(1))?;
        if pp.bio.data(1)?.is_empty() {
            Ok(packet)
        } else {
            Err(Error::MalformedPacket(
                "trailing data after packet".into()).into())
        }
    }
}

macro_rules! impl_parse_via_packet {
    ($typ:ident) => {
        impl Parse for $typ {
            fn from_bytes(data: &[u8]) -> Result<Self> {
                match Packet::from_bytes(data)? {
                    Packet::$typ(p) => Ok(p),
                    p => Err(Error::InvalidOperation(format!(
                        "expected a {} packet, got a {}",
                        stringify!($typ), p.tag())).into()),
                }
            }
        }
    };
}

impl_parse_via_packet!(Marker);
impl_parse_via_packet!(Literal);
impl_parse_via_packet!(CompressedData);
impl_parse_via_packet!(SED);
impl_parse_via_packet!(SEIP);
impl_parse_via_packet!(MDC);
impl_parse_via_packet!(Trust);
impl_parse_via_packet!(UserID);
impl_parse_via_packet!(UserAttribute);
impl_parse_via_packet!(Signature);

impl Parse for Key {
    /// Reads a key from a public key or public subkey packet.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        match Packet::from_bytes(data)? {
            Packet::PublicKey(k) | Packet::PublicSubkey(k) => Ok(k),
            p => Err(Error::InvalidOperation(format!(
                "expected a key packet, got a {}", p.tag())).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::SerializeInto;

    /// A new-format literal packet: mode `b`, filename "H", date
    /// 0x48010203, body "hi!\n".
    const LITERAL: &[u8] =
        b"\xcb\x0b\x62\x01\x48\x48\x01\x02\x03\x68\x69\x21\x0a";

    #[test]
    fn literal_scenario() {
        let packet = Packet::from_bytes(LITERAL).unwrap();
        match &packet {
            Packet::Literal(l) => {
                assert_eq!(l.format(), DataFormat::Binary);
                assert_eq!(l.filename(), Some(&b"H"[..]));
                assert_eq!(l.date(), 0x48010203);
                assert_eq!(l.body(), b"hi!\n");
            },
            other => panic!("expected a literal packet, got {:?}", other),
        }

        assert_eq!(packet.to_vec().unwrap(), LITERAL);
    }

    #[test]
    fn truncated_key_scenario() {
        // An old-format v4 RSA public key claiming 13 body bytes,
        // with only 10 supplied.
        let blob = b"\x99\x00\x0d\x04\x5a\x64\x9c\x0a\x01\x08\x00\x01\x01";
        let err = Packet::from_bytes(blob).unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::Truncated(_)) => (),
            other => panic!("expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn bounded_read_on_every_prefix() {
        for n in 0..LITERAL.len() {
            let err = Packet::from_bytes(&LITERAL[..n]).unwrap_err();
            match err.downcast_ref::<Error>() {
                Some(Error::Truncated(_)) => (),
                other => panic!("prefix of {} bytes: expected Truncated, \
                                 got {:?}", n, other),
            }
        }
    }

    #[test]
    fn partial_body_lengths_are_reassembled() {
        // A literal packet whose body is split into a 2^1 = 2 octet
        // chunk followed by a definite 9 octet tail.
        let mut blob = vec![0xcb, 0xe1];
        blob.extend_from_slice(b"\x62\x01");
        blob.push(9);
        blob.extend_from_slice(b"\x48\x48\x01\x02\x03\x68\x69\x21\x0a");

        let packet = Packet::from_bytes(&blob).unwrap();
        match &packet {
            Packet::Literal(l) => {
                assert_eq!(l.filename(), Some(&b"H"[..]));
                assert_eq!(l.body(), b"hi!\n");
            },
            other => panic!("expected a literal packet, got {:?}", other),
        }

        // The default serializer emits a definite length.
        assert_eq!(packet.to_vec().unwrap(), LITERAL);
    }

    #[test]
    fn partial_body_length_on_non_streamable_tag() {
        // A signature packet (tag 2) with a partial body length.
        let blob = b"\xc2\xe1\x04\x00";
        assert!(Packet::from_bytes(blob).is_err());
    }

    #[test]
    fn indeterminate_length() {
        // An old-format SED packet with indeterminate length runs to
        // the end of the input.
        let blob = b"\xa7\x01\x02\x03";
        let packet = Packet::from_bytes(blob).unwrap();
        match &packet {
            Packet::SED(sed) => assert_eq!(sed.ciphertext(), b"\x01\x02\x03"),
            other => panic!("expected a SED packet, got {:?}", other),
        }
        // The old form survives re-serialization, with the shortest
        // definite length.
        assert_eq!(packet.to_vec().unwrap(), b"\xa4\x03\x01\x02\x03");
    }

    #[test]
    fn stream_of_packets() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"\xca\x03PGP");
        blob.extend_from_slice(LITERAL);

        let packets = PacketParser::from_bytes(&blob)
            .collect::<Result<Vec<_>>>().unwrap();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].tag(), Tag::Marker);
        assert_eq!(packets[1].tag(), Tag::Literal);
    }

    #[test]
    fn stream_error_is_fatal() {
        let mut blob = Vec::new();
        blob.extend_from_slice(b"\xca\x03PG!"); // Bad marker.
        blob.extend_from_slice(LITERAL);

        let mut pp = PacketParser::from_bytes(&blob);
        assert!(pp.next().unwrap().is_err());
        assert!(pp.next().is_none());
    }

    #[test]
    fn v4_signature_with_subpackets() {
        // A v4 RSA signature with a hashed creation time and an
        // unhashed issuer.
        let mut body = vec![
            4,          // version
            0x00,       // binary signature
            1,          // RSA
            2,          // SHA1
        ];
        body.extend_from_slice(&[0x00, 0x06]); // hashed area length
        body.extend_from_slice(&[5, 2, 0x48, 0x01, 0x02, 0x03]);
        body.extend_from_slice(&[0x00, 0x0a]); // unhashed area length
        body.extend_from_slice(&[9, 16, 1, 2, 3, 4, 5, 6, 7, 8]);
        body.extend_from_slice(&[0xbe, 0xef]); // digest prefix
        body.extend_from_slice(&[0x00, 0x02, 0x03]); // MPI: 3

        let mut blob = vec![0xc2, body.len() as u8];
        blob.extend_from_slice(&body);

        let sig = Signature::from_bytes(&blob).unwrap();
        match &sig {
            Signature::V4(s) => {
                assert_eq!(s.sigtype(), SignatureType::Binary);
                assert_eq!(s.signature_creation_time(), Some(0x48010203));
                assert_eq!(s.issuer(),
                           Some(&KeyID::V4([1, 2, 3, 4, 5, 6, 7, 8])));
                assert_eq!(s.digest_prefix(), &[0xbe, 0xef]);
            },
            other => panic!("expected a v4 signature, got {:?}", other),
        }

        assert_eq!(sig.to_vec().unwrap(), blob);
    }

    #[test]
    fn subpacket_area_length_mismatch() {
        // The subpacket claims 9 octets but the area only has 6.
        let mut body = vec![4, 0x00, 1, 2];
        body.extend_from_slice(&[0x00, 0x06]);
        body.extend_from_slice(&[9, 2, 0x48, 0x01, 0x02, 0x03]);
        body.extend_from_slice(&[0x00, 0x00]);
        body.extend_from_slice(&[0xbe, 0xef]);
        body.extend_from_slice(&[0x00, 0x02, 0x03]);

        let mut blob = vec![0xc2, body.len() as u8];
        blob.extend_from_slice(&body);

        assert!(Signature::from_bytes(&blob).is_err());
    }

    #[test]
    fn embedded_signature_roundtrip() {
        // An embedded v3 signature inside an unhashed subpacket.
        let mut inner = vec![
            3,          // version
            5,          // hashed length
            0x00,       // binary signature
        ];
        inner.extend_from_slice(&[0x48, 0x01, 0x02, 0x03]); // creation time
        inner.extend_from_slice(&[1, 2, 3, 4, 5, 6, 7, 8]); // issuer
        inner.push(1);  // RSA
        inner.push(2);  // SHA1
        inner.extend_from_slice(&[0xbe, 0xef]);
        inner.extend_from_slice(&[0x00, 0x02, 0x03]);

        let mut body = vec![4, 0x00, 1, 2];
        body.extend_from_slice(&[0x00, 0x00]); // hashed area
        let sp_len = 1 + inner.len() as u8;
        body.extend_from_slice(&[0x00, sp_len + 1]); // unhashed area
        body.push(sp_len);
        body.push(32); // embedded signature
        body.extend_from_slice(&inner);
        body.extend_from_slice(&[0xbe, 0xef]);
        body.extend_from_slice(&[0x00, 0x02, 0x03]);

        let mut blob = vec![0xc2, body.len() as u8];
        blob.extend_from_slice(&body);

        let sig = Signature::from_bytes(&blob).unwrap();
        match &sig {
            Signature::V4(s) => {
                let sp = s.unhashed_area()
                    .subpacket(SubpacketTag::EmbeddedSignature).unwrap();
                match sp.value() {
                    SubpacketValue::EmbeddedSignature(inner) => {
                        assert_eq!(inner.version(), 3);
                        assert_eq!(inner.issuer(),
                                   Some(&KeyID::V4([1, 2, 3, 4, 5, 6, 7, 8])));
                    },
                    other => panic!("expected an embedded signature, \
                                     got {:?}", other),
                }
            },
            other => panic!("expected a v4 signature, got {:?}", other),
        }

        assert_eq!(sig.to_vec().unwrap(), blob);
    }

    #[test]
    fn unknown_subpacket_roundtrip() {
        // Subpacket type 77 is unassigned; it must survive, critical
        // bit included.
        let mut body = vec![4, 0x00, 1, 2];
        body.extend_from_slice(&[0x00, 0x05]);
        body.extend_from_slice(&[4, 77 | 0x80, 0xaa, 0xbb, 0xcc]);
        body.extend_from_slice(&[0x00, 0x00]);
        body.extend_from_slice(&[0xbe, 0xef]);
        body.extend_from_slice(&[0x00, 0x02, 0x03]);

        let mut blob = vec![0xc2, body.len() as u8];
        blob.extend_from_slice(&body);

        let sig = Signature::from_bytes(&blob).unwrap();
        match &sig {
            Signature::V4(s) => {
                let sp = s.hashed_area().iter().next().unwrap();
                assert!(sp.critical());
                assert_eq!(sp.tag(), SubpacketTag::Unknown(77));
            },
            other => panic!("expected a v4 signature, got {:?}", other),
        }
        assert_eq!(sig.to_vec().unwrap(), blob);
    }

    #[test]
    fn non_canonical_subpacket_length_roundtrip() {
        // A creation time subpacket framed with a five-octet length.
        let mut body = vec![4, 0x00, 1, 2];
        body.extend_from_slice(&[0x00, 0x0a]);
        body.extend_from_slice(&[255, 0, 0, 0, 5, 2, 0x48, 0x01, 0x02, 0x03]);
        body.extend_from_slice(&[0x00, 0x00]);
        body.extend_from_slice(&[0xbe, 0xef]);
        body.extend_from_slice(&[0x00, 0x02, 0x03]);

        let mut blob = vec![0xc2, body.len() as u8];
        blob.extend_from_slice(&body);

        let sig = Signature::from_bytes(&blob).unwrap();
        assert_eq!(sig.to_vec().unwrap(), blob);
    }

    #[test]
    fn notation_name_utf8_rules() {
        fn notation_sig(flags: u8, name: &[u8]) -> Vec<u8> {
            let mut notation = vec![flags, 0, 0, 0];
            notation.extend_from_slice(
                &(name.len() as u16).to_be_bytes());
            notation.extend_from_slice(&2u16.to_be_bytes());
            notation.extend_from_slice(name);
            notation.extend_from_slice(b"hi");

            let mut body = vec![4, 0x00, 1, 2];
            let sp_len = 1 + notation.len() as u8;
            body.extend_from_slice(&[0x00, sp_len + 1]);
            body.push(sp_len);
            body.push(20);
            body.extend_from_slice(&notation);
            body.extend_from_slice(&[0x00, 0x00]);
            body.extend_from_slice(&[0xbe, 0xef]);
            body.extend_from_slice(&[0x00, 0x02, 0x03]);

            let mut blob = vec![0xc2, body.len() as u8];
            blob.extend_from_slice(&body);
            blob
        }

        // Human readable with a UTF-8 name: fine.
        assert!(Signature::from_bytes(
            &notation_sig(0x80, "zuständig".as_bytes())).is_ok());
        // Human readable with a non-UTF-8 name: rejected.
        assert!(Signature::from_bytes(
            &notation_sig(0x80, b"\xff\xfe")).is_err());
        // Not human readable: anything goes, and it round-trips.
        let blob = notation_sig(0x00, b"\xff\xfe");
        let sig = Signature::from_bytes(&blob).unwrap();
        assert_eq!(sig.to_vec().unwrap(), blob);
    }
}
