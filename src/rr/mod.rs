// Copyright 2025 the arbor developers.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you
// may not use this file except in compliance with the License. You may
// obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or
// implied. See the License for the specific language governing
// permissions and limitations under the License.

//! Data structures and routines for handling DNS resource records.

use std::fmt;

mod rdata;
mod rr_type;
mod ttl;
pub use rdata::Rdata;
pub use rr_type::{Type, UnknownTypeError};
pub use ttl::Ttl;

use crate::buf::{self, WireReader, WireWriter};
use crate::class::{Class, UnknownClassError};
use crate::name::{self, Name};

////////////////////////////////////////////////////////////////////////
// RESOURCE RECORDS                                                   //
////////////////////////////////////////////////////////////////////////

/// A DNS resource record, per [RFC 1035 § 3.2.1].
///
/// The RR type is carried by the [`Rdata`] payload; see
/// [`Record::rr_type`].
///
/// [RFC 1035 § 3.2.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-3.2.1
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub owner: Name,
    pub class: Class,
    pub ttl: Ttl,
    pub rdata: Rdata,
}

impl Record {
    /// Returns the RR type of this record.
    pub fn rr_type(&self) -> Type {
        self.rdata.rr_type()
    }

    /// Reads a resource record at index `cursor` of `message`. The
    /// entire message is passed so that compressed domain names (in
    /// the owner field and in the RDATA) can be followed. On success,
    /// returns the record and the number of contiguous octets read at
    /// `cursor`.
    pub fn decode(message: &[u8], cursor: usize) -> Result<(Self, usize), Error> {
        let (owner, owner_len) = Name::try_from_compressed(message, cursor)?;
        let mut reader = WireReader::new(message);
        reader.skip(cursor + owner_len)?;
        let rr_type = Type::try_from(reader.take_u16()?)?;
        let class = Class::try_from(reader.take_u16()?)?;
        let ttl = Ttl::from(reader.take_u32()?);
        let rdlength = reader.take_u16()?;
        let rdata = Rdata::decode(rr_type, message, reader.position(), rdlength)?;
        let consumed = owner_len + 10 + rdlength as usize;
        Ok((
            Self {
                owner,
                class,
                ttl,
                rdata,
            },
            consumed,
        ))
    }

    /// Writes the record to `out`. The RDLENGTH field is reserved
    /// first and backfilled once the payload length is known.
    pub fn encode(&self, out: &mut WireWriter) -> Result<(), buf::Error> {
        self.owner.encode(out)?;
        out.write_u16(self.rr_type().into())?;
        out.write_u16(self.class.into())?;
        out.write_u32(self.ttl.into())?;
        let rdlength_at = out.reserve(2)?;
        let payload_start = out.position();
        self.rdata.encode(out)?;
        let rdlength = out.position() - payload_start;
        out.patch_u16(rdlength_at, rdlength as u16);
        Ok(())
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner,
            self.ttl,
            self.class,
            self.rr_type(),
            self.rdata
        )
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a resource record could not be read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A RDATA length was inconsistent with its type (A records carry
    /// exactly four octets).
    InvalidARecord,

    /// A RDATA length was inconsistent with its type (AAAA records
    /// carry exactly sixteen octets).
    InvalidAAAARecord,

    /// The record's class is not a known DNS class.
    InvalidClass(u16),

    /// MX RDATA was too short or its exchanger did not fill the RDATA.
    InvalidMXRecord,

    /// An embedded domain name was invalid.
    InvalidName(name::Error),

    /// The record's type is not a known DNS RR type.
    InvalidType(u16),

    /// The RDLENGTH field did not match the actual payload layout.
    RdlengthMismatch,

    /// The message ended in the middle of the record.
    UnexpectedEom,
}

impl From<name::Error> for Error {
    fn from(err: name::Error) -> Self {
        Self::InvalidName(err)
    }
}

impl From<UnknownTypeError> for Error {
    fn from(err: UnknownTypeError) -> Self {
        Self::InvalidType(err.0)
    }
}

impl From<UnknownClassError> for Error {
    fn from(err: UnknownClassError) -> Self {
        Self::InvalidClass(err.0)
    }
}

impl From<buf::Error> for Error {
    fn from(_: buf::Error) -> Self {
        Self::UnexpectedEom
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidARecord => f.write_str("A RDATA is not 4 octets long"),
            Self::InvalidAAAARecord => f.write_str("AAAA RDATA is not 16 octets long"),
            Self::InvalidClass(value) => write!(f, "unknown class value {}", value),
            Self::InvalidMXRecord => f.write_str("malformed MX RDATA"),
            Self::InvalidName(err) => write!(f, "invalid embedded domain name: {}", err),
            Self::InvalidType(value) => write!(f, "unknown type value {}", value),
            Self::RdlengthMismatch => f.write_str("RDLENGTH does not match the RDATA layout"),
            Self::UnexpectedEom => f.write_str("unexpected end of message in record"),
        }
    }
}

impl std::error::Error for Error {}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_to_vec(record: &Record) -> Vec<u8> {
        let mut buf = [0; 512];
        let mut out = WireWriter::new(&mut buf, 512);
        record.encode(&mut out).unwrap();
        out.written().to_vec()
    }

    fn sample_records() -> Vec<Record> {
        let owner: Name = "host.example.test.".parse().unwrap();
        let ttl = Ttl::from(300);
        [
            Rdata::A([192, 0, 2, 1]),
            Rdata::aaaa("2001:db8::1".parse().unwrap()),
            Rdata::Cname("alias.example.test.".parse().unwrap()),
            Rdata::Mx {
                preference: 10,
                exchanger: "mail.example.test.".parse().unwrap(),
            },
            Rdata::Ns("ns1.example.test.".parse().unwrap()),
            Rdata::Ptr("ptr.example.test.".parse().unwrap()),
            Rdata::Txt(b"\x05hello"[..].into()),
            Rdata::Unknown {
                rr_type: Type::NULL,
                octets: b"\xde\xad\xbe\xef"[..].into(),
            },
        ]
        .into_iter()
        .map(|rdata| Record {
            owner: owner.clone(),
            class: Class::IN,
            ttl,
            rdata,
        })
        .collect()
    }

    #[test]
    fn records_round_trip_through_the_wire() {
        for record in sample_records() {
            let encoded = encode_to_vec(&record);
            let (reparsed, consumed) = Record::decode(&encoded, 0).unwrap();
            assert_eq!(reparsed, record);
            assert_eq!(consumed, encoded.len());
        }
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let mut encoded = encode_to_vec(&sample_records()[0]);
        // The type field follows the 19-octet owner name.
        encoded[19] = 0xff;
        encoded[20] = 0x00;
        assert_eq!(
            Record::decode(&encoded, 0),
            Err(Error::InvalidType(0xff00)),
        );
    }

    #[test]
    fn decode_rejects_unknown_class() {
        let mut encoded = encode_to_vec(&sample_records()[0]);
        encoded[21] = 0x00;
        encoded[22] = 0x02;
        assert_eq!(Record::decode(&encoded, 0), Err(Error::InvalidClass(2)));
    }

    #[test]
    fn decode_rejects_truncated_record() {
        let encoded = encode_to_vec(&sample_records()[0]);
        assert_eq!(
            Record::decode(&encoded[..encoded.len() - 1], 0),
            Err(Error::UnexpectedEom),
        );
    }

    #[test]
    fn ttl_is_clamped_on_decode() {
        let mut encoded = encode_to_vec(&sample_records()[0]);
        // Set the TTL's most significant bit; RFC 2181 § 8 requires
        // such values to be treated as zero.
        encoded[23] = 0x80;
        let (record, _) = Record::decode(&encoded, 0).unwrap();
        assert_eq!(record.ttl, Ttl::from(0));
    }
}
