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

//! Implementation of the [`Reader`] type to read on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::HEADER_SIZE;
use super::{Header, Question};
use crate::class::Class;
use crate::name::{self, Name};
use crate::rr::{self, Record, Type};

////////////////////////////////////////////////////////////////////////
// READER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer containing a DNS message that enables
/// reading the message data.
///
/// A `Reader` is constructed using its [`TryFrom`] implementation. Any
/// underlying buffer for a reader must contain at least a full DNS
/// message header of 12 octets; otherwise the construction will fail.
///
/// Since the header is in a fixed position, it can be read at any time
/// through [`Reader::header`]. Questions and resource records are read
/// using a cursor, which is initially set to the first octet after the
/// header; [`Reader::read_question`], [`Reader::read_record`], and
/// [`Reader::skip_record`] must be called sequentially to consume the
/// sections in the order they appear in the message.
#[derive(Clone, Eq, PartialEq)]
pub struct Reader<'a> {
    octets: &'a [u8],
    cursor: usize,
}

impl<'a> Reader<'a> {
    /// Decodes the message header.
    pub fn header(&self) -> Header {
        Header::decode(self.octets)
    }

    /// Returns the current cursor position within the message.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Returns the raw octets of the message.
    pub fn octets(&self) -> &'a [u8] {
        self.octets
    }

    /// Reads a [`Question`] starting at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_question(&mut self) -> Result<Question> {
        let (qname, qname_len) = Name::try_from_compressed(self.octets, self.cursor)?;
        let fields_end = self.cursor + qname_len + 4;
        if fields_end > self.octets.len() {
            return Err(Error::Record(rr::Error::UnexpectedEom));
        }
        let qname_end = self.cursor + qname_len;
        let qtype = read_u16(self.octets, qname_end);
        let qclass = read_u16(self.octets, qname_end + 2);
        let qtype = Type::try_from(qtype).map_err(rr::Error::from)?;
        let qclass = Class::try_from(qclass).map_err(rr::Error::from)?;
        self.cursor = fields_end;
        Ok(Question {
            qname,
            qtype,
            qclass,
        })
    }

    /// Reads a resource record starting at the current cursor.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn read_record(&mut self) -> Result<Record> {
        let (record, consumed) = Record::decode(self.octets, self.cursor)?;
        self.cursor += consumed;
        Ok(record)
    }

    /// Skips a resource record starting at the current cursor,
    /// validating only its framing (owner name structure and the
    /// RDLENGTH field). This tolerates records — such as EDNS OPT
    /// pseudo-records — whose type or class the typed decoder would
    /// reject.
    ///
    /// This method is atomic, in that the cursor is not changed on
    /// failure.
    pub fn skip_record(&mut self) -> Result<()> {
        let owner_len = Name::skip_compressed(self.octets, self.cursor)?;
        let fixed_end = self.cursor + owner_len + 10;
        if fixed_end > self.octets.len() {
            return Err(Error::Record(rr::Error::UnexpectedEom));
        }
        let rdlength = read_u16(self.octets, self.cursor + owner_len + 8) as usize;
        if fixed_end + rdlength > self.octets.len() {
            return Err(Error::Record(rr::Error::UnexpectedEom));
        }
        self.cursor = fixed_end + rdlength;
        Ok(())
    }

    /// Returns whether the `Reader`'s cursor has reached the end of the
    /// message.
    pub fn at_eom(&self) -> bool {
        self.cursor >= self.octets.len()
    }
}

impl<'a> TryFrom<&'a [u8]> for Reader<'a> {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self> {
        if octets.len() >= HEADER_SIZE {
            Ok(Self {
                octets,
                cursor: HEADER_SIZE,
            })
        } else {
            Err(Error::HeaderTooShort)
        }
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Reader")
            .field("header", &self.header())
            .field("cursor", &self.cursor)
            .finish()
    }
}

/// Reads a network-byte-order `u16` at `start`. The caller must have
/// checked the bounds.
fn read_u16(octets: &[u8], start: usize) -> u16 {
    u16::from_be_bytes(octets[start..start + 2].try_into().unwrap())
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a message, [`Question`], or resource record
/// could not be read.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The buffer is too short to contain a DNS message header.
    HeaderTooShort,

    /// A domain name could not be read.
    Name(name::Error),

    /// A resource record (or question field) could not be read.
    Record(rr::Error),
}

impl From<name::Error> for Error {
    fn from(err: name::Error) -> Self {
        Self::Name(err)
    }
}

impl From<rr::Error> for Error {
    fn from(err: rr::Error) -> Self {
        Self::Record(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::HeaderTooShort => f.write_str("header too short"),
            Self::Name(err) => write!(f, "invalid domain name: {}", err),
            Self::Record(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Reader`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Opcode;
    use crate::rr::{Rdata, Ttl};

    /// A captured query for duckduckgo.com. IN A with an EDNS OPT
    /// record in the additional section.
    const DUCKDUCKGO_QUERY: &[u8] =
        b"\x3e\x3c\x01\x20\x00\x01\x00\x00\x00\x00\x00\x01\x0a\x64\x75\x63\
          \x6b\x64\x75\x63\x6b\x67\x6f\x03\x63\x6f\x6d\x00\x00\x01\x00\x01\
          \x00\x00\x29\x10\x00\x00\x00\x00\x00\x00\x00";

    #[test]
    fn reader_parses_a_real_query() {
        let mut reader = Reader::try_from(DUCKDUCKGO_QUERY).unwrap();

        let header = reader.header();
        assert_eq!(header.id, 0x3e3c);
        assert!(!header.qr);
        assert_eq!(header.opcode, Opcode::QUERY);
        assert!(header.rd);
        assert!(header.ad);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.ancount, 0);
        assert_eq!(header.nscount, 0);
        assert_eq!(header.arcount, 1);

        let question = reader.read_question().unwrap();
        assert_eq!(question.qname.to_string(), "duckduckgo.com.");
        assert_eq!(question.qname.label_count(), 2);
        assert_eq!(question.qtype, Type::A);
        assert_eq!(question.qclass, Class::IN);

        // The OPT record's class field carries a UDP payload size, so
        // it can only be skipped, not decoded.
        reader.skip_record().unwrap();
        assert!(reader.at_eom());
    }

    #[test]
    fn reader_reads_answer_records() {
        // A response with one compressed answer.
        let message = b"\x11\x11\x85\x80\x00\x01\x00\x01\x00\x00\x00\x00\
                        \x06google\x03com\x00\x00\x01\x00\x01\
                        \xc0\x0c\x00\x01\x00\x01\x00\x00\x01\x2c\x00\x04\x01\x02\x03\x04";
        let mut reader = Reader::try_from(&message[..]).unwrap();
        let question = reader.read_question().unwrap();
        assert_eq!(question.qname.to_string(), "google.com.");
        let record = reader.read_record().unwrap();
        assert_eq!(record.owner, question.qname);
        assert_eq!(record.class, Class::IN);
        assert_eq!(record.ttl, Ttl::from(300));
        assert_eq!(record.rdata, Rdata::A([1, 2, 3, 4]));
        assert!(reader.at_eom());
    }

    #[test]
    fn reader_constructor_rejects_short_message() {
        for size in 0..HEADER_SIZE {
            let buf = vec![0; size];
            assert_eq!(Reader::try_from(buf.as_slice()), Err(Error::HeaderTooShort));
        }
    }

    #[test]
    fn read_question_is_atomic_on_failure() {
        // The question's class field is missing.
        let message = b"\x00\x00\x00\x00\x00\x01\x00\x00\x00\x00\x00\x00\x01a\x00\x00\x01";
        let mut reader = Reader::try_from(&message[..]).unwrap();
        let before = reader.position();
        assert!(reader.read_question().is_err());
        assert_eq!(reader.position(), before);
    }
}
