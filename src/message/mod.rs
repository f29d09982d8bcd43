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

//! Implementation of reading and writing of DNS messages.

mod constants;
mod header;
mod opcode;
mod question;
mod rcode;
pub mod reader;
pub mod writer;
pub use header::Header;
pub use opcode::{IntoOpcodeError, Opcode};
pub use question::Question;
pub use rcode::{IntoRcodeError, Rcode};
pub use reader::Reader;
pub use writer::Writer;

use crate::buf::WireWriter;
use crate::class::Class;
use crate::name::Name;
use crate::rr::{Record, Type};

////////////////////////////////////////////////////////////////////////
// MESSAGES                                                           //
////////////////////////////////////////////////////////////////////////

/// An owned DNS message.
///
/// The questions and answers are fully decoded. The authority and
/// additional sections are validated for framing only and kept as a
/// raw pass-through [`Message::tail`]; this tolerates records the
/// typed decoder has no business interpreting (notably EDNS OPT
/// pseudo-records) while still consuming exactly the number of octets
/// the header's counts call for.
///
/// For streaming access without building an owned value, use
/// [`Reader`] and [`Writer`] directly.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,

    /// The raw octets of the authority and additional sections. These
    /// are re-emitted verbatim by [`Message::encode`], so they must
    /// not contain compression pointers into sections that encoding
    /// lays out differently than the decoded message did. Messages
    /// built by this crate always write names uncompressed, so their
    /// tails round-trip exactly.
    pub tail: Vec<u8>,
}

impl Message {
    /// Builds a query message with the given transaction id and
    /// question.
    pub fn query(id: u16, qname: Name, qtype: Type, qclass: Class) -> Self {
        let mut header = Header::query(id);
        header.qdcount = 1;
        Self {
            header,
            questions: vec![Question {
                qname,
                qtype,
                qclass,
            }],
            answers: Vec::new(),
            tail: Vec::new(),
        }
    }

    /// Builds an (initially empty) response to `request`, echoing its
    /// question.
    pub fn response(request: &Message) -> Self {
        let mut header = Header::response(&request.header);
        header.qdcount = request.questions.len() as u16;
        Self {
            header,
            questions: request.questions.clone(),
            answers: Vec::new(),
            tail: Vec::new(),
        }
    }

    /// Decodes a message from `octets`.
    ///
    /// The questions and answers given by the header counts are fully
    /// decoded; the authority and additional sections are skipped
    /// record by record (using each record's RDLENGTH) and captured
    /// raw, leaving the cursor exactly at the end of the frame. Octets
    /// past the frame are ignored.
    pub fn decode(octets: &[u8]) -> Result<Self, reader::Error> {
        let mut reader = Reader::try_from(octets)?;
        let header = reader.header();
        let questions = (0..header.qdcount)
            .map(|_| reader.read_question())
            .collect::<Result<_, _>>()?;
        let answers = (0..header.ancount)
            .map(|_| reader.read_record())
            .collect::<Result<_, _>>()?;
        let tail_start = reader.position();
        for _ in 0..header.nscount as usize + header.arcount as usize {
            reader.skip_record()?;
        }
        let tail = octets[tail_start..reader.position()].to_vec();
        Ok(Self {
            header,
            questions,
            answers,
            tail,
        })
    }

    /// Encodes the message into `buf`, returning the number of octets
    /// written.
    ///
    /// The QDCOUNT and ANCOUNT fields are taken from the list lengths;
    /// NSCOUNT and ARCOUNT are taken from the header, since their
    /// records live in [`Message::tail`]. If the encoded message would
    /// not fit in `buf`, this fails with [`writer::Error::Truncation`]
    /// without reporting a partial frame.
    pub fn encode(&self, buf: &mut [u8]) -> Result<usize, writer::Error> {
        let mut header = self.header;
        header.qdcount = self.questions.len() as u16;
        header.ancount = self.answers.len() as u16;

        let limit = buf.len();
        let mut wire = WireWriter::new(buf, limit);
        wire.write(&header.encode())?;
        for question in &self.questions {
            question.encode(&mut wire)?;
        }
        for answer in &self.answers {
            answer.encode(&mut wire)?;
        }
        wire.write(&self.tail)?;
        Ok(wire.position())
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rr::{Rdata, Ttl};

    fn encode_to_vec(message: &Message) -> Vec<u8> {
        let mut buf = vec![0; 4096];
        let len = message.encode(&mut buf).unwrap();
        buf.truncate(len);
        buf
    }

    fn sample_response() -> Message {
        let qname: Name = "host.example.test.".parse().unwrap();
        let request = Message::query(0x2b2b, qname.clone(), Type::A, Class::IN);
        let mut response = Message::response(&request);
        response.header.aa = true;
        response.header.ancount = 2;
        response.answers = vec![
            Record {
                owner: qname.clone(),
                class: Class::IN,
                ttl: Ttl::from(300),
                rdata: Rdata::A([192, 0, 2, 1]),
            },
            Record {
                owner: qname,
                class: Class::IN,
                ttl: Ttl::from(300),
                rdata: Rdata::Mx {
                    preference: 10,
                    exchanger: "mail.example.test.".parse().unwrap(),
                },
            },
        ];
        response
    }

    #[test]
    fn queries_round_trip() {
        let query = Message::query(
            0x3e3c,
            "duckduckgo.com.".parse().unwrap(),
            Type::A,
            Class::IN,
        );
        let encoded = encode_to_vec(&query);
        assert_eq!(Message::decode(&encoded).unwrap(), query);
    }

    #[test]
    fn responses_round_trip() {
        let response = sample_response();
        let encoded = encode_to_vec(&response);
        assert_eq!(Message::decode(&encoded).unwrap(), response);
    }

    #[test]
    fn reencoding_a_query_is_byte_identical() {
        let query = Message::query(
            0x0102,
            "www.example.com.".parse().unwrap(),
            Type::AAAA,
            Class::IN,
        );
        let encoded = encode_to_vec(&query);
        let reencoded = encode_to_vec(&Message::decode(&encoded).unwrap());
        assert_eq!(encoded, reencoded);
    }

    #[test]
    fn additional_section_passes_through() {
        // A query with an EDNS OPT record in the additional section.
        // The OPT record (root owner, type 41, class 4096) can't be
        // decoded as a typed record, but must survive the round trip.
        let mut encoded = encode_to_vec(&Message::query(
            0x3e3c,
            "duckduckgo.com.".parse().unwrap(),
            Type::A,
            Class::IN,
        ));
        encoded[11] = 1; // ARCOUNT
        encoded.extend_from_slice(b"\x00\x00\x29\x10\x00\x00\x00\x00\x00\x00\x00");

        let message = Message::decode(&encoded).unwrap();
        assert_eq!(message.header.arcount, 1);
        assert_eq!(message.tail.len(), 11);
        assert_eq!(encode_to_vec(&message), encoded);
    }

    #[test]
    fn decode_rejects_truncated_sections() {
        let encoded = encode_to_vec(&sample_response());
        assert!(Message::decode(&encoded[..encoded.len() - 3]).is_err());
    }

    #[test]
    fn encode_reports_truncation_for_small_buffers() {
        let response = sample_response();
        let mut buf = vec![0; 40];
        assert_eq!(response.encode(&mut buf), Err(writer::Error::Truncation));
    }
}
