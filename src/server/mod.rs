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

//! The processing logic of an authoritative DNS server.
//!
//! The [`Server`] structure is the heart of this module; see its
//! documentation for details.

use std::net::IpAddr;

use log::debug;

use crate::class::Class;
use crate::message::{writer, Header, Opcode, Question, Rcode, Reader, Writer};
use crate::zone::{self, Zone};

////////////////////////////////////////////////////////////////////////
// SERVER PUBLIC API AND CORE MESSAGE-HANDLING LOGIC                  //
////////////////////////////////////////////////////////////////////////

/// An authoritative DNS server, abstracted from any underlying network
/// I/O provider.
///
/// The `Server` implements the message-processing logic of an
/// authoritative DNS server. It receives, parses, and responds to DNS
/// messages through the [`Server::handle_message`] method. An
/// underlying network I/O provider (see [`io`](crate::io)) is
/// responsible for receiving these messages from the network and
/// sending the responses that the `Server` produces.
///
/// Responses are produced from the `Server`'s list of [`Zone`]s. The
/// zone whose context is the longest match for the queried name is
/// consulted; query outcomes map onto response codes as follows:
///
/// * records found — NOERROR, with the records in the answer section;
/// * the name exists without records of the queried type — NOERROR
///   with an empty answer section;
/// * the name is proven absent — NXDOMAIN;
/// * no zone is authoritative — NXDOMAIN if the client asked for
///   recursion, REFUSED otherwise; and
/// * a backend failure — SERVFAIL.
///
/// Zones are fixed once the `Server` is constructed, so handling may
/// run on any number of threads concurrently.
pub struct Server {
    zones: Vec<Zone>,
}

impl Server {
    /// Creates a new `Server` that will serve the provided zones.
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Handles a received DNS message. This is the API through which
    /// I/O providers submit messages.
    ///
    /// `received_buf` contains the message received, and
    /// `received_info` provides additional information about it.
    /// `response_buf` is the buffer into which a response message may
    /// be serialized; the response is additionally limited to 512
    /// octets on UDP transport. If the buffer is not long enough to
    /// hold a DNS message header, this method will panic.
    ///
    /// A [`Response`] is returned, signifying whether a response is to
    /// be sent and, if so, how long the response message written into
    /// `response_buf` is.
    pub fn handle_message(
        &self,
        received_buf: &[u8],
        received_info: ReceivedInfo,
        response_buf: &mut [u8],
    ) -> Response {
        // Ignore messages that do not contain a full DNS header, and
        // messages that are themselves responses.
        let mut received = match Reader::try_from(received_buf) {
            Ok(r) => r,
            Err(_) => return Response::None,
        };
        let request_header = received.header();
        if request_header.qr {
            return Response::None;
        }

        // Start the response by copying information from the received
        // message and setting the QR bit.
        let response_size_limit = match received_info.transport {
            Transport::Tcp => u16::MAX as usize,
            Transport::Udp => 512,
        };
        let mut response = Writer::new(response_buf, response_size_limit)
            .expect("failed to start response (buffer too short)");
        response.set_id(request_header.id);
        response.set_qr(true);
        response.set_opcode(request_header.opcode);
        if request_header.opcode == Opcode::QUERY {
            // RD is only defined for opcode QUERY, so we don't copy it
            // otherwise.
            response.set_rd(request_header.rd);
        }
        response.set_ra(true);
        response.set_ad(false);

        // Read the question, if any, and echo it into the response.
        // Most current implementations ignore messages with
        // QDCOUNT > 1, so we do the same. A failed question read
        // produces a best-effort FORMERR response carrying the header
        // written so far.
        let question = match request_header.qdcount {
            0 => None,
            1 => match received.read_question() {
                Ok(question) => {
                    if response.add_question(&question).is_err() {
                        response.set_rcode(Rcode::ServFail);
                        return Response::Single(response.finish());
                    }
                    Some(question)
                }
                Err(e) => {
                    debug!("malformed question from {}: {}", received_info.source, e);
                    response.set_rcode(Rcode::FormErr);
                    return Response::Single(response.finish());
                }
            },
            _ => return Response::None,
        };

        match request_header.opcode {
            Opcode::QUERY => {
                self.handle_query(question, &request_header, received_info, &mut response)
            }
            _ => response.set_rcode(Rcode::NotImp),
        }
        Response::Single(response.finish())
    }

    /// Handles a DNS message with opcode QUERY once its question has
    /// been read and echoed into the response.
    fn handle_query(
        &self,
        question: Option<Question>,
        request_header: &Header,
        received_info: ReceivedInfo,
        response: &mut Writer,
    ) {
        // If there is no question, then that's a FORMERR.
        let question = match question {
            Some(q) => q,
            None => {
                response.set_rcode(Rcode::FormErr);
                return;
            }
        };

        // Zone-transfer and other multi-type QTYPEs, as well as the
        // non-data QCLASSes, are not implemented.
        if question.qtype.is_question_only()
            || matches!(question.qclass, Class::ANY | Class::NONE)
        {
            response.set_rcode(Rcode::NotImp);
            return;
        }

        // Find the zone whose context is the longest match for the
        // QNAME.
        let zone = self
            .zones
            .iter()
            .filter(|zone| question.qname.labels_below(zone.context()).is_ok())
            .max_by_key(|zone| zone.context().label_count());
        let zone = match zone {
            Some(zone) => zone,
            None => {
                // Not authoritative for the name at all. A client that
                // asked for recursion learns the name cannot be
                // resolved here; anyone else is refused.
                response.set_rcode(if request_header.rd {
                    Rcode::NxDomain
                } else {
                    Rcode::Refused
                });
                return;
            }
        };

        match zone.query(&question.qname, question.qtype, question.qclass) {
            Ok(Some(records)) => {
                response.set_aa(true);
                for record in records {
                    match response.add_answer(record) {
                        Ok(()) => (),
                        Err(writer::Error::Truncation) => {
                            handle_truncation(received_info, response);
                            return;
                        }
                        Err(_) => {
                            response.set_aa(false);
                            response.set_rcode(Rcode::ServFail);
                            response.clear_rrs();
                            return;
                        }
                    }
                }
            }
            Ok(None) => {
                // The name exists (or lies outside our data) but holds
                // no records of the queried type.
                response.set_aa(true);
            }
            Err(zone::Error::NoDomain) => {
                response.set_aa(true);
                response.set_rcode(Rcode::NxDomain);
            }
            Err(e) => {
                debug!("query for {} failed: {}", question.qname, e);
                response.set_rcode(Rcode::ServFail);
            }
        }
    }
}

/// Recovers from a response that did not fit the size limit: the
/// records written so far are stripped, and on UDP the TC bit tells
/// the client to retry over TCP. There is no bigger transport to point
/// a TCP client at, so TCP gets SERVFAIL.
fn handle_truncation(received_info: ReceivedInfo, response: &mut Writer) {
    response.clear_rrs();
    if received_info.transport == Transport::Tcp {
        response.set_aa(false);
        response.set_rcode(Rcode::ServFail);
    } else {
        response.set_tc(true);
    }
}

/// Provides network-related information about a received DNS message
/// to [`Server::handle_message`].
#[derive(Clone, Copy, Debug)]
pub struct ReceivedInfo {
    pub source: IpAddr,
    pub transport: Transport,
}

impl ReceivedInfo {
    /// Creates a new `ReceivedInfo`.
    pub fn new(source: IpAddr, transport: Transport) -> Self {
        Self { source, transport }
    }
}

/// Indicates the transport through which a DNS message was received.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Transport {
    Tcp,
    Udp,
}

/// Indicates to the caller of [`Server::handle_message`] what kind of
/// response needs to be sent.
pub enum Response {
    /// A single response is to be sent. The response has been written
    /// into the provided buffer. The length of the response is
    /// included.
    Single(usize),

    /// No response is to be sent.
    None,
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
