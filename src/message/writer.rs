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

//! Implementation of the [`Writer`] type to write on-the-wire DNS
//! messages.

use std::fmt;

use super::constants::*;
use super::{Opcode, Question, Rcode};
use crate::buf::{self, WireWriter};
use crate::rr::Record;

////////////////////////////////////////////////////////////////////////
// WRITER                                                             //
////////////////////////////////////////////////////////////////////////

/// A "frame" around a buffer that serializes a DNS message into it.
///
/// A `Writer` is constructed with [`Writer::new`], which takes the
/// message size limit to enforce (for example 512 octets for a UDP
/// response). The underlying buffer and the limit must be long enough
/// to accommodate a full DNS message header of 12 octets. The message
/// header is initially zeroed.
///
/// Since the header is in a fixed position, its fields can be written
/// at any time through the appropriate `Writer` methods. Questions and
/// resource records are written sequentially based on a cursor, so
/// [`Writer::add_question`], [`Writer::add_answer`],
/// [`Writer::add_authority`], and [`Writer::add_additional`] must be
/// used in the proper section order; attempts to use them out of order
/// fail with [`Error::OutOfOrder`].
///
/// All names are written uncompressed. A record that does not fit
/// within the size limit fails with [`Error::Truncation`] and leaves
/// the message exactly as it was, so the caller may strip answers and
/// set the TC bit instead.
pub struct Writer<'a> {
    wire: WireWriter<'a>,
    section: Section,
    rr_start: usize,
    qdcount: u16,
    ancount: u16,
    nscount: u16,
    arcount: u16,
}

/// A type for recording which section of a DNS message a [`Writer`] is
/// currently serializing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Section {
    Question,
    Answer,
    Authority,
    Additional,
}

impl<'a> Writer<'a> {
    /// Creates a new `Writer` over `octets`. The message size is
    /// limited to `limit` or `octets.len()`, whichever is smaller. If
    /// the smaller limit is too small to hold a full DNS message
    /// header, this fails.
    pub fn new(octets: &'a mut [u8], limit: usize) -> Result<Self> {
        let mut wire = WireWriter::new(octets, limit);
        wire.reserve(HEADER_SIZE).or(Err(Error::Truncation))?;
        Ok(Self {
            wire,
            section: Section::Question,
            rr_start: HEADER_SIZE,
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        })
    }

    /// Returns the current 16-bit ID of the message.
    pub fn id(&self) -> u16 {
        u16::from_be_bytes(self.wire.written()[ID_START..ID_START + 2].try_into().unwrap())
    }

    /// Sets the 16-bit ID of the message.
    pub fn set_id(&mut self, id: u16) {
        self.wire.written_mut()[ID_START..ID_START + 2].copy_from_slice(&id.to_be_bytes());
    }

    /// Sets or clears the QR (query response) bit.
    pub fn set_qr(&mut self, qr: bool) {
        self.set_flag(QR_BYTE, QR_MASK, qr);
    }

    /// Sets the message's opcode.
    pub fn set_opcode(&mut self, opcode: Opcode) {
        let header = self.wire.written_mut();
        header[OPCODE_BYTE] &= !OPCODE_MASK;
        header[OPCODE_BYTE] |= u8::from(opcode) << OPCODE_SHIFT;
    }

    /// Sets or clears the AA (authoritative answer) bit.
    pub fn set_aa(&mut self, aa: bool) {
        self.set_flag(AA_BYTE, AA_MASK, aa);
    }

    /// Returns the current value of the TC (truncation) bit.
    pub fn tc(&self) -> bool {
        self.wire.written()[TC_BYTE] & TC_MASK != 0
    }

    /// Sets or clears the TC (truncation) bit.
    pub fn set_tc(&mut self, tc: bool) {
        self.set_flag(TC_BYTE, TC_MASK, tc);
    }

    /// Sets or clears the RD (recursion desired) bit.
    pub fn set_rd(&mut self, rd: bool) {
        self.set_flag(RD_BYTE, RD_MASK, rd);
    }

    /// Sets or clears the RA (recursion available) bit.
    pub fn set_ra(&mut self, ra: bool) {
        self.set_flag(RA_BYTE, RA_MASK, ra);
    }

    /// Sets or clears the AD (authentic data) bit.
    pub fn set_ad(&mut self, ad: bool) {
        self.set_flag(AD_BYTE, AD_MASK, ad);
    }

    /// Returns the message's current RCODE.
    pub fn rcode(&self) -> Rcode {
        Rcode::try_from(self.wire.written()[RCODE_BYTE] & RCODE_MASK).unwrap()
    }

    /// Sets the message's RCODE.
    pub fn set_rcode(&mut self, rcode: Rcode) {
        let header = self.wire.written_mut();
        header[RCODE_BYTE] &= !RCODE_MASK;
        header[RCODE_BYTE] |= u8::from(rcode);
    }

    fn set_flag(&mut self, byte: usize, mask: u8, on: bool) {
        let header = self.wire.written_mut();
        if on {
            header[byte] |= mask;
        } else {
            header[byte] &= !mask;
        }
    }

    /// Adds a question to the message. This must be used before any
    /// resource records are added.
    pub fn add_question(&mut self, question: &Question) -> Result<()> {
        if self.section != Section::Question {
            return Err(Error::OutOfOrder);
        }
        let new_qdcount = self.qdcount.checked_add(1).ok_or(Error::CountOverflow)?;
        self.with_rollback(|wire| question.encode(wire))?;
        self.qdcount = new_qdcount;
        self.rr_start = self.wire.position();
        Ok(())
    }

    /// Adds a resource record to the answer section of the message.
    /// This must be used after any questions are added and before RRs
    /// are added to any other section.
    pub fn add_answer(&mut self, record: &Record) -> Result<()> {
        match self.section {
            Section::Question | Section::Answer => (),
            _ => return Err(Error::OutOfOrder),
        }
        let new_ancount = self.ancount.checked_add(1).ok_or(Error::CountOverflow)?;
        self.with_rollback(|wire| record.encode(wire))?;
        self.section = Section::Answer;
        self.ancount = new_ancount;
        Ok(())
    }

    /// Adds a resource record to the authority section of the message.
    /// This must be used after any questions and answer RRs are added
    /// and before any additional RRs are added.
    pub fn add_authority(&mut self, record: &Record) -> Result<()> {
        match self.section {
            Section::Question | Section::Answer | Section::Authority => (),
            _ => return Err(Error::OutOfOrder),
        }
        let new_nscount = self.nscount.checked_add(1).ok_or(Error::CountOverflow)?;
        self.with_rollback(|wire| record.encode(wire))?;
        self.section = Section::Authority;
        self.nscount = new_nscount;
        Ok(())
    }

    /// Adds a resource record to the additional section of the
    /// message.
    pub fn add_additional(&mut self, record: &Record) -> Result<()> {
        let new_arcount = self.arcount.checked_add(1).ok_or(Error::CountOverflow)?;
        self.with_rollback(|wire| record.encode(wire))?;
        self.section = Section::Additional;
        self.arcount = new_arcount;
        Ok(())
    }

    /// Removes any resource records previously added to the message.
    pub fn clear_rrs(&mut self) {
        self.ancount = 0;
        self.nscount = 0;
        self.arcount = 0;
        self.wire.truncate_to(self.rr_start);
        self.section = Section::Question;
    }

    /// Finishes writing the message, filling in the section counts.
    /// The final length of the message is returned.
    pub fn finish(mut self) -> usize {
        let (qd, an, ns, ar) = (self.qdcount, self.ancount, self.nscount, self.arcount);
        self.wire.patch_u16(QDCOUNT_START, qd);
        self.wire.patch_u16(ANCOUNT_START, an);
        self.wire.patch_u16(NSCOUNT_START, ns);
        self.wire.patch_u16(ARCOUNT_START, ar);
        self.wire.position()
    }

    /// Executes `f` on the underlying [`WireWriter`], rolling the
    /// cursor back to its prior position if `f` fails. This keeps
    /// section writes atomic, so a truncated message never carries a
    /// partial record.
    fn with_rollback<F>(&mut self, f: F) -> Result<()>
    where
        F: FnOnce(&mut WireWriter) -> std::result::Result<(), buf::Error>,
    {
        let saved = self.wire.position();
        let result = f(&mut self.wire);
        if result.is_err() {
            self.wire.truncate_to(saved);
        }
        result.map_err(Into::into)
    }
}

impl fmt::Debug for Writer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Writer")
            .field("section", &self.section)
            .field("qdcount", &self.qdcount)
            .field("ancount", &self.ancount)
            .field("nscount", &self.nscount)
            .field("arcount", &self.arcount)
            .field("cursor", &self.wire.position())
            .finish()
    }
}

////////////////////////////////////////////////////////////////////////
// ERRORS                                                             //
////////////////////////////////////////////////////////////////////////

/// An error signaling that a message could not be written.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A section count would overflow its 16-bit field.
    CountOverflow,

    /// Questions or records were added out of section order.
    OutOfOrder,

    /// The message would exceed the size limit.
    Truncation,
}

impl From<buf::Error> for Error {
    fn from(_: buf::Error) -> Self {
        Self::Truncation
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::CountOverflow => f.write_str("section count overflow"),
            Self::OutOfOrder => f.write_str("sections written out of order"),
            Self::Truncation => f.write_str("message would exceed the size limit"),
        }
    }
}

impl std::error::Error for Error {}

/// The type returned by fallible [`Writer`] methods.
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
