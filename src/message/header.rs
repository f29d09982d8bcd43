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

//! Implementation of the DNS message [`Header`].

use super::constants::*;
use super::{Opcode, Rcode};

////////////////////////////////////////////////////////////////////////
// HEADER                                                             //
////////////////////////////////////////////////////////////////////////

/// The 12-octet DNS message header, bit-exact per [RFC 1035 § 4.1.1]
/// with the AD and CD bits of [RFC 4035 § 3.1.6].
///
/// [RFC 1035 § 4.1.1]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.1
/// [RFC 4035 § 3.1.6]: https://datatracker.ietf.org/doc/html/rfc4035#section-3.1.6
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Header {
    pub id: u16,
    pub qr: bool,
    pub opcode: Opcode,
    pub aa: bool,
    pub tc: bool,
    pub rd: bool,
    pub ra: bool,
    pub z: bool,
    pub ad: bool,
    pub cd: bool,
    pub rcode: Rcode,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    /// Builds the header of a new query with the given transaction id:
    /// opcode QUERY with the RD and AD bits set and zeroed counts.
    pub fn query(id: u16) -> Self {
        Self {
            id,
            qr: false,
            opcode: Opcode::QUERY,
            aa: false,
            tc: false,
            rd: true,
            ra: false,
            z: false,
            ad: true,
            cd: false,
            rcode: Rcode::NoError,
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    /// Builds the header of a response to `request`: the transaction
    /// id, opcode, and RD bit are copied; QR and RA are set. AD is
    /// cleared, since an authoritative answer makes no claim of DNSSEC
    /// validation.
    pub fn response(request: &Header) -> Self {
        Self {
            id: request.id,
            qr: true,
            opcode: request.opcode,
            aa: false,
            tc: false,
            rd: request.rd,
            ra: true,
            z: false,
            ad: false,
            cd: false,
            rcode: Rcode::NoError,
            qdcount: 0,
            ancount: 0,
            nscount: 0,
            arcount: 0,
        }
    }

    /// Decodes a header from the first [`HEADER_SIZE`] octets of
    /// `octets`. Panics if the slice is shorter; callers are expected
    /// to have checked the length (see
    /// [`Reader`](super::Reader)'s construction).
    pub(super) fn decode(octets: &[u8]) -> Self {
        let read_u16 =
            |start: usize| u16::from_be_bytes(octets[start..start + 2].try_into().unwrap());
        // The unwraps are fine: every four-bit value is a valid opcode
        // and RCODE.
        Self {
            id: read_u16(ID_START),
            qr: octets[QR_BYTE] & QR_MASK != 0,
            opcode: Opcode::try_from((octets[OPCODE_BYTE] & OPCODE_MASK) >> OPCODE_SHIFT).unwrap(),
            aa: octets[AA_BYTE] & AA_MASK != 0,
            tc: octets[TC_BYTE] & TC_MASK != 0,
            rd: octets[RD_BYTE] & RD_MASK != 0,
            ra: octets[RA_BYTE] & RA_MASK != 0,
            z: octets[Z_BYTE] & Z_MASK != 0,
            ad: octets[AD_BYTE] & AD_MASK != 0,
            cd: octets[CD_BYTE] & CD_MASK != 0,
            rcode: Rcode::try_from(octets[RCODE_BYTE] & RCODE_MASK).unwrap(),
            qdcount: read_u16(QDCOUNT_START),
            ancount: read_u16(ANCOUNT_START),
            nscount: read_u16(NSCOUNT_START),
            arcount: read_u16(ARCOUNT_START),
        }
    }

    /// Encodes the header into its 12-octet wire form.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut octets = [0; HEADER_SIZE];
        octets[ID_START..ID_START + 2].copy_from_slice(&self.id.to_be_bytes());
        let mut set = |byte: usize, mask: u8, on: bool| {
            if on {
                octets[byte] |= mask;
            }
        };
        set(QR_BYTE, QR_MASK, self.qr);
        set(AA_BYTE, AA_MASK, self.aa);
        set(TC_BYTE, TC_MASK, self.tc);
        set(RD_BYTE, RD_MASK, self.rd);
        set(RA_BYTE, RA_MASK, self.ra);
        set(Z_BYTE, Z_MASK, self.z);
        set(AD_BYTE, AD_MASK, self.ad);
        set(CD_BYTE, CD_MASK, self.cd);
        octets[OPCODE_BYTE] |= u8::from(self.opcode) << OPCODE_SHIFT;
        octets[RCODE_BYTE] |= u8::from(self.rcode);
        octets[QDCOUNT_START..QDCOUNT_START + 2].copy_from_slice(&self.qdcount.to_be_bytes());
        octets[ANCOUNT_START..ANCOUNT_START + 2].copy_from_slice(&self.ancount.to_be_bytes());
        octets[NSCOUNT_START..NSCOUNT_START + 2].copy_from_slice(&self.nscount.to_be_bytes());
        octets[ARCOUNT_START..ARCOUNT_START + 2].copy_from_slice(&self.arcount.to_be_bytes());
        octets
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builder_sets_expected_bits() {
        let header = Header::query(0x3e3c);
        assert_eq!(header.id, 0x3e3c);
        assert!(!header.qr);
        assert_eq!(header.opcode, Opcode::QUERY);
        assert!(header.rd);
        assert!(header.ad);
        assert_eq!(
            (header.qdcount, header.ancount, header.nscount, header.arcount),
            (0, 0, 0, 0)
        );
        // The flags word of such a query is 0x0120.
        assert_eq!(&header.encode()[..4], b"\x3e\x3c\x01\x20");
    }

    #[test]
    fn response_builder_copies_request_fields() {
        let mut request = Header::query(0x1111);
        request.opcode = Opcode::QUERY;
        let response = Header::response(&request);
        assert_eq!(response.id, 0x1111);
        assert!(response.qr);
        assert!(response.rd);
        assert!(response.ra);
        assert!(!response.ad);
        assert_eq!(response.rcode, Rcode::NoError);
    }

    #[test]
    fn encode_then_decode_is_identity() {
        let header = Header {
            id: 0xe2d7,
            qr: true,
            opcode: Opcode::QUERY,
            aa: true,
            tc: false,
            rd: true,
            ra: true,
            z: false,
            ad: false,
            cd: true,
            rcode: Rcode::NxDomain,
            qdcount: 1,
            ancount: 2,
            nscount: 3,
            arcount: 4,
        };
        assert_eq!(Header::decode(&header.encode()), header);
    }

    #[test]
    fn decode_matches_known_bytes() {
        // A captured query header: id 0x3e3c, RD and AD set, one
        // question.
        let octets = b"\x3e\x3c\x01\x20\x00\x01\x00\x00\x00\x00\x00\x01";
        let header = Header::decode(octets);
        assert_eq!(header.id, 0x3e3c);
        assert!(!header.qr);
        assert_eq!(header.opcode, Opcode::QUERY);
        assert!(header.rd);
        assert!(header.ad);
        assert!(!header.aa && !header.tc && !header.ra && !header.z && !header.cd);
        assert_eq!(header.rcode, Rcode::NoError);
        assert_eq!(header.qdcount, 1);
        assert_eq!(header.arcount, 1);
    }
}
