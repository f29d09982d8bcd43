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

//! Implementation of parsing of on-the-wire names.
//!
//! Compressed names are handled per [RFC 1035 § 4.1.4]. Two positions
//! are tracked while parsing: the *reader* position, which advances
//! sequentially through the message and stops for good once the first
//! pointer label is followed, and the *parse* position, which jumps to
//! each pointer's target. A pointer target must lie strictly before
//! the pointer itself; this excludes self-references, forward
//! references, and cycles.
//!
//! [RFC 1035 § 4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_N_LABELS, MAX_WIRE_LEN};

/// The label-header bit patterns of RFC 1035 § 4.1.4. Top bits `00`
/// introduce a literal label, `11` a compression pointer; `01` and
/// `10` are reserved.
const HEADER_MASK: u8 = 0xc0;
const HEADER_LITERAL: u8 = 0x00;
const HEADER_POINTER: u8 = 0xc0;

/// Parses a (possibly compressed) name starting at index `start` of
/// `octets`. Pointers are followed; indices given in pointers are
/// treated as indices of `octets`, so the intention is for an entire
/// DNS message to be passed in `octets`. Two things are returned on
/// success:
///
/// * the parsed [`Name`]; and
/// * the number of contiguous octets read at `start` — equivalently,
///   the number of octets to skip after `start` to read the next field
///   when parsing a DNS message.
pub(super) fn parse_compressed_name(octets: &[u8], start: usize) -> Result<(Name, usize), Error> {
    let mut wire_repr = ArrayVec::<u8, MAX_WIRE_LEN>::new();
    let mut label_offsets = ArrayVec::<u8, MAX_N_LABELS>::new();
    let mut index = start;
    let mut reader_len = None;

    loop {
        let header = *octets.get(index).ok_or(Error::NoRootLabel)?;
        match header & HEADER_MASK {
            HEADER_POINTER => {
                let low = *octets.get(index + 1).ok_or(Error::NoRootLabel)?;
                let target = ((header & !HEADER_MASK) as usize) << 8 | low as usize;
                if target >= index {
                    return Err(Error::InvalidPointerAddress);
                }
                reader_len.get_or_insert(index + 2 - start);
                index = target;
            }
            HEADER_LITERAL => {
                let len = header as usize;
                if len == 0 {
                    wire_repr.push(0);
                    reader_len.get_or_insert(index + 1 - start);
                    break;
                }
                let end = index + 1 + len;
                if end > octets.len() {
                    return Err(Error::NoRootLabel);
                }
                // Reserve room for the terminal null label as we go.
                if wire_repr.len() + 1 + len + 1 > MAX_WIRE_LEN {
                    return Err(Error::NameTooLong);
                }
                label_offsets.push(wire_repr.len() as u8);
                wire_repr.try_extend_from_slice(&octets[index..end]).unwrap();
                index = end;
            }
            _ => return Err(Error::InvalidLabelHeader),
        }
    }

    let name = Name {
        wire_repr,
        label_offsets,
    };
    Ok((name, reader_len.unwrap()))
}

/// Computes the size of the name starting at index `start` of `octets`
/// without materializing it. On success, returns the length of the
/// name's textual form assuming no escaping (each label contributes
/// its content plus one separating dot; the root name is a lone dot),
/// together with the number of non-root labels. The same pointer and
/// bounds rules as [`parse_compressed_name`] apply.
pub(super) fn decoded_name_length(octets: &[u8], start: usize) -> Result<(usize, usize), Error> {
    let mut wire_len = 0;
    let mut n_labels = 0;
    let mut index = start;

    loop {
        let header = *octets.get(index).ok_or(Error::NoRootLabel)?;
        match header & HEADER_MASK {
            HEADER_POINTER => {
                let low = *octets.get(index + 1).ok_or(Error::NoRootLabel)?;
                let target = ((header & !HEADER_MASK) as usize) << 8 | low as usize;
                if target >= index {
                    return Err(Error::InvalidPointerAddress);
                }
                index = target;
            }
            HEADER_LITERAL => {
                let len = header as usize;
                if len == 0 {
                    wire_len += 1;
                    break;
                }
                let end = index + 1 + len;
                if end > octets.len() {
                    return Err(Error::NoRootLabel);
                }
                if wire_len + 1 + len + 1 > MAX_WIRE_LEN {
                    return Err(Error::NameTooLong);
                }
                wire_len += 1 + len;
                n_labels += 1;
                index = end;
            }
            _ => return Err(Error::InvalidLabelHeader),
        }
    }

    // One dot per label replaces one length octet per label plus the
    // terminal null label, so the textual length is one less than the
    // wire length, except for the root name.
    if n_labels == 0 {
        Ok((1, 0))
    } else {
        Ok((wire_len - 1, n_labels))
    }
}

/// Tries to skip a compressed name at index `start` of `octets`. This
/// continues until the end of the name or the first pointer label,
/// whichever comes first, and returns the number of octets read.
///
/// This performs validation only on the portion of the name read.
/// Furthermore, when this terminates at a pointer, it does *not* check
/// whether the pointer itself is valid (i.e., points backward).
pub(super) fn skip_compressed_name(octets: &[u8], start: usize) -> Result<usize, Error> {
    // When the first chunk ends at a pointer, the pointer's expansion
    // contributes at least one octet to the decoded length, so the
    // lower bound for the decoded length and the chunk length differ
    // by one in that case.
    let mut index = start;

    loop {
        let header = *octets.get(index).ok_or(Error::NoRootLabel)?;
        match header & HEADER_MASK {
            HEADER_POINTER => {
                if index + 1 >= octets.len() {
                    return Err(Error::NoRootLabel);
                }
                let min_decoded_len = index + 1 - start;
                if min_decoded_len > MAX_WIRE_LEN {
                    return Err(Error::NameTooLong);
                }
                return Ok(index + 2 - start);
            }
            HEADER_LITERAL => {
                let len = header as usize;
                if len == 0 {
                    let decoded_len = index + 1 - start;
                    if decoded_len > MAX_WIRE_LEN {
                        return Err(Error::NameTooLong);
                    }
                    return Ok(decoded_len);
                }
                index += 1 + len;
                if index > octets.len() {
                    return Err(Error::NoRootLabel);
                }
            }
            _ => return Err(Error::InvalidLabelHeader),
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_uncompressed_names() {
        let octets = b"junk\x07example\x04test\x00junk";
        let target: Name = "example.test.".parse().unwrap();
        assert_eq!(parse_compressed_name(octets, 4), Ok((target, 14)));
    }

    #[test]
    fn parse_accepts_compressed_names() {
        let octets = b"junk\x04test\x00junk\x07example\xc0\x04junk";
        let target: Name = "example.test.".parse().unwrap();
        assert_eq!(parse_compressed_name(octets, 14), Ok((target, 10)));
    }

    #[test]
    fn parse_rejects_missing_root_label() {
        assert_eq!(
            parse_compressed_name(b"\x07example\x04tes", 0),
            Err(Error::NoRootLabel),
        );
        assert_eq!(parse_compressed_name(b"", 0), Err(Error::NoRootLabel));
    }

    #[test]
    fn parse_rejects_truncated_pointer() {
        assert_eq!(
            parse_compressed_name(b"\x01x\xc0", 0),
            Err(Error::NoRootLabel),
        );
    }

    #[test]
    fn parse_rejects_reserved_header_bits() {
        assert_eq!(
            parse_compressed_name(b"\x40xxx\x00", 0),
            Err(Error::InvalidLabelHeader),
        );
        assert_eq!(
            parse_compressed_name(b"\x80xxx\x00", 0),
            Err(Error::InvalidLabelHeader),
        );
    }

    #[test]
    fn parse_rejects_self_pointer() {
        assert_eq!(
            parse_compressed_name(b"\xc0\x00", 0),
            Err(Error::InvalidPointerAddress),
        );
        assert_eq!(
            parse_compressed_name(b"\x01a\x01b\xc0\x02", 2),
            Err(Error::InvalidPointerAddress),
        );
    }

    #[test]
    fn parse_rejects_forward_pointer() {
        assert_eq!(
            parse_compressed_name(b"\x01x\xc0\x08junk\x00", 0),
            Err(Error::InvalidPointerAddress),
        );
    }

    #[test]
    fn parse_rejects_long_name() {
        // 128 single-octet labels would decode to 257 octets.
        let mut octets = Vec::new();
        for _ in 0..128 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.push(0);
        assert_eq!(
            parse_compressed_name(&octets, 0),
            Err(Error::NameTooLong),
        );
    }

    #[test]
    fn parse_rejects_long_name_through_pointers() {
        // A first chunk of 16 single-octet labels pointing back at a
        // 240-octet run: the reconstructed name would be too long even
        // though each chunk alone is fine.
        let mut octets = Vec::new();
        for _ in 0..120 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.push(0);
        let second_chunk = octets.len();
        for _ in 0..16 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.extend_from_slice(b"\xc0\x00");
        assert_eq!(
            parse_compressed_name(&octets, second_chunk),
            Err(Error::NameTooLong),
        );
    }

    #[test]
    fn parse_accepts_max_len_name() {
        // 127 single-octet labels decode to exactly 255 octets.
        let mut octets = Vec::new();
        for _ in 0..127 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.push(0);
        let (name, len) = parse_compressed_name(&octets, 0).unwrap();
        assert_eq!(len, 255);
        assert_eq!(name.encoded_len(), 255);
        assert_eq!(name.label_count(), 127);
    }

    #[test]
    fn decoded_name_length_matches_parse() {
        let octets = b"junk\x04test\x00junk\x07example\xc0\x04junk";
        let (name, _) = parse_compressed_name(octets, 14).unwrap();
        assert_eq!(
            decoded_name_length(octets, 14),
            Ok((name.to_string().len(), name.label_count())),
        );
        assert_eq!(decoded_name_length(b"\x00", 0), Ok((1, 0)));
    }

    #[test]
    fn decoded_name_length_applies_pointer_rules() {
        assert_eq!(
            decoded_name_length(b"\xc0\x00", 0),
            Err(Error::InvalidPointerAddress),
        );
    }

    #[test]
    fn skip_handles_uncompressed_names() {
        assert_eq!(skip_compressed_name(b"\x07example\x04test\x00junk", 0), Ok(14));
    }

    #[test]
    fn skip_stops_at_first_pointer() {
        assert_eq!(skip_compressed_name(b"\x07example\xc0\x0cjunk", 0), Ok(10));
    }

    #[test]
    fn skip_accepts_almost_too_long_first_chunk() {
        // The first chunk is 256 octets, one greater than MAX_WIRE_LEN,
        // but if the pointer turned out to point at a single null
        // label, the decoded name would be exactly MAX_WIRE_LEN long.
        // So this chunk must be accepted.
        let mut octets = Vec::new();
        for _ in 0..127 {
            octets.extend_from_slice(b"\x01x");
        }
        octets.extend_from_slice(b"\xc0\x0c");
        assert_eq!(octets.len(), MAX_WIRE_LEN + 1);
        assert_eq!(skip_compressed_name(&octets, 0), Ok(MAX_WIRE_LEN + 1));
    }

    #[test]
    fn skip_rejects_missing_root_label() {
        assert_eq!(
            skip_compressed_name(b"\x07example\x04tes", 0),
            Err(Error::NoRootLabel),
        );
    }
}
