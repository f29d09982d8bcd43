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

//! Implementation of data structures related to domain names.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::ops::Index;
use std::str::FromStr;

use arrayvec::ArrayVec;

use crate::buf::{self, WireWriter};

mod builder;
mod error;
mod label;
mod wire;
pub use builder::NameBuilder;
pub use error::Error;
pub use label::{Label, LabelBuf};

/// The maximum number of non-root labels in a domain name.
const MAX_N_LABELS: usize = 127;

/// The maximum length of the uncompressed on-the-wire representation of
/// a domain name, including the terminal null label.
const MAX_WIRE_LEN: usize = 255;

/// The maximum length of a label in a domain name (not including the
/// octet that provides the length).
const MAX_LABEL_LEN: usize = 63;

////////////////////////////////////////////////////////////////////////
// NAME STRUCTURE                                                     //
////////////////////////////////////////////////////////////////////////

/// A domain name.
///
/// A `Name` owns the uncompressed on-the-wire representation of the
/// name (length-prefixed labels terminated by the null label, at most
/// 255 octets) together with a table giving the offset of each
/// non-root label in that representation. Both live in fixed-capacity
/// inline buffers, so short domain names — the common case — stay
/// compact and contiguous, and encoding a name is a single write of
/// the cached octets.
///
/// `Name`s can be constructed in several ways:
///
/// * through the [`FromStr`] implementation;
/// * through a [`NameBuilder`]; and
/// * from on-the-wire names (which may use compression) through
///   [`Name::try_from_compressed`].
///
/// `Name` is a value type: two names are equal if and only if their
/// label sequences are equal under ASCII-case-insensitive comparison.
/// The label count and all iteration exclude the terminal root label;
/// the root name itself has zero labels.
#[derive(Clone)]
pub struct Name {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
}

impl Name {
    /// Returns the `Name` of the DNS root, `.`.
    pub fn root() -> Self {
        let mut wire_repr = ArrayVec::new();
        wire_repr.push(0);
        Self {
            wire_repr,
            label_offsets: ArrayVec::new(),
        }
    }

    /// Returns whether the `Name` is the DNS root `.`.
    pub fn is_root(&self) -> bool {
        self.label_offsets.is_empty()
    }

    /// Returns whether the `Name` is a wildcard domain name (i.e.,
    /// whether its first label is `*`).
    pub fn is_wildcard(&self) -> bool {
        !self.is_root() && self[0].is_asterisk()
    }

    /// Returns the number of labels in this `Name`, excluding the
    /// terminal root label.
    pub fn label_count(&self) -> usize {
        self.label_offsets.len()
    }

    /// Returns the length of the `Name`'s uncompressed on-the-wire
    /// representation, including the terminal null label.
    pub fn encoded_len(&self) -> usize {
        self.wire_repr.len()
    }

    /// Returns the (uncompressed) on-the-wire representation of the
    /// `Name`.
    pub fn wire_repr(&self) -> &[u8] {
        &self.wire_repr
    }

    /// Writes the `Name`'s uncompressed wire form to `out` with a
    /// single write of the cached encoded octets.
    pub fn encode(&self, out: &mut WireWriter) -> Result<(), buf::Error> {
        out.write(self.wire_repr())
    }

    /// Returns an iterator over the labels in this `Name`, from the
    /// leaf label towards the TLD. Reverse iteration (TLD towards
    /// leaf) is available through [`DoubleEndedIterator`].
    pub fn labels(&self) -> Labels {
        Labels::new(self)
    }

    /// Tries to parse a name present at index `start` of the provided
    /// buffer. Compression pointers are followed; indices given in
    /// pointers are treated as indices of `octets` (so generally one
    /// will pass an entire DNS message in `octets`). Two things are
    /// returned on success:
    ///
    /// * the parsed `Name`; and
    /// * the number of contiguous octets read at `start`. Equivalently,
    ///   the number of octets to skip after `start` to read the next
    ///   field when parsing a DNS message. If a pointer label is
    ///   present at `start`, this value will be 2.
    pub fn try_from_compressed(octets: &[u8], start: usize) -> Result<(Self, usize), Error> {
        wire::parse_compressed_name(octets, start)
    }

    /// Computes the size of the name at index `start` of `octets`
    /// without materializing it. On success, returns the length of the
    /// name's textual form (assuming no escaping) and its label count.
    /// The same pointer and bounds rules as
    /// [`Name::try_from_compressed`] apply, and neither consumes the
    /// sequential reader.
    pub fn decoded_length(octets: &[u8], start: usize) -> Result<(usize, usize), Error> {
        wire::decoded_name_length(octets, start)
    }

    /// Tries to skip a name at index `start` of `octets`. This
    /// continues until the end of the name or the first pointer label,
    /// whichever comes first, and returns the number of octets read.
    ///
    /// This performs validation only on the portion of the name read.
    /// When this terminates at a pointer, it does *not* check whether
    /// the pointer itself is valid (i.e., points backward).
    pub fn skip_compressed(octets: &[u8], start: usize) -> Result<usize, Error> {
        wire::skip_compressed_name(octets, start)
    }

    /// Returns an iterator over the labels of `self` that lie strictly
    /// below `origin`, in reverse order (origin towards leaf), after
    /// verifying that `self` is a subdomain of `origin`.
    ///
    /// A `*` label in `origin` matches any single label of `self` at
    /// the same position. `Ok(None)` is returned when `self` equals
    /// `origin`; [`Error::NotASubdomain`] when `self` is not under
    /// `origin`.
    pub fn labels_below(&self, origin: &Name) -> Result<Option<LabelsBelow>, Error> {
        if self.label_count() < origin.label_count() {
            return Err(Error::NotASubdomain);
        }
        for (ours, theirs) in self.labels().rev().zip(origin.labels().rev()) {
            if !theirs.is_asterisk() && ours != theirs {
                return Err(Error::NotASubdomain);
            }
        }
        if self.label_count() == origin.label_count() {
            Ok(None)
        } else {
            Ok(Some(LabelsBelow {
                name: self,
                remaining: self.label_count() - origin.label_count(),
            }))
        }
    }

    /// Returns the offset of label `n` in the `Name`'s on-the-wire
    /// representation.
    fn label_offset(&self, n: usize) -> usize {
        self.label_offsets[n] as usize
    }
}

impl Index<usize> for Name {
    type Output = Label;

    fn index(&self, index: usize) -> &Self::Output {
        let offset = self.label_offset(index);
        let len = self.wire_repr[offset] as usize;
        let start = offset + 1;
        let end = start + len;
        Label::from_unchecked(&self.wire_repr[start..end])
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str(".")
        } else {
            for label in self.labels() {
                write!(f, "{}.", label)?;
            }
            Ok(())
        }
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.label_count() == other.label_count()
            && self.labels().zip(other.labels()).all(|(a, b)| a == b)
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for label in self.labels() {
            label.hash(state);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// ITERATION OVER A NAME'S LABELS                                     //
////////////////////////////////////////////////////////////////////////

/// An iterator over the [`Label`]s in a [`Name`], excluding the
/// terminal root label.
///
/// To use this iterator, construct one from a [`Name`] using
/// [`Name::labels`].
#[derive(Clone, Debug)]
pub struct Labels<'a> {
    name: &'a Name,
    front: usize,
    back: usize,
}

impl Labels<'_> {
    fn new(name: &Name) -> Labels {
        Labels {
            name,
            front: 0,
            back: name.label_count(),
        }
    }
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front < self.back {
            let this_one = self.front;
            self.front += 1;
            Some(&self.name[this_one])
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for Labels<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back > self.front {
            self.back -= 1;
            Some(&self.name[self.back])
        } else {
            None
        }
    }
}

impl ExactSizeIterator for Labels<'_> {}

impl FusedIterator for Labels<'_> {}

/// An iterator over the labels of a [`Name`] strictly below an origin,
/// yielded from the origin towards the leaf. Produced by
/// [`Name::labels_below`].
#[derive(Clone, Debug)]
pub struct LabelsBelow<'a> {
    name: &'a Name,
    remaining: usize,
}

impl<'a> Iterator for LabelsBelow<'a> {
    type Item = &'a Label;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            Some(&self.name[self.remaining])
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for LabelsBelow<'_> {}

impl FusedIterator for LabelsBelow<'_> {}

////////////////////////////////////////////////////////////////////////
// PARSING OF NAMES FROM RUST STRINGS                                 //
////////////////////////////////////////////////////////////////////////

/// Allows for conversion of a Rust [`str`] into a [`Name`]. The passed
/// string must be strictly ASCII, with labels separated by `.`. A
/// single trailing `.` is accepted and discarded, and a bare `.`
/// yields the root name. A `*` may appear only as a whole label, and
/// only in the leftmost position.
impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.is_ascii() {
            return Err(Error::InvalidName);
        } else if s == "." {
            return Ok(Name::root());
        }

        let s = s.strip_suffix('.').unwrap_or(s);
        let mut builder = NameBuilder::new();
        for octet in s.bytes() {
            if octet == b'.' {
                builder.end_label()?;
            } else {
                builder.try_push(octet)?;
            }
        }
        if builder.current_label_len() == 0 {
            // The original string ended with an empty label (e.g.
            // "a..").
            return Err(Error::InvalidName);
        }
        let name = builder.finish()?;

        for (i, label) in name.labels().enumerate() {
            if label.octets().contains(&b'*') {
                if label.len() != 1 {
                    return Err(Error::WildcardNotAlone);
                } else if i != 0 {
                    return Err(Error::WildcardNotFirst);
                }
            }
        }
        Ok(name)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_has_expected_characteristics() {
        let root = Name::root();
        assert!(root.is_root());
        assert_eq!(root.label_count(), 0);
        assert_eq!(root.encoded_len(), 1);
        assert_eq!(root.wire_repr(), &[0]);
        assert_eq!(root.to_string(), ".");
    }

    #[test]
    fn is_wildcard_works() {
        let wildcard: Name = "*.arbor.test.".parse().unwrap();
        let not_a_wildcard: Name = "arbor.test.".parse().unwrap();
        assert!(wildcard.is_wildcard());
        assert!(!not_a_wildcard.is_wildcard());
        assert!(!Name::root().is_wildcard());
    }

    #[test]
    fn labels_iterator_works() {
        let name: Name = "a.b.example.test.".parse().unwrap();
        let mut labels = name.labels();
        assert_eq!(labels.next(), Some(b"a".into()));
        assert_eq!(labels.next(), Some(b"b".into()));
        assert_eq!(labels.next(), Some(b"example".into()));
        assert_eq!(labels.next(), Some(b"test".into()));
        assert_eq!(labels.next(), None);
    }

    #[test]
    fn labels_iterator_reverses() {
        let name: Name = "www.example.com.".parse().unwrap();
        let reversed: Vec<&Label> = name.labels().rev().collect();
        let expected: [&Label; 3] = [b"com".into(), b"example".into(), b"www".into()];
        assert_eq!(reversed, expected);
    }

    #[test]
    fn fromstr_works() {
        let name: Name = "example.test.".parse().unwrap();
        assert_eq!(name.wire_repr(), b"\x07example\x04test\x00");
        assert_eq!(name.label_count(), 2);
    }

    #[test]
    fn fromstr_accepts_names_without_trailing_dot() {
        let with_dot: Name = "example.test.".parse().unwrap();
        let without_dot: Name = "example.test".parse().unwrap();
        assert_eq!(with_dot, without_dot);
    }

    #[test]
    fn fromstr_rejects_empty() {
        assert_eq!("".parse::<Name>(), Err(Error::InvalidName));
    }

    #[test]
    fn fromstr_rejects_non_ascii() {
        assert_eq!("✈.aero.".parse::<Name>(), Err(Error::InvalidName));
    }

    #[test]
    fn fromstr_rejects_empty_interior_label() {
        assert_eq!("a.b..c.".parse::<Name>(), Err(Error::InvalidName));
        assert_eq!("a..".parse::<Name>(), Err(Error::InvalidName));
        assert_eq!(".a.".parse::<Name>(), Err(Error::InvalidName));
    }

    #[test]
    fn fromstr_accepts_max_label_len() {
        let label = "x".repeat(63);
        let name: Name = format!("{}.test.", label).parse().unwrap();
        assert_eq!(name[0].len(), 63);
    }

    #[test]
    fn fromstr_rejects_long_label() {
        let label = "x".repeat(64);
        assert_eq!(
            format!("{}.test.", label).parse::<Name>(),
            Err(Error::LabelTooLong)
        );
    }

    #[test]
    fn fromstr_boundary_on_name_length() {
        // Eight labels of 31 octets encode to 8 * 32 + 1 = 257 octets,
        // so seven such labels with one of 29 octets gives exactly 255.
        let long = "x".repeat(31);
        let at_limit = format!("{}.{}", vec![long.as_str(); 7].join("."), "x".repeat(29));
        let name: Name = at_limit.parse().unwrap();
        assert_eq!(name.encoded_len(), 255);

        let over_limit = format!("{}.{}", vec![long.as_str(); 7].join("."), "x".repeat(30));
        assert_eq!(over_limit.parse::<Name>(), Err(Error::NameTooLong));
    }

    #[test]
    fn fromstr_boundary_on_label_count() {
        let at_limit = vec!["a"; 127].join(".");
        let name: Name = at_limit.parse().unwrap();
        assert_eq!(name.label_count(), 127);

        let over_limit = vec!["a"; 128].join(".");
        assert_eq!(over_limit.parse::<Name>(), Err(Error::TooManyLabels));
    }

    #[test]
    fn fromstr_validates_wildcards() {
        assert!("*.example.com.".parse::<Name>().is_ok());
        assert_eq!(
            "www.*.example.com.".parse::<Name>(),
            Err(Error::WildcardNotFirst)
        );
        assert_eq!(
            "*x.example.com.".parse::<Name>(),
            Err(Error::WildcardNotAlone)
        );
    }

    #[test]
    fn display_round_trips_through_fromstr() {
        for text in ["example.test.", "a.b.c.d.example.test.", "www.Example.COM."] {
            let name: Name = text.parse().unwrap();
            assert_eq!(name.to_string().parse::<Name>().unwrap(), name);
            assert_eq!(name.to_string(), text);
        }
    }

    #[test]
    fn eq_and_hash_are_case_insensitive() {
        use std::collections::hash_map::DefaultHasher;

        let lowercase: Name = "example.test.".parse().unwrap();
        let uppercase: Name = "EXAMPLE.TEST.".parse().unwrap();
        assert_eq!(lowercase, uppercase);

        let mut hasher = DefaultHasher::new();
        lowercase.hash(&mut hasher);
        let lowercase_hash = hasher.finish();
        let mut hasher = DefaultHasher::new();
        uppercase.hash(&mut hasher);
        assert_eq!(lowercase_hash, hasher.finish());
    }

    #[test]
    fn encode_then_decode_round_trips() {
        let name: Name = "www.example.com.".parse().unwrap();
        let mut buf = [0; 64];
        let mut out = WireWriter::new(&mut buf, 64);
        name.encode(&mut out).unwrap();
        assert_eq!(out.position(), name.encoded_len());
        let (reparsed, consumed) = Name::try_from_compressed(&buf, 0).unwrap();
        assert_eq!(reparsed, name);
        assert_eq!(consumed, name.encoded_len());
    }

    #[test]
    fn labels_below_yields_origin_to_leaf() {
        let name: Name = "a.b.www.example.com.".parse().unwrap();
        let origin: Name = "example.com.".parse().unwrap();
        let below: Vec<&Label> = name.labels_below(&origin).unwrap().unwrap().collect();
        let expected: [&Label; 3] = [b"www".into(), b"b".into(), b"a".into()];
        assert_eq!(below, expected);
    }

    #[test]
    fn labels_below_returns_none_at_origin() {
        let name: Name = "example.com.".parse().unwrap();
        let origin: Name = "Example.Com.".parse().unwrap();
        assert!(name.labels_below(&origin).unwrap().is_none());
    }

    #[test]
    fn labels_below_rejects_other_domains() {
        let name: Name = "www.example.org.".parse().unwrap();
        let origin: Name = "example.com.".parse().unwrap();
        assert!(matches!(
            name.labels_below(&origin),
            Err(Error::NotASubdomain)
        ));

        let shorter: Name = "com.".parse().unwrap();
        assert!(matches!(
            shorter.labels_below(&origin),
            Err(Error::NotASubdomain)
        ));
    }

    #[test]
    fn labels_below_honors_origin_wildcards() {
        let name: Name = "host.sub.example.com.".parse().unwrap();
        let origin: Name = "*.example.com.".parse().unwrap();
        let below: Vec<&Label> = name.labels_below(&origin).unwrap().unwrap().collect();
        let expected: [&Label; 1] = [b"host".into()];
        assert_eq!(below, expected);
    }

    #[test]
    fn everything_is_below_the_root() {
        let name: Name = "www.example.com.".parse().unwrap();
        let below: Vec<&Label> = name.labels_below(&Name::root()).unwrap().unwrap().collect();
        assert_eq!(below.len(), 3);
    }

    // The compression probe scenario: two names share a suffix through
    // a backward pointer.
    const COMPRESSED_BUF: &[u8] =
        b"\xcd\xa4\x05\x01\x02\x03\x04\x05\x03\xaa\xbb\xcc\x04\x1a\x2b\x3c\x4d\x00\x02\xab\xcd\xc0\x02";

    #[test]
    fn compressed_buffer_decodes_at_both_offsets() {
        let (first, consumed) = Name::try_from_compressed(COMPRESSED_BUF, 2).unwrap();
        assert_eq!(first.label_count(), 3);
        assert_eq!(consumed, 16);
        assert_eq!(
            first.wire_repr(),
            b"\x05\x01\x02\x03\x04\x05\x03\xaa\xbb\xcc\x04\x1a\x2b\x3c\x4d\x00"
        );

        let (second, consumed) = Name::try_from_compressed(COMPRESSED_BUF, 18).unwrap();
        assert_eq!(second.label_count(), 4);
        assert_eq!(consumed, 5);
        assert_eq!(
            second.wire_repr(),
            b"\x02\xab\xcd\x05\x01\x02\x03\x04\x05\x03\xaa\xbb\xcc\x04\x1a\x2b\x3c\x4d\x00"
        );
    }

    #[test]
    fn decoded_length_agrees_with_parse_at_both_offsets() {
        assert_eq!(Name::decoded_length(COMPRESSED_BUF, 2), Ok((15, 3)));
        assert_eq!(Name::decoded_length(COMPRESSED_BUF, 18), Ok((18, 4)));
    }

    #[test]
    fn forward_pointer_is_rejected() {
        let octets = b"\xc0\x05\x00\x00\x00\x03\x63\x6f\x6d\x00";
        assert_eq!(
            Name::try_from_compressed(octets, 0),
            Err(Error::InvalidPointerAddress)
        );
    }
}
