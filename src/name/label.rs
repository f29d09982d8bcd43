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

//! Implementation of the [`Label`] and [`LabelBuf`] types.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use arrayvec::ArrayVec;

use super::{Error, MAX_LABEL_LEN};

////////////////////////////////////////////////////////////////////////
// LABELS                                                             //
////////////////////////////////////////////////////////////////////////

/// One label of a domain name.
///
/// `Label` is a wrapper over `[u8]` that can only be constructed if
/// the slice is a valid DNS label, that is, no more than 63 octets
/// long. In accordance with [RFC 1034 § 3.1]:
///
/// * comparisons between `Label`s are ASCII-case-insensitive, but
/// * case is preserved in the internal representation.
///
/// [RFC 1034 § 3.1]: https://tools.ietf.org/html/rfc1034#section-3.1
#[repr(transparent)]
pub struct Label {
    octets: [u8],
}

#[allow(clippy::len_without_is_empty)] // Following DNS terminology, we have is_null().
impl Label {
    /// Returns the asterisk label `*`, which has a special meaning in
    /// the DNS lookup process.
    pub fn asterisk() -> &'static Self {
        static ASTERISK_LABEL: &[u8; 1] = b"*";
        Self::from_unchecked(ASTERISK_LABEL)
    }

    /// Wraps up a `&[u8]` as a `Label` without checking its length for
    /// validity. To be used only within the parent module, and only
    /// after performing the length check manually.
    pub(super) fn from_unchecked(octets: &[u8]) -> &Self {
        unsafe { &*(octets as *const [u8] as *const Label) }
    }

    /// Returns whether this `Label` is the asterisk label.
    pub fn is_asterisk(&self) -> bool {
        self == Self::asterisk()
    }

    /// Returns whether this `Label` is the null (zero-length) label.
    pub fn is_null(&self) -> bool {
        self.octets.is_empty()
    }

    /// Returns the number of octets in this `Label`.
    pub fn len(&self) -> usize {
        self.octets.len()
    }

    /// Returns the octets of this `Label`.
    pub fn octets(&self) -> &[u8] {
        &self.octets
    }
}

impl<'a> TryFrom<&'a [u8]> for &'a Label {
    type Error = Error;

    fn try_from(octets: &'a [u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            Ok(Label::from_unchecked(octets))
        }
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for &'a Label {
    fn from(octets: &'a [u8; N]) -> Self {
        // The const assertion rejects arrays that could never be valid
        // labels at compile time.
        struct AssertValidLen<const N: usize>;
        impl<const N: usize> AssertValidLen<N> {
            const OK: () = assert!(N <= MAX_LABEL_LEN);
        }
        #[allow(clippy::let_unit_value)]
        let _ = AssertValidLen::<N>::OK;
        Label::from_unchecked(octets)
    }
}

impl ToOwned for Label {
    type Owned = LabelBuf;

    fn to_owned(&self) -> Self::Owned {
        Self::Owned::from_unchecked(self.octets())
    }
}

/// When a `Label` is displayed, periods, backslashes, and octets that
/// are not ASCII graphic characters are escaped in accordance with
/// RFC 1035 § 5.1 and RFC 4343 § 2.1:
/// * periods are escaped `\.`;
/// * backslashes are escaped `\\`;
/// * all other ASCII graphic characters are not escaped; and
/// * all other octets are escaped `\xyz`, where `xyz` is the
///   three-digit zero-padded decimal representation of the octet.
impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for octet in self.octets() {
            if *octet == b'.' {
                f.write_str("\\.")?;
            } else if *octet == b'\\' {
                f.write_str("\\\\")?;
            } else if octet.is_ascii_graphic() {
                write!(f, "{}", *octet as char)?;
            } else {
                write!(f, "\\{:03}", *octet)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// In accordance with RFC 1034 § 3.1 (clarified by RFC 4343),
/// comparison of `Label`s is ASCII-case-insensitive.
impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.octets().eq_ignore_ascii_case(other.octets())
    }
}

impl Eq for Label {}

impl Hash for Label {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // We have to hash in a case-insensitive manner to match our
        // implementations of PartialEq and Eq.
        for octet in self.octets().iter().map(|octet| octet.to_ascii_lowercase()) {
            state.write_u8(octet);
        }
    }
}

////////////////////////////////////////////////////////////////////////
// LABEL BUFFERS                                                      //
////////////////////////////////////////////////////////////////////////

/// A fixed-size buffer capable of holding any valid DNS label. It
/// dereferences to a [`Label`].
///
/// The notes about case and internal representation found in the
/// documentation for [`Label`] apply equally here. `LabelBuf` is the
/// owned label type used as the child-map key of
/// [`NameTree`](crate::tree::NameTree) nodes.
#[derive(Clone)]
pub struct LabelBuf {
    octets: ArrayVec<u8, MAX_LABEL_LEN>,
}

impl LabelBuf {
    /// Constructs a `LabelBuf` from the given octets. The length of the
    /// slice is checked only in an assertion; the caller is expected to
    /// ensure that it is valid.
    fn from_unchecked(octets: &[u8]) -> Self {
        Self {
            octets: octets.try_into().unwrap(),
        }
    }
}

impl TryFrom<&[u8]> for LabelBuf {
    type Error = Error;

    fn try_from(octets: &[u8]) -> Result<Self, Self::Error> {
        if octets.len() > MAX_LABEL_LEN {
            Err(Error::LabelTooLong)
        } else {
            Ok(Self::from_unchecked(octets))
        }
    }
}

impl Deref for LabelBuf {
    type Target = Label;

    fn deref(&self) -> &Self::Target {
        Label::from_unchecked(&self.octets)
    }
}

impl Borrow<Label> for LabelBuf {
    fn borrow(&self) -> &Label {
        self.deref()
    }
}

impl fmt::Display for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.deref())
    }
}

impl fmt::Debug for LabelBuf {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\"{}\"", self.deref())
    }
}

// For use in HashMaps, Eq and Hash must be the same as for the
// corresponding Label.
impl PartialEq for LabelBuf {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for LabelBuf {}

impl Hash for LabelBuf {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.deref().hash(state)
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    #[test]
    fn label_try_from_slice_accepts_ok_lengths() {
        let octets = &[0; MAX_LABEL_LEN];
        for i in 0..=MAX_LABEL_LEN {
            <&Label>::try_from(&octets[0..i]).unwrap();
        }
    }

    #[test]
    fn labelbuf_try_from_slice_accepts_ok_lengths() {
        let octets = &[0; MAX_LABEL_LEN];
        for i in 0..=MAX_LABEL_LEN {
            LabelBuf::try_from(&octets[0..i]).unwrap();
        }
    }

    #[test]
    fn label_try_from_slice_rejects_bad_lengths() {
        assert_eq!(
            <&Label>::try_from(&[0; MAX_LABEL_LEN + 1][..]),
            Err(Error::LabelTooLong)
        );
        assert_eq!(<&Label>::try_from(&[0; 97][..]), Err(Error::LabelTooLong));
    }

    #[test]
    fn labelbuf_try_from_slice_rejects_bad_lengths() {
        assert_eq!(
            LabelBuf::try_from(&[0; MAX_LABEL_LEN + 1][..]),
            Err(Error::LabelTooLong)
        );
        assert_eq!(LabelBuf::try_from(&[0; 97][..]), Err(Error::LabelTooLong));
    }

    #[test]
    fn asterisk_is_asterisk() {
        assert!(Label::asterisk().is_asterisk());
    }

    fn hash_of<L: Hash>(label: &L) -> u64 {
        let mut hasher = DefaultHasher::new();
        label.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn label_eq_and_hash_are_case_insensitive() {
        let uppercase: &Label = b"EXAMPLE".into();
        let lowercase: &Label = b"example".into();
        assert_eq!(uppercase, lowercase);
        assert_eq!(hash_of(&uppercase), hash_of(&lowercase));
    }

    #[test]
    fn labelbuf_hash_matches_label_hash() {
        // The hashes need to match so that LabelBufs can be HashMap
        // keys looked up by &Label.
        let labelbuf: LabelBuf = LabelBuf::try_from(&b"label"[..]).unwrap();
        let label: &Label = labelbuf.borrow();
        assert_eq!(hash_of(&labelbuf), hash_of(&label));
    }

    #[test]
    fn label_display_escaping_works() {
        assert_eq!(<&Label>::from(b"\x00\\.a").to_string(), "\\000\\\\\\.a");
    }
}
