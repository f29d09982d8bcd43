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

//! Implementation of the [`NameBuilder`] structure.

use arrayvec::ArrayVec;

use super::{Error, Name, MAX_LABEL_LEN, MAX_N_LABELS, MAX_WIRE_LEN};

/// A facility to build [`Name`]s label by label.
///
/// The `NameBuilder` assembles the on-the-wire representation and the
/// label-offset table of a [`Name`] in fixed-size internal buffers that
/// are long enough to accommodate any valid name. Octets are appended
/// to the current label with [`NameBuilder::try_push`] and
/// [`NameBuilder::try_push_slice`]; [`NameBuilder::end_label`] closes
/// the current label and starts the next one. Any call that would
/// produce an invalid domain name fails, leaving the builder
/// unchanged.
///
/// [`NameBuilder::finish`] closes the final label, appends the
/// terminal null label, and produces the [`Name`]:
///
/// ```
/// use arbor::name::NameBuilder;
///
/// let mut builder = NameBuilder::new();
/// builder.try_push_slice(b"example").unwrap();
/// builder.end_label().unwrap();
/// builder.try_push_slice(b"test").unwrap();
/// let name = builder.finish().unwrap();
/// assert_eq!(name, "example.test.".parse().unwrap());
/// ```
pub struct NameBuilder {
    wire_repr: ArrayVec<u8, MAX_WIRE_LEN>,
    label_offsets: ArrayVec<u8, MAX_N_LABELS>,
    label_len: usize,
}

impl NameBuilder {
    /// Constructs a new, empty `NameBuilder`. Finishing it immediately
    /// yields the root name.
    pub fn new() -> Self {
        Self {
            wire_repr: ArrayVec::new(),
            label_offsets: ArrayVec::new(),
            label_len: 0,
        }
    }

    /// Returns the number of octets in the label currently under
    /// construction.
    pub fn current_label_len(&self) -> usize {
        self.label_len
    }

    /// Tries to add the given octet to the current label. This will
    /// fail if doing so would make the label or name too long. In the
    /// error case, the `NameBuilder`'s state remains unchanged.
    pub fn try_push(&mut self, octet: u8) -> Result<(), Error> {
        self.try_push_slice(&[octet])
    }

    /// Tries to add the given slice to the current label. This will
    /// fail if doing so would make the label or name too long. In the
    /// error case, the `NameBuilder`'s state remains unchanged.
    pub fn try_push_slice(&mut self, octets: &[u8]) -> Result<(), Error> {
        if octets.is_empty() {
            return Ok(());
        }
        if self.label_len + octets.len() > MAX_LABEL_LEN {
            return Err(Error::LabelTooLong);
        }
        if self.label_len == 0 {
            // A new label begins: it needs its length octet, and the
            // whole name (with its terminal null label) must still fit
            // in MAX_WIRE_LEN.
            if self.label_offsets.is_full() {
                return Err(Error::TooManyLabels);
            }
            if self.wire_repr.len() + 1 + octets.len() + 1 > MAX_WIRE_LEN {
                return Err(Error::NameTooLong);
            }
            self.label_offsets.push(self.wire_repr.len() as u8);
            self.wire_repr.push(0);
        } else if self.wire_repr.len() + octets.len() + 1 > MAX_WIRE_LEN {
            return Err(Error::NameTooLong);
        }
        self.wire_repr.try_extend_from_slice(octets).unwrap();
        self.label_len += octets.len();
        let label_start = *self.label_offsets.last().unwrap() as usize;
        self.wire_repr[label_start] = self.label_len as u8;
        Ok(())
    }

    /// Finishes the current label and starts a new one. An empty
    /// current label fails, since only the final (implicit) label of a
    /// domain name may be null.
    pub fn end_label(&mut self) -> Result<(), Error> {
        if self.label_len == 0 {
            Err(Error::InvalidName)
        } else {
            self.label_len = 0;
            Ok(())
        }
    }

    /// Finishes the construction of the domain name, consuming the
    /// `NameBuilder`. The current label is closed implicitly and the
    /// terminal null label is appended.
    pub fn finish(mut self) -> Result<Name, Error> {
        self.wire_repr.push(0);
        Ok(Name {
            wire_repr: self.wire_repr,
            label_offsets: self.label_offsets,
        })
    }
}

impl Default for NameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////
