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

//! Implementation of the [`Error`] type for name-related errors.

use std::fmt;

/// An error type used to report problems constructing label and name
/// types.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// A label header octet had the reserved `01` or `10` top bits.
    InvalidLabelHeader,

    /// The textual form of a name was malformed (empty, non-ASCII, or
    /// containing a null label in a non-terminal position).
    InvalidName,

    /// A compression pointer did not point strictly backward.
    InvalidPointerAddress,

    /// A label was longer than 63 octets.
    LabelTooLong,

    /// The name is too long (longer than 255 octets on the wire).
    NameTooLong,

    /// The buffer ended before the terminal null label was reached.
    NoRootLabel,

    /// The name is not a subdomain of the given origin.
    NotASubdomain,

    /// The name has more than 127 labels.
    TooManyLabels,

    /// A wildcard label appeared in combination with other content in
    /// the same label.
    WildcardNotAlone,

    /// A wildcard label appeared somewhere other than the leftmost
    /// position.
    WildcardNotFirst,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::InvalidLabelHeader => f.write_str("label header uses reserved bits"),
            Self::InvalidName => f.write_str("malformed domain name"),
            Self::InvalidPointerAddress => {
                f.write_str("compression pointer does not point backward")
            }
            Self::LabelTooLong => f.write_str("label is longer than 63 octets"),
            Self::NameTooLong => f.write_str("name is longer than 255 octets on the wire"),
            Self::NoRootLabel => f.write_str("name is not terminated by the root label"),
            Self::NotASubdomain => f.write_str("name is not a subdomain of the origin"),
            Self::TooManyLabels => f.write_str("name has more than 127 labels"),
            Self::WildcardNotAlone => f.write_str("wildcard must be the only octet in its label"),
            Self::WildcardNotFirst => f.write_str("wildcard label must be leftmost"),
        }
    }
}

impl std::error::Error for Error {}
