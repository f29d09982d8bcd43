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

//! Implementation of the [`Error`] type for zone operations.

use std::fmt;

/// An error produced when populating or querying a zone.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Error {
    /// The queried name is proven not to exist under the zone's
    /// origin. The message handler surfaces this as NXDOMAIN.
    NoDomain,

    /// A record's owner is not within the zone.
    NotInZone,

    /// The backend does not model the queried class or type at all.
    /// The message handler surfaces this as SERVFAIL.
    UnsupportedQuery,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::NoDomain => f.write_str("no such domain"),
            Self::NotInZone => f.write_str("owner is not within the zone"),
            Self::UnsupportedQuery => f.write_str("query not supported by this backend"),
        }
    }
}

impl std::error::Error for Error {}
