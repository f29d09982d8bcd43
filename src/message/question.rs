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

//! Implementation of the DNS [`Question`] type.

use std::fmt;

use crate::buf::{self, WireWriter};
use crate::class::Class;
use crate::name::Name;
use crate::rr::Type;

/// The question of a DNS query, per [RFC 1035 § 4.1.2]:
///
/// * the QNAME, which is the domain name whose records are being
///   queried;
/// * the QTYPE, which specifies what type of records are desired; and
/// * the QCLASS, which specifies which DNS class to search.
///
/// While the original specification does not rule out having multiple
/// questions per message, in practice only one question per message is
/// used.
///
/// [RFC 1035 § 4.1.2]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.2
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Question {
    pub qname: Name,
    pub qtype: Type,
    pub qclass: Class,
}

impl Question {
    /// Writes the question to `out`. The QNAME is written
    /// uncompressed.
    pub fn encode(&self, out: &mut WireWriter) -> Result<(), buf::Error> {
        self.qname.encode(out)?;
        out.write_u16(self.qtype.into())?;
        out.write_u16(self.qclass.into())
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.qname, self.qclass, self.qtype)
    }
}
