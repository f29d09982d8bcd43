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

//! arbor is an authoritative DNS server library.
//!
//! The crate provides the pieces needed to run an authoritative
//! nameserver process:
//!
//! * the [`name`] module implements domain names, including the
//!   decoding of compressed on-the-wire names per [RFC 1035 § 4.1.4];
//! * the [`rr`] module implements resource records with typed RDATA
//!   for the common [RFC 1035] types plus AAAA ([RFC 3596]);
//! * the [`message`] module implements reading and writing of whole
//!   DNS messages;
//! * the [`tree`] module implements a generic trie keyed by domain
//!   name labels, with wildcard fallback and closest-enclosing-node
//!   lookup;
//! * the [`zone`] module defines the backend boundary through which
//!   queries are answered, along with the in-tree dictionary backend
//!   built on [`tree::NameTree`];
//! * the [`server`] module implements the message-handling logic; and
//! * the [`io`] module provides a blocking network I/O provider.
//!
//! Zones are populated programmatically; there is no zone-file parser.
//!
//! [RFC 1035]: https://datatracker.ietf.org/doc/html/rfc1035
//! [RFC 1035 § 4.1.4]: https://datatracker.ietf.org/doc/html/rfc1035#section-4.1.4
//! [RFC 3596]: https://datatracker.ietf.org/doc/html/rfc3596

pub mod buf;
pub mod class;
pub mod io;
pub mod message;
pub mod name;
pub mod rr;
pub mod server;
pub mod tree;
pub mod zone;

mod util;
