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

//! DNS zones and the backend boundary through which they are queried.
//!
//! A [`Zone`] pairs a *context* — the domain name the zone is
//! authoritative for — with a [`Backend`] that resolves queries. The
//! backend is polymorphic: the in-tree [`DictBackend`] stores records
//! in per-class, per-type [`NameTree`](crate::tree::NameTree)s, while
//! alternative backends (a database, a synthesizer) only need to
//! implement the [`Backend`] trait.
//!
//! Zone contents are fixed at configuration time. Queries only read,
//! so a populated `Zone` may be shared freely across worker threads.

use crate::class::Class;
use crate::name::Name;
use crate::rr::{Record, Type};

mod dict;
mod error;
pub use dict::DictBackend;
pub use error::Error;

////////////////////////////////////////////////////////////////////////
// THE BACKEND BOUNDARY                                               //
////////////////////////////////////////////////////////////////////////

/// The interface a zone backend implements.
///
/// A backend resolves a query triple to the records stored at the
/// queried name. The three shapes of a successful answer are:
///
/// * `Ok(Some(records))` — records of the queried type exist;
/// * `Ok(None)` — the backend is not authoritative for the name, or
///   the name exists but holds no records of the queried type; and
/// * `Err(e)` — the query failed (see [`Error`]).
pub trait Backend: Send + Sync {
    /// Looks up the records for `name` with the given type and class.
    fn query(&self, name: &Name, rr_type: Type, class: Class) -> Result<Option<&[Record]>, Error>;
}

////////////////////////////////////////////////////////////////////////
// ZONES                                                              //
////////////////////////////////////////////////////////////////////////

/// A DNS zone: an authoritative context together with the backend that
/// answers queries for it.
pub struct Zone {
    context: Name,
    backend: Box<dyn Backend>,
}

impl Zone {
    /// Creates a `Zone` for the origin `context` served by `backend`.
    pub fn new(context: Name, backend: Box<dyn Backend>) -> Self {
        Self { context, backend }
    }

    /// Creates a `Zone` served by an already-populated
    /// [`DictBackend`]. The zone's context is taken from the backend's
    /// origin.
    pub fn with_dict(backend: DictBackend) -> Self {
        let context = backend.context().clone();
        Self::new(context, Box::new(backend))
    }

    /// Returns the name of the zone's origin.
    pub fn context(&self) -> &Name {
        &self.context
    }

    /// Looks up the records for `name` with the given type and class.
    /// See [`Backend::query`] for the meaning of the result.
    pub fn query(
        &self,
        name: &Name,
        rr_type: Type,
        class: Class,
    ) -> Result<Option<&[Record]>, Error> {
        self.backend.query(name, rr_type, class)
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Zone").field("context", &self.context).finish()
    }
}
