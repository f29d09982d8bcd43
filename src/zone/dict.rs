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

//! The dictionary zone backend.

use std::collections::HashMap;

use super::{Backend, Error};
use crate::class::Class;
use crate::name::Name;
use crate::rr::{Record, Type};
use crate::tree::NameTree;

/// A zone backend storing records in one
/// [`NameTree`](crate::tree::NameTree) per class and type.
///
/// Records are added one by one with [`DictBackend::add`]; each lands
/// in the tree selected by its class and type, at the node given by
/// its owner's labels below the zone origin. A query selects the same
/// way and walks the tree with the origin as context, so wildcard
/// records (`*.example.com.`) answer for otherwise-absent names.
///
/// The class map is the coarse authority switch: a query for a class
/// with no entry at all fails with [`Error::UnsupportedQuery`], while
/// a missing *type* tree within a present class simply means there are
/// no records of that type (`Ok(None)`).
pub struct DictBackend {
    context: Name,
    classes: HashMap<Class, HashMap<Type, NameTree<Vec<Record>>>>,
}

impl DictBackend {
    /// Creates an empty backend for the zone origin `context`. The IN
    /// class is modeled from the start, so an empty zone answers IN
    /// queries with "no records" rather than a failure.
    pub fn new(context: Name) -> Self {
        let mut classes = HashMap::new();
        classes.insert(Class::IN, HashMap::new());
        Self { context, classes }
    }

    /// Returns the zone origin this backend is anchored at.
    pub fn context(&self) -> &Name {
        &self.context
    }

    /// Adds a record to the backend. The record's owner must be the
    /// zone origin or a name below it.
    pub fn add(&mut self, record: Record) -> Result<(), Error> {
        let Self { context, classes } = self;
        let labels = match record.owner.labels_below(context) {
            Err(_) => return Err(Error::NotInZone),
            Ok(labels) => labels,
        };

        let tree = classes
            .entry(record.class)
            .or_default()
            .entry(record.rr_type())
            .or_insert_with(|| NameTree::new_namespace(context.clone()));

        let mut node = &mut *tree;
        if let Some(labels) = labels {
            for label in labels {
                // Adding a path node never passes a value, so this
                // cannot fail with DuplicateValue.
                node = node.add_child(label, None).unwrap();
            }
        }
        node.value_or_insert_with(Vec::new).push(record);
        Ok(())
    }
}

impl Backend for DictBackend {
    fn query(&self, name: &Name, rr_type: Type, class: Class) -> Result<Option<&[Record]>, Error> {
        let types = self.classes.get(&class).ok_or(Error::UnsupportedQuery)?;
        let tree = match types.get(&rr_type) {
            Some(tree) => tree,
            None => return Ok(None),
        };

        let labels = match name.labels_below(&self.context) {
            // Not authoritative for this name; the server decides what
            // that means for the response.
            Err(_) => return Ok(None),
            Ok(None) => return Ok(tree.value().map(Vec::as_slice)),
            Ok(Some(labels)) => labels,
        };

        let (node, complete) = tree.walk(labels);
        if complete {
            Ok(node.value().map(Vec::as_slice))
        } else {
            Err(Error::NoDomain)
        }
    }
}

////////////////////////////////////////////////////////////////////////
// TESTS                                                              //
////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::*;
    use crate::rr::{Rdata, Ttl};

    lazy_static! {
        static ref CONTEXT: Name = "example.com.".parse().unwrap();
        static ref WWW: Name = "www.example.com.".parse().unwrap();
    }

    fn a_record(owner: &Name, address: [u8; 4]) -> Record {
        Record {
            owner: owner.clone(),
            class: Class::IN,
            ttl: Ttl::from(300),
            rdata: Rdata::A(address),
        }
    }

    fn populated_backend() -> DictBackend {
        let mut backend = DictBackend::new(CONTEXT.clone());
        backend.add(a_record(&WWW, [1, 2, 3, 4])).unwrap();
        backend.add(a_record(&WWW, [5, 6, 7, 8])).unwrap();
        backend
    }

    #[test]
    fn query_returns_all_records_at_a_name() {
        let backend = populated_backend();
        let records = backend.query(&WWW, Type::A, Class::IN).unwrap().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].rdata, Rdata::A([1, 2, 3, 4]));
        assert_eq!(records[1].rdata, Rdata::A([5, 6, 7, 8]));
    }

    #[test]
    fn query_for_absent_type_returns_none() {
        let backend = populated_backend();
        assert_eq!(backend.query(&WWW, Type::MX, Class::IN), Ok(None));
    }

    #[test]
    fn query_for_unmodeled_class_fails() {
        let backend = populated_backend();
        assert_eq!(
            backend.query(&WWW, Type::A, Class::CH),
            Err(Error::UnsupportedQuery)
        );
    }

    #[test]
    fn query_outside_the_context_returns_none() {
        let backend = populated_backend();
        let other: Name = "www.other.com.".parse().unwrap();
        assert_eq!(backend.query(&other, Type::A, Class::IN), Ok(None));
    }

    #[test]
    fn query_for_missing_name_reports_nodomain() {
        let backend = populated_backend();
        let missing: Name = "missing.example.com.".parse().unwrap();
        assert_eq!(
            backend.query(&missing, Type::A, Class::IN),
            Err(Error::NoDomain)
        );
    }

    #[test]
    fn query_for_empty_interior_node_returns_none() {
        let mut backend = DictBackend::new(CONTEXT.clone());
        let deep: Name = "a.www.example.com.".parse().unwrap();
        backend.add(a_record(&deep, [1, 2, 3, 4])).unwrap();
        // www.example.com. exists as a branch node but holds no
        // records.
        assert_eq!(backend.query(&WWW, Type::A, Class::IN), Ok(None));
    }

    #[test]
    fn query_at_the_apex_uses_the_namespace_root() {
        let mut backend = DictBackend::new(CONTEXT.clone());
        backend.add(a_record(&CONTEXT, [9, 9, 9, 9])).unwrap();
        let records = backend
            .query(&CONTEXT, Type::A, Class::IN)
            .unwrap()
            .unwrap();
        assert_eq!(records[0].rdata, Rdata::A([9, 9, 9, 9]));
    }

    #[test]
    fn wildcards_answer_for_absent_names() {
        let mut backend = DictBackend::new(CONTEXT.clone());
        let wildcard: Name = "*.example.com.".parse().unwrap();
        backend.add(a_record(&wildcard, [7, 7, 7, 7])).unwrap();
        backend.add(a_record(&WWW, [1, 1, 1, 1])).unwrap();

        // Exact match wins over the wildcard.
        let records = backend.query(&WWW, Type::A, Class::IN).unwrap().unwrap();
        assert_eq!(records[0].rdata, Rdata::A([1, 1, 1, 1]));

        // Anything else synthesizes from the wildcard.
        let other: Name = "anything.example.com.".parse().unwrap();
        let records = backend.query(&other, Type::A, Class::IN).unwrap().unwrap();
        assert_eq!(records[0].rdata, Rdata::A([7, 7, 7, 7]));
    }

    #[test]
    fn add_rejects_owners_outside_the_zone() {
        let mut backend = DictBackend::new(CONTEXT.clone());
        let outside: Name = "www.other.com.".parse().unwrap();
        assert_eq!(
            backend.add(a_record(&outside, [1, 2, 3, 4])),
            Err(Error::NotInZone)
        );
    }
}
