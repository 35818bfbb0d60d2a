#![forbid(unsafe_code)]

//! An XML tree with identity-preserving nodes, namespace cleanup and
//! XPath queries.
//!
//! All nodes live in a [`Domesque`]; [`Node`] and [`Document`] are cheap
//! handles into it that compare by identity. A document holds one root
//! tag, plus the comments and processing instructions around it.
//!
//! ```rust
//! use domesque::{CleanupOptions, Domesque};
//!
//! let mut dom = Domesque::new();
//! let doc = dom
//!     .parse_document(r#"<root xmlns:x="urn:x" xmlns:y="urn:y"><x:node/></root>"#)
//!     .unwrap();
//! dom.cleanup_namespaces(doc, &CleanupOptions::new()).unwrap();
//! assert_eq!(
//!     dom.document_to_string(doc).unwrap(),
//!     r#"<root xmlns:x="urn:x"><x:node/></root>"#
//! );
//!
//! let root = dom.root(doc).unwrap();
//! let nodes = dom.xpath_with_namespaces(root, "x:node", &[("x", "urn:x")]).unwrap();
//! assert_eq!(nodes.len(), 1);
//! ```

mod access;
mod cleanup;
mod creation;
mod document;
mod domesque;
mod encoding;
mod entity;
mod error;
mod fullname;
mod id;
mod idmap;
mod manipulation;
mod nameaccess;
mod namespace;
mod parse;
mod query;
mod serialize;
mod value;
mod valueaccess;

#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

pub use access::NodeEdge;
pub use cleanup::CleanupOptions;
pub use document::{Document, Source};
pub use domesque::{Domesque, Node};
pub use error::Error;
pub use id::{NameId, NamespaceId, PrefixId};
pub use parse::ParseOptions;
pub use query::QueryResults;
pub use serialize::{SerializeOptions, WriteOptions};
pub use value::{
    Attributes, Comment, DocumentData, NodeKind, Prefixes, ProcessingInstruction, Tag, Text, Value,
};
