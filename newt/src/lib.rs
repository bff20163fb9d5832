//! `newt` is the in-memory core of an embedded LwM2M client:
//! - the four-level **object tree** (Object / Object Instance / Resource /
//!   Resource Instance) holding typed leaf values,
//! - the per-node **CoAP request dispatcher** serving GET/PUT/POST against
//!   that tree, with content-format negotiation, observation and delayed
//!   POST responses,
//! - the **OMA TLV codec** (content formats 11542 and legacy 99),
//! - the **report handler** implementing the `pmin`/`pmax`/`gt`/`lt`/`st`
//!   observation attributes.
//!
//! Transport, DTLS, and byte-level CoAP framing live outside this crate; the
//! event loop hands the tree parsed [`newt_msg::Header`]s one at a time and
//! sends whatever headers come back. Notifications and delayed responses
//! flow out through the [`ObservationHandler`] the caller supplies.
//!
//! ```
//! use newt::{ResourceType, Tree, Value};
//! use newt_msg::{code, ContentFormat, Header};
//!
//! let mut tree = Tree::new();
//! let device = tree.create_object(3).unwrap();
//! let instance = device.create_instance(0).unwrap();
//! instance.create_static_resource(0u16,
//!                                 ResourceType::String,
//!                                 Value::String(b"ACME".to_vec()),
//!                                 false)
//!         .unwrap();
//!
//! let mut req = Header::request(code::GET);
//! req.uri_path = Some("3/0/0".into());
//! req.accept = Some(ContentFormat::Text);
//!
//! let resp = tree.handle(&req, &mut ());
//! assert_eq!(resp.code, code::CONTENT);
//! assert_eq!(resp.payload, b"ACME");
//! ```

// docs
#![doc(html_root_url = "https://docs.rs/newt/0.1.0")]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// warnings
#![cfg_attr(not(test), warn(unreachable_pub))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;

/// Fields and behavior common to every node kind
pub mod base;

/// Runtime configuration
pub mod config;

/// Numeric ids, limits and well-known paths
pub mod constants;

/// LwM2M object
pub mod object;

/// LwM2M object instance
pub mod object_instance;

/// Observation handler interface consumed by the dispatcher
pub mod observe;

/// Observation attributes & notification triggering
pub mod report;

/// LwM2M resource
pub mod resource;

/// LwM2M resource instance
pub mod resource_instance;

/// OMA TLV serializer & deserializer
pub mod tlv;

/// The object tree root & path-addressed dispatch
pub mod tree;

/// Typed resource values
pub mod value;

mod error;
mod resource_base;

pub use base::{Base, Key, Observation, Operation};
pub use config::Config;
pub use error::Error;
pub use object::Object;
pub use object_instance::ObjectInstance;
pub use observe::ObservationHandler;
pub use report::{Millis, ReportHandler};
pub use resource::{Execute, Resource};
pub use resource_instance::ResourceInstance;
pub use tree::Tree;
pub use value::{ResourceType, Value};

#[cfg(test)]
pub(crate) mod test;
