//! Factory configuration for the [`newt`](https://github.com/toad-lib/newt)
//! LwM2M client: the one-time credential store (entropy, root of trust,
//! trusted-CA identifier, factory-done flag) kept in a secure
//! one-time-programmable area, and the pre-operational verification that a
//! device left the factory line fully provisioned.
//!
//! The SOTP primitive, the credential keystore, the crypto engine and the
//! platform layer are all consumed as narrow traits ([`Sotp`],
//! [`Keystore`], [`Engine`], [`Platform`]); this crate owns the lifecycle,
//! the at-most-once slot semantics, the verification walk and the
//! error/warning bookkeeping of the last verification session.
//!
//! Everything hangs off an explicit [`Factory`] lifecycle object: `init`
//! is idempotent, every other call before `init` fails
//! [`Status::NotInitialized`], and `finalize` releases the platform and
//! keystore again.

// docs
#![doc(html_root_url = "https://docs.rs/newt-factory/0.1.0")]
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

/// The `Factory` lifecycle object
pub mod factory;

/// Error/warning accumulator for the last verification session
pub mod output_info;

/// Named configuration & credential items
pub mod params;

/// Collaborator interfaces: SOTP, keystore, crypto engine, platform
pub mod platform;

mod error;
mod store;
mod verify;

pub use error::Status;
pub use factory::Factory;
pub use output_info::{ItemInfo, OutputInfo};
pub use platform::{Engine, Keystore, KeystoreError, Platform, Slot, Sotp, SotpError, CERT_ID_SIZE};

#[cfg(test)]
pub(crate) mod test;
