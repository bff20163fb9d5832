//! Parsed CoAP message headers for the [`newt`](https://github.com/toad-lib/newt)
//! LwM2M client core.
//!
//! The core serves requests against an LwM2M object tree; it does not frame or
//! deframe CoAP packets. A [`Header`] is the shape a message has *after* the
//! CoAP layer has decoded it: a code, a token, the small set of options LwM2M
//! cares about (already parsed), and the payload bytes. The transport hands
//! the core inbound [`Header`]s and is handed outbound ones back.

// docs
#![doc(html_root_url = "https://docs.rs/newt-msg/0.1.0")]
#![cfg_attr(any(docsrs, feature = "docs"), feature(doc_cfg))]
// -
// style
#![allow(clippy::unused_unit)]
// -
// deny
#![deny(missing_docs)]
#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub))]
#![cfg_attr(not(test), deny(unsafe_code))]
// -
// features
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc as std_alloc;

/// Message Code
pub mod code;

/// Content-Format option values
pub mod content_format;

/// Parsed message header
pub mod header;

/// Observe option
pub mod observe;

/// Message Token
pub mod token;

/// Message Type
pub mod ty;

pub use code::{Code, CodeKind};
pub use content_format::ContentFormat;
pub use header::Header;
pub use token::Token;
pub use ty::Type;
