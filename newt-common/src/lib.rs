//! This microcrate contains the byte-string and buffer primitives used by the
//! [`newt`](https://github.com/toad-lib/newt) LwM2M client core.

// docs
#![doc(html_root_url = "https://docs.rs/newt-common/0.1.0")]
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

mod cursor;
mod string;

pub use cursor::Cursor;
pub use string::{FromUtf8Error, String};

#[doc(no_inline)]
pub use tinyvec::{ArrayVec, TinyVec};
