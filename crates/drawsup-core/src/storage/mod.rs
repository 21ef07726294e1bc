//! Storage layer
//!
//! Handles the flat backing file that holds every annotation.
//!
//! ## Layout
//!
//! ```text
//! [imgs/a.png,<sha256>]
//! Exp=hello world
//! Memo=first line
//! second line
//! [imgs/b.png,<sha256>]
//! Date=2017/03/11
//! ```
//!
//! Each record is a `[path,hash]` header followed by `key=value` body lines
//! (see [`crate::codec`]) up to the next header.

pub mod error;
pub mod persistence;
pub(crate) mod records;

pub use error::{StoreError, StoreResult};
pub use persistence::{atomic_write, open_lines, RawLines};
