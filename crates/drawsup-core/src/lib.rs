//! Drawing Supporter Core Library
//!
//! This crate provides the annotation store behind Drawing Supporter, a
//! note-taking companion for illustrators that attaches named text regions
//! (`Exp`, `Memo`, `Tips`, ...) to image files.
//!
//! # Architecture
//!
//! - **One flat file**: every annotation lives in `text.db` as a
//!   `[path,hash]` header followed by `key=value` lines
//! - **No cache**: every read, write and search scans the file again
//!
//! # Quick Start
//!
//! ```text
//! let annotations = Annotations::from_config(&Config::load()?)?;
//!
//! // Load the regions for an image
//! let mut regions = annotations.open(&image)?;
//! regions.insert("Memo".into(), "redo the shading".into());
//! annotations.save(&image, &regions)?;
//!
//! // Search the Memo region of every image
//! let hits = annotations.search("shading", ["Memo"])?;
//! ```
//!
//! # Modules
//!
//! - `annotations`: File-addressed access (main entry point)
//! - `store`: Identity-addressed store and rewrite protocol
//! - `search`: Substring search with region filtering
//! - `links`: `>>name` links from region text to other images
//! - `codec`: `key=value` record body format
//! - `identity`: Relative path + SHA-256 identities
//! - `models`: Region maps, records and search hits
//! - `storage`: Backing file access and errors
//! - `config`: Application configuration

pub mod annotations;
pub mod codec;
pub mod config;
pub mod identity;
pub mod links;
pub mod models;
pub mod search;
pub mod storage;
pub mod store;

pub use annotations::{Annotations, SaveOutcome, SearchResult};
pub use codec::CodecError;
pub use config::Config;
pub use identity::Identity;
pub use links::ImageLink;
pub use models::{Record, RegionMap, SearchHit, StoreStats, DATE_REGION};
pub use storage::{StoreError, StoreResult};
pub use store::{AnnotationStore, WriteOutcome};
