//! Core domain for issue-seeder.
//!
//! This crate contains the catalog model, the body renderer, the two-pass
//! materializer, and the port traits that infrastructure crates implement.
//! Infrastructure crates never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`SpecKey`, `IssueNumber`, etc.) |
//! | [`catalog`] | `Specification` records and the validated `Catalog` |
//! | [`resolution`] | `ResolutionMap`: local key → remote issue number |
//! | [`render`] | Pure issue-body and annotation rendering |
//! | [`ports`] | `IssueTracker` and `PreviewSink` port traits |
//! | [`materialize`] | The two-pass `Materializer` |
//! | [`errors`] | Error taxonomy (`SeederError`, `RemoteError`) |

pub mod catalog;
pub mod errors;
pub mod identifiers;
pub mod materialize;
pub mod ports;
pub mod render;
pub mod resolution;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use catalog::{Catalog, Specification};
pub use errors::{RemoteError, SeederError};
pub use identifiers::{IssueNumber, RepositoryId, RunId, SpecKey};
pub use materialize::Materializer;
pub use ports::{IssueTracker, PreviewSink};
pub use render::{render_annotation, render_body};
pub use resolution::ResolutionMap;
