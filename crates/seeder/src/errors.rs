//! Error taxonomy for the seeding domain.
//!
//! [`SeederError`] covers conditions that halt a run. [`RemoteError`] is the
//! failure shape every remote-call port returns; infrastructure adapters map
//! their transport details into it and the domain never sees anything else.
//!
//! Every remote-call failure is fatal to the run: issue creation has real
//! side effects that must not proceed inconsistently, so there is no retry
//! and no partial-success continuation.

use thiserror::Error;

use crate::identifiers::{IssueNumber, SpecKey};

// ---------------------------------------------------------------------------
// Remote-call failures (port-level)
// ---------------------------------------------------------------------------

/// A failure reported by a remote-call port.
///
/// Transport-level and protocol-level failures are treated identically by the
/// materializer (abort the run); they are distinguished here so the operator
/// sees what actually happened. The status code and response body of a
/// protocol failure are surfaced verbatim.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never completed: connection failure, DNS failure, or any
    /// other transport-level problem.
    #[error("transport failure: {message}")]
    Transport {
        /// Description of the transport problem, as reported by the client.
        message: String,
    },

    /// The per-call deadline elapsed before a response arrived.
    #[error("remote call timed out after {seconds}s")]
    Timeout {
        /// The deadline that was exceeded, in whole seconds.
        seconds: u64,
    },

    /// The remote service answered with a non-success status.
    #[error("remote call failed: HTTP {status}\n{body}")]
    Protocol {
        /// HTTP status code of the response.
        status: u16,
        /// Response body, verbatim, for operator diagnosis.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// Run-level errors
// ---------------------------------------------------------------------------

/// Errors that halt a seeding run.
///
/// Catalog-shape errors (`DuplicateKey`, `UnknownDependency`) are detected at
/// construction time, before any remote call. Remote-call errors abort the
/// run at the item that failed; resolution-map entries recorded before that
/// point remain valid, since their items really were created.
#[derive(Debug, Error)]
pub enum SeederError {
    /// The run configuration is incomplete or invalid.
    ///
    /// Produced before any remote call; never retried.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration problem.
        message: String,
    },

    /// Two catalog entries declare the same key.
    #[error("duplicate catalog key '{key}'")]
    DuplicateKey {
        /// The key that appears more than once.
        key: SpecKey,
    },

    /// A catalog entry depends on a key no entry declares.
    ///
    /// Detected eagerly at catalog construction; a malformed catalog must
    /// never reach the creation pass.
    #[error("catalog entry '{spec}' depends on unknown key '{dependency}'")]
    UnknownDependency {
        /// The entry declaring the dependency.
        spec: SpecKey,
        /// The dependency key that matched no catalog entry.
        dependency: SpecKey,
    },

    /// A creation call failed during the first pass.
    ///
    /// Entries created before this point are not rolled back; a re-run will
    /// attempt to create every catalog entry again.
    #[error("failed to create issue for '{key}': {source}")]
    CreateFailed {
        /// The catalog entry whose creation call failed.
        key: SpecKey,
        /// The underlying remote failure.
        source: RemoteError,
    },

    /// An annotation call failed during the second pass.
    #[error("failed to annotate issue #{issue} for '{key}': {source}")]
    AnnotateFailed {
        /// The catalog entry whose annotation call failed.
        key: SpecKey,
        /// The issue the annotation was addressed to.
        issue: IssueNumber,
        /// The underlying remote failure.
        source: RemoteError,
    },

    /// No issue number was recorded for a key the annotation pass needs.
    ///
    /// Cannot occur after a completed creation pass; surfaced as an error
    /// rather than a panic so the invariant violation is diagnosable.
    #[error("internal error: no issue number recorded for '{key}'")]
    MissingResolution {
        /// The key with no resolution-map entry.
        key: SpecKey,
    },
}
