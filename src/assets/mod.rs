//! Static asset subsystem.
//!
//! # Data Flow
//! ```text
//! non-API request
//!     → path.rs (decode, clean, lexical containment)
//!     → resolver.rs (canonicalize, containment again, directory index,
//!       shell fallback)
//!     → ServeFile (conditional requests, ranges)
//! ```

pub mod path;
pub mod resolver;

pub use resolver::{Resolution, ResolveError, SpaResolver};
