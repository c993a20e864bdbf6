//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response:
//!     → headers.rs (defensive headers, via the security-headers stage)
//!
//! Outbound endpoints (/api/imgbb, /api/proxy):
//!     → origin.rs (Origin/Referer must belong to this deployment)
//!     → allowlist.rs (target host must be allow-listed)
//!     → forward
//! ```
//!
//! # Design Decisions
//! - Fail closed: any failed check rejects before a network call
//! - Allow-list matching is exact, never by suffix
//! - Related-origin matching is pluggable per hosting environment

pub mod allowlist;
pub mod headers;
pub mod origin;

pub use origin::{HostingSlugMatcher, OriginValidator, RelatedOrigin};
