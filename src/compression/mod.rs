//! Response compression subsystem.
//!
//! # Data Flow
//! ```text
//! compression stage decides to compress
//!     → pool.rs (acquire a reset encoder)
//!     → body.rs (GzipBody wraps the response body)
//!     → gzip.rs (deflate frames, gzip header/trailer)
//!     → end of body or drop → encoder back to pool.rs
//! ```

pub mod body;
pub mod gzip;
pub mod pool;

pub use body::GzipBody;
pub use pool::{EncoderPool, PooledEncoder};
