//! Reuse pool for gzip encoders.
//!
//! # Responsibilities
//! - Hand out an encoder per compressed response without blocking
//! - Take encoders back when the response body is done or dropped
//!
//! # Design Decisions
//! - Acquisition creates a new encoder when the pool is empty
//! - The pool keeps at most `capacity` idle encoders; extras are freed
//! - Release lives in `Drop`, so early returns, errors and panics all
//!   return the slot
//! - No ordering guarantee on which idle encoder is handed out

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, PoisonError};

use flate2::Compression;

use crate::compression::gzip::GzipEncoder;
use crate::observability::metrics;

/// Default number of idle encoders kept around.
pub const DEFAULT_POOL_CAPACITY: usize = 64;

struct PoolInner {
    idle: Mutex<Vec<GzipEncoder>>,
    capacity: usize,
    level: Compression,
}

/// Shared pool of gzip encoders.
#[derive(Clone)]
pub struct EncoderPool {
    inner: Arc<PoolInner>,
}

impl EncoderPool {
    pub fn new(capacity: usize, level: Compression) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                idle: Mutex::new(Vec::with_capacity(capacity)),
                capacity,
                level,
            }),
        }
    }

    /// Take an encoder, reset for a new stream.
    pub fn acquire(&self) -> PooledEncoder {
        let reused = self.lock().pop();
        let encoder = match reused {
            Some(mut encoder) => {
                encoder.reset();
                encoder
            }
            None => GzipEncoder::new(self.inner.level),
        };
        PooledEncoder {
            encoder: Some(encoder),
            pool: self.clone(),
        }
    }

    /// Number of idle encoders currently pooled.
    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    fn release(&self, encoder: GzipEncoder) {
        let mut idle = self.lock();
        if idle.len() < self.inner.capacity {
            idle.push(encoder);
        }
        metrics::record_pool_idle(idle.len());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GzipEncoder>> {
        // only push/pop happen under the lock, so a poisoned guard is still consistent
        self.inner.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for EncoderPool {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_CAPACITY, Compression::default())
    }
}

impl std::fmt::Debug for EncoderPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncoderPool")
            .field("capacity", &self.inner.capacity)
            .field("idle", &self.idle())
            .finish()
    }
}

/// An encoder on loan from an [`EncoderPool`].
/// Returned to the pool when dropped.
pub struct PooledEncoder {
    encoder: Option<GzipEncoder>,
    pool: EncoderPool,
}

impl Deref for PooledEncoder {
    type Target = GzipEncoder;

    fn deref(&self) -> &GzipEncoder {
        self.encoder.as_ref().expect("encoder present until drop")
    }
}

impl DerefMut for PooledEncoder {
    fn deref_mut(&mut self) -> &mut GzipEncoder {
        self.encoder.as_mut().expect("encoder present until drop")
    }
}

impl Drop for PooledEncoder {
    fn drop(&mut self) {
        if let Some(encoder) = self.encoder.take() {
            self.pool.release(encoder);
        }
    }
}
