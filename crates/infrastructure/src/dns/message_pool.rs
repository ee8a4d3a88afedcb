use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Capacity of every pooled buffer. Large enough for any query we build.
pub const BUFFER_CAPACITY: usize = 4096;

const DEFAULT_MAX_IDLE: usize = 1024;

/// Pool of reusable wire buffers for outgoing queries.
///
/// Packing a query checks a buffer out; the buffer goes back when the
/// returned [`PooledBuffer`] is dropped.
#[derive(Debug)]
pub struct MessagePool {
    idle: Mutex<Vec<Vec<u8>>>,
    max_idle: usize,
    total_created: AtomicU64,
    total_reused: AtomicU64,
}

impl MessagePool {
    pub fn new(max_idle: usize) -> Self {
        debug!(max_idle, "Initializing message buffer pool");
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            total_created: AtomicU64::new(0),
            total_reused: AtomicU64::new(0),
        }
    }

    pub fn checkout(self: &Arc<Self>) -> PooledBuffer {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop();

        let buf = match reused {
            Some(buf) => {
                self.total_reused.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.total_created.fetch_add(1, Ordering::Relaxed);
                Vec::with_capacity(BUFFER_CAPACITY)
            }
        };

        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    fn release(&self, mut buf: Vec<u8>) {
        // Oversized buffers are not worth keeping around.
        if buf.capacity() > BUFFER_CAPACITY {
            return;
        }
        buf.clear();
        let mut idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if idle.len() < self.max_idle {
            idle.push(buf);
        }
    }

    pub fn stats(&self) -> PoolStats {
        let idle = self
            .idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len();
        PoolStats {
            total_created: self.total_created.load(Ordering::Relaxed),
            total_reused: self.total_reused.load(Ordering::Relaxed),
            idle,
        }
    }
}

impl Default for MessagePool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

/// Buffer checked out of a [`MessagePool`]; returned on drop.
#[derive(Debug)]
pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<MessagePool>,
}

impl PooledBuffer {
    pub(crate) fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    pub total_created: u64,
    pub total_reused: u64,
    /// Buffers currently waiting in the pool.
    pub idle: usize,
}

impl PoolStats {
    pub fn reuse_rate(&self) -> f64 {
        let total = self.total_created + self.total_reused;
        if total == 0 {
            0.0
        } else {
            self.total_reused as f64 / total as f64
        }
    }
}
