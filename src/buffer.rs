//! Pooled line buffers.
//!
//! Every emission assembles its line in a scratch buffer checked out of a
//! process-wide free list, so steady-state logging allocates nothing per line.
//! The buffer is returned on drop, on every exit path.

use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

const INITIAL_CAPACITY: usize = 1024;

// Buffers that grew past this are dropped instead of pooled, so one huge
// record cannot pin memory forever.
const MAX_POOLED_CAPACITY: usize = 16 * 1024;
const MAX_POOLED: usize = 32;

static POOL: Mutex<Vec<String>> = Mutex::new(Vec::new());

/// A line-assembly buffer borrowed from the pool.
pub struct LineBuf {
    inner: String,
}

impl LineBuf {
    /// Checks a cleared buffer out of the pool, allocating if it is empty.
    pub fn acquire() -> Self {
        let recycled = match POOL.lock() {
            Ok(mut pool) => pool.pop(),
            Err(poisoned) => poisoned.into_inner().pop(),
        };
        Self {
            inner: recycled.unwrap_or_else(|| String::with_capacity(INITIAL_CAPACITY)),
        }
    }
}

impl Deref for LineBuf {
    type Target = String;

    fn deref(&self) -> &String {
        &self.inner
    }
}

impl DerefMut for LineBuf {
    fn deref_mut(&mut self) -> &mut String {
        &mut self.inner
    }
}

impl Drop for LineBuf {
    fn drop(&mut self) {
        if self.inner.capacity() > MAX_POOLED_CAPACITY {
            return;
        }
        let mut buf = std::mem::take(&mut self.inner);
        buf.clear();

        let mut pool = match POOL.lock() {
            Ok(pool) => pool,
            Err(poisoned) => poisoned.into_inner(),
        };
        if pool.len() < MAX_POOLED {
            pool.push(buf);
        }
    }
}
