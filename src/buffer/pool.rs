//! Thread-local buffer pool for read buffers.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};

/// Largest buffer worth returning to the pool.
pub const MAX_POOLED_CAPACITY: usize = 1024 * 1024;

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A reusable, zero-filled byte buffer of fixed length.
pub struct Buffer {
    data: Vec<u8>,
}

impl Buffer {
    /// Takes a buffer of `len` bytes from the thread-local pool or allocates one.
    pub fn take(len: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.clear();
        data.resize(len, 0);
        Self { data }
    }
}

impl Deref for Buffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl DerefMut for Buffer {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_take_has_requested_len() {
        let buf = Buffer::take(4096);
        assert_eq!(buf.len(), 4096);
    }

    #[test]
    fn test_reused_buffer_is_zeroed() {
        {
            let mut buf = Buffer::take(16);
            buf.copy_from_slice(&[0xFF; 16]);
        }

        let buf = Buffer::take(8);
        assert_eq!(buf.len(), 8);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_buffer_reuse_keeps_capacity() {
        {
            let _buf = Buffer::take(1024);
        }
        let buf = Buffer::take(10);
        assert!(buf.data.capacity() >= 10);
    }
}
