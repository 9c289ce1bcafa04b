use crossbeam_queue::ArrayQueue;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

const POOL_SLOTS: usize = 64;
const INITIAL_CAPACITY: usize = 256;
// Буферы, раздутые одной огромной записью, в пул не возвращаются
const MAX_RETAINED_CAPACITY: usize = 64 * 1024;

/// Пул байтовых буферов для форматирования записей.
/// Берётся из фонового writer'а и из консольного режима одновременно.
#[derive(Debug)]
pub struct BufferPool {
    slots: ArrayQueue<Vec<u8>>,
}

impl BufferPool {
    pub fn new() -> Arc<Self> {
        Self::with_slots(POOL_SLOTS)
    }

    pub fn with_slots(slots: usize) -> Arc<Self> {
        Arc::new(BufferPool {
            slots: ArrayQueue::new(slots.max(1)),
        })
    }

    pub fn acquire(self: &Arc<Self>) -> PooledBuffer {
        let buf = self
            .slots
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(INITIAL_CAPACITY));
        PooledBuffer {
            buf,
            pool: Arc::clone(self),
        }
    }

    pub fn idle(&self) -> usize {
        self.slots.len()
    }

    fn release(&self, mut buf: Vec<u8>) {
        if buf.capacity() > MAX_RETAINED_CAPACITY {
            return;
        }
        buf.clear();
        // Пул полон — буфер просто освобождается
        let _ = self.slots.push(buf);
    }
}

pub struct PooledBuffer {
    buf: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl Deref for PooledBuffer {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn returned_buffers_are_reused_and_cleared() {
        let pool = BufferPool::new();
        let ptr = {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"hello");
            buf.as_ptr()
        };
        assert_eq!(pool.idle(), 1);

        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert_eq!(buf.as_ptr(), ptr);
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn oversized_buffers_are_dropped() {
        let pool = BufferPool::new();
        {
            let mut buf = pool.acquire();
            buf.resize(MAX_RETAINED_CAPACITY + 1, b'x');
        }
        assert_eq!(pool.idle(), 0);
    }

    #[test]
    fn full_pool_discards_extra_buffers() {
        let pool = BufferPool::with_slots(2);
        let held: Vec<_> = (0..4).map(|_| pool.acquire()).collect();
        drop(held);
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn concurrent_borrowers() {
        let pool = BufferPool::with_slots(8);
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty());
                        buf.push(i as u8);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert!(pool.idle() <= 8);
    }
}
