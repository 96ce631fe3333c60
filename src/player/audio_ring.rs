use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Overwriting ring of interleaved f32 samples, shared between the decoder
/// worker and the audio output. Writes never block: when the ring is full
/// the oldest samples are dropped in bulk to make room.
pub struct AudioRing {
    samples: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl AudioRing {
    pub fn with_capacity(capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        })
    }

    /// Append samples, evicting the oldest ones if the ring would overflow.
    /// A chunk larger than the whole ring keeps only its tail.
    pub fn write(&self, chunk: &[f32]) {
        let mut buf = self.samples.lock();
        let chunk = if chunk.len() > self.capacity {
            &chunk[chunk.len() - self.capacity..]
        } else {
            chunk
        };
        let overflow = (buf.len() + chunk.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            buf.drain(..overflow);
        }
        buf.extend(chunk.iter().copied());
    }

    /// Pop the oldest sample, if any.
    pub fn read(&self) -> Option<f32> {
        self.samples.lock().pop_front()
    }

    pub fn clear(&self) {
        self.samples.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_in_write_order() {
        let ring = AudioRing::with_capacity(8);
        ring.write(&[1.0, 2.0, 3.0]);
        assert_eq!(ring.read(), Some(1.0));
        assert_eq!(ring.read(), Some(2.0));
        assert_eq!(ring.read(), Some(3.0));
        assert_eq!(ring.read(), None);
    }

    #[test]
    fn overflow_evicts_oldest_in_bulk() {
        let ring = AudioRing::with_capacity(4);
        ring.write(&[1.0, 2.0, 3.0, 4.0]);
        ring.write(&[5.0, 6.0]);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.read(), Some(3.0));
        assert_eq!(ring.read(), Some(4.0));
        assert_eq!(ring.read(), Some(5.0));
        assert_eq!(ring.read(), Some(6.0));
    }

    #[test]
    fn oversized_chunk_keeps_tail() {
        let ring = AudioRing::with_capacity(3);
        ring.write(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(ring.read(), Some(3.0));
        assert_eq!(ring.read(), Some(4.0));
        assert_eq!(ring.read(), Some(5.0));
    }

    #[test]
    fn clear_empties_the_ring() {
        let ring = AudioRing::with_capacity(4);
        ring.write(&[1.0, 2.0]);
        ring.clear();
        assert!(ring.is_empty());
    }
}
