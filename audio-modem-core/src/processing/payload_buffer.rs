/// Receive-side byte buffer with grow-to-fit semantics.
///
/// Starts at a default capacity and grows to exactly the size the decoder
/// reports as ready, never shrinking. Growing is the only allocation on the
/// receive tick.
#[derive(Debug, Clone)]
pub struct PayloadBuffer {
    bytes: Vec<u8>,
}

impl PayloadBuffer {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            bytes: vec![0; default_capacity],
        }
    }

    /// Usable size in bytes.
    pub fn capacity(&self) -> usize {
        self.bytes.len()
    }

    /// Grow to exactly `required` bytes if the buffer is smaller.
    ///
    /// Returns true if the buffer grew.
    pub fn grow_to_fit(&mut self, required: usize) -> bool {
        if required <= self.bytes.len() {
            return false;
        }
        self.bytes.resize(required, 0);
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_to_exact_size() {
        let mut buf = PayloadBuffer::new(8);
        assert!(buf.grow_to_fit(13));
        assert_eq!(buf.capacity(), 13);
    }

    #[test]
    fn never_shrinks() {
        let mut buf = PayloadBuffer::new(8);
        buf.grow_to_fit(20);
        assert!(!buf.grow_to_fit(4));
        assert!(!buf.grow_to_fit(20));
        assert_eq!(buf.capacity(), 20);
    }

    #[test]
    fn growth_preserves_prefix() {
        let mut buf = PayloadBuffer::new(2);
        buf.as_mut_slice().copy_from_slice(&[1, 2]);
        buf.grow_to_fit(4);
        assert_eq!(buf.as_slice(), &[1, 2, 0, 0]);
    }
}
