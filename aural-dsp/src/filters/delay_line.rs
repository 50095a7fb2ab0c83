//! Fixed-size circular delay line

/// Circular buffer of `f32`, sized once at configure time
#[derive(Debug, Clone)]
pub struct DelayLine {
    buffer: Vec<f32>,
    index: usize,
}

impl DelayLine {
    /// Allocate a delay line of `len` samples (at least one)
    pub fn new(len: usize) -> Self {
        Self {
            buffer: vec![0.0; len.max(1)],
            index: 0,
        }
    }

    /// Sample written `len` samples ago
    #[inline]
    pub fn read(&self) -> f32 {
        self.buffer[self.index]
    }

    /// Overwrite the current slot and move to the next one
    #[inline]
    pub fn write_and_advance(&mut self, value: f32) {
        self.buffer[self.index] = value;
        self.index += 1;
        if self.index >= self.buffer.len() {
            self.index = 0;
        }
    }

    /// Zero the contents without releasing the allocation
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_silent(&self) -> bool {
        self.buffer.iter().all(|&s| s == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_by_length() {
        let mut line = DelayLine::new(3);
        let input = [1.0, 2.0, 3.0, 4.0, 5.0];
        let mut output = Vec::new();
        for x in input {
            output.push(line.read());
            line.write_and_advance(x);
        }
        assert_eq!(output, vec![0.0, 0.0, 0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut line = DelayLine::new(16);
        line.write_and_advance(0.5);
        line.clear();
        assert_eq!(line.len(), 16);
        assert!(line.is_silent());
    }

    #[test]
    fn test_zero_length_rounds_up() {
        let line = DelayLine::new(0);
        assert_eq!(line.len(), 1);
    }
}
