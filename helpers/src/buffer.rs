use std::collections::VecDeque;

/// RingBuffer keeps the latest `capacity` values pushed to it. Once the capacity is reached, the
/// oldest value is dropped for every new one. Used to smooth frame durations for display.
#[derive(Debug)]
pub struct RingBuffer<T> {
    vals: VecDeque<T>,
    capacity: usize,
}

impl<T: Into<f64> + Copy> RingBuffer<T> {
    pub fn new(capacity: usize) -> RingBuffer<T> {
        RingBuffer {
            vals: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, val: T) {
        if self.capacity == 0 {
            return;
        }
        if self.vals.len() == self.capacity {
            self.vals.pop_front();
        }
        self.vals.push_back(val);
    }

    pub fn is_full(&self) -> bool {
        self.vals.len() == self.capacity
    }

    pub fn get_avg(&self) -> Option<f64> {
        if self.vals.is_empty() {
            return None;
        }
        let sum: f64 = self.vals.iter().map(|&val| val.into()).sum();
        Some(sum / self.vals.len() as f64)
    }
}
