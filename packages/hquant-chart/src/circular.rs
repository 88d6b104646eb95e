use core::fmt;

/// Fixed-capacity look-back window (overwrite-oldest when full).
///
/// Indicator executors keep exactly `period` trailing inputs here; pushing
/// into a full window hands back the value that fell out. Storage grows with
/// the values pushed, so a large capacity over a short input stays small.
#[derive(Clone)]
pub struct RingWindow {
    capacity: usize,
    head: usize, // oldest element once full
    data: Vec<f64>,
}

impl fmt::Debug for RingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingWindow")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl RingWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            capacity,
            head: 0,
            data: Vec::new(),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.data.len() == self.capacity
    }

    /// Pushes `v`; returns the evicted oldest value when the window was full.
    #[inline]
    pub fn push(&mut self, v: f64) -> Option<f64> {
        if !self.is_full() {
            self.data.push(v);
            return None;
        }
        let evicted = core::mem::replace(&mut self.data[self.head], v);
        self.head = (self.head + 1) % self.capacity;
        Some(evicted)
    }

    /// Gets element by index from oldest (0 = oldest).
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        if i >= self.len() {
            return None;
        }
        Some(self.data[(self.head + i) % self.len()])
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let (newer, older) = self.data.split_at(self.head);
        older.iter().chain(newer).copied()
    }
}
