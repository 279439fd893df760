/// Decides how much room a full value makes for new elements.
///
/// Passed to [`Value::push_with`](super::Value::push_with) by callers
/// that know their append patterns.
pub trait GrowthPolicy {
    /// Computes the new capacity for a value holding `len` elements in
    /// `capacity` slots.
    ///
    /// Results that do not leave room for at least one more element
    /// are rounded up to `capacity + 1`.
    fn grow(&self, len: usize, capacity: usize) -> usize;
}

/// Grows by a single slot at a time.
///
/// This is the policy used by [`Value::push`](super::Value::push).
#[derive(Clone, Copy, Debug, Default)]
pub struct Increment;

impl GrowthPolicy for Increment {
    fn grow(&self, _len: usize, capacity: usize) -> usize {
        capacity + 1
    }
}

/// Doubles the capacity, starting out with a minimum number of slots.
#[derive(Clone, Copy, Debug)]
pub struct Doubling(pub usize);

impl Default for Doubling {
    fn default() -> Self {
        Self(4)
    }
}

impl GrowthPolicy for Doubling {
    fn grow(&self, _len: usize, capacity: usize) -> usize {
        capacity.saturating_mul(2).max(self.0)
    }
}

impl<F: Fn(usize, usize) -> usize> GrowthPolicy for F {
    fn grow(&self, len: usize, capacity: usize) -> usize {
        self(len, capacity)
    }
}
