//! Dense id-indexed storage.

/// Table of optional values indexed by cell id.
#[derive(Debug, Clone, PartialEq)]
pub struct Slots<T> {
    items: Vec<Option<T>>,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> Slots<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `id`, growing the table as needed. Returns the
    /// previous occupant.
    pub fn insert(&mut self, id: u32, value: T) -> Option<T> {
        let idx = id as usize;
        if idx >= self.items.len() {
            self.items.resize_with(idx + 1, || None);
        }
        self.items[idx].replace(value)
    }

    pub fn remove(&mut self, id: u32) -> Option<T> {
        self.items.get_mut(id as usize).and_then(Option::take)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        self.items.get(id as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn get_mut(&mut self, id: u32) -> Option<&mut T> {
        self.items.get_mut(id as usize).and_then(Option::as_mut)
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Occupied slots in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().map(|v| (i as u32, v)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.iter().filter(|v| v.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.iter().all(Option::is_none)
    }

    /// Capacity in ids; the next never-used id.
    #[must_use]
    pub fn extent(&self) -> u32 {
        self.items.len() as u32
    }
}
