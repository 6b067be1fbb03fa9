//! Location history.

/// Entries kept before the oldest is dropped.
pub const DEFAULT_CAPACITY: usize = 100;

/// Stack of visited locations with a cursor, like a browser tab's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationHistory {
    entries: Vec<String>,
    cursor: usize,
    capacity: usize,
}

impl Default for LocationHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl LocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// History holding at most `capacity` locations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Visit `location`. Forward entries are discarded; pushing the current
    /// location again is a no-op. Past capacity the oldest entry is dropped.
    pub fn push(&mut self, location: impl Into<String>) {
        let location = location.into();
        if self.current() == Some(location.as_str()) {
            return;
        }
        if !self.entries.is_empty() {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push(location);
        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Step back one entry and return it.
    pub fn back(&mut self) -> Option<&str> {
        if !self.can_go_back() {
            return None;
        }
        self.cursor -= 1;
        self.current()
    }

    /// Step forward one entry and return it.
    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        self.current()
    }

    pub fn current(&self) -> Option<&str> {
        self.entries.get(self.cursor).map(String::as_str)
    }

    pub fn can_go_back(&self) -> bool {
        self.cursor > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_back() {
        let mut history = LocationHistory::new();
        assert_eq!(history.back(), None);

        history.push("/search?q=a&lang=English");
        history.push("/search?q=b&lang=English");
        assert_eq!(history.current(), Some("/search?q=b&lang=English"));
        assert_eq!(history.back(), Some("/search?q=a&lang=English"));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some("/search?q=b&lang=English"));
    }

    #[test]
    fn test_push_discards_forward_entries() {
        let mut history = LocationHistory::new();
        history.push("/1");
        history.push("/2");
        history.push("/3");
        history.back();
        history.back();
        history.push("/4");

        assert_eq!(history.len(), 2);
        assert_eq!(history.forward(), None);
        assert_eq!(history.back(), Some("/1"));
    }

    #[test]
    fn test_repeat_push_is_ignored() {
        let mut history = LocationHistory::new();
        history.push("/1");
        history.push("/1");
        assert_eq!(history.len(), 1);
        assert!(!history.can_go_back());
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = LocationHistory::with_capacity(3);
        for page in 1..=5 {
            history.push(format!("/search?q=a&lang=English&page={}", page));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), Some("/search?q=a&lang=English&page=5"));
        assert_eq!(history.back(), Some("/search?q=a&lang=English&page=4"));
        assert_eq!(history.back(), Some("/search?q=a&lang=English&page=3"));
        assert_eq!(history.back(), None);
    }

    #[test]
    fn test_default_capacity_bounds_long_sessions() {
        let mut history = LocationHistory::new();
        assert_eq!(history.capacity(), DEFAULT_CAPACITY);
        for page in 0..DEFAULT_CAPACITY * 3 {
            history.push(format!("/{}", page));
        }
        assert_eq!(history.len(), DEFAULT_CAPACITY);
        assert_eq!(history.current(), Some(format!("/{}", DEFAULT_CAPACITY * 3 - 1).as_str()));
    }
}
