//! Accumulate-then-freeze construction of a [`PersistentList`].

use alloc::vec::Vec;

use crate::PersistentList;

/// A growable buffer that is finalized into a [`PersistentList`].
///
/// Elements are pushed in order and [`finish`](Self::finish) links them into
/// list nodes back to front, so the resulting list yields them in the order
/// they were pushed.
///
/// # Examples
///
/// ```
/// use changetype_internals::ListBuilder;
///
/// let mut builder = ListBuilder::with_capacity(3);
/// builder.push("a");
/// builder.push("b");
/// builder.push("c");
///
/// let list = builder.finish();
/// assert_eq!(list.head(), Some(&"a"));
/// assert_eq!(list.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct ListBuilder<T> {
    /// Elements pushed so far, in insertion order.
    buffer: Vec<T>,
}

impl<T> ListBuilder<T> {
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates an empty builder with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Appends an element to the back of the list being built.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.buffer.push(value);
    }

    /// Number of elements pushed so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Returns `true` if nothing has been pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Consumes the builder and returns the finished list.
    #[must_use]
    pub fn finish(self) -> PersistentList<T> {
        self.buffer
            .into_iter()
            .rev()
            .fold(PersistentList::new(), PersistentList::prepend)
    }
}

impl<T> Default for ListBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for ListBuilder<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.buffer.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_finish_preserves_push_order() {
        let mut builder = ListBuilder::new();
        for value in [5, 1, 4] {
            builder.push(value);
        }
        assert_eq!(builder.len(), 3);

        let list = builder.finish();
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), vec![5, 1, 4]);
    }

    #[test]
    fn test_empty_builder_finishes_empty() {
        let builder: ListBuilder<u8> = ListBuilder::default();
        assert!(builder.is_empty());
        assert!(builder.finish().is_empty());
    }
}
