//! The immutable singly-linked list.
//!
//! A [`PersistentList`] is a chain of reference-counted nodes. Every node
//! records the length of the list that starts at it, so [`PersistentList::len`]
//! is constant time. Operations that "modify" a list return a new list that
//! shares all untouched nodes with the old one.

use core::{
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
};

use triomphe::Arc;

/// A single cell of a [`PersistentList`].
struct Node<T> {
    /// The element stored in this cell.
    value: T,
    /// Number of elements in the list starting at this node.
    len: usize,
    /// The rest of the list.
    next: Option<Arc<Node<T>>>,
}

/// An immutable, order-preserving singly-linked list with structural sharing.
///
/// Cloning a list is O(1): only the reference count of the first node is
/// incremented. Prepending with [`cons`](Self::cons) leaves the original list
/// untouched and shares its nodes with the result.
///
/// # Examples
///
/// ```
/// use changetype_internals::PersistentList;
///
/// let tail: PersistentList<i32> = [2, 3].into_iter().collect();
/// let list = tail.cons(1);
///
/// assert_eq!(list.iter().copied().collect::<Vec<_>>(), [1, 2, 3]);
/// assert_eq!(tail.len(), 2);
/// assert_eq!(list.tail(), Some(tail));
/// ```
pub struct PersistentList<T> {
    /// The first node, or `None` for the empty list.
    head: Option<Arc<Node<T>>>,
}

impl<T> PersistentList<T> {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { head: None }
    }

    /// Returns the number of elements in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |node| node.len)
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns a reference to the first element, if any.
    #[must_use]
    pub fn head(&self) -> Option<&T> {
        self.head.as_ref().map(|node| &node.value)
    }

    /// Returns the list without its first element, or `None` when empty.
    ///
    /// The returned list shares every node with `self`.
    #[must_use]
    pub fn tail(&self) -> Option<Self> {
        let node = self.head.as_ref()?;
        Some(Self {
            head: node.next.clone(),
        })
    }

    /// Returns a new list with `value` in front of the elements of `self`.
    ///
    /// `self` is left unchanged. See [`prepend`](Self::prepend) for the
    /// variant that consumes the list and avoids a reference count increment.
    #[must_use]
    pub fn cons(&self, value: T) -> Self {
        self.clone().prepend(value)
    }

    /// Consumes the list and returns it with `value` in front.
    #[must_use]
    pub fn prepend(mut self, value: T) -> Self {
        let next = self.head.take();
        let len = next.as_ref().map_or(0, |node| node.len) + 1;
        Self {
            head: Some(Arc::new(Node { value, len, next })),
        }
    }

    /// Returns an iterator over references to the elements, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
            remaining: self.len(),
        }
    }

    /// Returns `true` if both lists start at the same node.
    ///
    /// This is a cheap identity check; structurally equal lists built
    /// independently are not `ptr_eq`.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Clone> PersistentList<T> {
    /// Returns a new list with the elements of `self` in reverse order.
    #[must_use]
    pub fn reversed(&self) -> Self {
        self.iter()
            .fold(Self::new(), |list, value| list.prepend(value.clone()))
    }
}

impl<T> Drop for PersistentList<T> {
    fn drop(&mut self) {
        // Unlink uniquely owned nodes one at a time so that dropping a long
        // list does not recurse once per element.
        let mut next = self.head.take();
        while let Some(node) = next {
            next = match Arc::try_unique(node) {
                Ok(unique) => triomphe::UniqueArc::into_inner(unique).next,
                Err(_) => None,
            };
        }
    }
}

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        Self {
            head: self.head.clone(),
        }
    }
}

impl<T> Default for PersistentList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

impl<T: Hash> Hash for PersistentList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self {
            value.hash(state);
        }
    }
}

impl<T> FromIterator<T> for PersistentList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut builder = crate::ListBuilder::new();
        builder.extend(iter);
        builder.finish()
    }
}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone> IntoIterator for PersistentList<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { list: self }
    }
}

/// Borrowing iterator over a [`PersistentList`].
///
/// Created by [`PersistentList::iter`].
pub struct Iter<'a, T> {
    /// The node holding the next element to yield.
    next: Option<&'a Node<T>>,
    /// Elements left to yield.
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            next: self.next,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// Owning iterator over a [`PersistentList`].
///
/// Elements held by nodes that no other list shares are moved out; elements
/// of shared nodes are cloned.
pub struct IntoIter<T: Clone> {
    /// The remaining elements.
    list: PersistentList<T>,
}

impl<T: Clone> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.head.take()?;
        match Arc::try_unique(node) {
            Ok(unique) => {
                let node = triomphe::UniqueArc::into_inner(unique);
                self.list.head = node.next;
                Some(node.value)
            }
            Err(shared) => {
                self.list.head = shared.next.clone();
                Some(shared.value.clone())
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.list.len();
        (len, Some(len))
    }
}

impl<T: Clone> ExactSizeIterator for IntoIter<T> {}

impl<T: Clone> FusedIterator for IntoIter<T> {}

impl<T: Clone + fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec::Vec};

    use super::*;

    #[test]
    fn test_list_send_sync() {
        static_assertions::assert_impl_all!(PersistentList<u8>: Send, Sync, Clone);
        static_assertions::assert_not_impl_any!(PersistentList<u8>: Copy);
    }

    #[test]
    fn test_empty_list() {
        let list: PersistentList<u8> = PersistentList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert_eq!(list.head(), None);
        assert!(list.tail().is_none());
        assert_eq!(list.iter().next(), None);
    }

    #[test]
    fn test_cons_shares_tail() {
        let base: PersistentList<i32> = [2, 3].into_iter().collect();
        let extended = base.cons(1);

        assert_eq!(extended.len(), 3);
        assert_eq!(base.len(), 2);
        assert_eq!(extended.head(), Some(&1));
        assert!(extended.tail().is_some_and(|tail| tail.ptr_eq(&base)));
    }

    #[test]
    fn test_equality_ignores_sharing() {
        let a: PersistentList<i32> = [1, 2, 3].into_iter().collect();
        let b: PersistentList<i32> = [1, 2, 3].into_iter().collect();
        let c: PersistentList<i32> = [1, 2].into_iter().collect();

        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, a.reversed());
    }

    #[test]
    fn test_into_iter_clones_shared_nodes() {
        let list: PersistentList<String> = ["a", "b"].into_iter().map(String::from).collect();
        let kept = list.clone();

        let drained: Vec<String> = list.into_iter().collect();
        assert_eq!(drained, ["a", "b"]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.head().map(String::as_str), Some("a"));
    }

    #[test]
    fn test_iter_size_hint() {
        let list: PersistentList<u8> = (0..10).collect();
        let mut iter = list.iter();
        assert_eq!(iter.len(), 10);
        iter.next();
        assert_eq!(iter.size_hint(), (9, Some(9)));
    }

    #[test]
    fn test_drop_long_list() {
        let list: PersistentList<u32> = (0..200_000).collect();
        assert_eq!(list.len(), 200_000);
        drop(list);
    }
}
