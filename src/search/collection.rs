use std::sync::{Arc, PoisonError, RwLock};

/// Shared list of records, replaced wholesale by whoever loads it
///
/// Clones share storage: the loader keeps one handle and search reads
/// through another.
#[derive(Debug)]
pub struct Collection<T> {
    items: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(RwLock::new(items)),
        }
    }

    pub fn replace(&self, items: Vec<T>) {
        *self.items.write().unwrap_or_else(PoisonError::into_inner) = items;
    }

    pub fn clear(&self) {
        self.replace(Vec::new());
    }

    /// Run `f` against the current items
    pub fn with_items<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        f(&items)
    }

    pub fn len(&self) -> usize {
        self.with_items(<[T]>::len)
    }

    pub fn is_empty(&self) -> bool {
        self.with_items(<[T]>::is_empty)
    }
}

impl<T: Clone> Collection<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.with_items(<[T]>::to_vec)
    }
}
