use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::StateStore;
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    unavailable: bool,
    writes: usize,
}

/// In-process store. Clones share contents, which lets a test "reload" by
/// building a second engine over the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, as if an earlier run had written it.
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .inner
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
        store
    }

    /// Simulate storage being disabled or over quota.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.inner.borrow_mut().unavailable = unavailable;
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.borrow().entries.get(key).cloned()
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.inner.borrow().writes
    }
}

impl StateStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.borrow();
        if inner.unavailable {
            return Err(StoreError::Unavailable("storage disabled".into()));
        }
        Ok(inner.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.borrow_mut();
        if inner.unavailable {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        inner.entries.insert(key.to_string(), value.to_string());
        inner.writes += 1;
        Ok(())
    }
}
