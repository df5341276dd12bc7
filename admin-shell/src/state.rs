use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Slot<T> {
    value: RwLock<T>,
    revision: AtomicU64,
    dirty: AtomicBool,
}

/// Shared, observable value.
///
/// The storage behind every handle in this crate: table queries and rows,
/// drawer state, form values and the menu all live in one. Clones point at
/// the same slot. Every write bumps a revision counter and raises a dirty
/// flag a renderer can poll to decide whether to redraw.
///
/// A writer that panicked does not lock the value away; later readers see
/// whatever it left behind.
///
/// # Example
///
/// ```
/// use admin_shell::state::State;
///
/// let page = State::new(1u32);
/// let handle = page.clone();
///
/// handle.update(|p| *p += 1);
/// assert_eq!(page.get(), 2);
/// assert_eq!(page.revision(), 1);
/// assert!(page.is_dirty());
/// ```
pub struct State<T> {
    slot: Arc<Slot<T>>,
}

impl<T> State<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Arc::new(Slot {
                value: RwLock::new(value),
                revision: AtomicU64::new(0),
                dirty: AtomicBool::new(false),
            }),
        }
    }

    /// Snapshot of the value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.read().clone()
    }

    /// Read the value through a closure without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.read())
    }

    /// Replace the value.
    pub fn set(&self, value: T) {
        *self.write() = value;
        self.touch();
    }

    /// Mutate in place, returning what the closure returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.write());
        self.touch();
        out
    }

    /// Number of writes so far.
    pub fn revision(&self) -> u64 {
        self.slot.revision.load(Ordering::SeqCst)
    }

    pub fn is_dirty(&self) -> bool {
        self.slot.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.slot.dirty.store(false, Ordering::SeqCst);
    }

    fn touch(&self) {
        self.slot.revision.fetch_add(1, Ordering::SeqCst);
        self.slot.dirty.store(true, Ordering::SeqCst);
    }

    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.slot.value.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.slot.value.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("State")
            .field("value", &*self.read())
            .field("revision", &self.revision())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_value() {
        let a = State::new(String::from("x"));
        let b = a.clone();
        b.set("y".to_string());
        assert_eq!(a.get(), "y");
        assert_eq!(a.revision(), 1);
    }

    #[test]
    fn test_dirty_flag() {
        let s = State::new(0);
        assert!(!s.is_dirty());
        s.update(|v| *v = 5);
        assert!(s.is_dirty());
        s.clear_dirty();
        assert!(!s.is_dirty());
        assert_eq!(s.with(|v| *v * 2), 10);
    }

    #[test]
    fn test_survives_panicking_writer() {
        let s = State::new(vec![1]);
        let writer = s.clone();
        let _ = std::thread::spawn(move || {
            writer.update(|v| {
                v.push(2);
                panic!("writer failed");
            });
        })
        .join();
        assert_eq!(s.get(), vec![1, 2]);
    }
}
