use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

/// Generational index of an arena slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at the time the handle was issued.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

type ReleaseQueue = Rc<RefCell<Vec<Handle>>>;

/// Host-owned storage for native objects referenced by scripts.
///
/// Objects live until the last [`ScriptObject`] pointing at them is dropped and the next
/// [`Arena::sweep`] runs, or until [`Arena::clear`].
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    released: ReleaseQueue,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            released: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Store `value` and return the first script reference to it.
    pub fn insert(&mut self, value: T) -> ScriptObject<T> {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.value = Some(value);
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    value: Some(value),
                });
                Handle {
                    index,
                    generation: 0,
                }
            }
        };
        ScriptObject {
            lease: Rc::new(Lease {
                handle,
                released: Rc::downgrade(&self.released),
            }),
            _marker: PhantomData,
        }
    }

    fn slot(&self, handle: Handle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
    }

    /// Live object behind `handle`.
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slot(handle)?.value.as_ref()
    }

    /// Live object behind `handle`, mutably.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?
            .value
            .as_mut()
    }

    /// Two distinct live objects at once; `None` when `a == b` or either is stale.
    pub fn get_pair_mut(&mut self, a: Handle, b: Handle) -> Option<(&mut T, &mut T)> {
        if a.index == b.index || self.get(a).is_none() || self.get(b).is_none() {
            return None;
        }
        let (ai, bi) = (a.index as usize, b.index as usize);
        let (lo, hi) = if ai < bi { (ai, bi) } else { (bi, ai) };
        let (left, right) = self.slots.split_at_mut(hi);
        let lo_ref = left[lo].value.as_mut()?;
        let hi_ref = right[0].value.as_mut()?;
        Some(if ai < bi {
            (lo_ref, hi_ref)
        } else {
            (hi_ref, lo_ref)
        })
    }

    fn remove(&mut self, handle: Handle) -> Option<T> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?;
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        Some(value)
    }

    /// Free every object whose last script reference has been dropped. Returns the count freed.
    pub fn sweep(&mut self) -> usize {
        let released: Vec<Handle> = self.released.borrow_mut().drain(..).collect();
        released
            .into_iter()
            .filter_map(|h| self.remove(h))
            .count()
    }

    /// Free everything, live references included; their handles go stale.
    pub fn clear(&mut self) {
        self.released.borrow_mut().clear();
        for index in 0..self.slots.len() {
            let slot = &mut self.slots[index];
            if slot.value.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
    }

    /// Number of live objects.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// `true` when no object is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Lease {
    handle: Handle,
    released: Weak<RefCell<Vec<Handle>>>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        let Some(queue) = self.released.upgrade() else {
            return;
        };
        match queue.try_borrow_mut() {
            Ok(mut q) => q.push(self.handle),
            Err(_) => tracing::warn!(index = self.handle.index, "release queue busy; object leaked until clear"),
        };
    }
}

/// Script-side reference to an arena object.
///
/// Clones share one lease; dropping the last clone queues the handle for the next sweep.
pub struct ScriptObject<T> {
    lease: Rc<Lease>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScriptObject<T> {
    /// Handle of the referenced object.
    pub fn handle(&self) -> Handle {
        self.lease.handle
    }
}

impl<T> Clone for ScriptObject<T> {
    fn clone(&self) -> Self {
        Self {
            lease: Rc::clone(&self.lease),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ScriptObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptObject")
            .field("handle", &self.lease.handle)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/bridge/arena.rs"]
mod tests;
