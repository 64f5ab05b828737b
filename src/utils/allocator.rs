use serde::{Deserialize, Serialize};

/// Handle to a body slot, carrying a generation so that a handle kept after
/// `destroy_body` is detected instead of resolving to a recycled slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    pub fn from_index(index: u32) -> Self {
        Self::new(index, 0)
    }

    pub fn index(&self) -> usize {
        self.index as usize
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn is_null(&self) -> bool {
        self.index == u32::MAX
    }
}

impl Default for BodyHandle {
    fn default() -> Self {
        Self::new(u32::MAX, 0)
    }
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    item: Option<T>,
}

/// Generational arena backing the body registry. Handles stay stable across
/// removals, and a stale handle never resolves to a different body.
#[derive(Debug)]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn insert(&mut self, item: T) -> BodyHandle {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.item = Some(item);
            return BodyHandle::new(index as u32, slot.generation);
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            generation: 0,
            item: Some(item),
        });
        BodyHandle::new(index as u32, 0)
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.item.as_ref())
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.item.as_mut())
    }

    /// Mutable access to two distinct slots at once, as needed when resolving
    /// a contact between two bodies.
    pub fn get2_mut(&mut self, a: BodyHandle, b: BodyHandle) -> Option<(&mut T, &mut T)> {
        if a.index() == b.index() || !self.contains(a) || !self.contains(b) {
            return None;
        }

        let (low, high, flipped) = if a.index() < b.index() {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };

        let (left, right) = self.slots.split_at_mut(high);
        let low_item = left[low].item.as_mut()?;
        let high_item = right[0].item.as_mut()?;

        if flipped {
            Some((high_item, low_item))
        } else {
            Some((low_item, high_item))
        }
    }

    pub fn remove(&mut self, handle: BodyHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation() || slot.item.is_none() {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index());
        slot.item.take()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.slots
            .get(handle.index())
            .map(|slot| slot.generation == handle.generation() && slot.item.is_some())
            .unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.item.as_ref())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.item.as_mut())
    }

    /// Handles of all live slots, in slot-index order. The fixed iteration
    /// order is what keeps broadphase output reproducible between calls.
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.item
                .as_ref()
                .map(|_| BodyHandle::new(index as u32, slot.generation))
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.item.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
