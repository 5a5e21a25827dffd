//! Generation-checked arena for bodies.
//!
//! Bodies live in a dense `Vec` in spawn order, which is the order collision
//! pairs are enumerated in. Handles point at slots; a slot records the
//! current generation and where its body sits in the dense vector, so the
//! vector can grow or close gaps without invalidating live handles.

use super::body::Body;

/// Stable reference to a body returned by `Solver::add_object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl BodyHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    dense: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct BodyStore {
    bodies: Vec<Body>,
    // dense index -> slot index
    owners: Vec<u32>,
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a body after every live body and returns its handle.
    pub fn insert(&mut self, body: Body) -> BodyHandle {
        let dense = self.bodies.len();
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                (self.slots.len() - 1) as u32
            }
        };
        let slot = &mut self.slots[index as usize];
        slot.dense = Some(dense);
        self.bodies.push(body);
        self.owners.push(index);
        BodyHandle {
            index,
            generation: slot.generation,
        }
    }

    fn dense_index(&self, handle: BodyHandle) -> Option<usize> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.dense
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.dense_index(handle).is_some()
    }

    pub fn get(&self, handle: BodyHandle) -> Option<&Body> {
        self.dense_index(handle).map(|i| &self.bodies[i])
    }

    pub fn get_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        let i = self.dense_index(handle)?;
        Some(&mut self.bodies[i])
    }

    /// Removes a body, keeping the relative order of the rest.
    /// The handle (and every copy of it) is stale afterwards.
    pub fn remove(&mut self, handle: BodyHandle) -> Option<Body> {
        let dense = self.dense_index(handle)?;
        let slot = &mut self.slots[handle.index as usize];
        slot.dense = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);

        let body = self.bodies.remove(dense);
        self.owners.remove(dense);
        for (i, &owner) in self.owners.iter().enumerate().skip(dense) {
            self.slots[owner as usize].dense = Some(i);
        }
        Some(body)
    }

    /// Handle of the body at dense position `dense`.
    pub fn handle_at(&self, dense: usize) -> Option<BodyHandle> {
        let index = *self.owners.get(dense)?;
        Some(BodyHandle {
            index,
            generation: self.slots[index as usize].generation,
        })
    }

    /// Handles of all live bodies, in spawn order.
    pub fn handles(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        (0..self.bodies.len()).filter_map(move |i| self.handle_at(i))
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }
}
