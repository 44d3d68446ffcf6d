//! Generational slot storage backing every authoring handle.
//!
//! A handle pairs a slot index with the generation the slot had when the
//! value was inserted. Removing a value bumps the slot's generation, so any
//! handle still pointing at it fails lookup instead of reaching a reused slot.

use std::fmt;

/// Slot index plus generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Slot {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

#[derive(Debug)]
pub(crate) struct Arena<T> {
    entries: Vec<Entry<T>>,
    free_list: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> Slot {
        self.live += 1;
        if let Some(idx) = self.free_list.pop() {
            let entry = &mut self.entries[idx as usize];
            entry.value = Some(value);
            return Slot {
                idx,
                generation: entry.generation,
            };
        }
        let idx = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            value: Some(value),
        });
        Slot { idx, generation: 0 }
    }

    pub(crate) fn get(&self, slot: Slot) -> Option<&T> {
        self.entries
            .get(slot.idx as usize)
            .filter(|e| e.generation == slot.generation)
            .and_then(|e| e.value.as_ref())
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> Option<&mut T> {
        self.entries
            .get_mut(slot.idx as usize)
            .filter(|e| e.generation == slot.generation)
            .and_then(|e| e.value.as_mut())
    }

    pub(crate) fn remove(&mut self, slot: Slot) -> Option<T> {
        let entry = self
            .entries
            .get_mut(slot.idx as usize)
            .filter(|e| e.generation == slot.generation)?;
        let value = entry.value.take()?;
        // Bump generation so old handles immediately fail lookup.
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(slot.idx);
        self.live -= 1;
        Some(value)
    }

    /// Remove every value, invalidating all outstanding handles.
    pub(crate) fn clear(&mut self) {
        for (idx, entry) in self.entries.iter_mut().enumerate() {
            if entry.value.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free_list.push(idx as u32);
            }
        }
        self.live = 0;
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.live == 0
    }
}

macro_rules! handle_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) session: u32,
            pub(crate) slot: Slot,
        }

        impl $name {
            /// Returns the raw slot index (for diagnostics only).
            #[inline]
            #[must_use]
            pub const fn index(self) -> u32 {
                self.slot.idx
            }

            /// Returns the generation counter.
            #[inline]
            #[must_use]
            pub const fn generation(self) -> u32 {
                self.slot.generation
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(
                    f,
                    concat!($label, "({}@gen{} s{})"),
                    self.slot.idx, self.slot.generation, self.session
                )
            }
        }
    };
}

handle_type!(
    /// A handle to a group or paint layer inside an [`ExportSession`](crate::ExportSession).
    LayerId,
    "LayerId"
);
handle_type!(
    /// A handle to a drawing being authored on a paint layer.
    DrawingId,
    "DrawingId"
);
handle_type!(
    /// A handle to one element slot of a drawing.
    ElementId,
    "ElementId"
);
