//! # Slot Lists
//!
//! Three intrusive doubly-linked lists (free, used, pending) threaded through
//! a fixed array of link nodes. Links are slot indices; each list owns one
//! sentinel node stored past the last slot, so insert and remove are O(1)
//! with no branching on empty lists.

/// Which membership list a slot is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListId {
    /// Available for allocation.
    Free = 0,
    /// Live and visible to iteration and collision.
    Used = 1,
    /// Created this tick, not yet merged.
    Pending = 2,
}

impl ListId {
    const ALL: [Self; 3] = [Self::Free, Self::Used, Self::Pending];
}

#[derive(Clone, Copy, Debug)]
struct Link {
    prev: u32,
    next: u32,
    list: ListId,
}

/// Index-linked membership lists for a fixed number of slots.
///
/// Every slot is on exactly one list at all times: the only mutation is
/// [`SlotLists::move_to_back`], which unlinks and relinks in one step.
///
/// # Example
///
/// ```rust,ignore
/// let mut lists = SlotLists::new(8);
/// let slot = lists.first(ListId::Free).unwrap();
/// lists.move_to_back(slot, ListId::Pending);
/// ```
pub struct SlotLists {
    /// Slot nodes followed by one sentinel per list.
    links: Box<[Link]>,
    /// Length of each list.
    lens: [usize; 3],
    /// Number of slot nodes.
    capacity: usize,
}

impl SlotLists {
    /// Creates lists for `capacity` slots, all on the free list in slot order.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or does not fit the link index type.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            capacity <= (u32::MAX - 3) as usize,
            "Capacity cannot exceed u32::MAX - 3"
        );

        let placeholder = Link {
            prev: 0,
            next: 0,
            list: ListId::Free,
        };
        let mut lists = Self {
            links: vec![placeholder; capacity + 3].into_boxed_slice(),
            lens: [0; 3],
            capacity,
        };
        lists.reset();
        lists
    }

    /// Puts every slot back on the free list in slot order.
    pub fn reset(&mut self) {
        for list in ListId::ALL {
            let s = self.sentinel(list);
            self.links[s] = Link {
                prev: Self::idx(s),
                next: Self::idx(s),
                list,
            };
        }
        self.lens = [0; 3];

        for slot in 0..self.capacity {
            self.links[slot].list = ListId::Free;
            self.link_back(slot, ListId::Free);
        }
    }

    /// Number of slots.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots on `list`.
    #[inline]
    #[must_use]
    pub const fn len(&self, list: ListId) -> usize {
        self.lens[list as usize]
    }

    /// List `slot` is currently on.
    #[inline]
    #[must_use]
    pub fn list_of(&self, slot: usize) -> ListId {
        self.links[slot].list
    }

    /// First slot on `list`.
    #[inline]
    #[must_use]
    pub fn first(&self, list: ListId) -> Option<usize> {
        let head = self.links[self.sentinel(list)].next as usize;
        self.as_slot(head)
    }

    /// Slot after `slot` on the same list.
    ///
    /// Read this before mutating `slot` to walk a list while removing from it.
    #[inline]
    #[must_use]
    pub fn next(&self, slot: usize) -> Option<usize> {
        self.as_slot(self.links[slot].next as usize)
    }

    /// Moves `slot` from whatever list it is on to the back of `list`.
    ///
    /// This is a **O(1)** operation.
    pub fn move_to_back(&mut self, slot: usize, list: ListId) {
        self.unlink(slot);
        self.link_back(slot, list);
    }

    /// Iterates `list` front to back.
    pub fn iter(&self, list: ListId) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first(list), move |&slot| self.next(slot))
    }

    #[inline]
    fn sentinel(&self, list: ListId) -> usize {
        self.capacity + list as usize
    }

    #[inline]
    fn as_slot(&self, node: usize) -> Option<usize> {
        (node < self.capacity).then_some(node)
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    const fn idx(node: usize) -> u32 {
        node as u32
    }

    fn unlink(&mut self, slot: usize) {
        let Link { prev, next, list } = self.links[slot];
        self.links[prev as usize].next = next;
        self.links[next as usize].prev = prev;
        self.lens[list as usize] -= 1;
    }

    fn link_back(&mut self, slot: usize, list: ListId) {
        let s = self.sentinel(list);
        let tail = self.links[s].prev;
        self.links[slot] = Link {
            prev: tail,
            next: Self::idx(s),
            list,
        };
        self.links[tail as usize].next = Self::idx(slot);
        self.links[s].prev = Self::idx(slot);
        self.lens[list as usize] += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_puts_everything_on_free() {
        let lists = SlotLists::new(4);
        assert_eq!(lists.len(ListId::Free), 4);
        assert_eq!(lists.len(ListId::Used), 0);
        assert_eq!(lists.iter(ListId::Free).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
        assert_eq!(lists.first(ListId::Pending), None);
    }

    #[test]
    fn test_move_preserves_order() {
        let mut lists = SlotLists::new(5);
        lists.move_to_back(3, ListId::Used);
        lists.move_to_back(1, ListId::Used);
        lists.move_to_back(4, ListId::Used);

        assert_eq!(lists.iter(ListId::Used).collect::<Vec<_>>(), vec![3, 1, 4]);
        assert_eq!(lists.iter(ListId::Free).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(lists.list_of(1), ListId::Used);

        lists.move_to_back(1, ListId::Free);
        assert_eq!(lists.iter(ListId::Used).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(lists.iter(ListId::Free).collect::<Vec<_>>(), vec![0, 2, 1]);
    }

    #[test]
    fn test_remove_while_walking() {
        let mut lists = SlotLists::new(6);
        for slot in 0..6 {
            lists.move_to_back(slot, ListId::Used);
        }

        let mut cursor = lists.first(ListId::Used);
        while let Some(slot) = cursor {
            cursor = lists.next(slot);
            if slot % 2 == 0 {
                lists.move_to_back(slot, ListId::Free);
            }
        }

        assert_eq!(lists.iter(ListId::Used).collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(lists.len(ListId::Free), 3);
    }

    #[test]
    fn test_reset() {
        let mut lists = SlotLists::new(3);
        lists.move_to_back(2, ListId::Pending);
        lists.reset();
        assert_eq!(lists.len(ListId::Free), 3);
        assert_eq!(lists.len(ListId::Pending), 0);
    }
}
