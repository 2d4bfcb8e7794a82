use std::fmt::Debug;
use std::ops::{Index, IndexMut};

/// Slot arena with a free list of vacant indices.
///
/// Indices handed out by [`List::insert`] stay valid until the slot is
/// erased; erased slots are reused by later inserts in LIFO order.
#[derive(Clone, Debug)]
pub struct List<T> {
    data: Vec<Option<T>>,
    elements: usize,
    vacant: Vec<usize>,
}

impl<T> Default for List<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> List<T> {
    pub fn new() -> Self {
        Self::with_capacity(128)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            elements: 0,
            vacant: Vec::new(),
        }
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements == 0
    }

    /// Highest slot index ever handed out, plus one.
    pub fn slots(&self) -> usize {
        self.data.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index).and_then(Option::as_mut)
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.elements = 0;
        self.vacant.clear();
    }

    pub fn insert(&mut self, element: T) -> usize {
        self.elements += 1;
        if let Some(index) = self.vacant.pop() {
            self.data[index] = Some(element);
            return index;
        }
        self.data.push(Some(element));
        self.data.len() - 1
    }

    pub fn erase(&mut self, index: usize) -> Option<T> {
        let element = self.data.get_mut(index)?.take()?;
        self.elements -= 1;
        self.vacant.push(index);
        Some(element)
    }

    /// Occupied slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|element| (index, element)))
    }
}

impl<T> Index<usize> for List<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(element) => element,
            None => panic!("list slot {index} is vacant"),
        }
    }
}

impl<T> IndexMut<usize> for List<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Some(element) => element,
            None => panic!("list slot {index} is vacant"),
        }
    }
}
