//! # Ordered Lists
//!
//! Shared engine behind every admin-managed list: form fields, schedule slots,
//! curriculum modules and bonus benefits.
//!
//! ## Invariants
//!
//! - `order` values are exactly `0..n-1` after every mutation
//! - Position in the vector and `order` always agree
//! - Entries that carry a key (form fields) keep it unique
//! - Visibility never touches ordering
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

pub trait Ordered {
    fn order(&self) -> u32;

    fn set_order(&mut self, order: u32);

    fn visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Identifier that must stay unique within a list, if the entry has one.
    fn key(&self) -> Option<&str> {
        None
    }

    /// Entry-local rules, checked on insert and on full replacement.
    fn check(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OrderedList<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ordered> OrderedList<T> {
    /// Accepts a list whose `order` values are a permutation of `0..n-1`, sorted into place.
    pub fn replace_all(mut items: Vec<T>) -> Result<Self, SchemaError> {
        let mut keys = HashSet::new();
        let mut seen = vec![false; items.len()];

        for item in &items {
            item.check()?;

            if let Some(key) = item.key() {
                if !keys.insert(key.to_string()) {
                    return Err(SchemaError::DuplicateName(key.to_string()));
                }
            }

            let slot = item.order() as usize;
            if slot >= seen.len() || seen[slot] {
                return Err(SchemaError::OrderGap {
                    expected_max: items.len().saturating_sub(1),
                    found: item.order(),
                });
            }
            seen[slot] = true;
        }

        items.sort_by_key(|item| item.order());

        Ok(Self { items })
    }

    pub fn add(&mut self, mut item: T) -> Result<(), SchemaError> {
        item.check()?;

        if let Some(key) = item.key() {
            if self.contains_key(key) {
                return Err(SchemaError::DuplicateName(key.to_string()));
            }
        }

        item.set_order(self.items.len() as u32);
        self.items.push(item);

        Ok(())
    }

    /// Replaces the entry at `index` in place, keeping its position.
    pub fn edit(&mut self, index: usize, mut item: T) -> Result<(), SchemaError> {
        if index >= self.items.len() {
            return Err(SchemaError::IndexOutOfRange(index));
        }

        item.check()?;

        if let Some(key) = item.key() {
            let clash = self
                .items
                .iter()
                .enumerate()
                .any(|(i, other)| i != index && other.key() == Some(key));

            if clash {
                return Err(SchemaError::DuplicateName(key.to_string()));
            }
        }

        item.set_order(index as u32);
        self.items[index] = item;

        Ok(())
    }

    pub fn delete(&mut self, index: usize) -> Result<T, SchemaError> {
        if index >= self.items.len() {
            return Err(SchemaError::IndexOutOfRange(index));
        }

        let removed = self.items.remove(index);
        self.renumber();

        Ok(removed)
    }

    /// Swaps with the neighbour in `direction`; a no-op at either end.
    pub fn reorder(&mut self, index: usize, direction: Direction) {
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1),
        };

        let Some(target) = target else {
            return;
        };

        if index >= self.items.len() || target >= self.items.len() {
            return;
        }

        self.items.swap(index, target);
        self.renumber();
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Result<bool, SchemaError> {
        let item = self
            .items
            .get_mut(index)
            .ok_or(SchemaError::IndexOutOfRange(index))?;

        let visible = !item.visible();
        item.set_visible(visible);

        Ok(visible)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.items.iter().any(|item| item.key() == Some(key))
    }

    pub fn visible(&self) -> impl Iterator<Item = &T> {
        self.items.iter().filter(|item| item.visible())
    }

    fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.set_order(i as u32);
        }
    }
}

impl<T> OrderedList<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }
}

impl<'de, T> Deserialize<'de> for OrderedList<T>
where
    T: Ordered + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;

        Self::replace_all(items).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Slot {
        name: &'static str,
        order: u32,
        visible: bool,
    }

    impl Ordered for Slot {
        fn order(&self) -> u32 {
            self.order
        }

        fn set_order(&mut self, order: u32) {
            self.order = order;
        }

        fn visible(&self) -> bool {
            self.visible
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }

        fn key(&self) -> Option<&str> {
            Some(self.name)
        }
    }

    fn slot(name: &'static str) -> Slot {
        Slot {
            name,
            order: 99,
            visible: true,
        }
    }

    fn filled(names: &[&'static str]) -> OrderedList<Slot> {
        let mut list = OrderedList::default();
        for name in names {
            list.add(slot(name)).unwrap();
        }
        list
    }

    fn orders(list: &OrderedList<Slot>) -> Vec<u32> {
        list.as_slice().iter().map(|s| s.order).collect()
    }

    fn names(list: &OrderedList<Slot>) -> Vec<&'static str> {
        list.as_slice().iter().map(|s| s.name).collect()
    }

    #[test]
    fn add_assigns_next_order() {
        let list = filled(&["a", "b", "c"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);
    }

    #[test]
    fn add_rejects_duplicate_key() {
        let mut list = filled(&["a"]);
        assert_eq!(
            list.add(slot("a")),
            Err(SchemaError::DuplicateName("a".to_string()))
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delete_renumbers() {
        let mut list = filled(&["a", "b", "c", "d"]);
        let removed = list.delete(1).unwrap();

        assert_eq!(removed.name, "b");
        assert_eq!(names(&list), vec!["a", "c", "d"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);
        assert_eq!(list.delete(3), Err(SchemaError::IndexOutOfRange(3)));
    }

    #[test]
    fn reorder_swaps_and_renumbers() {
        let mut list = filled(&["a", "b", "c"]);

        list.reorder(2, Direction::Up);
        assert_eq!(names(&list), vec!["a", "c", "b"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);

        list.reorder(0, Direction::Down);
        assert_eq!(names(&list), vec!["c", "a", "b"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);
    }

    #[test]
    fn reorder_at_boundaries_is_noop() {
        let mut list = filled(&["a", "b", "c"]);

        list.reorder(0, Direction::Up);
        list.reorder(2, Direction::Down);
        list.reorder(7, Direction::Up);

        assert_eq!(names(&list), vec!["a", "b", "c"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);
    }

    #[test]
    fn toggle_keeps_order() {
        let mut list = filled(&["a", "b"]);

        assert_eq!(list.toggle_visibility(1), Ok(false));
        assert_eq!(orders(&list), vec![0, 1]);
        assert_eq!(list.visible().count(), 1);
        assert_eq!(list.toggle_visibility(1), Ok(true));
        assert!(list.toggle_visibility(5).is_err());
    }

    #[test]
    fn edit_keeps_position_and_rejects_clash() {
        let mut list = filled(&["a", "b", "c"]);

        list.edit(1, slot("z")).unwrap();
        assert_eq!(names(&list), vec!["a", "z", "c"]);
        assert_eq!(orders(&list), vec![0, 1, 2]);

        // Same key at the same index is fine.
        list.edit(1, slot("z")).unwrap();

        assert_eq!(
            list.edit(0, slot("c")),
            Err(SchemaError::DuplicateName("c".to_string()))
        );
    }

    #[test]
    fn mixed_mutations_stay_contiguous() {
        let mut list = filled(&["a", "b", "c", "d", "e"]);

        list.delete(0).unwrap();
        list.reorder(3, Direction::Up);
        list.add(slot("f")).unwrap();
        list.delete(2).unwrap();
        list.reorder(0, Direction::Down);

        let expected: Vec<u32> = (0..list.len() as u32).collect();
        assert_eq!(orders(&list), expected);
    }

    #[test]
    fn replace_all_sorts_permutation() {
        let items = vec![
            Slot {
                name: "b",
                order: 1,
                visible: true,
            },
            Slot {
                name: "a",
                order: 0,
                visible: false,
            },
        ];

        let list = OrderedList::replace_all(items).unwrap();
        assert_eq!(names(&list), vec!["a", "b"]);
    }

    #[test]
    fn replace_all_rejects_gaps_and_duplicates() {
        let gap = vec![
            Slot {
                name: "a",
                order: 0,
                visible: true,
            },
            Slot {
                name: "b",
                order: 2,
                visible: true,
            },
        ];
        assert_eq!(
            OrderedList::replace_all(gap),
            Err(SchemaError::OrderGap {
                expected_max: 1,
                found: 2
            })
        );

        let repeated = vec![
            Slot {
                name: "a",
                order: 0,
                visible: true,
            },
            Slot {
                name: "b",
                order: 0,
                visible: true,
            },
        ];
        assert!(matches!(
            OrderedList::replace_all(repeated),
            Err(SchemaError::OrderGap { found: 0, .. })
        ));

        let dup = vec![
            Slot {
                name: "a",
                order: 0,
                visible: true,
            },
            Slot {
                name: "a",
                order: 1,
                visible: true,
            },
        ];
        assert_eq!(
            OrderedList::replace_all(dup),
            Err(SchemaError::DuplicateName("a".to_string()))
        );
    }
}
