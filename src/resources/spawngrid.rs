//! Target slot occupancy grid.
//!
//! Targets are spawned into a fixed `columns × rows` grid of slots. A slot
//! stays occupied for as long as its target is alive; destroying or expiring
//! the target frees it again.

use bevy_ecs::prelude::Resource;
use fastrand::Rng;

/// Column/row coordinate of a spawn slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSlot {
    pub column: usize,
    pub row: usize,
}

impl GridSlot {
    pub fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

#[derive(Resource, Debug, Clone)]
pub struct SpawnGrid {
    columns: usize,
    rows: usize,
    occupied: Vec<bool>,
    occupied_count: usize,
}

impl SpawnGrid {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            occupied: vec![false; columns * rows],
            occupied_count: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.occupied.len()
    }

    /// Number of slots currently held by a target.
    pub fn occupied_count(&self) -> usize {
        self.occupied_count
    }

    fn index(&self, slot: GridSlot) -> Option<usize> {
        (slot.column < self.columns && slot.row < self.rows)
            .then_some(slot.row * self.columns + slot.column)
    }

    pub fn is_occupied(&self, slot: GridSlot) -> bool {
        self.index(slot).is_some_and(|i| self.occupied[i])
    }

    /// Mark `slot` as taken. Returns false if it was already taken or lies
    /// outside the grid.
    pub fn occupy(&mut self, slot: GridSlot) -> bool {
        match self.index(slot) {
            Some(i) if !self.occupied[i] => {
                self.occupied[i] = true;
                self.occupied_count += 1;
                true
            }
            _ => false,
        }
    }

    /// Release `slot`. Returns false if it was not taken.
    pub fn free(&mut self, slot: GridSlot) -> bool {
        match self.index(slot) {
            Some(i) if self.occupied[i] => {
                self.occupied[i] = false;
                self.occupied_count -= 1;
                true
            }
            _ => false,
        }
    }

    pub fn free_slots(&self) -> impl Iterator<Item = GridSlot> + '_ {
        self.occupied
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(i, _)| GridSlot::new(i % self.columns, i / self.columns))
    }

    /// Uniformly random free slot, or `None` when the grid is full.
    pub fn pick_free(&self, rng: &mut Rng) -> Option<GridSlot> {
        let free = self.capacity() - self.occupied_count;
        if free == 0 {
            return None;
        }
        self.free_slots().nth(rng.usize(0..free))
    }

    pub fn clear(&mut self) {
        self.occupied.fill(false);
        self.occupied_count = 0;
    }
}
