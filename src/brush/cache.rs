// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Lazily computed derived values

use std::sync::OnceLock;

/// A derived value that is computed on first read and dropped on invalidation.
/// Reads never observe a stale value: invalidation needs `&mut self`, so it
/// cannot race a reader.
#[derive(Debug, Clone)]
pub struct Cached<T> {
    cell: OnceLock<T>,
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Return the cached value, computing it first if invalid
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(compute)
    }

    pub fn invalidate(&mut self) {
        self.cell.take();
    }

    #[cfg(test)]
    pub(crate) fn is_valid(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Cached<T> {
    fn default() -> Self {
        Self::new()
    }
}
