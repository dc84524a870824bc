//! Palettes for indexed Pix images.
//!
//! A [`PixColormap`] is created on its own and then either dropped or moved
//! into exactly one [`Pix`](crate::Pix) with
//! [`Pix::set_colormap`](crate::Pix::set_colormap). After that the Pix owns
//! it and frees it with the rest of its storage.

use alloc::vec::Vec;

use crate::color::PixColor;
use crate::error::PixError;

/// Seed for [`PixColormap::create_random`]; fixed so the palette is reproducible.
const RANDOM_SEED: u32 = 0x2545_F491;

/// An ordered palette holding at most `2^depth` colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixColormap {
    depth: u32,
    colors: Vec<PixColor>,
}

fn check_depth(depth: u32) -> Result<(), PixError> {
    match depth {
        1 | 2 | 4 | 8 => Ok(()),
        other => Err(PixError::InvalidDepth(other)),
    }
}

impl PixColormap {
    /// Empty colormap for `depth` ∈ {1, 2, 4, 8}.
    pub fn create(depth: u32) -> Result<Self, PixError> {
        check_depth(depth)?;
        Ok(Self {
            depth,
            colors: Vec::with_capacity(1usize << depth),
        })
    }

    /// Gray ramp of `levels` entries from black to white.
    pub fn create_linear(depth: u32, levels: u32) -> Result<Self, PixError> {
        check_depth(depth)?;
        if levels < 2 || levels > (1u32 << depth) {
            return Err(PixError::InvalidLevels { depth, levels });
        }
        let mut cmap = Self::create(depth)?;
        for i in 0..levels {
            let val = (255 * i / (levels - 1)) as u8;
            cmap.colors.push(PixColor::new(val, val, val));
        }
        Ok(cmap)
    }

    /// Full colormap of pseudo-random colors.
    ///
    /// `first_is_black` pins index 0 to black, `last_is_white` pins the last
    /// index to white. The sequence is deterministic.
    pub fn create_random(
        depth: u32,
        first_is_black: bool,
        last_is_white: bool,
    ) -> Result<Self, PixError> {
        check_depth(depth)?;
        let ncolors = 1usize << depth;
        let mut cmap = Self::create(depth)?;
        let mut state = RANDOM_SEED;
        let mut next = || {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        };
        for i in 0..ncolors {
            let color = if first_is_black && i == 0 {
                PixColor::BLACK
            } else if last_is_white && i == ncolors - 1 {
                PixColor::WHITE
            } else {
                PixColor::from_rgb(next())
            };
            cmap.colors.push(color);
        }
        Ok(cmap)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Maximum number of entries, `2^depth`.
    pub fn capacity(&self) -> usize {
        1usize << self.depth
    }

    pub fn count(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.count()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() >= self.capacity()
    }

    pub fn colors(&self) -> &[PixColor] {
        &self.colors
    }

    pub fn iter(&self) -> impl Iterator<Item = PixColor> + '_ {
        self.colors.iter().copied()
    }

    /// Append `color`. Returns `false`, leaving the colormap untouched, when full.
    pub fn add_color(&mut self, color: PixColor) -> bool {
        if self.is_full() {
            return false;
        }
        self.colors.push(color);
        true
    }

    /// Index of the first entry with the same RGB as `color`.
    pub fn find_color(&self, color: PixColor) -> Option<usize> {
        self.colors.iter().position(|c| c.same_rgb(color))
    }

    /// Index of the entry closest to `color` in RGB space.
    pub fn nearest_color(&self, color: PixColor) -> Option<usize> {
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.distance_sq(color), *i))
            .map(|(i, _)| i)
    }

    /// Index of an existing entry matching `color`, adding it if absent.
    ///
    /// Returns `None` when there is no match and no room to add one.
    pub fn add_new_color(&mut self, color: PixColor) -> Option<usize> {
        if let Some(index) = self.find_color(color) {
            return Some(index);
        }
        if self.add_color(color) {
            Some(self.colors.len() - 1)
        } else {
            None
        }
    }

    /// Like [`add_new_color`](Self::add_new_color), but a full colormap
    /// answers with the nearest existing entry instead of failing.
    pub fn add_nearest_color(&mut self, color: PixColor) -> usize {
        match self.add_new_color(color) {
            Some(index) => index,
            // full implies non-empty, so a nearest entry exists
            None => self.nearest_color(color).unwrap_or(0),
        }
    }

    /// Add black (`white == false`) or white if not already present.
    ///
    /// A full colormap answers with its darkest or lightest entry.
    pub fn add_black_or_white(&mut self, white: bool) -> usize {
        let color = if white {
            PixColor::WHITE
        } else {
            PixColor::BLACK
        };
        match self.add_new_color(color) {
            Some(index) => index,
            None if white => self.lightest().unwrap_or(0),
            None => self.darkest().unwrap_or(0),
        }
    }

    /// Overwrite the darkest entry with black and/or the lightest with white.
    pub fn set_black_and_white(&mut self, set_black: bool, set_white: bool) {
        if set_black {
            if let Some(i) = self.darkest() {
                self.colors[i] = PixColor::BLACK;
            }
        }
        if set_white {
            if let Some(i) = self.lightest() {
                self.colors[i] = PixColor::WHITE;
            }
        }
    }

    /// Whether `color` can be represented: room remains or it is already present.
    pub fn is_usable_color(&self, color: PixColor) -> bool {
        !self.is_full() || self.find_color(color).is_some()
    }

    pub fn clear(&mut self) {
        self.colors.clear();
    }

    pub fn get(&self, index: usize) -> Result<PixColor, PixError> {
        self.colors
            .get(index)
            .copied()
            .ok_or(PixError::IndexOutOfRange {
                index,
                len: self.colors.len(),
            })
    }

    /// Overwrite entry `index` in place; the count does not change.
    pub fn set(&mut self, index: usize, color: PixColor) -> Result<(), PixError> {
        let len = self.colors.len();
        let slot = self
            .colors
            .get_mut(index)
            .ok_or(PixError::IndexOutOfRange { index, len })?;
        *slot = color;
        Ok(())
    }

    fn darkest(&self) -> Option<usize> {
        self.colors
            .iter()
            .enumerate()
            .min_by_key(|(i, c)| (c.intensity(), *i))
            .map(|(i, _)| i)
    }

    fn lightest(&self) -> Option<usize> {
        // ties resolve to the lowest index
        self.colors
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.intensity(), core::cmp::Reverse(*i)))
            .map(|(i, _)| i)
    }
}
