/// A per-tick mask of next-buffer cells already claimed by a moving
/// particle.
///
/// During the gravity pass, two source cells may target the same empty
/// destination. The first mover claims the destination here; later
/// movers see the claim and try their remaining fallback directions
/// instead. The mask is transient: it is cleared at the start of every
/// tick and is never part of the published grid state.
///
/// The buffer is reused across ticks via [`ClaimMask::ensure_dims`], so
/// steady-state ticking performs no allocation for it.
#[derive(Debug)]
pub struct ClaimMask {
    width: usize,
    claimed: Vec<bool>,
}

impl ClaimMask {
    /// Creates a cleared mask for a `width × height` grid.
    pub fn with_dims(width: usize, height: usize) -> Self {
        Self {
            width,
            claimed: vec![false; width * height],
        }
    }

    /// Ensures the mask covers a `width × height` grid and is cleared.
    ///
    /// The backing storage is resized only when the dimensions changed;
    /// in every case all claims are dropped, even if the size was
    /// already correct.
    pub fn ensure_dims(&mut self, width: usize, height: usize) {
        let len = width * height;
        if self.claimed.len() != len {
            self.claimed.resize(len, false);
        }
        self.width = width;
        self.clear();
    }

    /// Drops all claims without changing the mask's dimensions.
    pub fn clear(&mut self) {
        self.claimed.fill(false);
    }

    /// Marks the destination `(x, y)` as claimed for this tick.
    #[inline]
    pub fn claim(&mut self, x: usize, y: usize) {
        self.claimed[y * self.width + x] = true;
    }

    /// Whether `(x, y)` has already been claimed this tick.
    #[inline]
    pub fn is_claimed(&self, x: usize, y: usize) -> bool {
        self.claimed[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_dims_starts_unclaimed() {
        let mask = ClaimMask::with_dims(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                assert!(!mask.is_claimed(x, y));
            }
        }
    }

    #[test]
    fn claim_marks_only_the_given_cell() {
        let mut mask = ClaimMask::with_dims(4, 3);
        mask.claim(2, 1);

        assert!(mask.is_claimed(2, 1));
        assert!(!mask.is_claimed(1, 2));
        assert!(!mask.is_claimed(2, 0));
    }

    #[test]
    fn clear_drops_all_claims() {
        let mut mask = ClaimMask::with_dims(2, 2);
        mask.claim(0, 0);
        mask.claim(1, 1);

        mask.clear();

        assert!(!mask.is_claimed(0, 0));
        assert!(!mask.is_claimed(1, 1));
    }

    #[test]
    fn ensure_dims_clears_even_when_size_is_unchanged() {
        let mut mask = ClaimMask::with_dims(3, 3);
        mask.claim(1, 1);

        mask.ensure_dims(3, 3);
        assert!(!mask.is_claimed(1, 1));
    }

    #[test]
    fn ensure_dims_resizes_and_clears() {
        let mut mask = ClaimMask::with_dims(2, 2);
        mask.claim(1, 1);

        mask.ensure_dims(5, 4);
        for y in 0..4 {
            for x in 0..5 {
                assert!(!mask.is_claimed(x, y));
            }
        }
    }
}
