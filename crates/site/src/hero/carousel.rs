//! Slide index state machine.

/// Current slide of a fixed-size slide set.
///
/// The index is always in `0..len`; `len` is at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Carousel {
    len: usize,
    index: usize,
}

impl Carousel {
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            len: len.max(1),
            index: 0,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn next(&mut self) {
        self.index = (self.index + 1) % self.len;
    }

    pub const fn previous(&mut self) {
        self.index = (self.index + self.len - 1) % self.len;
    }

    /// Jump to `index`. Out-of-range indices are ignored.
    pub const fn jump_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Switch to a set of `len` slides, starting over at the first slide.
    ///
    /// Returns `true` if the size changed; same-size calls keep the index.
    pub fn resize(&mut self, len: usize) -> bool {
        if len.max(1) == self.len {
            return false;
        }
        *self = Self::new(len);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_is_cyclic() {
        for len in 1..=3 {
            let mut carousel = Carousel::new(len);
            carousel.jump_to(len - 1);
            let start = carousel.index();
            for _ in 0..len {
                carousel.next();
            }
            assert_eq!(carousel.index(), start, "len {len}");
        }
    }

    #[test]
    fn test_previous_is_cyclic() {
        for len in 1..=3 {
            let mut carousel = Carousel::new(len);
            for _ in 0..len {
                carousel.previous();
            }
            assert_eq!(carousel.index(), 0, "len {len}");
        }
    }

    #[test]
    fn test_previous_wraps_to_last() {
        let mut carousel = Carousel::new(3);
        carousel.previous();
        assert_eq!(carousel.index(), 2);
        carousel.next();
        assert_eq!(carousel.index(), 0);
    }

    #[test]
    fn test_jump_to_bounds() {
        let mut carousel = Carousel::new(2);
        assert!(carousel.jump_to(1));
        assert_eq!(carousel.index(), 1);
        assert!(!carousel.jump_to(2));
        assert_eq!(carousel.index(), 1);
    }

    #[test]
    fn test_resize_resets_index() {
        let mut carousel = Carousel::new(3);
        carousel.jump_to(2);

        assert!(carousel.resize(2));
        assert_eq!(carousel.len(), 2);
        assert_eq!(carousel.index(), 0);

        carousel.next();
        assert!(!carousel.resize(2));
        assert_eq!(carousel.index(), 1);
    }

    #[test]
    fn test_empty_set_is_treated_as_single_slide() {
        let mut carousel = Carousel::new(0);
        carousel.next();
        carousel.previous();
        assert_eq!(carousel.index(), 0);
    }
}
