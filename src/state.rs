#[derive(Debug, PartialEq, Clone, Copy)]
pub enum SlideshowState {
    Displaying,    // Current slide is settled and visible
    Transitioning, // Index change is pending until the transition window elapses
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeckStatus {
    Loading, // No slide list has been supplied yet
    Empty,   // A list was supplied (or the fetch failed) and it has no slides
    Ready,   // At least one slide is visible
}

/// Outcome of a navigation request. None of these are errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Navigation {
    Started,        // Transition lock acquired, index changes when it elapses
    Busy,           // Dropped, another transition is in flight
    NoSlides,       // Dropped, nothing to navigate
    AlreadyCurrent, // Dropped, target is the visible slide
    OutOfRange,     // Dropped, target index does not exist
}

impl Navigation {
    pub fn is_started(self) -> bool {
        self == Navigation::Started
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Step {
    Forward,
    Backward,
    Jump(usize),
}

impl Step {
    pub fn resolve(self, current: usize, len: usize) -> usize {
        match self {
            Step::Forward => (current + 1) % len,
            Step::Backward => (current + len - 1) % len,
            Step::Jump(target) => target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_wraps_to_first() {
        assert_eq!(Step::Forward.resolve(2, 3), 0);
        assert_eq!(Step::Forward.resolve(0, 3), 1);
    }

    #[test]
    fn backward_wraps_to_last() {
        assert_eq!(Step::Backward.resolve(0, 3), 2);
        assert_eq!(Step::Backward.resolve(2, 3), 1);
    }

    #[test]
    fn only_started_takes_the_lock() {
        assert!(Navigation::Started.is_started());
        for dropped in [
            Navigation::Busy,
            Navigation::NoSlides,
            Navigation::AlreadyCurrent,
            Navigation::OutOfRange,
        ] {
            assert!(!dropped.is_started());
        }
    }

    #[test]
    fn single_slide_steps_stay_put() {
        assert_eq!(Step::Forward.resolve(0, 1), 0);
        assert_eq!(Step::Backward.resolve(0, 1), 0);
    }
}
