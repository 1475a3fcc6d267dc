/// One iteration of the window loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSlot {
    /// Loop counter, starting at 0 for every run.
    pub iteration: usize,
    /// Window index used for hour shifting and naming.
    pub index: usize,
}

impl WindowSlot {
    /// The first window of a run is built from scratch; later ones are updated.
    pub fn is_first(&self) -> bool {
        self.iteration == 0
    }
}

/// A clock that hands out the windows of one run.
///
/// In continuous mode the index equals the iteration. In single-step mode a
/// fixed `offset` is used as the index of the only window.
///
/// # Examples
///
/// ```
/// use horizon_sim::sim::clock::WindowClock;
///
/// let mut clock = WindowClock::continuous(3);
/// let mut indices = Vec::new();
///
/// clock.run(|slot| indices.push(slot.index));
/// assert_eq!(indices, vec![0, 1, 2]);
/// ```
pub struct WindowClock {
    /// Next iteration to hand out
    current: usize,
    /// Windows in this run
    total: usize,
    /// Fixed window index, if any
    offset: Option<usize>,
}

impl WindowClock {
    /// Creates a clock for `total` consecutive windows starting at index 0.
    pub fn continuous(total: usize) -> Self {
        Self {
            current: 0,
            total,
            offset: None,
        }
    }

    /// Creates a clock for a single window with index `day`.
    pub fn single(day: usize) -> Self {
        Self {
            current: 0,
            total: 1,
            offset: Some(day),
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Advances the clock by one window.
    ///
    /// # Returns
    ///
    /// * `Some(slot)` - The next window
    /// * `None` - If every window has been handed out
    pub fn tick(&mut self) -> Option<WindowSlot> {
        if self.current < self.total {
            let iteration = self.current;
            self.current += 1;
            Some(WindowSlot {
                iteration,
                index: self.offset.unwrap_or(iteration),
            })
        } else {
            None
        }
    }

    /// Runs a function for each remaining window.
    pub fn run(&mut self, mut f: impl FnMut(WindowSlot)) {
        while let Some(slot) = self.tick() {
            f(slot);
        }
    }
}
