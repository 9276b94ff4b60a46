//! Slideshow rotation controller.
//!
//! Cycles a read-only, ordered slide list one slide at a time. Index changes
//! go through a transition lock: an accepted request only takes effect once
//! the transition window has elapsed, and every request arriving meanwhile is
//! dropped. A recurring timer drives automatic advances; pausing gates its
//! ticks without stopping it.

use std::fmt;
use std::time::Duration;

use crate::config::ControllerConfig;
use crate::render::SlideRenderer;
use crate::state::{DeckStatus, Navigation, SlideshowState, Step};
use crate::timer::{IntervalTimer, Timeout};

pub struct RotationController<T> {
    config: ControllerConfig,
    slides: Option<Vec<T>>,
    current_index: usize,
    paused: bool,
    state: SlideshowState,
    pending: Option<Step>,
    transition: Timeout,
    timer: IntervalTimer,
    load_error: Option<String>,
}

impl<T> RotationController<T> {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            slides: None,
            current_index: 0,
            paused: false,
            state: SlideshowState::Displaying,
            pending: None,
            transition: Timeout::new(config.transition),
            timer: IntervalTimer::new(config.interval),
            load_error: None,
        }
    }

    pub fn with_slides(config: ControllerConfig, slides: Vec<T>) -> Self {
        let mut controller = Self::new(config);
        controller.load(slides);
        controller
    }

    /// Supplies (or replaces) the slide list.
    ///
    /// The current index survives a reload when it is still in range,
    /// otherwise playback restarts at the first slide. A pending transition
    /// is cancelled and the auto-advance timer restarts from a full interval.
    pub fn load(&mut self, slides: Vec<T>) {
        self.cancel_transition();
        if self.current_index >= slides.len() {
            self.current_index = 0;
        }
        tracing::info!(count = slides.len(), "Slides loaded");
        self.slides = Some(slides);
        self.load_error = None;
        self.sync_timer();
    }

    pub fn load_result<E: fmt::Display>(&mut self, result: Result<Vec<T>, E>) {
        match result {
            Ok(slides) => self.load(slides),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to fetch slides, treating as empty");
                self.load(Vec::new());
                self.load_error = Some(e.to_string());
            }
        }
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn reconfigure(&mut self, config: ControllerConfig) {
        self.config = config;
        self.transition.set_duration(config.transition);
        self.timer.set_period(config.interval);
        self.sync_timer();
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn status(&self) -> DeckStatus {
        match &self.slides {
            None => DeckStatus::Loading,
            Some(slides) if slides.is_empty() => DeckStatus::Empty,
            Some(_) => DeckStatus::Ready,
        }
    }

    pub fn slides(&self) -> &[T] {
        self.slides.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.slides().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides().is_empty()
    }

    pub fn current_index(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.current_index)
    }

    pub fn current(&self) -> Option<&T> {
        self.slides().get(self.current_index)
    }

    pub fn is_transitioning(&self) -> bool {
        self.state == SlideshowState::Transitioning
    }

    pub fn state(&self) -> SlideshowState {
        self.state
    }

    pub fn transition_progress(&self) -> Option<f32> {
        self.transition.progress()
    }

    pub fn next_tick_in(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            tracing::debug!(paused, "Auto-advance pause toggled");
            self.paused = paused;
        }
    }

    pub fn pause(&mut self) {
        self.set_paused(true);
    }

    pub fn resume(&mut self) {
        self.set_paused(false);
    }

    /// Moves to the following slide, wrapping to the first.
    ///
    /// The auto-advance timer is reset even when the request is dropped.
    pub fn next(&mut self) -> Navigation {
        let outcome = self.begin(Step::Forward);
        self.timer.reset();
        tracing::debug!(?outcome, "Manual next");
        outcome
    }

    pub fn previous(&mut self) -> Navigation {
        let outcome = self.begin(Step::Backward);
        self.timer.reset();
        tracing::debug!(?outcome, "Manual previous");
        outcome
    }

    /// Jumps to `target`. Out-of-range targets are ignored.
    pub fn go_to(&mut self, target: usize) -> Navigation {
        let outcome = if self.is_empty() {
            Navigation::NoSlides
        } else if target >= self.len() {
            Navigation::OutOfRange
        } else if self.is_transitioning() {
            Navigation::Busy
        } else if target == self.current_index {
            Navigation::AlreadyCurrent
        } else {
            let outcome = self.begin(Step::Jump(target));
            self.timer.reset();
            outcome
        };
        tracing::debug!(index = target, ?outcome, "Manual jump");
        outcome
    }

    /// Feeds elapsed time to the transition lock and the auto-advance timer,
    /// handling every event that falls due in chronological order. When a
    /// transition settles on the same instant a tick fires, the settle runs
    /// first so the tick can start the next transition.
    ///
    /// Returns true if at least one transition settled.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let mut settled = false;
        let mut left = dt;

        loop {
            let due = [self.transition.remaining(), self.timer.remaining()]
                .into_iter()
                .flatten()
                .min();

            match due {
                Some(step) if step <= left => {
                    left -= step;
                    let expired = self.transition.advance(step);
                    let fired = self.timer.advance(step);
                    if expired {
                        self.settle();
                        settled = true;
                    }
                    if fired {
                        self.on_tick();
                    }
                }
                _ => {
                    self.transition.advance(left);
                    self.timer.advance(left);
                    break;
                }
            }
        }

        settled
    }

    pub fn render<R: SlideRenderer<T>>(&self, renderer: &R) -> Option<R::Output> {
        self.current()
            .map(|slide| renderer.render(slide, self.config.compact))
    }

    pub fn shutdown(mut self) -> Vec<T> {
        self.timer.cancel();
        self.cancel_transition();
        tracing::debug!("Rotation controller shut down");
        self.slides.take().unwrap_or_default()
    }

    fn begin(&mut self, step: Step) -> Navigation {
        if self.is_empty() {
            return Navigation::NoSlides;
        }
        if self.is_transitioning() {
            return Navigation::Busy;
        }
        self.pending = Some(step);
        self.state = SlideshowState::Transitioning;
        self.transition.start();
        Navigation::Started
    }

    fn settle(&mut self) {
        self.state = SlideshowState::Displaying;
        let Some(step) = self.pending.take() else {
            return;
        };
        let len = self.len();
        if len == 0 {
            return;
        }
        let from = self.current_index;
        self.current_index = step.resolve(from, len);
        tracing::debug!(from, to = self.current_index, "Transition settled");
    }

    fn on_tick(&mut self) {
        if self.paused {
            tracing::trace!("Auto-advance tick skipped while paused");
            return;
        }
        let outcome = self.begin(Step::Forward);
        tracing::trace!(?outcome, "Auto-advance tick");
    }

    fn cancel_transition(&mut self) {
        self.transition.cancel();
        self.pending = None;
        self.state = SlideshowState::Displaying;
    }

    fn sync_timer(&mut self) {
        if self.config.auto_advance && !self.is_empty() {
            self.timer.start();
        } else {
            self.timer.cancel();
        }
    }
}
