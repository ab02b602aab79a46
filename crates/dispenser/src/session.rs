//! The state of one cup, from beverage selection to a full glass.
//!
//! Every operation returns whether it changed anything. Controls pressed in a
//! state that forbids them are ignored rather than reported; the kiosk must
//! never end up in an error state because of a stray button press.

use serde::Serialize;
use shared::domain::Beverage;

use crate::{
    placement::{ice_batch, lemon_slice_delays_ms, IceCube, RandomSource},
    timing::PourTiming,
};

pub const FULL_LEVEL: f64 = 100.0;
/// Above this level the stream and bubbles stop being drawn.
pub const SPLASH_CUTOFF_LEVEL: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "beverage", rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    Dispensing(Beverage),
    Full(Beverage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not dispensing, or already at the top.
    Ignored,
    Filling,
    /// The glass reached 100%; stop ticking and wait for the settle delay.
    ToppedOff,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Session {
    phase: Phase,
    fill_level: f64,
    /// Ticks applied in the current pour; the level is derived from it.
    #[serde(skip)]
    ticks: u32,
    ice_requested: bool,
    lemon_requested: bool,
    ice_cubes: Vec<IceCube>,
    soda_menu_open: bool,
}

impl Session {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn beverage(&self) -> Option<Beverage> {
        match self.phase {
            Phase::Idle => None,
            Phase::Dispensing(beverage) | Phase::Full(beverage) => Some(beverage),
        }
    }

    pub fn fill_level(&self) -> f64 {
        self.fill_level
    }

    pub fn is_dispensing(&self) -> bool {
        matches!(self.phase, Phase::Dispensing(_))
    }

    pub fn is_full(&self) -> bool {
        matches!(self.phase, Phase::Full(_))
    }

    pub fn ice_requested(&self) -> bool {
        self.ice_requested
    }

    pub fn lemon_requested(&self) -> bool {
        self.lemon_requested
    }

    pub fn ice_cubes(&self) -> &[IceCube] {
        &self.ice_cubes
    }

    /// Reveal delay of each lemon slice in the glass, in ms.
    pub fn lemon_slices(&self) -> Vec<u64> {
        if self.lemon_requested {
            lemon_slice_delays_ms().to_vec()
        } else {
            Vec::new()
        }
    }

    pub fn soda_menu_open(&self) -> bool {
        self.soda_menu_open
    }

    /// Ice, lemon and the menus are locked while a pour is running or a full
    /// glass is waiting to be taken.
    pub fn controls_locked(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    pub fn liquid_visible(&self) -> bool {
        self.controls_locked()
    }

    pub fn stream_visible(&self) -> bool {
        self.is_dispensing() && self.fill_level < SPLASH_CUTOFF_LEVEL
    }

    pub fn bubbles_visible(&self) -> bool {
        self.beverage().is_some_and(Beverage::has_bubbles)
            && self.fill_level < SPLASH_CUTOFF_LEVEL
            && !self.is_full()
    }

    pub fn is_topped_off(&self) -> bool {
        self.fill_level >= FULL_LEVEL
    }

    pub fn select_beverage(&mut self, beverage: Beverage) -> bool {
        if self.controls_locked() {
            return false;
        }
        self.phase = Phase::Dispensing(beverage);
        self.fill_level = 0.0;
        self.ticks = 0;
        self.soda_menu_open = false;
        true
    }

    pub fn tick(&mut self, timing: &PourTiming) -> TickOutcome {
        if !self.is_dispensing() || self.is_topped_off() {
            return TickOutcome::Ignored;
        }
        // Exactly `steps()` ticks reach the top, whatever the timing.
        self.ticks += 1;
        let next = f64::from(self.ticks) * FULL_LEVEL / timing.steps();
        if next >= FULL_LEVEL {
            self.fill_level = FULL_LEVEL;
            TickOutcome::ToppedOff
        } else {
            self.fill_level = next;
            TickOutcome::Filling
        }
    }

    /// Ends a pour once the glass is topped off and the settle delay passed.
    pub fn complete_pour(&mut self) -> bool {
        match self.phase {
            Phase::Dispensing(beverage) if self.is_topped_off() => {
                self.phase = Phase::Full(beverage);
                true
            }
            _ => false,
        }
    }

    pub fn toggle_ice<R: RandomSource + ?Sized>(&mut self, random: &mut R) -> bool {
        if self.controls_locked() {
            return false;
        }
        self.ice_requested = !self.ice_requested;
        self.ice_cubes = if self.ice_requested {
            ice_batch(random)
        } else {
            Vec::new()
        };
        true
    }

    pub fn toggle_lemon(&mut self) -> bool {
        if self.controls_locked() {
            return false;
        }
        self.lemon_requested = !self.lemon_requested;
        true
    }

    pub fn open_soda_menu(&mut self) -> bool {
        if self.controls_locked() || self.soda_menu_open {
            return false;
        }
        self.soda_menu_open = true;
        true
    }

    pub fn close_soda_menu(&mut self) -> bool {
        std::mem::replace(&mut self.soda_menu_open, false)
    }

    /// Back to an empty glass. Allowed from any state.
    pub fn reset_for_new_cup(&mut self) -> bool {
        if *self == Self::default() {
            return false;
        }
        *self = Self::default();
        true
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
