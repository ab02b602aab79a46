//! Beverage dispenser session: the pour state machine, ice placement and the
//! timer-driven controller that renders it live.

pub mod controller;
pub mod placement;
pub mod session;
pub mod timing;

pub use controller::DispenserController;
pub use placement::{IceCube, RandomSource, SeededRandom, ThreadRandom};
pub use session::{Phase, Session, TickOutcome};
pub use timing::{PourTiming, TimingError};
