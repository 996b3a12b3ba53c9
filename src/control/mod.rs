//! # Speed Control Core
//!
//! Hardware-independent pieces of the software PWM controller.
//!
//! - [`duty_cycle`] - speed index to high/low tick counts.
//! - [`phase`] - two-state toggler run from the countdown interrupt.
//! - [`speed`] - shared speed index, button edges and serial commands.

pub mod duty_cycle;
pub mod phase;
pub mod speed;

pub use duty_cycle::{PhaseDurations, duty_cycle};
pub use phase::{Phase, PhaseToggler};
pub use speed::{EdgeSet, Echo, PendingEdges, SpeedIndex, SpeedSetter};
