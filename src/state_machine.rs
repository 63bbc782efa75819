//! Core conversation state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! The runtime executes the effects and feeds outcomes back as events.

pub mod action;
mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

#[allow(unused_imports)] // Used by tests and the runtime's callers
pub use action::{choices_for, ActionToken, AudioChoice};
pub use effect::{Effect, Failure};
pub use event::Event;
pub use state::{ConvContext, ConvState};
pub use transition::{transition, TransitionError, TransitionResult};
