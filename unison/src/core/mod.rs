//! The `Core` is the per-node coordinator task.
//!
//! It consumes membership views and internal notifications from an
//! application or timer, applies the election policy to every accepted view,
//! and enacts the local consequence: starting or stopping the payload
//! service instance.

pub(crate) mod core;
pub(crate) mod core_state;
pub(crate) mod io;
