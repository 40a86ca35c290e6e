//! Controller layer for board GUI event modeling and command orchestration.

pub mod events;
pub mod orchestration;
