//! Wire model shared by the activity board client and its front ends.

pub mod domain;
pub mod error;
pub mod protocol;
