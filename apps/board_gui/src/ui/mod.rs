//! UI layer for the board GUI.

pub mod app;
