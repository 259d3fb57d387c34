//! Tracks how much time you spend focused over a day and shows progress toward a fixed daily
//! goal. The count survives restarts within the same day, starts fresh at local midnight, and
//! never credits time the session spent hidden or suspended.
//!

pub mod cli;
pub mod tracker;
pub mod utils;
