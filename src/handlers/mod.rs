//! API handlers

pub mod booking;
pub mod calendar;
pub mod ledger;

pub use booking::*;
pub use calendar::*;
pub use ledger::*;
