//! Route definitions

mod booking;
mod calendar;
mod ledger;

pub use booking::booking_routes;
pub use calendar::calendar_routes;
pub use ledger::ledger_routes;
