//! Per-date inventory calendar

pub mod model;
pub mod service;

pub use model::{
    is_weekend, CalendarDay, CalendarDayView, CalendarOverrideRequest, CalendarWindowQuery,
};
pub use service::CalendarService;
