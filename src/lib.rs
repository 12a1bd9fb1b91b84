//! HavenStay Backend Library
//!
//! Exports the booking lifecycle, inventory calendar and reconciliation
//! modules for the HavenStay backend server.

pub mod booking;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod inventory;
pub mod ledger;
pub mod middleware;
pub mod models;
pub mod notifier;
pub mod routes;
pub mod state;
