//! Opening-hours and tariff scheduling for a court reservation service.
//!
//! The core is [`schedule::validate`]: a proposed time range for a court may
//! only be stored if it does not overlap another range of the same court,
//! collection and day of week.

pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod parser;
pub mod payment;
pub mod report;
pub mod schedule;
pub mod session;
pub mod store;
pub mod web;
