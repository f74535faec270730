//! Lensbook
//!
//! Lensbook is the booking core of an event photography and live-streaming service: package
//! pricing, form validation, the booking state machine and payment submission.

pub mod booking;
pub mod config;
pub mod details;
pub mod extras;
pub mod fixtures;
pub mod input;
pub mod packages;
pub mod payments;
pub mod prelude;
pub mod pricing;
pub mod quote;
pub mod session;
pub mod share;
pub mod submission;
