//! Core notification logic for the ship registration portal.

pub mod services;

pub use services::*;
