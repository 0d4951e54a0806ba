//! Application layer

pub mod services;

pub use services::{compute_total, TariffEngine};
