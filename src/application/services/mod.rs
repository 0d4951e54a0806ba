pub mod billing;

pub use billing::{compute_total, TariffEngine};
