pub mod contract;
pub mod error;
