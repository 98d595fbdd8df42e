//! Kernel utilities shared across slices.
//!
//! Keep this crate lightweight: configuration loading, startup wiring of the
//! contract resolver and the HTTP plumbing every slice builds on.
//!
//! ## Config loading
//! ```rust,no_run
//! use polycase_kernel::config::load_config;
//! use polycase_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap_or_default();
//! # let _ = cfg;
//! ```
//!
//! ## Wiring
//! ```rust
//! use polycase_kernel::contracts::wire_contracts;
//! use polycase_kernel::domain::config::ContractsConfig;
//!
//! let resolver = wire_contracts(&ContractsConfig::default());
//! assert_eq!(resolver.builds(), 0);
//! ```

pub mod config;
pub mod contracts;
pub mod prelude;
pub mod server;

pub use polycase_contract as contract;
pub use polycase_domain as domain;
