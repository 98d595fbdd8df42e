//! # Domain Models
//!
//! Pure data shared by the kernel, the feature slices and the server:
//! configuration sections and the feature slice registry types.
//! No I/O, networking or heavy logic.

pub mod config;
pub mod registry;
