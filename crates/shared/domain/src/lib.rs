//! # Domain Models
//!
//! This crate contains pure domain types with a single dependency (`serde`).
//! Keep it lean: no I/O, networking, or heavy logic - just data and simple
//! helpers.

pub mod constants;
pub mod profile;
