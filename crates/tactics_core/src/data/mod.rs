//! Data structures for class and species configuration.
//!
//! Profiles are plain data deserialized from RON. This module performs no
//! IO; reading files is the caller's job.

mod profile_data;
pub mod roster;

pub use profile_data::{EntityProfile, ProfileSet};
