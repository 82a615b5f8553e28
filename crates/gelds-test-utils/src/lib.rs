//! Test utilities for Gelds development.
//!
//! Provides [`ManualClock`], a simulated [`Clock`](gelds_core::Clock)
//! that lets tests step production cycles deterministically, and
//! [`fixtures`] with small cost curves whose numbers are easy to check
//! by hand.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod clock;
pub mod fixtures;

pub use clock::ManualClock;
