//! Domain operations consumed by UI surfaces.
//!
//! # Responsibility
//! - Layer authorization, identity stamping and vote arithmetic over the
//!   raw store primitives and selectors.
//! - Keep UI surfaces decoupled from slice layout.
//!
//! # Invariants
//! - Every mutation checks hydration, identity and input before its first
//!   write; a failed call leaves every slice unchanged.
//! - Unknown ids are reported as absence, never as errors.

pub mod forum_service;
