//! Core domain models for environmental sensor analytics.
//!
//! This module defines the fundamental data structures used throughout the crate:
//! canonical points, aggregated buckets, day/night periods, and the metric catalog.

pub mod domain;
pub mod metrics;
