//! Documents and segments.
//!
//! A [`Document`] is an immutable, ordered sequence of [`Segment`]s tagged
//! with the [`Version`] it represents. Segments are produced by the
//! [`segment`](crate::segment) module or built directly from text for
//! callers that already have their own decomposition.

mod document;

pub use document::{Document, Position, Segment, SegmentKind, Version};
