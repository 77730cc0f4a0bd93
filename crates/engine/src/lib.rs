//! Creative validation and tag-classification engine.
//!
//! Operators submit a creative (an image, a zipped bundle, a video file, or a
//! pasted tag snippet) against a declared ad type and input type. This crate
//! decides whether the submission is acceptable and computes the structured
//! description the preview renderer needs, before anything is persisted
//! upstream.
//!
//! Everything here is pure and synchronous: rule tables are compile-time
//! constants, validators collect every applicable failure instead of
//! short-circuiting, and the only hard error is a registry lookup for an
//! incompatible (ad type, input type) pair.

pub mod aspect;
pub mod bundle;
pub mod file;
pub mod intake;
pub mod probe;
pub mod registry;
pub mod tag;
pub mod tracking;
pub mod vast;

pub use intake::evaluate;
