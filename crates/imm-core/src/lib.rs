//! # imm-core
//!
//! Core types and primitives for the IMM export builder.
//! This crate contains foundational types shared across all IMM crates:
//! colors, 3-D transforms and bounds, stroke points, the committed document
//! model, export configuration, and error types.

pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod hash;
pub mod math;
pub mod point;
pub mod types;

pub use config::*;

pub use color::Color;
pub use document::{
    Document, DocumentStats, ElementRecord, FrameRecord, LayerContent, LayerInfo, LayerRecord,
    SequenceSettings,
};
pub use error::{ImmError, ImmResult};
pub use math::{Bounds3, Quat, Transform3D, Vec3};
pub use point::PaintPoint;
pub use types::{
    AudioCodec, AudioSettings, BrushSectionType, LayerType, ResourceBudget, SequenceType,
    Timeline, VisibilityType,
};
