//! # imm-ir
//!
//! The IMM authoring builder: an [`ExportSession`] owns a forest of group and
//! paint layers; paint layers receive frames authored as drawings of stroke
//! elements; the committed result is snapshotted into an
//! [`imm_core::Document`] and handed to an export sink.
//!
//! All handles ([`LayerId`], [`DrawingId`], [`ElementId`]) are generational
//! indices into arenas owned by the session, so a handle that outlives its
//! object (or its session) fails lookup instead of aliasing new data.

mod arena;
pub mod builder;
pub mod drawing;
pub mod element;
pub mod layer;
pub mod session;
mod snapshot;
pub mod validate;

pub use arena::{DrawingId, ElementId, LayerId};
pub use builder::{SessionBuilder, StrokeBuilder};
pub use drawing::{DrawingState, MAX_ELEMENTS_PER_DRAWING};
pub use element::{ElementState, MAX_POINTS_PER_ELEMENT};
pub use layer::{LayerParent, LayerProps, MAX_LAYER_DEPTH};
pub use session::ExportSession;
pub use validate::{check_budget, validate_document};
