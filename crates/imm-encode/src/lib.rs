//! # imm-encode
//!
//! Encoding module: writes committed documents to `.imm` container files
//! and reads them back for inspection.

pub mod container;
pub mod sink;

pub use container::{ContainerHeader, ImmFileReader};
pub use sink::{ExportSink, ImmFileSink};
