//! Base-layer writer, reduced-resolution pyramid generator, and the
//! orchestrator that sequences them (C5, C6, C9).

pub mod base_writer;
pub mod orchestrator;
pub mod pyramid;

pub use base_writer::{write_base_layer, BaseLayerResult};
pub use orchestrator::{run, RipOptions};
pub use pyramid::generate_pyramid;
