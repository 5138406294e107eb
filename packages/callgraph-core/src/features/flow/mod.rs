//! Flow graph feature
//!
//! The propagation abstraction at the heart of the analysis: vertices
//! represent program values, edges assert "values at the source may also
//! appear at the target". Property vertices key on the property name only
//! (the field-based approximation).

mod builder;
mod graph;
mod vertex;

pub use builder::build_flow;
pub use graph::FlowGraph;
pub use vertex::{Vertex, VertexId};
