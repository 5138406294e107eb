//! Extraction feature
//!
//! Reads call edges off the saturated flow graph, flags escaping
//! functions and unknown call-sites, and renders the configured output
//! projection.

mod extractor;
mod output;

pub use extractor::{extract, CallEdge, CallGraph, CallTarget};
pub use output::{dump_flow_graph, render, EdgeOut, EndpointOut};
