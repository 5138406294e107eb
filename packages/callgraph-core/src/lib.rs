//! callgraph-core — field-based approximate call graphs for JavaScript.
//!
//! Feature-first layout:
//! - `shared/`   : common models (Span, diagnostics)
//! - `features/` : vertical slices (parsing → decorate → binding → flow →
//!   natives → modules → strategy → reachability → extraction)
//! - `pipeline/` : stage orchestration and configuration
//!
//! The analysis follows the ICSE'13 field-based approximation: object
//! properties are conflated by name, dynamic lookups and reflection are not
//! tracked. Scalability and stable coverage are favored over soundness.

pub mod context;
pub mod errors;
pub mod features;
pub mod pipeline;
pub mod shared;

pub use context::AnalysisCtx;
pub use errors::{CallgraphError, Result};
pub use features::extraction::{CallGraph, CallTarget};
pub use features::flow::{FlowGraph, Vertex};
pub use pipeline::config::{AnalyzerKind, AnalysisConfig, FileFilter, Strategy};
pub use pipeline::{AnalysisPipeline, AnalysisResult, SourceInput};
