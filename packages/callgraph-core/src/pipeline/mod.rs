//! Analysis pipeline
//!
//! Drives the stages in order: preprocess/parse → decorate → bind →
//! native seeding → intraprocedural edges → module linking → callback
//! wiring → strategy → extraction. Parsing runs under rayon; lowering is
//! sequential so arena order equals file-list order and the output stays
//! deterministic.

pub mod config;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde_json::Value;
use tracing::{debug, info};

use crate::context::AnalysisCtx;
use crate::errors::Result;
use crate::features::decorate::{self, render_callee};
use crate::features::extraction::{self, CallGraph};
use crate::features::flow::{build_flow, FlowGraph};
use crate::features::modules;
use crate::features::natives;
use crate::features::parsing::ast::NodeKind;
use crate::features::parsing::{lower_tree, parse_syntax, preprocess};
use crate::features::strategy;
use config::{AnalysisConfig, AnalyzerKind};

/// One input file: path plus contents
#[derive(Debug, Clone)]
pub struct SourceInput {
    pub path: String,
    pub source: String,
}

impl SourceInput {
    pub fn new(path: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }
}

/// Wall-clock duration of one stage
#[derive(Debug, Clone)]
pub struct StageTiming {
    pub stage: &'static str,
    pub duration: Duration,
}

/// Callback statistics (`countCB`)
#[derive(Debug, Clone, Default)]
pub struct CallbackStats {
    pub functions: usize,
    pub callbacks: usize,
    /// rendered callee → number of callbacks passed to it
    pub by_callee: BTreeMap<String, usize>,
}

/// Everything the analysis produced
pub struct AnalysisResult {
    pub ctx: AnalysisCtx,
    pub flow: FlowGraph,
    pub call_graph: CallGraph,
    pub timings: Vec<StageTiming>,
}

impl AnalysisResult {
    /// Render the call-graph edges under the given projection
    pub fn render_edges(&self, kind: AnalyzerKind) -> Value {
        extraction::render(&self.ctx, &self.call_graph, kind)
    }

    /// Flow-graph dump (`fg`)
    pub fn dump_flow_graph(&self) -> String {
        extraction::dump_flow_graph(&self.ctx, &self.flow)
    }

    /// AMD/RequireJS dependency graph (`reqJs`)
    pub fn amd_dependency_graph(&self) -> BTreeMap<String, Vec<String>> {
        modules::amd_dependency_graph(&self.ctx)
    }

    /// Callback statistics (`countCB`)
    pub fn callback_stats(&self) -> CallbackStats {
        let ctx = &self.ctx;
        let mut stats = CallbackStats {
            functions: ctx.functions.len(),
            ..Default::default()
        };
        for f in &ctx.functions {
            let Some(cb) = ctx.decorations.callback.get(f) else {
                continue;
            };
            stats.callbacks += 1;
            let callee = match ctx.ast.kind(cb.call) {
                NodeKind::Call { callee, .. } => Some(*callee),
                _ => None,
            };
            let rendered = callee
                .and_then(|c| render_callee(&ctx.ast, c))
                .unwrap_or_else(|| "<unknown>".to_string());
            *stats.by_callee.entry(rendered).or_insert(0) += 1;
        }
        stats
    }
}

/// Batch analysis driver
pub struct AnalysisPipeline {
    config: AnalysisConfig,
}

impl AnalysisPipeline {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run the whole pipeline over the given inputs
    pub fn run(&self, inputs: Vec<SourceInput>) -> Result<AnalysisResult> {
        let mut timings = Vec::new();
        let mut ctx = AnalysisCtx::new();

        // ── parse ────────────────────────────────────────────────────────
        let start = Instant::now();
        let preprocessed: Vec<SourceInput> = inputs
            .into_iter()
            .map(|input| SourceInput {
                source: preprocess(&input.path, &input.source),
                path: modules::normalize_path(&input.path),
            })
            .collect();
        // CSTs in parallel; lowering stays sequential in file-list order
        let trees: Vec<_> = preprocessed
            .par_iter()
            .map(|input| parse_syntax(&input.source))
            .collect();
        for (input, tree) in preprocessed.iter().zip(trees) {
            let file = ctx.add_file(input.path.clone());
            let program = match tree {
                Some(tree) => lower_tree(
                    &tree,
                    &input.source,
                    &input.path,
                    file,
                    &mut ctx.ast,
                    &mut ctx.diagnostics,
                )
                .ok(),
                None => {
                    ctx.diagnostics
                        .warn(format!("failed to parse {}: no tree produced", input.path));
                    None
                }
            };
            ctx.files[file.0 as usize].program = program;
        }
        self.record(&mut timings, "parse", start);

        // ── decorate ─────────────────────────────────────────────────────
        let start = Instant::now();
        decorate::decorate(&mut ctx);
        self.record(&mut timings, "decorate", start);
        debug!(
            functions = ctx.functions.len(),
            calls = ctx.calls.len(),
            "decoration complete"
        );

        // ── bind ─────────────────────────────────────────────────────────
        let start = Instant::now();
        crate::features::binding::bind(&mut ctx);
        self.record(&mut timings, "bind", start);

        // ── flow graph ───────────────────────────────────────────────────
        let start = Instant::now();
        let mut flow = FlowGraph::new();
        natives::seed(&mut flow);
        build_flow(&ctx, &mut flow);
        self.record(&mut timings, "flow", start);

        let start = Instant::now();
        modules::link_modules(&mut ctx, &mut flow);
        natives::wire_callsites(&mut ctx, &mut flow);
        self.record(&mut timings, "link", start);

        // ── strategy ─────────────────────────────────────────────────────
        let start = Instant::now();
        strategy::apply(&ctx, &mut flow, self.config.strategy);
        self.record(&mut timings, "strategy", start);

        // ── extraction ───────────────────────────────────────────────────
        let start = Instant::now();
        let call_graph = extraction::extract(&ctx, &flow);
        self.record(&mut timings, "extract", start);

        info!(
            files = ctx.files.len(),
            strategy = self.config.strategy.name(),
            edges = call_graph.edges.len(),
            escaping = call_graph.escaping.len(),
            unknown_sites = call_graph.unknown_sites.len(),
            warnings = ctx.diagnostics.warning_count(),
            "analysis complete"
        );

        Ok(AnalysisResult {
            ctx,
            flow,
            call_graph,
            timings,
        })
    }

    fn record(&self, timings: &mut Vec<StageTiming>, stage: &'static str, start: Instant) {
        let duration = start.elapsed();
        if self.config.timings {
            info!(stage, ms = duration.as_millis() as u64, "stage finished");
        }
        timings.push(StageTiming { stage, duration });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Strategy;

    fn run(sources: &[(&str, &str)], strategy: Strategy) -> AnalysisResult {
        let pipeline = AnalysisPipeline::new(AnalysisConfig {
            strategy,
            ..Default::default()
        });
        let inputs = sources
            .iter()
            .map(|(p, s)| SourceInput::new(*p, *s))
            .collect();
        pipeline.run(inputs).expect("pipeline runs")
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let result = run(
            &[("main.js", "function f() {} f();")],
            Strategy::Demand,
        );
        assert_eq!(result.call_graph.edges.len(), 1);
        assert_eq!(result.timings.len(), 7);
    }

    #[test]
    fn test_parse_failure_keeps_going() {
        let result = run(
            &[("bad.js", "function ( {"), ("good.js", "(function() {})();")],
            Strategy::OneShot,
        );
        assert!(result.ctx.files[0].program.is_none());
        assert!(result.ctx.files[1].program.is_some());
        assert_eq!(result.call_graph.edges.len(), 1);
        assert!(result.ctx.diagnostics.warning_count() >= 1);
    }

    #[test]
    fn test_callback_stats() {
        let result = run(
            &[(
                "main.js",
                "setTimeout(function() {}, 1); a.forEach(x => x); function named() {}",
            )],
            Strategy::OneShot,
        );
        let stats = result.callback_stats();
        assert_eq!(stats.functions, 3);
        assert_eq!(stats.callbacks, 2);
        assert_eq!(stats.by_callee.get("setTimeout"), Some(&1));
        assert_eq!(stats.by_callee.get("a.forEach"), Some(&1));
    }

    #[test]
    fn test_determinism() {
        let sources = [(
            "app.js",
            "function a() { b(); } function b() {} a(); [1].forEach(x => a);",
        )];
        let first = run(&sources, Strategy::Demand);
        let second = run(&sources, Strategy::Demand);
        let render1 = serde_json::to_string(&first.render_edges(AnalyzerKind::Static)).unwrap();
        let render2 = serde_json::to_string(&second.render_edges(AnalyzerKind::Static)).unwrap();
        assert_eq!(render1, render2);
        assert_eq!(first.dump_flow_graph(), second.dump_flow_graph());
    }

    #[test]
    fn test_vue_preprocessing_keeps_positions() {
        let vue = "<template>\n  <div/>\n</template>\n<script>\nfunction handler() {}\nhandler();\n</script>\n";
        let result = run(&[("component.vue", vue)], Strategy::OneShot);
        assert_eq!(result.call_graph.edges.len(), 1);
        let edge = &result.call_graph.edges[0];
        match edge.target {
            crate::features::extraction::CallTarget::Function(f) => {
                // the function still sits on line 5 of the original file
                assert_eq!(result.ctx.ast.span(f).start_line, 5);
            }
            _ => panic!("expected function target"),
        }
    }
}
