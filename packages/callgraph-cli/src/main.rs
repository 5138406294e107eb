//! callgraph — field-based approximate call graphs for JavaScript
//!
//! # Usage
//!
//! ```bash
//! # default: ONESHOT strategy, static projection, JSON on stdout
//! callgraph src/
//!
//! # demand-driven fix-point, output to a file
//! callgraph --strategy DEMAND -o edges.json src/
//!
//! # exclude vendored code, keep one package
//! callgraph --filter -node_modules --filter +node_modules/mylib src/
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use callgraph_core::{
    AnalysisConfig, AnalysisPipeline, AnalyzerKind, FileFilter, SourceInput, Strategy,
};

const SOURCE_EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "vue"];

#[derive(Parser)]
#[command(name = "callgraph")]
#[command(about = "Approximate call graph construction for JavaScript", long_about = None)]
struct Cli {
    /// Input files or directories
    inputs: Vec<PathBuf>,

    /// Inter-procedural strategy: NONE, ONESHOT, DEMAND or FULL
    #[arg(long, default_value = "ONESHOT")]
    strategy: String,

    /// Edge-extraction projection: static, nativecalls or acg
    #[arg(long = "analyzer-type", default_value = "static")]
    analyzer_type: String,

    /// Output path for the edge list (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Ordered +regex/-regex rules including/excluding files
    #[arg(long = "filter")]
    filter: Vec<String>,

    /// Serialize the flow graph instead of the call graph
    #[arg(long)]
    fg: bool,

    /// Emit callback statistics
    #[arg(long = "count-cb")]
    count_cb: bool,

    /// Emit an AMD/RequireJS dependency graph instead
    #[arg(long = "req-js")]
    req_js: bool,

    /// Report per-stage timings
    #[arg(long)]
    time: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let strategy = Strategy::parse(&cli.strategy)?;
    let analyzer = AnalyzerKind::parse(&cli.analyzer_type)?;
    let filter = FileFilter::parse(&cli.filter)?;

    let files = discover(&cli.inputs, &filter);
    if files.is_empty() {
        bail!("no input files");
    }

    let mut inputs = Vec::with_capacity(files.len());
    for path in files {
        match std::fs::read_to_string(&path) {
            Ok(source) => inputs.push(SourceInput::new(path.to_string_lossy(), source)),
            Err(e) => warn!("skipping {}: {}", path.display(), e),
        }
    }
    if inputs.is_empty() {
        bail!("no readable input files");
    }

    let pipeline = AnalysisPipeline::new(AnalysisConfig {
        strategy,
        analyzer,
        dump_flow_graph: cli.fg,
        count_callbacks: cli.count_cb,
        requirejs_graph: cli.req_js,
        timings: cli.time,
    });
    let result = pipeline.run(inputs)?;

    if cli.count_cb {
        let stats = result.callback_stats();
        eprintln!(
            "callbacks: {} of {} functions",
            stats.callbacks, stats.functions
        );
        for (callee, count) in &stats.by_callee {
            eprintln!("  {} <- {}", callee, count);
        }
    }

    let rendered = if cli.req_js {
        serde_json::to_string_pretty(&result.amd_dependency_graph())?
    } else if cli.fg {
        result.dump_flow_graph()
    } else {
        serde_json::to_string_pretty(&result.render_edges(analyzer))?
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing {}", path.display()))?,
        None => println!("{}", rendered),
    }

    Ok(())
}

/// Expand files and directories into the filtered, ordered input list
fn discover(inputs: &[PathBuf], filter: &FileFilter) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let path = entry.path();
                if entry.file_type().is_file() && has_source_extension(path) {
                    push_filtered(&mut out, path, filter);
                }
            }
        } else {
            push_filtered(&mut out, input, filter);
        }
    }
    out
}

fn has_source_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SOURCE_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}

fn push_filtered(out: &mut Vec<PathBuf>, path: &Path, filter: &FileFilter) {
    if filter.includes(&path.to_string_lossy()) {
        out.push(path.to_path_buf());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("vendor")).unwrap();
        std::fs::write(root.join("b.js"), "var b;").unwrap();
        std::fs::write(root.join("a.js"), "var a;").unwrap();
        std::fs::write(root.join("vendor").join("lib.js"), "var v;").unwrap();
        std::fs::write(root.join("notes.txt"), "ignored").unwrap();

        let filter = FileFilter::parse(&["-vendor".to_string()]).unwrap();
        let found = discover(&[root.to_path_buf()], &filter);
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.js", "b.js"]);
    }

    #[test]
    fn test_single_file_input() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("only.js");
        std::fs::write(&file, "f();").unwrap();
        let found = discover(&[file.clone()], &FileFilter::default());
        assert_eq!(found, vec![file]);
    }
}
