//! End-to-end run: read input, build the tree once, answer every query.

use crate::config::Config;
use crate::error::BuildWarning;
use crate::parser::parse_input;
use crate::path_finder::{find_path_with, PathStrategy};
use crate::record::PathQuery;
use crate::tree::{build, Tree};
use crate::writer::PathWriter;
use anyhow::{bail, Context, Result};

/// What a run did, for the caller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub nodes: usize,
    pub dropped: Vec<BuildWarning>,
    pub queries: usize,
    /// Queries that printed an empty line
    pub empty_results: usize,
    pub lines_written: usize,
}

/// Answers queries in order, writing one line each.
///
/// Returns the number of queries with an empty result. A query naming an
/// unknown node only yields an empty line; later queries are unaffected.
pub fn run_queries(
    tree: &Tree,
    queries: &[PathQuery],
    strategy: PathStrategy,
    writer: &mut PathWriter,
) -> Result<usize> {
    log::info!("there are {} test cases", queries.len());

    let mut empty_results = 0;
    for query in queries {
        let path = find_path_with(tree, query.start, query.end, strategy);
        if path.is_empty() {
            empty_results += 1;
        }
        writer.write_path(&path)?;
    }
    writer.flush()?;
    Ok(empty_results)
}

/// Runs the whole pipeline described by `config`.
///
/// With `config.strict` set, dropped records fail the run after all query
/// results have been written.
pub fn run(config: &Config) -> Result<RunSummary> {
    let input = parse_input(&config.input, config.format)?;

    let report = build(&input.records)
        .with_context(|| format!("Failed to build tree from {}", config.input))?;

    let mut writer = match &config.output {
        Some(path) => PathWriter::new(path)?,
        None => PathWriter::stdout(),
    };

    let empty_results = run_queries(&report.tree, &input.queries, config.strategy, &mut writer)?;

    let summary = RunSummary {
        nodes: report.tree.len(),
        dropped: report.warnings,
        queries: input.queries.len(),
        empty_results,
        lines_written: writer.lines_written(),
    };

    if config.strict && !summary.dropped.is_empty() {
        bail!(
            "{} node records were dropped while building the tree (first: {})",
            summary.dropped.len(),
            summary.dropped[0]
        );
    }

    Ok(summary)
}
