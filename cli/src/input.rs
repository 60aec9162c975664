/*
 * SPDX-FileCopyrightText: 2026 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Readers for the input formats of the command-line interface.

use anyhow::{Context, Result, bail, ensure};
use clap::{Args, ValueEnum};
use rankgraph::VecGraph;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::PathBuf;

/// The formats a graph can be read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Worker count, damping factor, page count, one page name per line,
    /// arc count, and one "source destination" pair of names per line.
    PageList,
    /// One arc per line; nodes are numbered in order of appearance.
    Arcs,
}

#[derive(Args, Debug)]
/// Shared CLI arguments for reading files containing arcs.
pub struct ArcsArgs {
    #[arg(long, default_value_t = '#')]
    /// Ignore lines that start with this symbol.
    pub line_comment_symbol: char,

    #[arg(long)]
    /// The column separator (default: any whitespace).
    pub separator: Option<char>,

    #[arg(long, default_value_t = 0)]
    /// The index of the column containing the source node of an arc.
    pub source_column: usize,

    #[arg(long, default_value_t = 1)]
    /// The index of the column containing the target node of an arc.
    pub target_column: usize,
}

impl Default for ArcsArgs {
    fn default() -> Self {
        Self {
            line_comment_symbol: '#',
            separator: None,
            source_column: 0,
            target_column: 1,
        }
    }
}

/// Shared CLI arguments for reading a graph.
#[derive(Args, Debug)]
pub struct InputArgs {
    /// The input file (default: standard input).
    pub input: Option<PathBuf>,

    #[arg(short = 'f', long, value_enum, default_value_t = InputFormat::PageList)]
    /// The input format.
    pub input_format: InputFormat,

    #[clap(flatten)]
    pub arcs_args: ArcsArgs,
}

/// A graph together with the run configuration carried by its input.
#[derive(Debug, Clone)]
pub struct Input {
    pub graph: VecGraph,
    /// The number of workers requested by the input, if any.
    pub num_threads: Option<usize>,
    /// The damping factor requested by the input, if any.
    pub damping: Option<f64>,
}

impl InputArgs {
    /// Reads the input described by the arguments.
    pub fn read(&self) -> Result<Input> {
        match &self.input {
            None => {
                log::info!("Reading {:?} from standard input", self.input_format);
                self.read_from(std::io::stdin().lock())
            }
            Some(path) => {
                log::info!("Reading {:?} from {}", self.input_format, path.display());
                let file = std::fs::File::open(path)
                    .with_context(|| format!("Could not open {}", path.display()))?;
                self.read_from(std::io::BufReader::new(file))
                    .with_context(|| format!("Could not read {}", path.display()))
            }
        }
    }

    fn read_from(&self, reader: impl BufRead) -> Result<Input> {
        let input = match self.input_format {
            InputFormat::PageList => read_page_list(reader)?,
            InputFormat::Arcs => Input {
                graph: read_arcs(reader, &self.arcs_args)?,
                num_threads: None,
                damping: None,
            },
        };
        log::info!(
            "Read {} nodes and {} arcs",
            rankgraph::RankGraph::num_nodes(&input.graph),
            rankgraph::RankGraph::num_arcs(&input.graph)
        );
        Ok(input)
    }
}

/// Non-blank lines of a reader, trimmed, with their (one-based) line number.
struct Lines<R> {
    lines: std::io::Lines<R>,
    line_num: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_num: 0,
        }
    }

    /// Returns the next non-blank line, if any.
    fn rest(&mut self) -> Result<Option<(usize, String)>> {
        for line in self.lines.by_ref() {
            self.line_num += 1;
            let line = line.with_context(|| format!("Could not read line {}", self.line_num))?;
            let line = line.trim();
            if !line.is_empty() {
                return Ok(Some((self.line_num, line.to_owned())));
            }
        }
        Ok(None)
    }

    /// Returns the next non-blank line, failing at end of file.
    fn next_line(&mut self, what: &str) -> Result<(usize, String)> {
        self.rest()?
            .with_context(|| format!("Unexpected end of file: expected {what}"))
    }

    /// Parses the next non-blank line.
    fn parse<T: std::str::FromStr>(&mut self, what: &str) -> Result<T>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        let (line_num, line) = self.next_line(what)?;
        line.parse::<T>()
            .with_context(|| format!("Line {line_num}: could not parse {what} from {line:?}"))
    }
}

/// Reads a graph in page-list format.
///
/// The input contains, one item per line, the number of workers, the damping
/// factor, the number of pages, the page names, the number of arcs and the
/// arcs, each given by the names of its source and destination separated by
/// whitespace. Blank lines are ignored. A non-positive number of workers is
/// returned as zero.
pub fn read_page_list(reader: impl BufRead) -> Result<Input> {
    let mut lines = Lines::new(reader);

    let num_threads = lines.parse::<i64>("the number of workers")?;
    let damping = lines.parse::<f64>("the damping factor")?;
    let num_pages = lines.parse::<usize>("the number of pages")?;

    let mut graph = VecGraph::new();
    let mut ids = HashMap::new();
    for i in 0..num_pages {
        let (line_num, name) = lines.next_line(&format!("page name {} of {num_pages}", i + 1))?;
        ensure!(
            !ids.contains_key(&name),
            "Line {line_num}: duplicate page name {name:?}"
        );
        let node = graph.add_node(name.clone());
        ids.insert(name, node);
    }

    let num_arcs = lines.parse::<u64>("the number of edges")?;
    for i in 0..num_arcs {
        let (line_num, line) = lines.next_line(&format!("edge {} of {num_arcs}", i + 1))?;
        let mut tokens = line.split_whitespace();
        let (Some(src), Some(dst), None) = (tokens.next(), tokens.next(), tokens.next()) else {
            bail!("Line {line_num}: expected two page names, got {line:?}");
        };
        let src = *ids
            .get(src)
            .with_context(|| format!("Line {line_num}: unknown page {src:?}"))?;
        let dst = *ids
            .get(dst)
            .with_context(|| format!("Line {line_num}: unknown page {dst:?}"))?;
        graph.add_arc(src, dst);
    }

    if let Some((line_num, line)) = lines.rest()? {
        bail!("Line {line_num}: unexpected content after {num_arcs} edges: {line:?}");
    }

    Ok(Input {
        graph,
        num_threads: Some(usize::try_from(num_threads).unwrap_or(0)),
        damping: Some(damping),
    })
}

/// Reads a graph given as a list of arcs.
///
/// Nodes are named by the labels appearing in the arcs and numbered in
/// order of first appearance. Comment lines are skipped, and lines without
/// enough columns are logged and skipped.
pub fn read_arcs(reader: impl BufRead, args: &ArcsArgs) -> Result<VecGraph> {
    let mut graph = VecGraph::new();
    let mut ids = HashMap::new();
    let biggest_idx = args.source_column.max(args.target_column);

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Could not read line {}", line_num + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(args.line_comment_symbol) {
            continue;
        }

        let vals = match args.separator {
            Some(separator) => trimmed.split(separator).map(str::trim).collect::<Vec<_>>(),
            None => trimmed.split_whitespace().collect::<Vec<_>>(),
        };

        if vals.len() <= biggest_idx {
            log::warn!(
                "Line {}: {:?} does not have enough columns: got {} columns but expected at least {} (you can change the separator using the --separator option)",
                line_num + 1,
                line,
                vals.len(),
                biggest_idx + 1,
            );
            continue;
        }

        let mut id = |label: &str| {
            *ids.entry(label.to_owned())
                .or_insert_with(|| graph.add_node(label))
        };
        let src = id(vals[args.source_column]);
        let dst = id(vals[args.target_column]);
        graph.add_arc(src, dst);
    }

    if rankgraph::RankGraph::num_arcs(&graph) == 0 {
        log::warn!("No arcs read: check the --separator, --source-column and --target-column options");
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rankgraph::prelude::*;

    const PAGES: &str = "2\n0.85\n3\nA\nB\n\nC\n4\nA B\nB C\nC A\nA C\n";

    #[test]
    fn test_page_list() -> Result<()> {
        let input = read_page_list(PAGES.as_bytes())?;
        assert_eq!(input.num_threads, Some(2));
        assert_eq!(input.damping, Some(0.85));
        let g = &input.graph;
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_arcs(), 4);
        assert_eq!(g.name(2), "C");
        assert_eq!(g.outdegree(0), 2);
        assert_eq!(g.predecessors(2).collect::<Vec<_>>(), vec![1, 0]);
        Ok(())
    }

    #[test]
    fn test_page_list_no_edges() -> Result<()> {
        let input = read_page_list("-1\n0.85\n1\nA\n0\n\n".as_bytes())?;
        assert_eq!(input.num_threads, Some(0));
        assert_eq!(input.graph.num_nodes(), 1);
        assert!(input.graph.is_dangling(0));
        Ok(())
    }

    #[test]
    fn test_page_list_errors() {
        for bad in [
            "",
            "x\n0.85\n1\nA\n0\n",
            "1\n0.85\n2\nA\nA\n0\n",
            "1\n0.85\n2\nA\nB\n1\nA D\n",
            "1\n0.85\n2\nA\nB\n1\nA B C\n",
            "1\n0.85\n2\nA\nB\n2\nA B\n",
            "1\n0.85\n2\nA\nB\n1\nA B\nB A\n",
            "1\n0.85\n3\nA\nB\n",
        ] {
            assert!(read_page_list(bad.as_bytes()).is_err(), "{bad:?}");
        }
    }

    #[test]
    fn test_page_list_huge_page_count() {
        let huge = format!("1\n0.85\n{}\nA\n", u64::MAX);
        let err = read_page_list(huge.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Unexpected end of file"), "{err}");
    }

    #[test]
    fn test_arcs() -> Result<()> {
        let arcs = "# comment\nx y\ny z\n\nbroken\nz x\n";
        let g = read_arcs(arcs.as_bytes(), &ArcsArgs::default())?;
        assert_eq!(g.num_nodes(), 3);
        assert_eq!(g.num_arcs(), 3);
        assert_eq!(g.names(), &["x", "y", "z"]);
        Ok(())
    }

    #[test]
    fn test_arcs_columns() -> Result<()> {
        let args = ArcsArgs {
            separator: Some(','),
            source_column: 2,
            target_column: 0,
            ..ArcsArgs::default()
        };
        let g = read_arcs("b,1,a\nc,2,b\n".as_bytes(), &args)?;
        assert_eq!(g.names(), &["a", "b", "c"]);
        assert_eq!(g.predecessors(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(g.predecessors(2).collect::<Vec<_>>(), vec![1]);
        Ok(())
    }
}
