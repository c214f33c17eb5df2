use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use treebank_annotator::{read_trees, typed_dependency_head_finder, Configuration, Pipeline};
use treebank_deps::{GrammaticalStructureBuilder, HeadDependencyBuilder};
use treebank_protocol::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One bracketed tree per line
    Text,
    /// A JSON array with one entry per input tree
    Json,
    /// Basic head dependencies, one block per tree
    Deps,
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Annotates Penn Treebank trees for PCFG training",
    after_help = "Annotation flags follow `--`, e.g. `treebank-annotate -i wsj.mrg -- -goodPCFG -splitTMP 1`"
)]
struct Cli {
    /// Bracketed trees to read (stdin when omitted)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Where to write the result (stdout when omitted)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log consumed flags and per-tree decisions
    #[arg(short, long)]
    verbose: bool,

    /// Run only the subcategory stripper
    #[arg(long)]
    strip_only: bool,

    /// Worker threads for corpus processing (rayon default when omitted)
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Annotation flag tokens
    #[arg(last = true, allow_hyphen_values = true)]
    flags: Vec<String>,
}

#[derive(Serialize)]
struct TreeReport<'a> {
    index: usize,
    input: &'a Tree,
    output: Option<&'a Tree>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the worker pool")?;
    }

    let (config, unrecognized) =
        Configuration::from_flags(&cli.flags).context("invalid annotation flags")?;
    if !unrecognized.is_empty() {
        bail!("unrecognized annotation flags: {}", unrecognized.join(" "));
    }
    info!(flags = %config.to_flags().join(" "), "configuration");

    let text = match &cli.input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let trees = read_trees(&text).context("failed to parse bracketed trees")?;
    info!(trees = trees.len(), "read corpus");

    let pipeline = Pipeline::new(&config);
    let results: Vec<Option<Tree>> = if cli.strip_only {
        trees.iter().map(|t| pipeline.stripper().strip(t)).collect()
    } else {
        pipeline.process_corpus(&trees)
    };

    let rendered = match cli.format {
        Format::Text => render_text(&results),
        Format::Json => render_json(&trees, &results)?,
        Format::Deps => render_deps(&config, &results),
    };

    match &cli.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{}", rendered),
    }
    Ok(())
}

fn render_text(results: &[Option<Tree>]) -> String {
    let mut out = String::new();
    for tree in results.iter().flatten() {
        let _ = writeln!(out, "{}", tree);
    }
    out
}

fn render_json(inputs: &[Tree], results: &[Option<Tree>]) -> anyhow::Result<String> {
    let reports: Vec<TreeReport<'_>> = inputs
        .iter()
        .zip(results)
        .enumerate()
        .map(|(index, (input, output))| TreeReport {
            index,
            input,
            output: output.as_ref(),
        })
        .collect();
    let mut json = serde_json::to_string_pretty(&reports).context("failed to encode JSON")?;
    json.push('\n');
    Ok(json)
}

/// `relation(governor-i, dependent-j)` lines, blank line between trees.
fn render_deps(config: &Configuration, results: &[Option<Tree>]) -> String {
    let head_finder = typed_dependency_head_finder(config);
    let builder = HeadDependencyBuilder::new();
    let mut out = String::new();
    for (index, tree) in results.iter().enumerate() {
        let Some(tree) = tree else { continue };
        match builder.build(tree, &head_finder) {
            Ok(structure) => {
                if let Some(root) = structure.root() {
                    let _ = writeln!(out, "root(ROOT-0, {}-{})", root.word, root.index);
                }
                for (gov, dep, relation) in structure.dependencies() {
                    let _ = writeln!(
                        out,
                        "{}({}-{}, {}-{})",
                        relation, gov.word, gov.index, dep.word, dep.index
                    );
                }
                out.push('\n');
            }
            Err(e) => warn!(tree = index, error = %e, "no dependencies"),
        }
    }
    out
}
