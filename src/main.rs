use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::{LevelFilter, info, warn};

use bintax::TaxonomyReference;
use bintax::convert::BinaryConverter;
use bintax::io::{DEFAULT_OUTPUT_FILE, write_newick_file, write_tree_file};
use bintax::taxonomy::NcbiTaxonomy;

#[derive(Parser)]
#[command(name = "bintax")]
#[command(version)]
#[command(about = "Build a balanced binary taxonomy tree from a list of taxids and the NCBI taxonomy")]
#[command(long_about = r#"
bintax - balanced binary taxonomy trees for hierarchical classification

Places the taxids of a training set (one line per training sample) into the
NCBI taxonomy, then balances the resulting tree into a binary tree whose
splits divide the samples roughly evenly. The tree file can be passed to the
classifier as precomputed tree for hierarchical clustering.

The NCBI dump files come from:
  https://ftp.ncbi.nlm.nih.gov/pub/taxonomy/taxdump.tar.gz
"#)]
struct Cli {
    /// List of taxids to tree-ify, one per line
    taxids: PathBuf,

    /// Name of output file
    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// nodes.dmp from the NCBI taxdump
    #[arg(long = "ncbi-nodes-file", alias = "ncbi_nodes_file")]
    ncbi_nodes_file: PathBuf,

    /// names.dmp from the NCBI taxdump (scientific names for --print and --newick)
    #[arg(long = "ncbi-names-file", alias = "ncbi_names_file")]
    ncbi_names_file: Option<PathBuf>,

    /// merged.dmp from the NCBI taxdump (redirects merged taxids)
    #[arg(long = "ncbi-merged-file", alias = "ncbi_merged_file")]
    ncbi_merged_file: Option<PathBuf>,

    /// Also export the binary tree in Newick format to this file
    #[arg(long)]
    newick: Option<PathBuf>,

    /// Print the binary tree to stdout
    #[arg(long)]
    print: bool,

    /// List all leaf taxids on the root line instead of none
    #[arg(long)]
    root_taxids: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease log verbosity (-q warnings only, -qq errors only)
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    run(cli)
}

fn init_logging(verbose: u8, quiet: u8) {
    let rust_log_set = std::env::var_os(env_logger::DEFAULT_FILTER_ENV).is_some();

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = cli_log_level(verbose, quiet, rust_log_set) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

/// Level selected by `-v`/`-q`, or `None` if `RUST_LOG` is set and takes precedence.
fn cli_log_level(verbose: u8, quiet: u8, rust_log_set: bool) -> Option<LevelFilter> {
    if rust_log_set {
        return None;
    }

    let level = match (verbose, quiet) {
        (_, 1) => LevelFilter::Warn,
        (_, q) if q > 1 => LevelFilter::Error,
        (0, _) => LevelFilter::Info,
        (1, _) => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    Some(level)
}

fn run(cli: Cli) -> Result<()> {
    info!("Loading NCBI info");
    let taxonomy = NcbiTaxonomy::load(
        cli.ncbi_nodes_file.as_path(),
        cli.ncbi_names_file.as_deref(),
        cli.ncbi_merged_file.as_deref(),
    )
    .context("Failed to load NCBI taxonomy")?;

    info!("Creating taxonomy tree");
    let (count_tree, summary) = bintax::tree_from_taxid_file(&cli.taxids, &taxonomy)
        .with_context(|| format!("Failed to build taxonomy tree from {}", cli.taxids.display()))?;
    info!("{summary}");
    if summary.uncounted_samples() > 0 {
        warn!(
            "{} of {} samples are not part of the tree",
            summary.uncounted_samples(),
            summary.input_samples
        );
    }

    let binary_tree = BinaryConverter::new()
        .with_root_taxids(cli.root_taxids)
        .convert(&count_tree)
        .context("Failed to convert taxonomy tree into a binary tree")?;

    let names: Option<&dyn TaxonomyReference> = Some(&taxonomy);
    if cli.print {
        binary_tree.print_tree(names);
    }

    info!("Saving binary tree to {}", cli.output.display());
    write_tree_file(&cli.output, &binary_tree)
        .with_context(|| format!("Failed to write binary tree to {}", cli.output.display()))?;

    if let Some(newick_path) = &cli.newick {
        info!("Saving Newick export to {}", newick_path.display());
        write_newick_file(newick_path, &binary_tree, names)
            .with_context(|| format!("Failed to write Newick file {}", newick_path.display()))?;
    }

    Ok(())
}
