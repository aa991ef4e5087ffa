//! Command-line front end: filter a corpus file and print the table.
//!
//! Usage: `mtinspect [--text | --json] <corpus.json> [query]`
//! where `query` uses the page's parameters, e.g. `minwer=10&punct=yes`.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use mtinspect::{Corpus, FilterConfig, build_table, render};
use tracing::info;
use tracing_subscriber::EnvFilter;

enum Output {
    Html,
    Text,
    Json,
}

struct Args {
    output: Output,
    corpus: PathBuf,
    query: String,
}

fn parse_args() -> Result<Args> {
    let mut output = Output::Html;
    let mut positional = Vec::new();

    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--text" => output = Output::Text,
            "--json" => output = Output::Json,
            "--html" => output = Output::Html,
            flag if flag.starts_with("--") => bail!("unknown option {flag}"),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(corpus) = positional.next() else {
        bail!("usage: mtinspect [--text | --json] <corpus.json> [query]");
    };

    Ok(Args {
        output,
        corpus: PathBuf::from(corpus),
        query: positional.next().unwrap_or_default(),
    })
}

fn init_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))
}

fn main() -> Result<()> {
    init_logging()?;
    let args = parse_args()?;

    let config = FilterConfig::from_query(&args.query).context("invalid filter query")?;
    let corpus = Corpus::load(&args.corpus)
        .with_context(|| format!("failed to load corpus {}", args.corpus.display()))?;
    corpus.validate().context("corpus failed validation")?;

    let table = build_table(&corpus.records, &config).context("failed to render table")?;

    match args.output {
        Output::Html => println!("{}", render::render_rows(&table)),
        Output::Text => print!("{}", render::render_text(&table)),
        Output::Json => println!("{}", serde_json::to_string_pretty(&table)?),
    }

    info!(
        "{} outputs ({} examined, {} rejected)",
        table.total,
        table.stats.examined,
        table.stats.rejected()
    );
    Ok(())
}
