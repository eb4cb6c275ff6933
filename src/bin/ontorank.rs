

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use ontorank::db::{FileMatrixStore, InMemoryGraphStore, InMemoryMatrixStore, MatrixStore};
use ontorank::toolkit::lexical::Corpora;
use ontorank::toolkit::search::{CdsName, ConfigurationSelector, EngineLoader, SearchRequest};
use ontorank::{OntoRankConfig, safe_truncate_ellipsis};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

enum Command {
    Matrix,
    Search(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("ontorank=info".parse()?))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut selector = ConfigurationSelector::Default;
    let mut cds = CdsName::All;
    let mut result_threshold: Option<f64> = None;
    let mut json = false;
    let mut command: Option<Command> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                config_path = args.get(i).map(PathBuf::from);
            }
            "--configuration" => {
                i += 1;
                if let Some(id) = args.get(i) {
                    selector = ConfigurationSelector::from(id.as_str());
                }
            }
            "--cds" => {
                i += 1;
                if let Some(name) = args.get(i) {
                    cds = name.parse().with_context(|| format!("unknown matrix name {name}"))?;
                }
            }
            "--threshold" | "-t" => {
                i += 1;
                if let Some(t) = args.get(i) {
                    result_threshold = Some(t.parse().context("threshold must be a number")?);
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "matrix" => command = Some(Command::Matrix),
            "search" => {
                command = Some(Command::Search(args[i + 1..].join(" ")));
                break;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_help();
                std::process::exit(2);
            }
        }
        i += 1;
    }

    let Some(command) = command else {
        print_help();
        std::process::exit(2);
    };

    let config = match &config_path {
        Some(path) => OntoRankConfig::load(path)?,
        None => OntoRankConfig::from_env(),
    };
    config.validate()?;

    let snapshot = config
        .snapshot_path
        .clone()
        .context("no graph snapshot configured (snapshot_path or ONTORANK_SNAPSHOT_PATH)")?;
    let corpus_path = config
        .corpus_path
        .clone()
        .context("no lexical corpus configured (corpus_path or ONTORANK_CORPUS_PATH)")?;

    let store = Arc::new(InMemoryGraphStore::load(&snapshot, config.default_configuration.clone()).await?);
    let matrices: Arc<dyn MatrixStore> = match &config.matrix_dir {
        Some(dir) => Arc::new(FileMatrixStore::open(dir).await?),
        None => Arc::new(InMemoryMatrixStore::new()),
    };
    let corpora = Corpora::new().with(Corpora::load(config.language, &corpus_path).await?);
    let loader = EngineLoader::new(store, matrices, &corpora, config)?;

    match command {
        Command::Matrix => {
            let loaded = loader.ensure_all_loaded().await?;
            let stats = loader.cache_stats();
            println!("Matrices up to date for {} configuration(s)", loaded);
            println!(
                "   cache hits: {}, misses: {}, hit rate: {:.0}%",
                stats.hits,
                stats.misses,
                stats.hit_rate * 100.0
            );
        }
        Command::Search(query) => {
            if query.trim().is_empty() {
                anyhow::bail!("search needs a query");
            }
            let request = SearchRequest::new(query)
                .with_cds(cds)
                .with_thresholds(None, result_threshold);
            let response = loader.search(selector, &request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }

            println!("Query concepts:");
            for concept in &response.query_concepts {
                println!("   {:.3}  {}", concept.score, concept.label);
            }
            println!();
            println!("{} dataset(s):", response.results.len());
            for result in &response.results {
                let title = result
                    .info
                    .as_ref()
                    .map(|i| i.title.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or(result.dataset.as_str());
                println!("   {:.3}  {}", result.score, safe_truncate_ellipsis(title, 72));
                if let Some(concepts) = &result.concepts {
                    let names: Vec<&str> = concepts.iter().map(|c| c.label.as_str()).collect();
                    println!("          {}", names.join(", "));
                }
            }
        }
    }

    Ok(())
}

fn print_help() {
    println!(r#"
OntoRank dataset search

USAGE:
    ontorank [OPTIONS] matrix
    ontorank [OPTIONS] search <QUERY>...

COMMANDS:
    matrix                   Compute and store matrices for every configuration
    search                   Rank datasets against a free-text query

OPTIONS:
    -c, --config <FILE>      Settings file (JSON, TOML or YAML)
    --configuration <ID>     Configuration to search (default: the store's default)
    --cds <NAME>             similarity, autotag or all (default: all)
    -t, --threshold <T>      Minimum result score in [0, 1] (default: 0.75)
    --json                   Print the response as JSON
    -h, --help               Print this help

ENVIRONMENT:
    ONTORANK_SNAPSHOT_PATH   Graph snapshot (JSON)
    ONTORANK_CORPUS_PATH     Lexical corpus export (JSON)
    ONTORANK_MATRIX_DIR      Directory for stored matrices
    ONTORANK_DEFAULT_CONFIGURATION  Configuration used when none is named
    ONTORANK_LANGUAGE        en or nb
    RUST_LOG                 Log filter, e.g. ontorank=debug
"#);
}
