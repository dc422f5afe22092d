//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use docenrich_core::canonical::{known_domains, terms_for_domain};
use docenrich_core::{BatchProgress, Enricher, SourceDocument, extraction_instructions};
use docenrich_shared::types::parse_publication_date;
use docenrich_shared::{AppConfig, MetadataFacts, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// docenrich: enrich technical documents before knowledge-graph ingestion.
#[derive(Parser)]
#[command(
    name = "docenrich",
    version,
    about = "Normalize, score and annotate documents for knowledge-graph ingestion.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file to use instead of ~/.docenrich/docenrich.toml.
    #[arg(long, global = true, env = "DOCENRICH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Enrich files for one topic and print the hand-off payloads as JSON.
    Enrich(EnrichArgs),

    /// Print the extraction instructions for a topic.
    Instructions {
        /// Topic (e.g. ai, quantum_computing, biology).
        #[arg(short, long)]
        topic: String,
    },

    /// List canonical abbreviation terms.
    Terms {
        /// Only this domain. Defaults to all.
        #[arg(short, long)]
        domain: Option<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `enrich`.
#[derive(clap::Args)]
pub(crate) struct EnrichArgs {
    /// Files to enrich.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Topic for this batch; fills primary_topic when not given in facts.
    #[arg(short, long)]
    topic: String,

    /// Dataset name (defaults to the topic).
    #[arg(long)]
    dataset: Option<String>,

    /// JSON facts: an object applied to every file, or an array with one
    /// object per file.
    #[arg(long)]
    facts: Option<PathBuf>,

    /// Document type (paper, book, article, technical_doc, blog_post, interview).
    #[arg(long)]
    doc_type: Option<String>,

    /// Author, repeatable. "Last, First" is accepted.
    #[arg(long = "author")]
    authors: Vec<String>,

    /// Keyword, repeatable.
    #[arg(long = "keyword")]
    keywords: Vec<String>,

    /// Subtopic, repeatable.
    #[arg(long = "subtopic")]
    subtopics: Vec<String>,

    /// Publication venue.
    #[arg(long)]
    venue: Option<String>,

    /// Mark the documents as peer reviewed.
    #[arg(long)]
    peer_reviewed: bool,

    /// Publication date (YYYY-MM-DD or RFC 3339).
    #[arg(long)]
    date: Option<String>,

    /// Pass file contents inline instead of file paths.
    #[arg(long)]
    inline: bool,

    /// Expand the first mention of each abbreviation in inline content.
    #[arg(long)]
    expand: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// clean JSON.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "docenrich=info",
        1 => "docenrich=debug",
        _ => "docenrich=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Enrich(args) => cmd_enrich(cli.config.as_deref(), args),
        Command::Instructions { topic } => cmd_instructions(&topic),
        Command::Terms { domain } => cmd_terms(domain.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(cli.config.as_deref()),
        },
    }
}

fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

// ---------------------------------------------------------------------------
// enrich
// ---------------------------------------------------------------------------

fn cmd_enrich(config_path: Option<&Path>, args: EnrichArgs) -> Result<()> {
    let mut config = resolve_config(config_path)?;
    if args.expand {
        config.enrichment.expand_abbreviations = true;
    }

    let per_file_facts = load_facts(args.facts.as_deref(), args.files.len())?;
    let overrides = facts_from_flags(&args)?;

    let mut sources = Vec::with_capacity(args.files.len());
    for (path, facts) in args.files.iter().zip(per_file_facts) {
        let facts = apply_overrides(facts, &overrides);
        let text = match std::fs::read_to_string(path) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read file as text, passing path only");
                None
            }
        };
        let source = match (args.inline, text) {
            (true, Some(text)) => SourceDocument::from_text(text, facts),
            (true, None) => return Err(eyre!("--inline needs readable text, but '{}' is not", path.display())),
            (false, Some(text)) => SourceDocument::from_path(path, facts).with_raw_text(text),
            (false, None) => SourceDocument::from_path(path, facts),
        };
        sources.push(source);
    }

    let dataset = args.dataset.unwrap_or_else(|| args.topic.clone());
    info!(topic = %args.topic, dataset = %dataset, files = sources.len(), "enriching documents");

    let enricher = Enricher::new(&config);
    let progress = CliProgress::new(sources.len());
    let batch = enricher.prepare_batch(&args.topic, &dataset, sources, &progress)?;
    progress.finish();

    println!("{}", serde_json::to_string_pretty(&batch)?);
    Ok(())
}

/// Read `--facts`: one object for all files, or one object per file.
fn load_facts(path: Option<&Path>, file_count: usize) -> Result<Vec<MetadataFacts>> {
    let Some(path) = path else {
        return Ok(vec![MetadataFacts::default(); file_count]);
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|e| eyre!("cannot read facts file '{}': {e}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    match value {
        serde_json::Value::Array(items) => {
            if items.len() != file_count {
                return Err(eyre!(
                    "facts file has {} entries but {file_count} files were given",
                    items.len()
                ));
            }
            items
                .into_iter()
                .map(|v| MetadataFacts::from_value(v).map_err(Into::into))
                .collect()
        }
        object @ serde_json::Value::Object(_) => {
            let facts = MetadataFacts::from_value(object)?;
            Ok(vec![facts; file_count])
        }
        _ => Err(eyre!("facts file must hold a JSON object or array")),
    }
}

/// Facts given as command-line flags.
fn facts_from_flags(args: &EnrichArgs) -> Result<MetadataFacts> {
    let publication_date = args
        .date
        .as_deref()
        .map(parse_publication_date)
        .transpose()?;
    Ok(MetadataFacts {
        doc_type: args.doc_type.clone(),
        authors: args.authors.clone(),
        keywords: args.keywords.clone(),
        subtopics: args.subtopics.clone(),
        publication_venue: args.venue.clone(),
        peer_reviewed: args.peer_reviewed,
        publication_date,
        ..Default::default()
    })
}

/// Flags win over facts-file values when present.
fn apply_overrides(mut facts: MetadataFacts, flags: &MetadataFacts) -> MetadataFacts {
    if flags.doc_type.is_some() {
        facts.doc_type = flags.doc_type.clone();
    }
    if !flags.authors.is_empty() {
        facts.authors = flags.authors.clone();
    }
    if !flags.keywords.is_empty() {
        facts.keywords = flags.keywords.clone();
    }
    if !flags.subtopics.is_empty() {
        facts.subtopics = flags.subtopics.clone();
    }
    if flags.publication_venue.is_some() {
        facts.publication_venue = flags.publication_venue.clone();
    }
    if flags.publication_date.is_some() {
        facts.publication_date = flags.publication_date;
    }
    facts.peer_reviewed |= flags.peer_reviewed;
    facts
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif bar on stderr.
struct CliProgress {
    bar: ProgressBar,
}

impl CliProgress {
    fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchProgress for CliProgress {
    fn document_done(&self, current: usize, _total: usize, label: &str) {
        self.bar.set_position(current as u64);
        self.bar.set_message(label.to_string());
    }
}

// ---------------------------------------------------------------------------
// Other commands
// ---------------------------------------------------------------------------

fn cmd_instructions(topic: &str) -> Result<()> {
    print!("{}", extraction_instructions(topic));
    Ok(())
}

fn cmd_terms(domain: Option<&str>) -> Result<()> {
    let domains: Vec<String> = match domain {
        Some(d) => vec![d.to_lowercase()],
        None => known_domains().into_iter().map(String::from).collect(),
    };

    for domain in domains {
        let terms = terms_for_domain(&domain);
        if terms.is_empty() {
            println!("{domain}: no canonical terms");
            continue;
        }
        println!("{domain}:");
        for (abbreviation, canonical) in terms {
            println!("  {abbreviation:<8} {canonical}");
        }
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = resolve_config(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
