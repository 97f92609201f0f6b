use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

mod output;

use output::ColorMode;

use subiecte_batch::{BatchOptions, process_field};
use subiecte_core::{PdfBackend, ProgressEvent, config_file};
use subiecte_parsing::{CorpusEra, extract_subjects, field_grammar, fix_mojibake, flatten_text, known_fields};
use subiecte_pdf_mupdf::MupdfBackend;

/// Structure extractor for Romanian baccalaureate exam papers
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a corpus tree of `<field>/<year>/<version>` exam PDFs
    Parse {
        /// Root of the corpus tree (default: ./data, or config file)
        data_dir: Option<PathBuf>,

        /// Comma-separated field names; all registered field directories
        /// under the root when omitted
        #[arg(long, value_delimiter = ',')]
        field: Vec<String>,

        /// Number of parallel unit workers
        #[arg(long)]
        workers: Option<usize>,

        /// Anchor set to segment with: "modern" or "early-scan"
        #[arg(long)]
        era: Option<String>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Parse one exam PDF and print its structure as JSON (no caching)
    Extract {
        /// Path to a subiect or barem PDF
        pdf_path: PathBuf,

        /// Field whose grammar to apply
        #[arg(long)]
        field: String,

        /// Treat the document as a grading rubric instead of a subject paper
        #[arg(long)]
        rubric: bool,

        /// Anchor set to segment with: "modern" or "early-scan"
        #[arg(long)]
        era: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Parse {
            data_dir,
            field,
            workers,
            era,
            no_color,
        } => parse_corpus(data_dir, field, workers, era, no_color).await,
        Command::Extract {
            pdf_path,
            field,
            rubric,
            era,
        } => extract_one(pdf_path, field, rubric, era),
    }
}

fn resolve_era(flag: Option<String>, config: &config_file::ConfigFile) -> anyhow::Result<CorpusEra> {
    let name = flag
        .or_else(|| std::env::var("SUBIECTE_ERA").ok())
        .or_else(|| config.processing.as_ref().and_then(|p| p.era.clone()));
    match name {
        Some(name) => name.parse().map_err(|e: String| anyhow::anyhow!(e)),
        None => Ok(CorpusEra::default()),
    }
}

/// Field directories under the corpus root that have a registered grammar,
/// in sorted order. Unregistered directories are reported and skipped.
fn discover_fields(data_root: &std::path::Path) -> anyhow::Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(data_root)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();

    for name in entries {
        if known_fields().any(|known| known == name) {
            fields.push(name);
        } else {
            tracing::warn!(field = %name, "skipping directory: no grammar registered");
        }
    }
    Ok(fields)
}

async fn parse_corpus(
    data_dir: Option<PathBuf>,
    fields: Vec<String>,
    workers: Option<usize>,
    era: Option<String>,
    no_color: bool,
) -> anyhow::Result<()> {
    // Resolve configuration: CLI flags > env vars > config file > defaults
    let config = config_file::load_config();
    let data_root = data_dir
        .or_else(|| std::env::var("SUBIECTE_DATA_DIR").ok().map(PathBuf::from))
        .or_else(|| {
            config
                .data
                .as_ref()
                .and_then(|d| d.root.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("data"));
    let num_workers = workers
        .or_else(|| {
            std::env::var("SUBIECTE_WORKERS")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .or_else(|| config.processing.as_ref().and_then(|p| p.workers))
        .unwrap_or(4);
    let era = resolve_era(era, &config)?;

    if !data_root.is_dir() {
        anyhow::bail!("Data directory not found: {}", data_root.display());
    }

    let fields = if !fields.is_empty() {
        fields
    } else if let Some(configured) = config.data.as_ref().and_then(|d| d.fields.clone()) {
        configured
    } else {
        discover_fields(&data_root)?
    };
    if fields.is_empty() {
        anyhow::bail!(
            "No field directories to process under {}",
            data_root.display()
        );
    }

    let color = ColorMode(!no_color);
    let progress: Arc<dyn Fn(ProgressEvent) + Send + Sync> = Arc::new(move |event| {
        let mut out = std::io::stdout();
        let _ = output::print_progress(&mut out, &event, color);
        let _ = out.flush();
    });

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let backend: Arc<dyn PdfBackend> = Arc::new(MupdfBackend::new());
    let options = BatchOptions { num_workers, era };

    let mut writer = std::io::stdout();
    for field in &fields {
        if cancel.is_cancelled() {
            break;
        }
        let summary = process_field(
            &data_root.join(field),
            backend.clone(),
            None,
            &options,
            progress.clone(),
            cancel.clone(),
        )
        .await?;
        output::print_field_summary(&mut writer, &summary, color)?;
    }

    if cancel.is_cancelled() {
        writeln!(
            writer,
            "Interrupted; consolidated outputs for unfinished fields were not written."
        )?;
    }
    Ok(())
}

fn extract_one(
    pdf_path: PathBuf,
    field: String,
    rubric: bool,
    era: Option<String>,
) -> anyhow::Result<()> {
    let config = config_file::load_config();
    let era = resolve_era(era, &config)?;

    if !pdf_path.exists() {
        anyhow::bail!("File not found: {}", pdf_path.display());
    }
    let grammar = field_grammar(&field)?;

    let backend = MupdfBackend::new();
    let text = fix_mojibake(&backend.extract_text(&pdf_path, true)?);
    let subjects = extract_subjects(&text, era)?;

    let mut writer = std::io::stdout();
    for (i, (block, rules)) in subjects.iter().zip(grammar.subjects).enumerate() {
        let node = if rubric {
            rules.rubric.apply(block)
        } else {
            rules.task.apply(block)?
        };
        let node = node.map_leaves(&flatten_text);
        writeln!(writer, "subiectul_{}:", i + 1)?;
        writeln!(writer, "{}", serde_json::to_string_pretty(&node)?)?;
        writeln!(writer)?;
    }
    Ok(())
}
