use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rayon::prelude::*;
use tracing::info;

use profilegen::record::RecordSet;
use profilegen::render::{candidate, europass, markdown, RenderOptions};

#[derive(Parser)]
#[command(name = "profilegen", about = "Render a career-profile snapshot into Markdown and CV XML")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render documents from a records snapshot
    Render {
        /// Records JSON: domain tag → record list
        #[arg(short, long)]
        input: PathBuf,
        /// Directory the documents are written to
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
        /// Which document to produce
        #[arg(short, long, value_enum, default_value = "all")]
        format: Format,
        /// Optional JSON file overriding the identity links and artifact paths
        #[arg(long)]
        options: Option<PathBuf>,
    },
    /// Show per-domain record counts for a snapshot
    Inspect {
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, PartialEq)]
enum Format {
    Markdown,
    Candidate,
    Europass,
    All,
}

#[derive(Clone, Copy)]
enum Document {
    Markdown,
    Candidate,
    Europass,
}

impl Document {
    fn filename(self) -> &'static str {
        match self {
            Document::Markdown => "README.md",
            Document::Candidate => "candidate_cv.xml",
            Document::Europass => "skills_passport.xml",
        }
    }

    fn render(self, records: &RecordSet, opts: &RenderOptions) -> String {
        match self {
            Document::Markdown => markdown::render(records, opts),
            Document::Candidate => candidate::render(records, opts),
            Document::Europass => europass::render(records, opts),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Render { input, out_dir, format, options } => {
            let records = load_records(&input)?;
            let opts = load_options(options.as_deref())?;

            let documents: Vec<Document> = match format {
                Format::Markdown => vec![Document::Markdown],
                Format::Candidate => vec![Document::Candidate],
                Format::Europass => vec![Document::Europass],
                Format::All => vec![Document::Markdown, Document::Candidate, Document::Europass],
            };

            // Renderers are pure functions over the shared snapshot, so the
            // formats render independently.
            let rendered: Vec<(&'static str, String)> = documents
                .par_iter()
                .map(|doc| (doc.filename(), doc.render(&records, &opts)))
                .collect();

            fs::create_dir_all(&out_dir)
                .with_context(|| format!("Failed to create {}", out_dir.display()))?;
            for (filename, text) in rendered {
                let path = out_dir.join(filename);
                fs::write(&path, text)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Commands::Inspect { input } => {
            let records = load_records(&input)?;
            let rows = records.overview();

            println!("{:<28} | {:>7}", "Domain", "Records");
            println!("{}", "-".repeat(38));
            let mut total = 0;
            for (domain, count) in &rows {
                println!("{:<28} | {:>7}", domain, count);
                total += count;
            }
            println!("\n{} records across {} domains", total, rows.len());
            Ok(())
        }
    }
}

fn load_records(path: &std::path::Path) -> Result<RecordSet> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: RecordSet = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid snapshot in {}", path.display()))?;
    if records.is_empty() {
        bail!("{} holds no records in any domain", path.display());
    }
    let domains = records.overview();
    info!(
        "Loaded {} domains, {} records",
        domains.len(),
        domains.iter().map(|(_, n)| n).sum::<usize>()
    );
    Ok(records)
}

fn load_options(path: Option<&std::path::Path>) -> Result<RenderOptions> {
    match path {
        Some(p) => {
            let raw = fs::read_to_string(p)
                .with_context(|| format!("Failed to read {}", p.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("Invalid options in {}", p.display()))
        }
        None => Ok(RenderOptions::default()),
    }
}
