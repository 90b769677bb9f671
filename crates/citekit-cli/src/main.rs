use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use citekit_core::{AppConfig, ExitCode, Language, NamedStyle, StyleConfig, export_style, import_style};
use citekit_science::http::DiskCache;
use citekit_science::input::read_reference_file;
use citekit_science::render::{render_doi_list, render_plain_text, render_statistics};
use citekit_science::sources::{CrossRefSource, MetadataSource};
use citekit_science::{
    DoiResolver, ProgressEvent, ProgressPhase, ReferenceBatchProcessor, RunOptions, compute_statistics_now,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "citekit",
    about = "Resolve DOIs and format bibliographies from Crossref metadata",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format. Also enabled by setting CITEKIT_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Format a file of references, one per line.
    Format {
        file: PathBuf,
        /// Exported style JSON to format with.
        #[arg(long, conflicts_with = "preset")]
        style: Option<PathBuf>,
        /// Named style: gost, acs, rsc or cta.
        #[arg(long)]
        preset: Option<String>,
        /// Flat preview strings instead of styled runs.
        #[arg(long)]
        preview: bool,
        /// Drop existing `1.` / `[1]` numbering from input lines.
        #[arg(long)]
        strip_numbering: bool,
        /// Also write the plain-text DOI list here.
        #[arg(long)]
        doi_list: Option<PathBuf>,
        /// Print journal/year/author statistics after the bibliography.
        #[arg(long)]
        stats: bool,
        /// Bypass the metadata cache.
        #[arg(long)]
        no_cache: bool,
        /// Label language (en, ru). Defaults to the configured one.
        #[arg(long)]
        lang: Option<String>,
    },

    /// Find the DOI of a single reference.
    Resolve { text: String },

    /// Style import/export.
    Style {
        #[command(subcommand)]
        action: StyleAction,
    },

    /// Metadata cache management.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information.
    Version,
}

#[derive(Subcommand)]
enum StyleAction {
    /// Write a style envelope (the default custom style unless --preset).
    Export {
        #[arg(long)]
        preset: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate an exported style file.
    Check { file: PathBuf },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove every cached metadata record.
    Clear,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the config file location.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "citekit=info,citekit_science=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("CITEKIT_JSON").as_deref() == Ok("1");
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Format {
            file,
            style,
            preset,
            preview,
            strip_numbering,
            doi_list,
            stats,
            no_cache,
            lang,
        } => {
            let style = load_style(style.as_deref(), preset.as_deref())?;
            let language = match lang.as_deref() {
                Some(code) => match Language::parse(code) {
                    Some(language) => language,
                    None => exit_with(ExitCode::InvalidArgs, &format!("Unknown language: {code}")),
                },
                None => config.output.language,
            };

            let runtime = runtime()?;
            let references = match runtime.block_on(read_reference_file(&file, strip_numbering)) {
                Ok(refs) => refs,
                Err(e) => exit_with(
                    ExitCode::FileSystemError,
                    &format!("Cannot read {}: {e}", file.display()),
                ),
            };
            if references.is_empty() {
                exit_with(ExitCode::InvalidArgs, &format!("No references in {}", file.display()));
            }

            let processor = ReferenceBatchProcessor::from_config(&config, !no_cache)?;
            let run = RunOptions { language, preview };
            let outcome = runtime.block_on(processor.process(&references, &style, run, log_progress()))?;

            if let Some(path) = &doi_list {
                std::fs::write(path, render_doi_list(&outcome))
                    .with_context(|| format!("writing DOI list to {}", path.display()))?;
                info!("DOI list written to {}", path.display());
            }

            let statistics = stats.then(|| compute_statistics_now(&outcome.references));
            let dur = start.elapsed().as_millis();
            let labels = language.labels();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "outcome": outcome, "statistics": statistics },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print!("{}", render_plain_text(&outcome, &style, labels));
                eprintln!(
                    "\n{} found, {} not found, {} duplicates",
                    outcome.doi_found,
                    outcome.doi_not_found,
                    outcome.duplicates.len()
                );
                if let Some(statistics) = &statistics {
                    println!("\n{}", render_statistics(statistics, labels));
                }
            }
        }

        Commands::Resolve { text } => {
            let source: Arc<dyn MetadataSource> = Arc::new(CrossRefSource::from_config(&config.metadata)?);
            let resolver = DoiResolver::new(source).with_min_query_chars(config.metadata.min_query_chars);
            let found = runtime()?.block_on(resolver.resolve(&text));
            let dur = start.elapsed().as_millis();

            match found {
                Some(doi) => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"ok","data":{"doi":doi},"meta":{"duration_ms":dur}}))?;
                    } else {
                        println!("{doi}");
                    }
                }
                None => {
                    if json_output {
                        print_json(&serde_json::json!({"status":"error","error":"not_found","message":"No DOI found","meta":{"duration_ms":dur}}))?;
                    } else {
                        eprintln!("No DOI found");
                    }
                    std::process::exit(ExitCode::NotFound as i32);
                }
            }
        }

        Commands::Style { action } => match action {
            StyleAction::Export { preset, output } => {
                let style = load_style(None, preset.as_deref())?;
                let envelope = export_style(&style, chrono::Local::now())?;
                match output {
                    Some(path) => {
                        std::fs::write(&path, &envelope)
                            .with_context(|| format!("writing style to {}", path.display()))?;
                        if !json_output {
                            println!("Style written to {}", path.display());
                        }
                    }
                    None => println!("{envelope}"),
                }
            }
            StyleAction::Check { file } => {
                let style = load_style(Some(file.as_path()), None)?;
                let kind = style.named_style().map_or("Custom", NamedStyle::label);
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"style":kind,"elements":style.elements.len()}}))?;
                } else {
                    println!("✓ {}: {kind} style, {} elements", file.display(), style.elements.len());
                }
            }
        },

        Commands::Cache { action } => match action {
            CacheAction::Clear => {
                let cache = DiskCache::in_dir(config.cache_dir(), config.cache_ttl())?;
                let removed = runtime()?.block_on(cache.clear())?;
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":{"removed":removed}}))?;
                } else {
                    println!("Removed {removed} cached records from {}", cache.dir().display());
                }
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({"status":"ok","data":config}))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => println!("{}", AppConfig::config_path().display()),
        },

        Commands::Version => {
            let version = env!("CARGO_PKG_VERSION");
            if json_output {
                print_json(&serde_json::json!({"status":"ok","data":{"version":version}}))?;
            } else {
                println!("citekit v{version}");
            }
        }
    }

    debug!("done in {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);
    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

fn runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_multi_thread().enable_all().build()?)
}

/// `--style` file, else `--preset`, else the default custom style.
fn load_style(path: Option<&Path>, preset: Option<&str>) -> Result<StyleConfig> {
    if let Some(path) = path {
        let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        return Ok(import_style(&json)?);
    }
    match preset {
        Some(name) => match NamedStyle::parse(name) {
            Some(named) => Ok(StyleConfig::preset(named)),
            None => bail!("unknown style preset: {name} (expected gost, acs, rsc or cta)"),
        },
        None => Ok(StyleConfig::default_custom()),
    }
}

/// Logs a line whenever the batch enters a new phase.
fn log_progress() -> impl FnMut(ProgressEvent) {
    let mut phase: Option<ProgressPhase> = None;
    move |event| {
        if phase != Some(event.phase) {
            phase = Some(event.phase);
            info!("{:?}: {} items", event.phase, event.total);
        }
        debug!("{:?} {}/{}", event.phase, event.completed, event.total);
    }
}

fn exit_with(code: ExitCode, message: &str) -> ! {
    eprintln!("{message}");
    std::process::exit(code as i32);
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
