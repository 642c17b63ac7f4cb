use crate::model::{CapturedEntity, CatalogConfig, PageStatus, PageView};
use crate::orchestrator::Coordinator;
use crate::source::{CatalogSource, PokeApiClient};
use crate::store::{session, CaptureStore};
use crate::text_summary::{self, TextSummary};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "pokedex-cli",
    version,
    about = "Browse the Pokémon catalog and keep a captured collection"
)]
pub struct Cli {
    /// Base URL of the PokéAPI service
    #[arg(long, global = true, default_value = "https://pokeapi.co/api/v2")]
    pub base_url: String,

    /// Entries per page
    #[arg(long, global = true, default_value_t = 20)]
    pub page_size: usize,

    /// Quiet period before a search term is committed
    #[arg(long, global = true, default_value = "300ms")]
    pub debounce: humantime::Duration,

    /// How long fetched pages are served without refetching
    #[arg(long, global = true, default_value = "5m")]
    pub stale_time: humantime::Duration,

    /// How long unused pages stay cached
    #[arg(long, global = true, default_value = "10m")]
    pub gc_time: humantime::Duration,

    /// Number of names fetched for the search index
    #[arg(long, global = true, default_value_t = 1302)]
    pub index_limit: usize,

    /// Simulated login latency
    #[arg(long, global = true, default_value = "1s")]
    pub login_delay: humantime::Duration,

    /// Per-request timeout
    #[arg(long, global = true, default_value = "15s")]
    pub request_timeout: humantime::Duration,

    /// Where the session and captured list are stored
    #[arg(long, global = true)]
    pub state_file: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Log level for stderr diagnostics (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List one page of the full catalog
    Browse {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Search Pokémon by name
    Search {
        term: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Show details for an id or name
    Show { pokemon: String },
    /// List the captured collection
    Captured,
    /// Capture a Pokémon by id (requires login)
    Capture { id: u32 },
    /// Release a captured Pokémon (requires login)
    Release { id: u32 },
    /// Log in as a trainer
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out and clear the captured list
    Logout,
    /// Show the current session
    Whoami,
    /// Export the captured collection
    Export {
        /// Write the collection as JSON
        #[arg(long = "to-json")]
        json_path: Option<PathBuf>,
        /// Write the collection as CSV
        #[arg(long = "to-csv")]
        csv_path: Option<PathBuf>,
    },
    /// Interactive catalog browser
    #[cfg(feature = "tui")]
    Tui,
}

impl Cli {
    /// Whether this invocation ends up in the interactive UI.
    pub fn is_tui(&self) -> bool {
        #[cfg(feature = "tui")]
        {
            matches!(self.command, None | Some(Command::Tui))
        }
        #[cfg(not(feature = "tui"))]
        {
            false
        }
    }
}

/// Build a `CatalogConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> CatalogConfig {
    CatalogConfig {
        base_url: args.base_url.clone(),
        page_size: args.page_size.max(1),
        debounce: Duration::from(args.debounce),
        stale_time: Duration::from(args.stale_time),
        gc_time: Duration::from(args.gc_time),
        index_limit: args.index_limit,
        login_delay: Duration::from(args.login_delay),
        request_timeout: Duration::from(args.request_timeout),
        state_file: args.state_file.clone(),
        ..CatalogConfig::default()
    }
}

fn state_path(cfg: &CatalogConfig) -> Result<PathBuf> {
    match &cfg.state_file {
        Some(p) => Ok(p.clone()),
        None => crate::storage::default_state_path(),
    }
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let store = CaptureStore::open(state_path(&cfg)?, cfg.login_delay);
    debug!(base_url = %cfg.base_url, page_size = cfg.page_size, "starting");

    #[cfg(feature = "tui")]
    if args.command.is_none() {
        return crate::tui::run(cfg, store).await;
    }
    // Fallback when built without TUI support.
    let command = args.command.clone().unwrap_or(Command::Browse { page: 1 });

    let (out, writer) = spawn_output_writer();
    let res = run_command(&args, cfg, store, command, &out).await;
    drop(out);
    let _ = writer.await;
    res
}

async fn run_command(
    args: &Cli,
    cfg: CatalogConfig,
    mut store: CaptureStore,
    command: Command,
    out: &mpsc::UnboundedSender<OutputLine>,
) -> Result<()> {
    match command {
        Command::Browse { page } => {
            let mut coord = coordinator(&cfg)?;
            coord.set_page(page.saturating_sub(1));
            let view = coord.load().await;
            emit_view(args, out, &view, &store)
        }
        Command::Search { term, page } => {
            let mut coord = coordinator(&cfg)?;
            coord.commit_term(term);
            coord.set_page(page.saturating_sub(1));
            let view = coord.load().await;
            emit_view(args, out, &view, &store)
        }
        Command::Show { pokemon } => {
            let mut coord = coordinator(&cfg)?;
            let d = coord
                .detail(&pokemon)
                .await
                .with_context(|| format!("could not load {pokemon}"))?;
            let captured = store.is_captured(d.id);
            if args.json {
                emit_json(out, &*d)
            } else {
                emit_text(out, text_summary::build_detail_summary(&d, captured));
                Ok(())
            }
        }
        Command::Captured => {
            if args.json {
                emit_json(out, &store.captured())
            } else {
                emit_text(out, text_summary::build_collection_summary(store.captured()));
                Ok(())
            }
        }
        Command::Capture { id } => {
            store.require_user("capture Pokémon")?;
            if store.is_captured(id) {
                emit_message(args, out, format!("#{id} is already captured"))
            } else {
                let mut coord = coordinator(&cfg)?;
                let d = coord
                    .detail(&id.to_string())
                    .await
                    .with_context(|| format!("could not load #{id}"))?;
                let entity = CapturedEntity::from(&*d);
                let name = entity.name.clone();
                store.capture(entity);
                emit_message(args, out, format!("Captured {name}!"))
            }
        }
        Command::Release { id } => {
            store.require_user("release Pokémon")?;
            if store.release(id) {
                emit_message(args, out, format!("Released #{id}"))
            } else {
                emit_message(args, out, format!("#{id} was not captured"))
            }
        }
        Command::Login { email, password } => match store.login(&email, &password).await {
            Ok(u) => emit_message(args, out, format!("Welcome, {}!", u.name)),
            Err(e) => {
                let roster: Vec<&str> = session::roster_emails().collect();
                let _ = out.send(OutputLine::Stderr(format!(
                    "Known trainers: {}",
                    roster.join(", ")
                )));
                Err(e.into())
            }
        },
        Command::Logout => {
            if store.session().is_authenticated() {
                store.logout();
                emit_message(args, out, "Logged out. Captured list cleared.".into())
            } else {
                emit_message(args, out, "Not logged in".into())
            }
        }
        Command::Whoami => {
            if args.json {
                emit_json(out, &store.snapshot())
            } else {
                emit_text(out, text_summary::build_session_summary(store.session()));
                Ok(())
            }
        }
        Command::Export {
            json_path,
            csv_path,
        } => {
            if json_path.is_none() && csv_path.is_none() {
                anyhow::bail!("nothing to export: pass --to-json and/or --to-csv");
            }
            if let Some(p) = json_path.as_deref() {
                crate::storage::export_json(p, store.user(), store.captured())?;
                let _ = out.send(OutputLine::Stderr(format!("Exported JSON: {}", p.display())));
            }
            if let Some(p) = csv_path.as_deref() {
                crate::storage::export_csv(p, store.captured())?;
                let _ = out.send(OutputLine::Stderr(format!("Exported CSV: {}", p.display())));
            }
            Ok(())
        }
        #[cfg(feature = "tui")]
        Command::Tui => crate::tui::run(cfg, store).await,
    }
}

fn coordinator(cfg: &CatalogConfig) -> Result<Coordinator> {
    let source: Arc<dyn CatalogSource> = Arc::new(PokeApiClient::new(cfg)?);
    Ok(Coordinator::new(source, cfg))
}

fn emit_view(
    args: &Cli,
    out: &mpsc::UnboundedSender<OutputLine>,
    view: &PageView,
    store: &CaptureStore,
) -> Result<()> {
    if args.json {
        return emit_json(out, view);
    }
    if let PageStatus::Failed(msg) = &view.status {
        anyhow::bail!("could not load Pokémon: {msg}");
    }
    emit_text(
        out,
        text_summary::build_page_summary(view, |id| store.is_captured(id)),
    );
    Ok(())
}

fn emit_text(out: &mpsc::UnboundedSender<OutputLine>, summary: TextSummary) {
    for line in summary.lines {
        let _ = out.send(OutputLine::Stdout(line));
    }
}

fn emit_json<T: Serialize + ?Sized>(
    out: &mpsc::UnboundedSender<OutputLine>,
    value: &T,
) -> Result<()> {
    let out_json = serde_json::to_string_pretty(value).context("serialize output")?;
    let _ = out.send(OutputLine::Stdout(out_json));
    Ok(())
}

#[derive(Serialize)]
struct Message {
    message: String,
}

fn emit_message(
    args: &Cli,
    out: &mpsc::UnboundedSender<OutputLine>,
    message: String,
) -> Result<()> {
    if args.json {
        emit_json(out, &Message { message })
    } else {
        let _ = out.send(OutputLine::Stdout(message));
        Ok(())
    }
}
