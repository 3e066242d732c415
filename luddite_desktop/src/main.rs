//! Luddite - headless driver for the editor core.
//!
//! Usage: luddite [--store FILE] <list | new TITLE | preview ID | highlight ID | delete ID>
//!
//! The store defaults to `$LUDDITE_STORE` or `luddite.json`; configuration is
//! read from `$LUDDITE_CONFIG` or `luddite.toml`.

mod store;

use luddite_core::{
    AppContext, Config, DocumentId, LudditeError, Mode, OutlineRow, Renderer, Result, SpanClass,
    TerminateReply,
};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use store::JsonStore;

/// Prints preview HTML to stdout.
struct StdoutRenderer;

impl Renderer for StdoutRenderer {
    fn render(&mut self, html: &str, base_dir: &Path) {
        log::debug!("Rendering preview relative to {:?}", base_dir);
        println!("{html}");
    }
}

enum Command {
    List,
    New(String),
    Preview(DocumentId),
    Highlight(DocumentId),
    Delete(DocumentId),
}

fn usage() -> LudditeError {
    LudditeError::Validation {
        message: "unknown command".to_string(),
        suggestion: "usage: luddite [--store FILE] <list | new TITLE | preview ID | highlight ID | delete ID>"
            .to_string(),
    }
}

fn parse_id(arg: Option<&String>) -> Result<DocumentId> {
    let arg = arg.ok_or_else(usage)?;
    arg.parse::<DocumentId>().map_err(|e| LudditeError::Validation {
        message: format!("invalid document id {arg:?}: {e}"),
        suggestion: "run `luddite list` to see document ids".to_string(),
    })
}

fn parse_args(args: &[String]) -> Result<(Option<PathBuf>, Command)> {
    let (store, rest) = match args {
        [flag, path, rest @ ..] if flag == "--store" => (Some(PathBuf::from(path)), rest),
        rest => (None, rest),
    };
    let command = match rest.first().map(String::as_str) {
        None | Some("list") => Command::List,
        Some("new") => Command::New(rest[1..].join(" ")),
        Some("preview") => Command::Preview(parse_id(rest.get(1))?),
        Some("highlight") => Command::Highlight(parse_id(rest.get(1))?),
        Some("delete") => Command::Delete(parse_id(rest.get(1))?),
        Some(_) => return Err(usage()),
    };
    Ok((store, command))
}

fn print_outline(ctx: &AppContext) {
    if ctx.sidebar().index().is_empty() {
        println!("No documents");
        return;
    }
    for row in ctx.sidebar().rows() {
        match row {
            OutlineRow::Header(header) => println!("{}", header.label()),
            OutlineRow::Document(doc) => println!("  {}  {}", doc.id(), doc.title()),
        }
    }
}

fn print_highlight(ctx: &mut AppContext, id: DocumentId) -> Result<()> {
    ctx.select(Some(id))?;
    ctx.toggle()?;
    ctx.session_mut().wait_for_worker(Duration::from_secs(10));

    let session = ctx.session();
    if session.mode() != Mode::Editing {
        return Ok(());
    }
    let text = session.editor().text();
    for span in session.styles().runs() {
        if span.class != SpanClass::Plain {
            println!("{:>6}..{:<6} {:?} {}", span.range.start, span.range.end, span.class, span.text(&text));
        }
    }
    println!("{}", session.stats_label());
    Ok(())
}

fn run(args: &[String]) -> Result<()> {
    let (store_path, command) = parse_args(args)?;
    let config_path = env::var_os("LUDDITE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("luddite.toml"));
    let config = Config::load_or_default(&config_path);

    let store_path = store_path
        .or_else(|| env::var_os("LUDDITE_STORE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("luddite.json"));
    let store = Arc::new(JsonStore::open(&store_path)?);
    log::info!("Using store {:?}", store.path());

    let mut ctx = AppContext::new(store, Box::new(StdoutRenderer), config)?;

    match command {
        Command::List => print_outline(&ctx),
        Command::New(title) => {
            let doc = ctx.create_document(&title)?;
            println!("{}", doc.id());
        }
        Command::Preview(id) => ctx.select(Some(id))?,
        Command::Highlight(id) => print_highlight(&mut ctx, id)?,
        Command::Delete(id) => ctx.delete_document(id)?,
    }

    if let TerminateReply::Ask { question, info, .. } = ctx.shutdown() {
        eprintln!("{question}\n{info}");
        process::exit(2);
    }
    Ok(())
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        log::error!("{}", e);
        if let LudditeError::Validation { suggestion, .. } = &e {
            eprintln!("{suggestion}");
        }
        process::exit(1);
    }
}
