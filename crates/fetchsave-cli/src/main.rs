//! fetchsave CLI - fetch a URL to a file, or serve the fetch tools over MCP

mod mcp;

use clap::{Parser, Subcommand};
use fetchsave::{FetchRequest, Fetcher, OutputKind, TOOL_LLMTXT};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Directory name used under the home or temp directory
const APP_DIR: &str = "fetchsave";

/// fetchsave - save web content to disk and get back only the path
#[derive(Parser, Debug)]
#[command(name = "fetchsave")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory fetched files are written to
    #[arg(long, global = true, env = "FETCHSAVE_DOWNLOAD_DIR")]
    download_dir: Option<PathBuf>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Fetch a URL and save it to the download directory
    Fetch {
        /// URL to fetch
        url: String,

        /// Output kind: html, json, text (txt) or markdown (md)
        #[arg(long, short, default_value = "html")]
        kind: OutputKind,

        /// Extra request header as `Name: value` (repeatable)
        #[arg(long = "header", short = 'H', value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Print the result as JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    let download_dir = resolve_download_dir(cli.download_dir, home::home_dir());
    debug!(dir = %download_dir.display(), "Using download directory");

    let fetcher = match Fetcher::new(&download_dir) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(fetcher).await;
        }
        Some(Commands::Fetch {
            url,
            kind,
            headers,
            json,
        }) => {
            run_fetch(&fetcher, url, kind, headers, json).await;
        }
        None => {
            eprintln!("Usage: fetchsave fetch <URL> [--kind html|json|text|markdown]");
            eprintln!("   or: fetchsave mcp");
            eprintln!("   or: fetchsave --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr so stdout stays clean for results and MCP traffic
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

async fn run_fetch(
    fetcher: &Fetcher,
    url: String,
    kind: OutputKind,
    headers: Vec<(String, String)>,
    json: bool,
) {
    let request = headers
        .into_iter()
        .fold(FetchRequest::new(url), |req, (name, value)| {
            req.header(name, value)
        });

    let result = fetcher.fetch(&request, kind).await;

    if json {
        let out = serde_json::to_string_pretty(&result).unwrap_or_else(|e| {
            eprintln!("Error serializing result: {}", e);
            std::process::exit(1);
        });
        writeln_safe(&out);
    } else if result.is_error {
        eprintln!("{}", result.text());
    } else {
        writeln_safe(&result.text());
    }

    if result.is_error {
        std::process::exit(1);
    }
}

/// Parse a `Name: value` header argument
fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("invalid header '{}', expected 'Name: value'", raw))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header '{}', name is empty", raw));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Pick the download directory: explicit flag or env, then
/// `~/Downloads/fetchsave`, then the system temp directory
fn resolve_download_dir(explicit: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    let dir = match (explicit, home) {
        (Some(dir), _) => dir,
        (None, Some(home)) => home.join("Downloads").join(APP_DIR),
        (None, None) => std::env::temp_dir().join(APP_DIR),
    };
    absolutize(&dir)
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
