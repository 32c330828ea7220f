//! nlterm entry point.
//!
//! Reads one line at a time from stdin, dispatches it, and prints the
//! result. Configuration comes from the path given as the first argument,
//! then `NLTERM_CONFIG`, then `<config dir>/nlterm/config.toml` if present.

mod render;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};

use nlterm_net::GeminiBackend;
use nlterm_terminal::{CompletionBackend, Dispatcher, Strategy};
use nlterm_types::config::TermConfig;

use render::Flow;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = load_config()?;
    let backend = GeminiBackend::from_config(&config.remote)
        .context("failed to set up remote resolver")?
        .map(|b| Box::new(b) as Box<dyn CompletionBackend>);
    let mut dispatcher =
        Dispatcher::from_config(&config, backend).context("failed to start session")?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let remote = dispatcher.session().strategy() == Strategy::Remote;
    render::banner(&mut stdout, remote)?;

    let mut line = String::new();
    loop {
        let session = dispatcher.session();
        write!(stdout, "{}", render::prompt(session.cwd(), session.home()))?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }
        let result = dispatcher.dispatch(&line);
        if render::render(&result, &mut stdout)? == Flow::Exit {
            break;
        }
    }
    log::info!("session ended");
    Ok(())
}

fn load_config() -> Result<TermConfig> {
    let explicit = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("NLTERM_CONFIG").ok())
        .map(PathBuf::from);
    if let Some(path) = explicit {
        return TermConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display()));
    }
    let default = dirs::config_dir().map(|d| d.join("nlterm").join("config.toml"));
    match default {
        Some(path) if path.is_file() => TermConfig::load(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        _ => Ok(TermConfig::default()),
    }
}
