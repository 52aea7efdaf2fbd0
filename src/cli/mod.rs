//! Command-line interface parsing and session startup.

use std::error::Error;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::core::providers::AUTO_ROUTE;
use crate::ui::chat_loop::{run_chat, RunOptions};
use crate::ui::theme::Theme;

#[derive(Parser)]
#[command(name = "neurochat")]
#[command(about = "A terminal chat client for NeuroSwitch-routed AI conversations")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_DESCRIBE"), ")"))]
#[command(
    long_about = "Neurochat is a full-screen terminal chat client for a NeuroSwitch routing \
backend. Messages are submitted to the backend, which picks an AI provider (or uses \
the one you pin) and reports back which provider answered, token consumption, and \
whether auto-routing had to fall back.\n\n\
Controls:\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message (Ctrl+Enter also works)\n\
  Alt+Enter         Insert a newline\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\n\
Commands:\n\
  /attach <path>    Upload an image to send with the next message\n\
  /detach           Remove the pending attachment\n\
  /mode [name]      Select a response mode for the next message\n\
  /provider [name]  Pin a provider, or list the available ones\n\
  /log [filename]   Enable transcript logging, or pause/resume it\n\
  /dump [filename]  Export the conversation to a text file\n\
  /help             Show extended help"
)]
pub struct Args {
    /// Backend server base URL
    #[arg(short = 's', long, value_name = "URL")]
    pub server: Option<String>,

    /// Provider to pin, instead of NeuroSwitch auto-routing
    #[arg(short = 'p', long, value_name = "PROVIDER")]
    pub provider: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short = 'l', long, value_name = "FILE")]
    pub log: Option<String>,

    /// UI theme (dark, light)
    #[arg(long, value_name = "THEME")]
    pub theme: Option<String>,

    /// Write diagnostic traces to FILE (filtered via NEUROCHAT_LOG)
    #[arg(long, value_name = "FILE")]
    pub trace_file: Option<String>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.trace_file.as_deref())?;

    let config = Config::load()?;

    let provider = args
        .provider
        .or_else(|| config.default_provider.clone())
        .unwrap_or_else(|| AUTO_ROUTE.to_string());
    let theme_name = args
        .theme
        .or_else(|| config.theme.clone())
        .unwrap_or_default();

    let options = RunOptions {
        server_url: args
            .server
            .unwrap_or_else(|| config.server_url().to_string()),
        provider: provider.to_ascii_lowercase(),
        theme: Theme::from_name(&theme_name),
        markdown_enabled: config.markdown_enabled(),
        syntax_enabled: config.syntax_enabled(),
        log_file: args.log,
    };

    run_chat(options).await
}

/// Diagnostics go to a file so the alternate screen stays clean; without
/// `--trace-file` they are discarded.
fn init_tracing(path: Option<&str>) -> Result<(), Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let filter = EnvFilter::try_from_env("NEUROCHAT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn flags_parse() {
        let args = Args::parse_from([
            "neurochat",
            "-s",
            "http://10.0.0.2:5000",
            "-p",
            "claude",
            "--theme",
            "light",
        ]);
        assert_eq!(args.server.as_deref(), Some("http://10.0.0.2:5000"));
        assert_eq!(args.provider.as_deref(), Some("claude"));
        assert_eq!(args.theme.as_deref(), Some("light"));
        assert!(args.log.is_none());
    }
}
