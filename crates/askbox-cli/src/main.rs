//! askbox CLI: terminal chat client for an ask endpoint

use askbox_engine::{dispatch, parse, ChatSession, Config, HttpAskClient, RenderOptions};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Chat with a bot backend from the terminal
#[derive(Parser)]
#[command(name = "askbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: .askbox/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the config file
    #[arg(long, global = true)]
    url: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the chat TUI (default when no command specified)
    Chat,

    /// Send one message and print the reply
    Ask {
        /// The message to send
        message: String,

        /// Print the reply as plain text instead of HTML
        #[arg(long, conflicts_with = "json")]
        plain: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Convert markdown from stdin to HTML
    Render {
        /// Escape HTML in the input before converting
        #[arg(long)]
        escape: bool,
    },

    /// Initialize .askbox/ directory and config
    Init,
}

const ASKBOX_DIR: &str = ".askbox";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "askbox.log";

fn main() {
    let Cli {
        command,
        config,
        url,
        verbose,
    } = Cli::parse();
    let config_path = config.unwrap_or_else(|| Path::new(ASKBOX_DIR).join(CONFIG_FILE));

    match command {
        None | Some(Commands::Chat) => {
            // Keep the guard alive so buffered log lines are flushed on exit.
            let _log_guard = init_file_logging(verbose);
            let config = load_config(&config_path, url);
            cmd_chat(&config);
        }
        Some(Commands::Ask {
            message,
            plain,
            json,
        }) => {
            init_stderr_logging(verbose);
            let config = load_config(&config_path, url);
            cmd_ask(&config, &message, plain, json);
        }
        Some(Commands::Render { escape }) => {
            init_stderr_logging(verbose);
            cmd_render(escape);
        }
        Some(Commands::Init) => {
            init_stderr_logging(verbose);
            cmd_init(&config_path);
        }
    }
}

fn log_filter(verbose: u8, quiet_level: &str) -> EnvFilter {
    let level = match verbose {
        0 => quiet_level,
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

fn init_stderr_logging(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, "warn"))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Log to `.askbox/askbox.log`; the terminal belongs to the TUI.
fn init_file_logging(verbose: u8) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(ASKBOX_DIR) {
        eprintln!("Logging disabled, cannot create {ASKBOX_DIR}: {e}");
        return None;
    }

    let appender = tracing_appender::rolling::never(ASKBOX_DIR, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, "info"))
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Some(guard)
}

fn load_config(path: &Path, url: Option<String>) -> Config {
    let mut config = match Config::load_or_default(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {e}", path.display());
            std::process::exit(1);
        }
    };
    if let Some(url) = url {
        config.base_url = url;
    }
    debug!(path = %path.display(), base_url = %config.base_url, "config loaded");
    config
}

fn http_client(config: &Config) -> HttpAskClient {
    match HttpAskClient::from_config(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_chat(config: &Config) {
    let client = Arc::new(http_client(config));
    info!(url = %client.url(), "starting chat");

    let rt = runtime();
    if let Err(e) = rt.block_on(askbox_tui::run_tui(config, client)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_ask(config: &Config, message: &str, plain: bool, json: bool) {
    let client = http_client(config);

    let mut session = ChatSession::from_config(config);
    let Some(pending) = session.submit(message) else {
        eprintln!("Nothing to send: message is empty");
        std::process::exit(2);
    };

    let rt = runtime();
    let reply = match rt.block_on(dispatch(&client, &pending)) {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("{}", config.strings.fallback);
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let doc = parse(&reply);
    let html = doc.to_html(session.render_options());

    if json {
        let output = serde_json::json!({
            "message": pending.message,
            "reply": reply,
            "html": html,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Failed to serialize reply: {e}");
                std::process::exit(1);
            }
        }
    } else if plain {
        println!("{}", doc.plain_text());
    } else {
        println!("{html}");
    }
}

fn cmd_render(escape: bool) {
    let mut input = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut input) {
        eprintln!("Failed to read stdin: {e}");
        std::process::exit(1);
    }

    // The newline that ends the last line is not an empty line.
    let text = input
        .strip_suffix("\r\n")
        .or_else(|| input.strip_suffix('\n'))
        .unwrap_or(&input);

    let html = parse(text).to_html(&RenderOptions { escape_html: escape });
    println!("{html}");
}

fn cmd_init(config_path: &Path) {
    if config_path.exists() {
        println!("Config already exists at {}", config_path.display());
        return;
    }

    match Config::default().save(config_path) {
        Ok(()) => println!("Created {}", config_path.display()),
        Err(e) => {
            eprintln!("Failed to write config: {e}");
            std::process::exit(1);
        }
    }

    println!("\nNext steps:");
    println!("  1. Set base_url in {} to your chat backend", config_path.display());
    println!("  2. Run 'askbox' to open the chat");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_opens_chat() {
        let cli = Cli::try_parse_from(["askbox"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "askbox",
            "ask",
            "hello there",
            "--url",
            "http://localhost:8080",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Commands::Ask { message, plain, json }) => {
                assert_eq!(message, "hello there");
                assert!(!plain);
                assert!(!json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_plain_and_json_conflict() {
        assert!(Cli::try_parse_from(["askbox", "ask", "hi", "--plain", "--json"]).is_err());
    }

    #[test]
    fn test_render_escape_flag() {
        let cli = Cli::try_parse_from(["askbox", "render", "--escape"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Render { escape: true })));
    }
}
