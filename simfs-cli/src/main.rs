//! SIMFS CLI - interactive multi-user file system simulator.
//!
//! Usage:
//!   simfs [--trace] [--json] [--quiet] [--host NAME]
//!
//! Examples:
//!   simfs                            # Interactive terminal with banner
//!   simfs --json < script.txt        # Run a script, one JSON reply per line
//!   RUST_LOG=simfs_core=debug simfs  # Log every engine operation to stderr

use std::io::{IsTerminal, Write};

use clap::Parser;
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use simfs_core::{Console, OutputFormat, Shell, ShellConfig};

/// SIMFS terminal
#[derive(Parser, Debug)]
#[command(name = "simfs")]
#[command(about = "Multi-user in-memory file system simulator")]
struct Args {
    /// Log engine operations to stderr
    #[arg(short, long)]
    trace: bool,

    /// Print replies as JSON objects
    #[arg(long)]
    json: bool,

    /// Skip the welcome banner
    #[arg(short, long)]
    quiet: bool,

    /// Host name shown in the prompt
    #[arg(long, default_value = "filesystem")]
    host: String,
}

/// Console writing to stdout; `clear` wipes the terminal.
struct TerminalConsole {
    is_tty: bool,
}

impl TerminalConsole {
    fn new() -> Self {
        Self {
            is_tty: std::io::stdout().is_terminal(),
        }
    }
}

impl Console for TerminalConsole {
    fn write(&mut self, text: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = handle.write_all(text.as_bytes());
        let _ = handle.flush();
    }

    fn clear(&mut self) {
        if self.is_tty {
            let _ = execute!(std::io::stdout(), Clear(ClearType::All), MoveTo(0, 0));
        }
    }
}

fn init_tracing(trace: bool) {
    let default_level = if trace { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.trace);

    let config = ShellConfig {
        host: args.host,
        format: if args.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        banner: !args.quiet,
    };
    let mut shell = Shell::new(TerminalConsole::new(), config);

    if shell.config().banner {
        shell.console_mut().clear();
        shell.print_banner();
    }
    tracing::debug!("simfs ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while shell.is_running() {
        shell.show_prompt();

        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    shell.execute_line(&line);
                }
                None => {
                    shell.console_mut().write_line("\nExiting...");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                shell
                    .console_mut()
                    .write_line("\nUse 'exit' or 'quit' to leave the terminal");
            }
        }
    }

    Ok(())
}
