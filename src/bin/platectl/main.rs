mod console;

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colored::*;
use console::Command;
use platectl::client::Client;
use platectl::config::{CaptureMode, Config, DEFAULT_SERVER};
use platectl::controller::{Controller, UiEvent};
use platectl::view::TerminalView;
use platectl::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long a one-shot `connect` waits for the stream to deliver a frame.
const FIRST_FRAME_WAIT: Duration = Duration::from_secs(15);

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    #[arg(
        long,
        global = true,
        env = "PLATECTL_SERVER",
        default_value = DEFAULT_SERVER,
        help = "Base URL of the recognition backend"
    )]
    server: String,

    #[arg(
        long,
        global = true,
        env = "PLATECTL_MODE",
        value_enum,
        default_value_t = CaptureMode::FreezeThenRecognize,
        help = "How a capture is carried out"
    )]
    mode: CaptureMode,

    #[arg(
        long,
        global = true,
        env = "PLATECTL_CONNECT_TIMEOUT",
        default_value_t = 10,
        value_name = "SECS",
        help = "Seconds allowed to reach the backend"
    )]
    connect_timeout: u64,

    #[arg(
        long,
        global = true,
        env = "PLATECTL_SAVE_DIR",
        value_name = "DIR",
        help = "Save every frozen frame into this directory"
    )]
    save_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Point the backend at an IP camera and start the live stream
    Connect {
        #[arg(help = "Camera address (e.g., 192.168.0.7)")]
        address: String,
    },
    /// Capture a frame from the connected camera and recognize the plate
    Capture,
    /// Show the backend status
    Status,
    /// Interactive session: connect, capture and retry from a prompt
    Console,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Cli::parse();
    init_tracing(&args.verbose);

    let config = Config::new(args.server.clone())
        .with_mode(args.mode)
        .with_connect_timeout(Duration::from_secs(args.connect_timeout))
        .with_save_dir(args.save_dir.clone());
    tracing::debug!(?config, "Starting platectl");

    match run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            handle_error(&e, &config);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: &Verbosity<WarnLevel>) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(verbose.tracing_level_filter().into())
                .from_env_lossy(),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(command: Commands, config: &Config) -> platectl::Result<()> {
    match command {
        Commands::Connect { address } => {
            let mut controller = Controller::from_config(config, TerminalView::stdout())?;
            controller.dispatch(UiEvent::Loaded).await;
            controller.dispatch(UiEvent::AddressEdited(address)).await;
            controller.dispatch(UiEvent::ConnectClicked).await;
            // The backend only grabs frames while the stream is read, so keep
            // reading until one arrives for a later `capture` to use.
            if controller.is_streaming() {
                if controller.wait_for_live_frame(FIRST_FRAME_WAIT).await {
                    println!("✔ {}", "Camera is streaming".green().bold());
                } else {
                    println!("⚠ {}", "No frame received from the camera yet".yellow().bold());
                    println!(
                        "  {} Check the camera, then try {}",
                        "→".bright_blue(),
                        "platectl console".bright_green()
                    );
                }
            }
        }
        Commands::Capture => {
            let mut controller = Controller::from_config(config, TerminalView::stdout())?;
            // The page-load check swallows its errors; an unreachable backend
            // must surface here instead of as "no camera".
            controller.client().status().await?;
            controller.dispatch(UiEvent::Loaded).await;
            if !controller.dispatch(UiEvent::CaptureClicked).await {
                println!("✖ {}", "No camera is streaming".red().bold());
                println!(
                    "  {} Connect one first with {}",
                    "→".bright_blue(),
                    "platectl connect <ADDRESS>".bright_green()
                );
            }
        }
        Commands::Status => print_status(&Client::from_config(config)?).await?,
        Commands::Console => run_console(config).await?,
    }
    Ok(())
}

async fn print_status(client: &Client) -> platectl::Result<()> {
    let status = client.status().await?;

    let yes_no = |value: Option<bool>| match value {
        Some(true) => "yes".green().to_string(),
        Some(false) => "no".red().to_string(),
        None => "unknown".bright_black().to_string(),
    };

    let mut table = comfy_table::Table::new();
    table
        .set_header(vec!["Backend", client.base_url()])
        .load_preset(comfy_table::presets::UTF8_FULL_CONDENSED)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table.add_row(vec![
        "Camera connected".to_string(),
        yes_no(Some(status.camera_connected)),
    ]);
    table.add_row(vec![
        "Camera address".to_string(),
        status.camera_url.clone().unwrap_or_else(|| "-".to_string()),
    ]);
    table.add_row(vec!["Frame available".to_string(), yes_no(status.has_frame)]);
    table.add_row(vec![
        "Recognizer ready".to_string(),
        yes_no(status.recognizer_ready),
    ]);
    println!("{table}");
    Ok(())
}

async fn run_console(config: &Config) -> platectl::Result<()> {
    let mut controller = Controller::from_config(config, TerminalView::stdout())?;
    println!(
        "{} {} {}",
        "●".bright_green(),
        "platectl console".bold(),
        config.server.bright_cyan()
    );
    println!(
        "  {} Type {} for commands",
        "→".bright_blue(),
        "help".bright_green()
    );
    controller.dispatch(UiEvent::Loaded).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match console::parse(&line) {
            None => continue,
            Some(Command::Quit) => break,
            Some(Command::Help) => println!("{}", console::HELP),
            Some(Command::Status) => {
                if let Err(e) = print_status(controller.client()).await {
                    handle_error(&e, config);
                }
            }
            Some(Command::Unknown(word)) => {
                println!("✖ Unknown command {}", word.red().bold());
                println!("  {} Type {} for commands", "→".bright_blue(), "help".bright_green());
            }
            Some(Command::Events(events)) => {
                for event in events {
                    let control = control_name(&event);
                    if !controller.dispatch(event).await {
                        println!(
                            "  {} {} is not available right now",
                            "→".bright_blue(),
                            control.bright_black()
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn control_name(event: &UiEvent) -> &'static str {
    match event {
        UiEvent::Loaded => "Page",
        UiEvent::AddressEdited(_) => "Address",
        UiEvent::AddressSubmitted | UiEvent::ConnectClicked => "Connect",
        UiEvent::CaptureClicked => "Capture",
        UiEvent::RetryClicked => "Retry",
    }
}

fn handle_error(e: &Error, config: &Config) {
    match e {
        Error::Http(err) if err.is_connect() => {
            eprintln!(
                "{} {}",
                "✖".red().bold(),
                "Cannot connect to the recognition backend".red()
            );
            eprintln!(
                "  {} Make sure it is running on {}",
                "→".bright_blue(),
                config.server.bright_cyan()
            );
            eprintln!(
                "  {} Or point platectl elsewhere with {}",
                "→".bright_blue(),
                "--server <URL>".bright_green()
            );
        }
        Error::Http(err) if err.is_timeout() => {
            eprintln!("{} {}", "✖".red().bold(), "Request timed out".red());
            eprintln!(
                "  {} The backend may be overloaded or unresponsive",
                "→".bright_blue()
            );
        }
        Error::Http(err) if err.is_decode() => {
            eprintln!(
                "{} {}",
                "✖".red().bold(),
                "Invalid response from backend".red()
            );
            eprintln!(
                "  {} {} may not be a plate recognition backend",
                "→".bright_blue(),
                config.server.bright_cyan()
            );
        }
        other => {
            eprintln!("{} {}", "✖".red().bold(), "Command failed".red());
            eprintln!("  {} {}", "→".bright_blue(), other.to_string().bright_red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "platectl",
            "capture",
            "--mode",
            "single",
            "--server",
            "http://10.0.0.2:5000",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Capture));
        assert_eq!(cli.mode, CaptureMode::SingleStep);
        assert_eq!(cli.server, "http://10.0.0.2:5000");
    }

    #[test]
    fn connect_requires_address() {
        assert!(Cli::try_parse_from(["platectl", "connect"]).is_err());
        let cli = Cli::try_parse_from(["platectl", "connect", "192.168.0.7"]).unwrap();
        assert!(matches!(cli.command, Commands::Connect { ref address } if address == "192.168.0.7"));
    }

    #[tokio::test]
    async fn capture_reports_unreachable_backend() {
        // Nothing listens on port 1.
        let config = Config::new("http://127.0.0.1:1");
        let result = run(Commands::Capture, &config).await;
        assert!(
            matches!(result, Err(Error::Http(ref e)) if e.is_connect()),
            "{result:?}"
        );
    }
}
