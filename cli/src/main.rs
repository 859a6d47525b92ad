use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use cloudmail_cli::commands::{parse_line, render, Command, HELP};
use cloudmail_cli::{
    Controller, HttpComposeApi, LaneOutcome, NotificationEvent, NotificationKind, NotificationQueue,
};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tokio::task::LocalSet;

#[derive(Parser)]
#[command(
    name = "cloudmail",
    about = "Generate emails with AI and send them to multiple recipients"
)]
struct Cli {
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbosity: u8,

    /// Base URL of the CloudMail service
    #[arg(long, env = "CLOUDMAIL_API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    /// Seconds a notification stays on screen
    #[arg(long, default_value_t = 5)]
    toast_secs: u64,

    /// Per-request deadline in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,
}

type App = Controller<HttpComposeApi>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("initializing logger")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;

    // The controller is single-threaded; actions run as local tasks.
    LocalSet::new().block_on(&runtime, run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let api = HttpComposeApi::new(&cli.api_url, Duration::from_secs(cli.timeout_secs))
        .context("building HTTP client")?;
    let queue = NotificationQueue::new(Duration::from_secs(cli.toast_secs));
    let app: Rc<App> = Rc::new(Controller::new(api, queue.clone()));

    tokio::task::spawn_local(print_notifications(queue.subscribe()));

    log::info!("Using service at {}", cli.api_url);
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            Command::To(text) => locked_unless(app.set_recipients(text.as_line()), "recipients"),
            Command::Prompt(text) => locked_unless(app.set_prompt(text.as_line()), "prompt"),
            Command::Draft(text) => locked_unless(app.set_draft(text.unescaped()), "draft"),
            Command::Generate => {
                let app = app.clone();
                tokio::task::spawn_local(async move {
                    if app.generate().await == LaneOutcome::Busy {
                        println!("Busy: wait for the current request to finish.");
                    }
                });
            }
            Command::Send => {
                let app = app.clone();
                tokio::task::spawn_local(async move {
                    if app.send().await == LaneOutcome::Busy {
                        println!("Busy: wait for the current request to finish.");
                    }
                });
            }
            Command::Show => println!("{}", render(&app.state())),
            Command::Dismiss { id } => {
                if !queue.remove(id) {
                    println!("No notification {id}");
                }
            }
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
        }
    }

    Ok(())
}

fn locked_unless(accepted: bool, field: &str) {
    if !accepted {
        println!("The {field} field is locked while a request is in flight.");
    }
}

async fn print_notifications(mut events: broadcast::Receiver<NotificationEvent>) {
    loop {
        match events.recv().await {
            Ok(NotificationEvent::Pushed(n)) => {
                let tag = match n.kind {
                    NotificationKind::Success => "ok",
                    NotificationKind::Error => "error",
                };
                println!("[{tag} {}] {}", n.id, n.message);
            }
            Ok(NotificationEvent::Removed(id)) => log::debug!("notification {id} cleared"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("missed {skipped} notifications");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
