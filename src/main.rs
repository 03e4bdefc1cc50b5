use clap::{Parser, Subcommand};
use keyword_dash::modules::console::{Command, CommandError, HELP, parse_command};
use keyword_dash::modules::control::RunController;
use keyword_dash::modules::dates::DateCatalog;
use keyword_dash::modules::keywords::KeywordViewer;
use keyword_dash::modules::logs::LogTailer;
use keyword_dash::modules::panel::Panel;
use keyword_dash::modules::render::View;
use keyword_dash::modules::serialize::{
    URL_ENV, load_panel_config_or_default, save_panel_config,
};
use keyword_dash::modules::status::StatusPoller;
use keyword_dash::modules::tasks::PollTasks;
use keyword_dash::modules::types::Tone;
use log::info;
use simplelog::*;
use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(
    name = "keyword_dash",
    version,
    about = "Control panel for the keyword scrape job",
    long_about = include_str!("../help.txt")
)]
struct Cli {
    #[arg(short = 'l', long = "log-file", default_value = "keyword_dash.log")]
    log_file: String,

    #[arg(short = 'c', long = "config", default_value = "./keyword_dash.toml")]
    config: String,

    #[arg(short = 'u', long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive panel with live status and logs (default)
    Watch,
    /// Show whether the scrape job is running
    Status,
    /// Print the tail of the scrape log
    Logs {
        #[arg(short = 'n', long = "lines")]
        lines: Option<usize>,
    },
    /// List the dates that have results, newest first
    Dates,
    /// Show the keyword ranking of a date (newest date if omitted)
    Keywords { date: Option<String> },
    /// Start a scrape
    Run {
        #[arg(long = "start-date", value_name = "YYYY-MM-DD")]
        start_date: Option<String>,
        #[arg(long = "end-date", value_name = "YYYY-MM-DD")]
        end_date: Option<String>,
    },
    /// Stop the running scrape
    Stop,
    /// Write the effective configuration to the config file
    InitConfig,
}

fn init_logger(log_path: &str, verbose: bool) -> Result<(), Box<dyn Error>> {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    WriteLogger::init(
        level,
        ConfigBuilder::new()
            .set_time_format_rfc3339()
            .build(),
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?,
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(&cli.log_file, cli.verbose)?;

    let mut config = load_panel_config_or_default(&cli.config)?;
    if let Ok(url) = env::var(URL_ENV) {
        config.base_url = url;
    }
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }
    let command = cli.command.unwrap_or(Commands::Watch);
    if let Commands::Logs { lines: Some(lines) } = command {
        config.log_lines = lines;
    }
    config.validate()?;
    if let Commands::InitConfig = command {
        save_panel_config(&cli.config, &config)?;
        println!("Wrote {}", cli.config);
        return Ok(());
    }

    info!("Using backend {}", config.base_url);
    let panel = Panel::new(config)?;

    match command {
        Commands::Watch => watch(panel).await?,
        Commands::Status => {
            StatusPoller::new(panel.clone()).check_status().await;
            print_status(&panel.view());
        }
        Commands::Logs { .. } => {
            LogTailer::new(panel.clone()).update_logs().await;
            let view = panel.view();
            print!("{}", view.logs.text);
            if view.logs.failed {
                return Err(view.logs.text.into());
            }
        }
        Commands::Dates => {
            let dates = panel.client().dates().await?;
            for date in dates.dates {
                println!("{date}");
            }
        }
        Commands::Keywords { date } => {
            let viewer = KeywordViewer::new(panel.clone());
            match date {
                Some(date) => viewer.load_keywords(Some(date.as_str())).await,
                None => {
                    DateCatalog::new(panel.clone()).load_available_dates().await;
                    viewer.view_selected().await;
                }
            }
            print_keywords(&panel.view())?;
        }
        Commands::Run {
            start_date,
            end_date,
        } => {
            StatusPoller::new(panel.clone()).check_status().await;
            let controller = RunController::new(panel.clone());
            let recheck = controller
                .run_scrape(start_date.as_deref(), end_date.as_deref())
                .await;
            finish_action(&panel, recheck).await?;
        }
        Commands::Stop => {
            StatusPoller::new(panel.clone()).check_status().await;
            let recheck = RunController::new(panel.clone()).stop_scrape().await;
            finish_action(&panel, recheck).await?;
        }
        Commands::InitConfig => {}
    }

    Ok(())
}

fn print_status(view: &View) {
    match view.status.pid {
        Some(pid) => println!("{} pid {pid}", view.status),
        None => println!("{}", view.status),
    }
}

fn print_keywords(view: &View) -> Result<(), Box<dyn Error>> {
    if let Some(date) = &view.keywords.selected_date {
        println!("date: {date}");
    }
    if let Some(message) = &view.keywords.message {
        if message.tone == Tone::Danger {
            return Err(message.text.clone().into());
        }
        println!("{}", message.text);
    }
    for row in view.keywords.table.iter().flatten() {
        println!("{:>4} {}", row.rank, row.keyword);
    }
    Ok(())
}

/// Prints the action's outcome and, on success, waits for the status re-check.
async fn finish_action(
    panel: &Arc<Panel>,
    recheck: Option<tokio::task::JoinHandle<()>>,
) -> Result<(), Box<dyn Error>> {
    let view = panel.view();
    if let Some(message) = &view.run_message {
        if message.tone == Tone::Danger {
            return Err(message.text.clone().into());
        }
        println!("{}", message.text);
    }
    if let Some(handle) = recheck {
        handle.await?;
        print_status(&panel.view());
    }
    Ok(())
}

fn draw(panel: &Panel, notice: Option<&str>) -> std::io::Result<()> {
    let mut out = std::io::stdout().lock();
    write!(out, "\x1b[2J\x1b[H{}", panel.view())?;
    if let Some(notice) = notice {
        writeln!(out, "--\n{notice}")?;
    }
    write!(out, "> ")?;
    out.flush()
}

async fn watch(panel: Arc<Panel>) -> Result<(), Box<dyn Error>> {
    let tasks = PollTasks::start(&panel);
    let controller = RunController::new(panel.clone());
    let viewer = KeywordViewer::new(panel.clone());
    let poller = StatusPoller::new(panel.clone());
    let tailer = LogTailer::new(panel.clone());

    let mut revisions = panel.subscribe();
    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut notice: Option<String> = None;
    draw(&panel, notice.as_deref())?;

    loop {
        tokio::select! {
            changed = revisions.changed() => {
                if changed.is_err() {
                    break;
                }
                draw(&panel, notice.as_deref())?;
            }
            line = input.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                notice = None;
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => notice = Some(HELP.to_string()),
                    Ok(Command::Run { start_date, end_date }) => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            controller
                                .run_scrape(start_date.as_deref(), end_date.as_deref())
                                .await;
                        });
                    }
                    Ok(Command::Stop) => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            controller.stop_scrape().await;
                        });
                    }
                    Ok(Command::View(date)) => {
                        if let Some(date) = &date {
                            panel.select_date(date.clone());
                        }
                        let viewer = viewer.clone();
                        tokio::spawn(async move {
                            viewer.view_selected().await;
                        });
                    }
                    Ok(Command::SelectDate(date)) => panel.select_date(date),
                    Ok(Command::Refresh) => {
                        let poller = poller.clone();
                        let tailer = tailer.clone();
                        tokio::spawn(async move {
                            tokio::join!(poller.check_status(), tailer.update_logs());
                        });
                    }
                    Err(CommandError::Empty) => {}
                    Err(e) => notice = Some(e.to_string()),
                }
                draw(&panel, notice.as_deref())?;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }

    tasks.shutdown().await;
    println!();
    Ok(())
}
