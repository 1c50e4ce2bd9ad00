//! Command implementations for vizaskctl

use crate::cli::{Cli, Commands};
use crate::config::VizaskConfig;
use crate::controller::{Command, Controller, CycleReport, Preview};
use crate::errors::{exit_code_for, EXIT_SUCCESS};
use crate::gateway::{Backend, HttpBackend};
use crate::input::GUIDANCE_LIMIT;
use crate::logging::CycleLogEntry;
use crate::surface::TerminalSurface;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::info;
use vizask_shared::{DashboardHost, EnrichmentOutcome, FixtureDashboard, Mode};

type TerminalController = Controller<HttpBackend, TerminalSurface>;

/// Run the parsed command line; returns the process exit code.
pub async fn run(cli: Cli) -> Result<i32> {
    let mut config = VizaskConfig::resolve(cli.config.as_deref())?;
    config.apply_flags(cli.endpoint.clone(), cli.view.clone());

    match cli.command {
        Commands::Config => config_show(&config, cli.config.as_deref()),
        Commands::Report => {
            let mut controller = controller(&config, cli.fixture.as_deref())?;
            Ok(finish(controller.dispatch(Command::Analyze).await))
        }
        Commands::Ask { question } => {
            let mut controller = controller(&config, cli.fixture.as_deref())?;
            ask(&mut controller, question.join(" ")).await
        }
        Commands::Chat => {
            let mut controller = controller(&config, cli.fixture.as_deref())?;
            chat(&mut controller).await
        }
        Commands::Preview { mode, question } => {
            let controller = controller(&config, cli.fixture.as_deref())?;
            let command = match Mode::from(mode) {
                Mode::AnalyzeReport => Command::Analyze,
                Mode::AiAssistant => Command::ask(question),
            };
            preview(&controller, &command).await
        }
    }
}

fn open_host(fixture: Option<&Path>) -> Result<Arc<dyn DashboardHost>> {
    let path = fixture.context("a dashboard source is required: pass --fixture <file.json>")?;
    let dashboard = FixtureDashboard::from_path(path)
        .with_context(|| format!("Failed to load fixture {}", path.display()))?;
    info!(fixture = %path.display(), "dashboard fixture loaded");
    Ok(Arc::new(dashboard))
}

fn controller(config: &VizaskConfig, fixture: Option<&Path>) -> Result<TerminalController> {
    let host = open_host(fixture)?;
    let backend = HttpBackend::new(config.backend.endpoint.clone());
    Ok(Controller::new(
        host,
        backend,
        TerminalSurface::new(),
        config.controller_settings(),
    ))
}

/// Record the cycle and map its outcome to an exit code.
fn finish(report: CycleReport) -> i32 {
    CycleLogEntry::from_report(&report).write();
    report.error().map(exit_code_for).unwrap_or(EXIT_SUCCESS)
}

async fn ask(controller: &mut TerminalController, question: String) -> Result<i32> {
    let input = controller.surface_mut().input_mut();
    input.set(question);
    if input.over_guidance() {
        warn_over_guidance(input.len());
    }
    let question = input.text().to_string();

    Ok(finish(controller.dispatch(Command::ask(question)).await))
}

async fn chat(controller: &mut TerminalController) -> Result<i32> {
    println!(
        "{}",
        "Ask about the filtered view. /report analyzes the report, /quit exits.".dimmed()
    );

    let stdin = BufReader::new(tokio::io::stdin());
    chat_loop(controller, stdin, finish).await
}

/// Read lines from `reader` until EOF or `/quit`, dispatching one cycle per
/// question. `on_cycle` turns each report into an exit code; the last one is
/// returned.
async fn chat_loop<B, R, F>(
    controller: &mut Controller<B, TerminalSurface>,
    reader: R,
    mut on_cycle: F,
) -> Result<i32>
where
    B: Backend,
    R: AsyncBufRead + Unpin,
    F: FnMut(CycleReport) -> i32,
{
    let mut lines = reader.lines();
    let mut last = EXIT_SUCCESS;

    loop {
        print!("{} ", "vizask>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/report" => {
                last = on_cycle(controller.dispatch(Command::Analyze).await);
                continue;
            }
            _ => {}
        }

        let input = controller.surface_mut().input_mut();
        input.set(line);
        if !input.can_send() {
            continue;
        }
        println!("{}", input.counter_label().dimmed());
        if input.over_guidance() {
            warn_over_guidance(input.len());
        }
        let question = input.text().to_string();

        last = on_cycle(controller.dispatch(Command::ask(question)).await);
    }

    Ok(last)
}

fn warn_over_guidance(len: usize) {
    eprintln!(
        "{} question is {} characters; {} or fewer works best",
        "warning:".yellow().bold(),
        len,
        GUIDANCE_LIMIT
    );
}

async fn preview(controller: &TerminalController, command: &Command) -> Result<i32> {
    let preview = match controller.preview(command).await {
        Ok(preview) => preview,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e.to_string().red());
            return Ok(exit_code_for(&e));
        }
    };
    print_preview(&preview)?;
    Ok(EXIT_SUCCESS)
}

fn print_preview(preview: &Preview) -> Result<()> {
    println!("{}", "Collected filters".bold());
    println!("{}", serde_json::to_string_pretty(&preview.collected)?);
    println!();

    println!("{}", "Enrichment".bold());
    if preview.report.outcomes.is_empty() {
        println!("  {}", "nothing to enrich".dimmed());
    }
    for (filter, outcome) in &preview.report.outcomes {
        println!("  {:<24} {}", filter, describe(outcome));
    }
    println!();

    println!("{}", "Request body".bold());
    println!("{}", serde_json::to_string_pretty(&preview.payload)?);
    Ok(())
}

fn describe(outcome: &EnrichmentOutcome) -> String {
    match outcome {
        EnrichmentOutcome::Resolved { column, count } => {
            format!("{} ({} values from {})", "resolved".green(), count, column)
        }
        EnrichmentOutcome::TooManyValues { column, count } => format!(
            "{} ({}+ values in {})",
            "kept (All)".yellow(),
            count,
            column
        ),
        EnrichmentOutcome::EmptyColumn { column } => {
            format!("{} ({} has no values)", "kept (All)".yellow(), column)
        }
        EnrichmentOutcome::NoMatchingColumn => {
            format!("{} (no matching column)", "kept (All)".yellow())
        }
        EnrichmentOutcome::NoRows => format!("{} (no data rows)", "kept (All)".yellow()),
    }
}

fn config_show(config: &VizaskConfig, explicit: Option<&Path>) -> Result<i32> {
    match VizaskConfig::locate(explicit) {
        Some(path) => println!("{}", format!("# {}", path.display()).dimmed()),
        None => println!("{}", "# no config location".dimmed()),
    }
    print!("{}", config.to_toml()?);
    Ok(EXIT_SUCCESS)
}
