use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use dashboard_tour::config::TourConfig;
use dashboard_tour::headless::{HeadlessDocument, HeadlessRouter, RecordingTooltip};
use dashboard_tour::store::MemoryFlagStore;
use dashboard_tour::tour::{LoopPhase, Rect, StepRegistry, TourController, TourDeps, Viewport};

#[derive(Parser, Debug)]
#[command(name = "tour-preview", version, about = "Validate and lay out dashboard tour content")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a content file and list its steps
    Check(CheckArgs),
    /// Walk the tour against a static layout and print tooltip placements
    Layout(LayoutArgs),
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Tour content JSON (defaults to the built-in dashboard tour)
    #[arg(long)]
    content: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Tour content JSON (defaults to the built-in dashboard tour)
    #[arg(long)]
    content: Option<PathBuf>,

    /// JSON object mapping element ids to {top, left, width, height}
    #[arg(long)]
    layout: PathBuf,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long, default_value = "1024x768", value_parser = parse_viewport)]
    viewport: Viewport,

    /// Print one JSON object per step instead of a table
    #[arg(long)]
    json: bool,
}

fn parse_viewport(raw: &str) -> std::result::Result<Viewport, String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{raw}'"))?;
    let width: f64 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: f64 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err("viewport dimensions must be finite and positive".to_string());
    }
    Ok(Viewport::new(width, height))
}

fn load_registry(content: Option<&PathBuf>) -> Result<StepRegistry> {
    match content {
        Some(path) => StepRegistry::from_path(path)
            .with_context(|| format!("failed to load tour content from {}", path.display())),
        None => Ok(StepRegistry::dashboard()),
    }
}

fn check(args: CheckArgs) -> Result<()> {
    let registry = load_registry(args.content.as_ref())?;
    println!("{} steps", registry.len());
    for (index, step) in registry.steps().iter().enumerate() {
        println!(
            "{:>2}. {:<24} side={:<7} target={:<28} route={}",
            index + 1,
            step.id,
            step.side,
            step.target_id.as_deref().unwrap_or("-"),
            step.route_path.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

async fn layout(args: LayoutArgs) -> Result<()> {
    let registry = Arc::new(load_registry(args.content.as_ref())?);
    let raw = std::fs::read_to_string(&args.layout)
        .with_context(|| format!("failed to read layout {}", args.layout.display()))?;
    let elements: HashMap<String, Rect> =
        serde_json::from_str(&raw).context("layout must map element ids to rects")?;

    let config = TourConfig {
        settle_delay: Duration::ZERO,
        ..TourConfig::from_env()?
    };
    let renderer = Arc::new(RecordingTooltip::default());
    let mut tour = TourController::new(
        config,
        registry,
        TourDeps {
            router: Arc::new(HeadlessRouter::new("/")),
            document: Arc::new(HeadlessDocument::with_layout(args.viewport, elements)),
            renderer: renderer.clone(),
            store: Arc::new(MemoryFlagStore::new()),
        },
    );

    tour.start();
    while tour.is_active() {
        while tour.observer_phase() == LoopPhase::Initializing {
            tour.process_next_signal().await;
        }
        if let Some(view) = tour.tooltip() {
            if args.json {
                println!("{}", serde_json::to_string(view)?);
            } else {
                let controls = match (view.is_first(), view.is_last()) {
                    (true, true) => "finish",
                    (true, false) => "next",
                    (false, true) => "back/finish",
                    (false, false) => "back/next",
                };
                println!(
                    "{:<14} {:<24} {:<7} top={:>7.1} left={:>7.1} [{}]{}",
                    view.progress_label(),
                    view.step_id,
                    view.side,
                    view.position.top,
                    view.position.left,
                    controls,
                    if view.anchored { "" } else { "  (no target, centered)" },
                );
            }
        }
        tour.next();
    }

    tracing::debug!(rendered = renderer.views().len(), "Layout preview finished");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check(args) => check(args),
        Commands::Layout(args) => layout(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_viewport() {
        assert_eq!(parse_viewport("1280x720").unwrap(), Viewport::new(1280.0, 720.0));
        assert_eq!(parse_viewport(" 800 X 600 ").unwrap(), Viewport::new(800.0, 600.0));
    }

    #[test]
    fn rejects_degenerate_viewports() {
        for raw in ["NaNx768", "1024xinf", "0x768", "-5x10", "1024", "widexhigh"] {
            assert!(parse_viewport(raw).is_err(), "{raw} accepted");
        }
    }
}
