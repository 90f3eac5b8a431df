use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "battlemap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and validate a battle dataset, printing any data warnings.
    Validate(ValidateArgs),
    /// Normalize coordinates and correct the layout, writing the prepared dataset.
    Prepare(PrepareArgs),
    /// Play every scene on a headless surface and print one JSON report per transition.
    Play(PlayArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input battle dataset JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PrepareArgs {
    /// Input battle dataset JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output path for the prepared dataset.
    #[arg(long)]
    out: PathBuf,

    /// Engine config JSON; defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input battle dataset JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON; defaults apply to anything it omits.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Prepare(args) => cmd_prepare(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn read_dataset(path: &Path) -> anyhow::Result<battlemap::BattleDataset> {
    battlemap::BattleDataset::from_path(path)
        .with_context(|| format!("load battle dataset '{}'", path.display()))
}

fn read_config(path: Option<&Path>) -> anyhow::Result<battlemap::EngineConfig> {
    match path {
        Some(p) => battlemap::EngineConfig::from_path(p)
            .with_context(|| format!("load engine config '{}'", p.display())),
        None => Ok(battlemap::EngineConfig::default()),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let mut dataset = read_dataset(&args.in_path)?;
    dataset.validate()?;
    let warnings = dataset.sanitize();
    for w in &warnings {
        eprintln!("warning: {w}");
    }
    eprintln!(
        "ok: {} scenes, {} warnings",
        dataset.scene_count(),
        warnings.len()
    );
    Ok(())
}

fn cmd_prepare(args: PrepareArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let mut dataset = read_dataset(&args.in_path)?;
    let report = battlemap::prepare_dataset(&mut dataset, &config)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&dataset).context("serialize prepared dataset")?;
    std::fs::write(&args.out, json)
        .with_context(|| format!("write prepared dataset '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({} warnings, {} layout adjustments)",
        args.out.display(),
        report.warnings.len(),
        report.layout.adjustments.len()
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let dataset = read_dataset(&args.in_path)?;

    let viewport = config.viewport;
    let projector = battlemap::WebMercator::new(
        dataset.battle_info.location.coordinates,
        viewport.zoom,
        battlemap::Size::new(viewport.width, viewport.height),
    );
    let mut viewer = battlemap::BattleViewer::new(battlemap::RecordingSurface::new(projector), config);
    let load = viewer.load_battle(dataset)?;
    for w in &load.warnings {
        eprintln!("warning: {w}");
    }

    pollster::block_on(async {
        while let Some(report) = viewer.next_scene().await? {
            let line = serde_json::to_string(&report).context("serialize transition report")?;
            println!("{line}");
        }
        anyhow::Ok(())
    })
}
