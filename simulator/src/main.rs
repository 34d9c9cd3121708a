use anyhow::Context;
use clap::Parser;
use gui_bridge::bridge::GuiBridge;
use log::info;
use scenario::script::ScenarioScript;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SimulatorConfig;
use workflow::runner::{DelayMode, Runner};
use workflow::session::{build_console, lock, shared, Session};

mod gui_bridge;
mod scenario;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Wildfire operator console driver")]
struct Args {
    /// Load simulator settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    bind: Option<SocketAddr>,
    #[arg(long)]
    export_dir: Option<PathBuf>,
    /// Replay a scripted operator session and export its incidents
    #[arg(long, default_value_t = false)]
    offline: bool,
    /// Scenario script (YAML) for --offline; a built-in session otherwise
    #[arg(long)]
    script: Option<PathBuf>,
    /// Skip the simulated analysis delay in --offline runs
    #[arg(long, default_value_t = false)]
    no_delay: bool,
    /// Keep the HTTP bridge alive for the visualizer
    #[arg(long, default_value_t = false)]
    serve: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::load(path)?,
        None => SimulatorConfig::default(),
    };
    config.apply_overrides(args.seed, args.bind, args.export_dir.clone());
    config.validate()?;

    let session = shared(Session::new(build_console(&config)?));
    let gui_bridge = GuiBridge::new(session.clone());

    if args.offline {
        let script = match &args.script {
            Some(path) => ScenarioScript::load(path)?,
            None => ScenarioScript::default_session(),
        };
        let delay = if args.no_delay {
            DelayMode::Skip
        } else {
            DelayMode::Real
        };
        let result = {
            let mut guard = lock(&session);
            Runner::new(delay).execute(&mut *guard, &script)?
        };

        println!(
            "Offline run -> incidents {}, exports {}, markers {}, circles {}",
            result.incidents,
            result.exports.len(),
            result.layers.markers.len(),
            result.layers.circles.len()
        );

        fs::create_dir_all(&config.export_dir).with_context(|| {
            format!("creating export dir {}", config.export_dir.display())
        })?;
        for export in &result.exports {
            let path = config.export_dir.join(export.file_name());
            fs::write(&path, export.to_pretty_json()?)
                .with_context(|| format!("writing export {}", path.display()))?;
            info!("exported {}", path.display());
        }

        let report = format!(
            "scenario={} incidents={} exports={} metrics={:?} activity={:?}\n",
            script.name, result.incidents, result.exports.len(), result.metrics, result.activity
        );
        let report_path = config.export_dir.join("offline_session.log");
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&report_path)
            .with_context(|| format!("opening session log {}", report_path.display()))?;
        file.write_all(report.as_bytes())?;

        gui_bridge.publish_status("Offline session results ready.");
    }

    if args.serve {
        let _server = gui_bridge.spawn(config.bind);
        gui_bridge.publish_status("HTTP bridge running (Ctrl+C to stop)...");
        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for signal handling")?;
        runtime.block_on(async {
            signal::ctrl_c().await.context("awaiting Ctrl+C to exit")?;
            Ok::<(), anyhow::Error>(())
        })?;
    }

    if !args.offline && !args.serve {
        info!("nothing to do; pass --offline and/or --serve");
    }

    Ok(())
}
