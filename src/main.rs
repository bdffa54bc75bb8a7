//! Storm Chase Tracker demo
//!
//! Replays a scripted drive through the tracker runtime and prints every host
//! message as JSON on stdout.

use clap::Parser;
use std::path::PathBuf;
use std::process;
use storm_chase_tracker::alerting::{AlertingPolicy, Announcer, LogSynthesizer};
use storm_chase_tracker::api::{BreadcrumbTrail, CallbackSink, ChaseTracker, HostMessage, TrackerRuntime};
use storm_chase_tracker::core::{now_ms, Fix, SevereWeatherNotice};
use storm_chase_tracker::logging::init_logging;
use storm_chase_tracker::source::{MockPositionSource, PositionError, PositionUpdate};
use storm_chase_tracker::utils::{JsonFileStore, MemoryStore, ToggleStore, TrackerConfig};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "storm-chase-tracker")]
#[command(about = "Replay a storm chase through the breadcrumb tracker", long_about = None)]
struct Args {
    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Persist tracking/voice toggles to this file (overrides the config)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Minimum distance between breadcrumbs in meters (overrides the config)
    #[arg(long)]
    min_distance: Option<f64>,

    /// Run without a speech synthesizer
    #[arg(long)]
    no_voice: bool,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let mut config = match &args.config {
        Some(path) => match TrackerConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "failed to load configuration");
                process::exit(1);
            }
        },
        None => TrackerConfig::default(),
    };
    if let Some(min_distance) = args.min_distance {
        config = config.with_min_distance(min_distance);
    }
    if let Some(state) = args.state {
        config = config.with_state_path(state);
    }
    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        process::exit(1);
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "failed to start event loop");
            process::exit(1);
        }
    };

    runtime.block_on(replay(config, args.no_voice));
}

async fn replay(config: TrackerConfig, no_voice: bool) {
    let store: Box<dyn ToggleStore> = match &config.state_path {
        Some(path) => Box::new(JsonFileStore::new(path)),
        None => Box::new(MemoryStore::default()),
    };
    let announcer = if no_voice {
        Announcer::silent()
    } else {
        Announcer::new(Some(Box::new(LogSynthesizer)))
    };
    let alerting = AlertingPolicy::new(announcer, config.alert_duration());

    let mut tracker = ChaseTracker::new(&config, store, alerting);
    let trail = BreadcrumbTrail::new();
    tracker.register_sink(Box::new(trail.clone()));
    tracker.register_sink(Box::new(CallbackSink::new(|event| {
        match HostMessage::new(event).to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => error!(error = %e, "failed to encode host message"),
        }
    })));

    let mut source = MockPositionSource::with_script(scripted_drive(now_ms()));
    source.set_current(Fix::new(35.2226, -97.4395, now_ms()).with_accuracy(12.0));

    let (runtime, handle) = TrackerRuntime::new(tracker, source, config);
    let task = tokio::spawn(runtime.run());

    let notice = SevereWeatherNotice::new(
        "Cleveland County",
        "Tornado Warning for Cleveland County until 6:45 PM CDT",
    );
    let commands = async {
        handle.start().await?;
        handle.severe_weather(notice).await?;
        handle.mark_position().await?;
        let status = handle.status().await?;
        info!(
            tracking = status.tracking,
            active_alerts = status.active_alerts,
            "chase status"
        );
        handle.stop().await?;
        handle.shutdown().await
    };
    if let Err(e) = commands.await {
        error!(error = %e, "runtime stopped early");
    }

    match task.await {
        Ok(_) => info!(
            breadcrumbs = trail.len(),
            distance_m = trail.total_distance_m(),
            "chase finished"
        ),
        Err(e) => error!(error = %e, "tracker task failed"),
    }
}

/// A short drive north-east out of Norman with GPS jitter and one dropout
fn scripted_drive(start_ms: u64) -> Vec<PositionUpdate> {
    let mut updates = Vec::new();
    for i in 0..24u64 {
        let step = i as f64;
        // ~22m per step along each axis, with small alternating jitter
        let jitter = if i % 2 == 0 { 0.00002 } else { -0.00002 };
        let fix = Fix::new(35.2226 + step * 0.0002 + jitter, -97.4395 + step * 0.00025, start_ms + i * 5_000)
            .with_accuracy(8.0 + (i % 3) as f64);
        updates.push(PositionUpdate::Fix(fix));

        if i == 12 {
            updates.push(PositionUpdate::Error(PositionError::Timeout));
        }
    }
    updates
}
