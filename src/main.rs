use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use greenroute_dashboard::backend::{BackendClient, DashboardBackend};
use greenroute_dashboard::config::{Config, ConfigOverrides};
use greenroute_dashboard::dashboard::fleet::VehicleForm;
use greenroute_dashboard::dashboard::{Shell, Tab};
use greenroute_dashboard::map::overlay::{MapDefaults, OverlayManager};
use greenroute_dashboard::map::recording::{RecordingEngine, RecordingSurface};
use greenroute_dashboard::output::csv::{fleet_to_csv, history_to_csv, routes_to_csv};
use greenroute_dashboard::output::json::render_json;
use greenroute_dashboard::output::table::{
    render_fleet_table, render_history_table, render_layers_table, render_routes_table,
    render_simulation_table,
};
use greenroute_dashboard::types::VehicleStatus;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "greenroute", about = "Route optimization dashboard client")]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short = 'u', long = "api-url")]
    api_url: Option<String>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Health,
    Status,
    Optimize,
    Fleet {
        #[command(subcommand)]
        command: FleetCommands,
    },
    History,
    Explain {
        log_id: String,
    },
    Ask {
        question: String,
    },
    Render {
        #[arg(long)]
        log: Option<String>,
    },
    Watch {
        #[arg(long)]
        duration_secs: Option<u64>,
    },
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[derive(Debug, Subcommand)]
enum FleetCommands {
    List,
    Add {
        #[arg(long = "id")]
        vehicle_id: String,
        #[arg(long = "type")]
        vehicle_type: String,
        #[arg(long, default_value_t = 0)]
        capacity: u32,
        #[arg(long, default_value = "Active")]
        status: VehicleStatus,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        base_url: cli.api_url.clone(),
    });

    if let Commands::Config { init, show } = &cli.command {
        return handle_config_command(*init, *show, &config, &config_path);
    }

    let client = Arc::new(BackendClient::new(&config.backend)?);
    info!(base_url = client.base_url(), "using backend");
    let shell = Shell::new(client.clone(), &config);

    match &cli.command {
        Commands::Health => {
            let online = client.health().await;
            println!("{}", if online { "online" } else { "offline" });
            if !online {
                return Err(anyhow!("backend at {} is unreachable", client.base_url()));
            }
        }
        Commands::Status => {
            let online = client.health().await;
            let simulation = match client.simulation_status().await {
                Ok(simulation) => Some(simulation),
                Err(err) => {
                    warn!("simulation status unavailable: {err}");
                    None
                }
            };
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_simulation_table(online, simulation.as_ref()))
                }
                _ => println!(
                    "{}",
                    render_json(&serde_json::json!({ "online": online, "simulation": simulation }))?
                ),
            }
        }
        Commands::Optimize => {
            let result = shell.optimize().await?;
            match cli.output {
                OutputFormat::Table => {
                    println!("{}", render_routes_table(&result));
                    let (headline, received_at) =
                        shell.with_optimization(|view| (view.headline(), view.received_at()));
                    if let (Some(headline), Some(received_at)) = (headline, received_at) {
                        println!("{headline} (received {})", received_at.format("%H:%M:%S UTC"));
                    }
                }
                OutputFormat::Json => println!("{}", render_json(&result)?),
                OutputFormat::Csv => println!("{}", routes_to_csv(&result)?),
            }
        }
        Commands::Fleet { command } => {
            if let FleetCommands::Add {
                vehicle_id,
                vehicle_type,
                capacity,
                status,
            } = command
            {
                let form = VehicleForm {
                    vehicle_id: vehicle_id.clone(),
                    vehicle_type: vehicle_type.clone(),
                    capacity: *capacity,
                    status: *status,
                };
                shell.add_vehicle(&form).await?;
                info!(vehicle_id = %vehicle_id, "vehicle added");
            } else {
                shell.refresh_fleet().await?;
            }
            let (vehicles, table) =
                shell.with_fleet(|fleet| (fleet.vehicles().to_vec(), render_fleet_table(fleet)));
            match cli.output {
                OutputFormat::Table => println!("{table}"),
                OutputFormat::Json => println!("{}", render_json(&vehicles)?),
                OutputFormat::Csv => println!("{}", fleet_to_csv(&vehicles)?),
            }
        }
        Commands::History => {
            shell.refresh_history().await?;
            let (logs, summary) =
                shell.with_history(|history| (history.logs().to_vec(), history.summary()));
            match cli.output {
                OutputFormat::Table => println!("{}", render_history_table(&logs, &summary)),
                OutputFormat::Json => println!("{}", render_json(&logs)?),
                OutputFormat::Csv => println!("{}", history_to_csv(&logs)?),
            }
        }
        Commands::Explain { log_id } => {
            let state = shell.select_log(log_id).await;
            match cli.output {
                OutputFormat::Table => println!("{}", state.text().unwrap_or_default()),
                _ => println!("{}", render_json(&state)?),
            }
        }
        Commands::Ask { question } => match shell.ask(question).await {
            Ok(Some(answer)) => match cli.output {
                OutputFormat::Table => {
                    println!("{}", answer.answer);
                    if let Some(audio) = &answer.audio_url {
                        println!("Audio: {audio}");
                    }
                }
                _ => println!("{}", render_json(&answer)?),
            },
            Ok(None) => return Err(anyhow!("question is empty")),
            Err(notice) => println!("{notice}"),
        },
        Commands::Render { log } => render_overlay(&shell, &config, log.as_deref(), cli.output).await?,
        Commands::Watch { duration_secs } => run_watch(&shell, *duration_secs).await?,
        Commands::Config { .. } => unreachable!("config command handled before dispatch"),
    }

    Ok(())
}

fn handle_config_command(init: bool, show: bool, config: &Config, config_path: &PathBuf) -> Result<()> {
    if init {
        Config::write_template(config_path)?;
        println!("Wrote config template to {}", config_path.display());
    }
    if show || !init {
        println!("{}", render_json(config)?);
    }
    Ok(())
}

async fn render_overlay(
    shell: &Shell,
    config: &Config,
    log: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    match log {
        Some(log_id) => {
            if let Some(fetch) = shell.switch_tab(Tab::History) {
                fetch.await??;
            }
            shell.select_log(log_id).await;
        }
        None => {
            shell.optimize().await?;
        }
    }

    let engine = RecordingEngine::new();
    let mut overlay: OverlayManager<RecordingSurface> =
        OverlayManager::new(MapDefaults::from(&config.map));
    if !overlay.initialize(&engine) {
        return Err(anyhow!("no map surface available"));
    }
    let summary = overlay.redraw(&shell.scene());
    info!(
        mode = ?summary.mode,
        layers = summary.layers_drawn,
        "overlay redrawn"
    );
    let snapshot = overlay
        .surface()
        .map(RecordingSurface::snapshot)
        .ok_or_else(|| anyhow!("map surface released during redraw"))?;
    match format {
        OutputFormat::Table => println!("{}", render_layers_table(&snapshot)),
        OutputFormat::Json => println!("{}", render_json(&snapshot)?),
        OutputFormat::Csv => {
            warn!("CSV output for render not implemented, using JSON");
            println!("{}", render_json(&snapshot)?);
        }
    }
    Ok(())
}

async fn run_watch(shell: &Shell, duration_secs: Option<u64>) -> Result<()> {
    let poller = shell.start_polling();
    let mut online = shell.status().indicator.subscribe();
    let mut simulation = shell.status().subscribe_simulation();
    let deadline = async {
        match duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            _ = &mut deadline => break,
            changed = online.changed() => {
                if changed.is_err() {
                    break;
                }
                let now_online = *online.borrow_and_update();
                info!(online = now_online, "connectivity");
            }
            changed = simulation.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(status) = simulation.borrow_and_update().clone() {
                    info!(
                        traffic = %status.traffic_level,
                        traffic_factor = status.traffic_factor,
                        weather = %status.weather_condition,
                        weather_risk = status.weather_risk,
                        "simulation"
                    );
                }
            }
        }
    }
    poller.stop();
    Ok(())
}
