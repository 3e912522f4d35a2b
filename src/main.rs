use anyhow::{anyhow, Result};
use is_terminal::IsTerminal;
use recordcrab::{Config, RecordSolver, Shared, Solver};
use std::sync::Arc;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let group_name = recordcrab::config::group_name()?;

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("recordcrab".to_string()),
        first_args.next(),
    );
    let config = config_init(&program_name, config_file)?;

    let mut solver = RecordSolver::new();
    solver.initialize(&config.store).await?;
    let solver: Arc<dyn Solver> = Arc::new(solver);

    let shutdown = CancellationToken::new();
    tracing::info!(
        "API listening on {} for solver \"{}\" in group \"{group_name}\"",
        &config.api_bind_addr,
        solver.name()
    );
    let api_server = recordcrab::api::new(config.clone(), group_name, solver, shutdown.clone())?;
    let mut api_handle = tokio::spawn(api_server);

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
            shutdown.cancel();
            api_handle.await??;
        },
        api_res = &mut api_handle => {
            api_res??;
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recordcrab=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<Shared> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
