use keyword_alerts::app_state::AppState;
use keyword_alerts::configuration::{bot_token, get_configuration};
use keyword_alerts::create_app;
use keyword_alerts::errors::Error;
use keyword_alerts::parser::BestsellersParser;
use keyword_alerts::scheduler::AlertScheduler;
use keyword_alerts::supervisor::supervise;
use keyword_alerts::telegram::{CommandPoller, TelegramBot};
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn bind_address(host: &str, port: u16) -> Result<SocketAddr, Error> {
    let host = IpAddr::from_str(host)?;
    Ok(SocketAddr::from((host, port)))
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let token = bot_token()?;
    let settings = get_configuration()?;
    let addr = bind_address(&settings.application.host, settings.application.port)?;
    let app_state = AppState::load(&settings);

    let bot = TelegramBot::new(&settings.telegram.api_url, &token, settings.scheduler.send_timeout)?;
    let source = BestsellersParser::new(settings.catalog.clone(), settings.scheduler.fetch_timeout);
    let scheduler = AlertScheduler::new(
        Arc::new(source),
        Arc::new(bot.clone()),
        app_state.preferences.clone(),
        app_state.snapshot.clone(),
        settings.scheduler.clone(),
    );
    let poller = CommandPoller::new(
        bot,
        app_state.preferences.clone(),
        Duration::from_secs(settings.telegram.long_poll_secs),
    );

    let shutdown = CancellationToken::new();
    let mut tasks = JoinSet::new();
    tasks.spawn(scheduler.run(shutdown.clone()));
    tasks.spawn(poller.run(shutdown.clone()));
    tasks.spawn(serve(addr, app_state, shutdown.clone()));
    info!(%addr, "bot started");

    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    supervise(tasks, shutdown, settings.scheduler.shutdown_grace, ctrl_c).await
}

async fn serve(addr: SocketAddr, app_state: AppState, shutdown: CancellationToken) {
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!(%addr, error = %err, "failed to bind http listener");
            return;
        }
    };
    let app = create_app(app_state);
    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
    {
        error!(error = %err, "http server failed");
    }
}
