use std::sync::Arc;

use tokio::{signal, sync::mpsc};
use tracing::{error, info};
use uuid::Uuid;

use warehouse_req_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(cfg.log_level(), cfg.log_json);

    // Init DB
    let db_pool = api::db::establish_connection_from_app_config(&cfg).await?;
    if cfg.auto_migrate {
        api::db::run_migrations(&db_pool).await.map_err(|e| {
            error!("Failed running migrations: {}", e);
            e
        })?;
    }

    let db_arc = Arc::new(db_pool);

    // Init events
    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let event_sender = api::events::EventSender::new(event_tx);

    // Spawn event processor
    tokio::spawn(api::events::process_events(event_rx));

    // Acting identity for approval checks. The nil actor stands in until an
    // embedding application installs its own CallerIdentity.
    let identity: Arc<dyn api::identity::CallerIdentity> =
        Arc::new(api::identity::FixedIdentity::new(Uuid::nil()));

    // Build services
    let factory =
        api::services::factory::ServiceFactory::new(db_arc.clone(), event_sender.clone(), identity);
    let services = api::services::factory::ServiceContainer::new(&factory);

    // Compose shared app state
    let app_state = api::AppState {
        db: db_arc.clone(),
        config: cfg.clone(),
        event_sender,
        services,
    };

    api::db::check_connection(&app_state.db).await?;
    info!("warehouse-req-api up; requisition services ready");

    shutdown_signal().await;
    info!("Shutdown signal received, stopping");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("failed to install signal handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
