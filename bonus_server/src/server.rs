use std::time::Duration;

use accrual_client::AccrualApi;
use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use bonus_engine::{AuthApi, LedgerApi, OrderIntakeApi, ReconciliationApi, SqliteDatabase};
use log::*;
use tokio::sync::watch;

use crate::{
    accrual_worker::start_accrual_worker,
    auth::TokenManager,
    config::ServerConfig,
    errors::ServerError,
    routes::{
        health,
        json_config,
        BalanceRoute,
        ListOrdersRoute,
        LoginRoute,
        RegisterRoute,
        SubmitOrderRoute,
        WithdrawRoute,
        WithdrawalsRoute,
    },
};

/// Connects to (and migrates) the database, starts the accrual poller and serves HTTP until the server is stopped.
///
/// The database being unavailable at startup is fatal: the server will not accept any traffic.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, config.database_max_connections)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(format!("Database migration failed. {e}")))?;
    info!("🚀️ Database ready at {}", db.url());
    let tokens = TokenManager::new(&config.auth)?;
    let provider =
        AccrualApi::new(config.accrual.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let worker =
        start_accrual_worker(ReconciliationApi::new(db.clone()), provider, config.poll_interval, shutdown_rx);
    let srv = create_server_instance(config, db.clone(), tokens)?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    info!("🚀️ HTTP server stopped. Waiting for the accrual poller to finish");
    let _ = shutdown_tx.send(true);
    if let Err(e) = worker.await {
        error!("🚀️ The accrual poller did not shut down cleanly. {e}");
    }
    db.close().await;
    result
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    tokens: TokenManager,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let auth_api = AuthApi::new(db.clone());
        let orders_api = OrderIntakeApi::new(db.clone());
        let ledger_api = LedgerApi::new(db.clone());
        let user_scope = web::scope("/api/user")
            .service(RegisterRoute::<SqliteDatabase>::new())
            .service(LoginRoute::<SqliteDatabase>::new())
            .service(SubmitOrderRoute::<SqliteDatabase>::new())
            .service(ListOrdersRoute::<SqliteDatabase>::new())
            .service(BalanceRoute::<SqliteDatabase>::new())
            .service(WithdrawRoute::<SqliteDatabase>::new())
            .service(WithdrawalsRoute::<SqliteDatabase>::new());
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("bps::access_log"))
            .app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(ledger_api))
            .app_data(web::Data::new(tokens.clone()))
            .app_data(json_config())
            .service(health)
            .service(user_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind(config.run_address.as_str())?
    .run();
    Ok(srv)
}
