use std::net::TcpListener;
use std::sync::Arc;

use guid_auth::configuration::get_configuration;
use guid_auth::startup::run;
use guid_auth::store::PostgresSessionStore;
use guid_auth::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "configuration error",
            ));
        }
    };

    if let Err(e) = configuration.jwt.validate() {
        tracing::error!("invalid jwt configuration: {}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "configuration error",
        ));
    }

    let connection_string = configuration.database.connection_string();
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&connection_string)
        .await
        .map_err(|e| {
            tracing::error!("failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "database connection error",
            )
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!("failed to run migrations: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, "migration error")
    })?;

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!("server listening on {}", address);

    let store = Arc::new(PostgresSessionStore::new(pool));
    let server = run(listener, store, configuration.jwt.clone())?;

    server.await
}
