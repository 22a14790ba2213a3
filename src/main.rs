use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use rental_pricing::config::{ArtifactConfig, EnvironmentConfig};
use rental_pricing::middleware::metrics::AppMetrics;
use rental_pricing::repositories::ArtifactRepository;
use rental_pricing::routes;
use rental_pricing::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚗 Rental Pricing API - Estimación de precio diario");
    info!("===================================================");
    info!("🌍 Entorno: {}", config.environment);
    if config.is_production() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío: se aceptan peticiones de cualquier origen");
    }

    // Cargar artefactos una sola vez; fallar aquí es fatal
    let artifact_config = ArtifactConfig::from_env();
    let artifacts = match ArtifactRepository::new(artifact_config).load_all() {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("❌ Error cargando artefactos: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "📦 Artefactos listos: {} filas, {} árboles",
        artifacts.dataset.len(),
        artifacts.model.num_trees()
    );

    let metrics = AppMetrics::new()?;
    let app_state = AppState::from_artifacts(config.clone(), artifacts, metrics);
    let app = routes::create_app(app_state);

    let addr = config.server_url();

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /          - Descripción de la API");
    info!("   GET  /health    - Health check");
    info!("   GET  /metrics   - Métricas Prometheus");
    info!("   GET  /features  - Valores de una columna por frecuencia");
    info!("   GET  /preview   - Primeras filas del dataset");
    info!("   POST /predict   - Estimar precio diario");

    let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
