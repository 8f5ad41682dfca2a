//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use financas_backend::{config::AppState, routes::create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let app_state = AppState::new().await.inspect_err(|e| {
        tracing::error!("🔥 Falha ao inicializar o estado da aplicação: {:?}", e);
    })?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Agendamento diário da reconciliação
    let job = app_state.job.clone();
    let shutdown = job.shutdown_handle();
    let job_handle = tokio::spawn(async move { job.run().await });

    let bind_addr = app_state.config.bind_addr;
    let app = create_router(app_state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Sinal de encerramento recebido");
        })
        .await?;

    shutdown.notify_one();
    let _ = job_handle.await;
    Ok(())
}
