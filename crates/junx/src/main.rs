use anyhow::{Context, Result};
use clap::Parser;
use database::Database;
use server::{app::ApplicationServer, services::Services};
use std::sync::Arc;
use timer::Timer;
use tokio::{signal, task::JoinSet};
use tracing::info;
use utils::{AppConfig, Logger};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // 根据 CARGO_ENV 加载对应的环境配置文件
    utils::EnvLoader::load_env_file().ok();
    let config = Arc::new(AppConfig::parse());
    let _log_guard = Logger::new(config.cargo_env);

    let junx = Junx::new(config).await?;
    junx.run().await.context("🔴 Junx backend error")?;

    Ok(())
}

pub struct Junx {
    services: Services,
    config: Arc<AppConfig>,
}

impl Junx {
    pub async fn new(config: Arc<AppConfig>) -> Result<Self> {
        let mongodb = Database::new(config.clone())
            .await
            .context("🔴 Failed to connect database")?;
        let services = Services::new(mongodb);

        Ok(Self { services, config })
    }

    pub async fn run(self) -> Result<()> {
        let mut set = JoinSet::new();

        // 1. 启动api & services
        // 2. 启动榜单重算Timer

        let config = self.config.clone();
        set.spawn(async move {
            ApplicationServer::serve(config)
                .await
                .context("🔴 Failed to start server")
                .expect("🔴 Failed to start server");
        });

        let timer = Arc::new(Timer::new(Some(self.config.leaderboard_cron.clone()), self.services.clone()));
        set.spawn(async move {
            timer.run().await;
        });

        tokio::select! {
            _ = async {
                while let Some(_) = set.join_next().await {
                    info!("🔔 Task completed");
                }
            } => {},
            _ = shutdown_signal() => {
                info!("🔔 Shutdown signal received, stopping all tasks...");
            },
        }

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("🔴 Failed to install Ctrl+C handler");
        info!("🔔 Ctrl+C received");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("🔴 Failed to install signal handler")
            .recv()
            .await;
        info!("🔔 Terminate signal received");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("❌ Signal received, starting graceful shutdown...");
}
