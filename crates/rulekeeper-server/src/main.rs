use clap::Parser;
use rulekeeper_api::{create_router, AppState};
use rulekeeper_core::{RuleService, SeaOrmRuleStore};
use rulekeeper_server::{init_logging, ConfigLoader};
use sea_orm::{ConnectOptions, Database};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ConfigLoader::new(&args.config)
        .with_env_prefix("RULEKEEPER")
        .load()?;

    // 初始化日志
    init_logging(&config.logging)?;
    info!(config = %args.config.display(), "Starting rulekeeper server");

    // 连接数据库
    let mut options = ConnectOptions::new(config.database.url.clone());
    if let Some(max_connections) = config.database.pool_size() {
        options.max_connections(max_connections);
    }
    let db = Database::connect(options).await?;

    // 创建表结构
    let store = SeaOrmRuleStore::new(Arc::new(db));
    store.init_schema().await?;

    let rule_service = Arc::new(RuleService::new(Arc::new(store)));
    let app = create_router(AppState::new(rule_service));

    // 启动服务器
    let addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
