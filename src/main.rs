//! Saybot - 内联查询文本转语音服务
//!
//! 装配各组件并启动 HTTP 服务器与标识符清扫任务

use std::sync::Arc;
use std::time::Duration;

use saybot::application::DeliveryConfig;
use saybot::config::{load_config, print_config, LogConfig};
use saybot::infrastructure::adapters::{FileAudioCache, HttpTtsClient, HttpTtsClientConfig};
use saybot::infrastructure::http::{AppState, AppStateConfig, HttpServer, ServerConfig};
use saybot::infrastructure::memory::InMemoryIdentifierIndex;
use saybot::infrastructure::worker::{IdentifierSweeper, SweeperConfig};

fn init_logging(config: &LogConfig) {
    let log_filter = format!("{},saybot={},tower_http=debug", config.level, config.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl-c");
        return;
    }
    tracing::info!("Received shutdown signal");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_logging(&config.log);

    tracing::info!("Saybot - 内联查询文本转语音服务");
    print_config(&config);

    // 标识符索引（TTL 已在配置校验中限定范围）
    let ttl = chrono::Duration::seconds(config.index.ttl_secs as i64);
    let identifier_index = InMemoryIdentifierIndex::new(ttl).arc();

    // 文件音频缓存，目录在第一次请求时创建
    let audio_cache = Arc::new(FileAudioCache::new(
        &config.storage.audio_dir,
        config.tts.format,
    ));

    // HTTP TTS 引擎
    let tts_config =
        HttpTtsClientConfig::new(config.tts.url.clone()).with_timeout(config.tts.timeout_secs);
    let tts_engine = Arc::new(HttpTtsClient::new(tts_config)?);

    // 启动清扫任务
    let sweeper = IdentifierSweeper::new(
        SweeperConfig {
            interval: Duration::from_secs(config.index.sweep_interval_secs),
        },
        identifier_index.clone(),
    )
    .spawn();

    let state = AppState::new(
        identifier_index,
        audio_cache,
        tts_engine,
        AppStateConfig {
            public_base_url: config.server.public_base_url(),
            max_length: config.request.max_length,
            delivery: DeliveryConfig {
                format: config.tts.format,
                voice: config.tts.voice.clone(),
                ..Default::default()
            },
        },
    )?;

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, Arc::new(state));

    tracing::info!("Starting HTTP server...");

    // 启动服务器（带优雅关闭）
    let result = server.run_with_shutdown(shutdown_signal()).await;

    sweeper.shutdown().await;
    result?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
