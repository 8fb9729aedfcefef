use clap::Parser;
use fileguard_client::config::{default_config_dir, ClientConfig};
use fileguard_client::logging::init_logging;
use fileguard_client::{Dashboard, HttpGateway, TimerKind, TracingPresenter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "fileguard-dashboard")]
#[command(about = "File Guardian dashboard client", long_about = None)]
struct Cli {
    /// 服务器地址，覆盖配置文件
    #[arg(short, long)]
    server: Option<String>,

    /// 常驻轮询周期（秒）
    #[arg(long)]
    ambient_interval: Option<u64>,

    /// 监控轮询周期（秒）
    #[arg(long)]
    monitoring_interval: Option<u64>,

    /// 配置与日志目录
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// 启动后加入待上传队列的文件
    #[arg(short, long = "add")]
    add: Vec<String>,

    /// 启动后立即上传队列
    #[arg(short, long)]
    upload: bool,

    /// 启动后开始监控
    #[arg(long)]
    start_monitoring: bool,

    /// 把当前参数写回配置文件
    #[arg(long)]
    save_config: bool,

    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_dir = cli.config_dir.clone().unwrap_or_else(default_config_dir);
    std::fs::create_dir_all(&config_dir)?;
    let _log_guard = init_logging(&config_dir.join("logs"), cli.verbose);

    let mut config = ClientConfig::load(&config_dir);
    if let Some(server) = cli.server {
        config.server_url = server;
    }
    if let Some(secs) = cli.ambient_interval {
        config.ambient_interval_secs = secs;
    }
    if let Some(secs) = cli.monitoring_interval {
        config.monitoring_interval_secs = secs;
    }
    if cli.save_config {
        config.save(&config_dir)?;
        tracing::info!("配置已保存: {:?}", config_dir.join("config.json"));
    }

    let gateway = HttpGateway::from_config(&config)?;
    let dashboard = Dashboard::new(Arc::new(gateway), Arc::new(TracingPresenter), &config);

    dashboard.init().await;

    for path in &cli.add {
        if let Err(e) = dashboard.add_pending_file(path).await {
            tracing::warn!("跳过 {}: {}", path, e);
        }
    }
    if cli.upload {
        match dashboard.request_upload_all().await {
            Ok(report) => {
                for error in &report.errors {
                    tracing::warn!("  {}", error);
                }
            }
            Err(e) => tracing::warn!("上传未执行: {}", e),
        }
    }
    if cli.start_monitoring {
        let _ = dashboard.request_start_monitoring().await;
    }

    let polling = dashboard.polling();
    tracing::info!(
        "轮询中（常驻 {:?}，监控 {:?}），按 Ctrl+C 退出",
        polling.polling_interval(TimerKind::Ambient).await,
        polling.polling_interval(TimerKind::Monitoring).await
    );

    tokio::signal::ctrl_c().await?;
    dashboard.teardown().await;
    Ok(())
}
