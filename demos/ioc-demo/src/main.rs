//! # 示例应用程序
//!
//! 演示如何用 Fodax IoC 容器组织一个 axum Web 服务：
//! 单例服务带引导/关闭钩子，作用域服务按请求隔离，
//! 退出信号触发容器的优雅关闭。

use async_trait::async_trait;
use axum::routing::get;
use axum::{middleware, Extension, Router};
use clap::Parser;
use ioc_axum::{context_ioc, IocContext};
use ioc_common::HookError;
use ioc_core::{Ioc, Lifecycle, Lifetime, Provider, ServiceInstance};
use std::sync::atomic::{AtomicU64, Ordering};
use tower_http::trace::TraceLayer;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "ioc-demo")]
#[command(about = "Fodax IoC 示例应用")]
struct Args {
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(&args.log_level))
        .init();

    info!("启动 Fodax IoC 示例应用");

    // 构建容器并注册服务
    let container = Ioc::global().create("demo");
    container.register(
        Provider::new()
            .token("greeting")
            .use_value(GreetingService::new("你好")),
    )?;
    container.register_service(
        "connection-pool",
        ConnectionPool::default(),
        Lifetime::Singleton,
    )?;
    container.register_factory(
        "request-counter",
        |_| Ok(ServiceInstance::new(RequestCounter::default())),
        Lifetime::Scoped,
    )?;

    // 运行引导钩子
    container.initialize_services().await?;

    let app = Router::new()
        .route("/", get(index))
        .layer(middleware::from_fn_with_state(
            container.clone(),
            context_ioc,
        ))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("监听地址: {}", args.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    info!("收到退出信号，正在关闭应用");
    container.shutdown_services("SIGINT").await?;

    info!("应用已关闭");
    Ok(())
}

/// 首页处理器：在请求作用域内解析服务
async fn index(Extension(ioc): Extension<IocContext>) -> String {
    let greeting = ioc
        .use_service::<GreetingService>("greeting")
        .map(|service| service.greet())
        .unwrap_or_else(|e| format!("解析失败: {e}"));

    // 作用域服务在同一请求内记忆化
    let counter = ioc.use_service::<RequestCounter>("request-counter");
    let hits = counter.map(|c| c.bump()).unwrap_or_default();

    format!("{greeting} (本请求内第 {hits} 次解析)\n")
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

// 示例服务

/// 问候服务（单例）
#[derive(Debug)]
pub struct GreetingService {
    prefix: String,
}

impl GreetingService {
    /// 创建问候服务
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// 生成问候语
    #[must_use]
    pub fn greet(&self) -> String {
        format!("{}，Fodax！", self.prefix)
    }
}

/// 模拟连接池（单例，带生命周期钩子）
#[derive(Debug, Default)]
pub struct ConnectionPool {
    connections: AtomicU64,
}

#[async_trait]
impl Lifecycle for ConnectionPool {
    async fn on_application_bootstrap(&self) -> Result<(), HookError> {
        // 模拟建立连接
        self.connections.store(4, Ordering::SeqCst);
        info!(
            "连接池已预热: {} 个连接",
            self.connections.load(Ordering::SeqCst)
        );
        Ok(())
    }

    async fn on_application_shutdown(&self, signal: &str) -> Result<(), HookError> {
        info!("收到 {signal}，连接池正在排空");
        self.connections.store(0, Ordering::SeqCst);
        Ok(())
    }
}

/// 请求内解析计数器（作用域）
#[derive(Debug, Default)]
pub struct RequestCounter {
    hits: AtomicU64,
}

impl RequestCounter {
    /// 递增并返回当前计数
    pub fn bump(&self) -> u64 {
        self.hits.fetch_add(1, Ordering::SeqCst) + 1
    }
}
