//! # 示例应用程序
//!
//! 演示互相依赖的 `userService` / `orderService` 在日志切面下协作：
//!
//! ```text
//! example-app --user alice --delete --log-level debug
//! ```

mod demo;

use anyhow::Context;
use clap::Parser;
use demo::aspect::LoggingAspect;
use infrastructure_common::Value;
use infrastructure_composition::{ApplicationContext, ContextSettings};
use std::path::PathBuf;
use tracing::{error, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn IoC 示例应用")]
struct Args {
    /// 扫描的根命名空间，覆盖配置文件
    #[arg(short, long)]
    namespace: Option<String>,

    /// 要创建的用户
    #[arg(short, long, default_value = "alice")]
    user: String,

    /// 创建后再删除该用户
    #[arg(long)]
    delete: bool,

    /// 配置文件路径（TOML / JSON / YAML）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件
    #[arg(long)]
    log_level: Option<String>,
}

const DEFAULT_NAMESPACE: &str = "example_app.demo";

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => ContextSettings::load(Some(path.as_path()))
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
        None => ContextSettings::from_env().context("加载环境变量配置失败")?,
    };
    if let Some(namespace) = args.namespace.clone() {
        settings.root_namespace = namespace;
    } else if settings.root_namespace.is_empty() {
        settings.root_namespace = DEFAULT_NAMESPACE.to_string();
    }
    if let Some(level) = &args.log_level {
        settings.logging = settings.logging.with_level(level);
    }

    let context = ApplicationContext::builder()
        .with_settings(settings)
        .enable_logging(true)
        .start()
        .context("启动应用上下文失败")?;

    info!("启动 Lorn IoC 示例应用, 组件: {:?}", context.bean_names());

    let outcome = run(&context, &args);
    if let Err(e) = &outcome {
        error!("示例执行失败: {:#}", e);
    }

    let stats = context.stats();
    info!(
        "统计: 组件 {} 个, 单例 {} 个, 代理 {} 个, 早期引用 {} 次",
        stats.registered_components,
        stats.active_singletons,
        stats.proxies_created,
        stats.early_references
    );

    context.close().context("关闭应用上下文失败")?;
    info!("应用已关闭");
    outcome
}

fn run(context: &ApplicationContext, args: &Args) -> anyhow::Result<()> {
    let user_service = context.get_invocable("userService")?;

    let order = user_service.invoke("createUser", &[Value::from(args.user.as_str())])?;
    println!("已为用户 {} 创建订单 {}", args.user, order);

    if args.delete {
        user_service.invoke("deleteUser", &[Value::from(args.user.as_str())])?;
        println!("已删除用户 {}", args.user);
    }

    if let Ok(aspect) = context.get_bean_typed::<LoggingAspect>("loggingAspect") {
        info!("日志切面记录调用 {} 次", aspect.calls());
    }
    Ok(())
}
