//! rsuseragent 命令行工具
//! 加载规则文件后逐条识别 UA（命令行参数，或未给参数时逐行读取标准输入）

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use rsuseragent::{ClassificationModel, ConfigManager, RuleLoader};

#[derive(Debug, Parser)]
#[command(name = "rsuseragent", version, about = "识别 User-Agent 对应的浏览器与操作系统")]
struct Cli {
    /// 规则文件路径（默认 ./useragent.yml）
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// 每条结果输出一行 JSON
    #[arg(long)]
    json: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,

    /// 待识别的 UA，留空则读取标准输入
    user_agents: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut builder = ConfigManager::custom().verbose(cli.verbose);
    if let Some(rules) = cli.rules {
        builder = builder.rule_file(rules);
    }
    let config = builder.build();
    init_logging(config.verbose);

    let model = RuleLoader::load(&config)
        .await
        .with_context(|| format!("加载规则文件失败：{}", config.rule_file.display()))?;

    if cli.user_agents.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            let user_agent = line.trim();
            if !user_agent.is_empty() {
                print_result(&model, user_agent, cli.json)?;
            }
        }
    } else {
        for user_agent in &cli.user_agents {
            print_result(&model, user_agent, cli.json)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_result(model: &ClassificationModel, user_agent: &str, json: bool) -> anyhow::Result<()> {
    let report = model.classify(user_agent).report(user_agent);
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report);
    }
    Ok(())
}
