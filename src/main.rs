//! Bee Browser - 交互式浏览器工具驱动
//!
//! 启动 Chrome，从 stdin 逐行读取工具调用 `{"tool": "...", "args": {...}}` 并打印结果。
//! 以 `:` 开头的行为控制命令：`:tools`、`:schema`、`:export <name>`、`:clear`、`:quit`。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bee_browser::browser::{ChromeDriver, Page};
use bee_browser::config::load_config;
use bee_browser::observability;
use bee_browser::recorder::ScriptRecorder;
use bee_browser::tools::{BrowserContext, BrowserToolkit, ToolExecutor, ToolSettings};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    args: Value,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load config")?;

    let driver = ChromeDriver::launch(cfg.browser.clone())
        .await
        .context("Failed to launch browser")?;
    let page = Page::new(Arc::new(driver))
        .with_poll_interval(Duration::from_millis(cfg.tools.poll_interval_ms));
    let recorder = Arc::new(ScriptRecorder::from_config(&cfg.recorder));
    let ctx = BrowserContext::new(
        Arc::new(page),
        Arc::clone(&recorder),
        ToolSettings::from_config(&cfg.tools),
    );
    let executor = ToolExecutor::new(
        BrowserToolkit::new(ctx).into_registry(),
        cfg.tools.tool_timeout_secs,
    );
    if let Some(path) = recorder.path() {
        tracing::info!(path = %path.display(), "recording steps");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(command) = line.strip_prefix(':') {
            let (command, rest) = command
                .split_once(char::is_whitespace)
                .map(|(c, r)| (c, r.trim()))
                .unwrap_or((command, ""));
            match command {
                "quit" | "q" => break,
                "tools" => {
                    for (name, description) in executor.registry().tool_descriptions() {
                        println!("{name}: {description}");
                    }
                }
                "schema" => println!("{}", executor.registry().to_schema_json()),
                "export" => {
                    let name = if rest.is_empty() { "recorded steps" } else { rest };
                    match recorder.render_test(name).await {
                        Ok(script) => println!("{script}"),
                        Err(e) => println!("Error: failed to read recorded steps: {e}"),
                    }
                }
                "clear" => match recorder.clear().await {
                    Ok(()) => println!("Recorded steps cleared"),
                    Err(e) => println!("Error: failed to clear recorded steps: {e}"),
                },
                other => println!("Error: unknown command :{other}"),
            }
            continue;
        }

        let call: ToolCall = match serde_json::from_str(line) {
            Ok(call) => call,
            Err(e) => {
                println!("Error: invalid tool call: {e}");
                continue;
            }
        };
        match executor.execute(&call.tool, call.args).await {
            Ok(output) => println!("{output}"),
            Err(e) => println!("Error: {e}"),
        }
    }

    Ok(())
}
