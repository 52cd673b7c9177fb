//! 脚本录制：把每个成功的浏览器步骤追加为一行 Playwright 语句
//!
//! 所有工具共享一个录制文件（默认在系统临时目录），用于审计与回放。
//! 断言失败写 `// FAIL - ...` 注释行；写文件失败只记 warn 日志，不影响工具结果。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::RecorderSection;

const INDENT: &str = "    ";

/// 录制语句风格：async 带 `await ` 前缀，sync 不带
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptDialect {
    #[default]
    Async,
    Sync,
}

pub struct ScriptRecorder {
    path: Option<PathBuf>,
    dialect: ScriptDialect,
    lock: Mutex<()>,
}

impl ScriptRecorder {
    pub fn new(path: impl Into<PathBuf>, dialect: ScriptDialect) -> Self {
        Self {
            path: Some(path.into()),
            dialect,
            lock: Mutex::new(()),
        }
    }

    /// 不落盘的录制器（所有 record 调用为空操作）
    pub fn disabled() -> Self {
        Self {
            path: None,
            dialect: ScriptDialect::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(section: &RecorderSection) -> Self {
        if section.enabled {
            Self::new(section.resolved_path(), section.dialect)
        } else {
            Self::disabled()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 格式化一行语句，如 `    await page.click('#a');`
    pub fn statement(&self, stmt: &str) -> String {
        let prefix = match self.dialect {
            ScriptDialect::Async => "await ",
            ScriptDialect::Sync => "",
        };
        format!("{INDENT}{prefix}{stmt};\n")
    }

    pub async fn record(&self, stmt: &str) {
        let line = self.statement(stmt);
        self.append_logged(&line).await;
    }

    pub async fn record_failure(&self, note: &str) {
        let line = format!("{INDENT}// FAIL - {note}\n");
        self.append_logged(&line).await;
    }

    async fn append_logged(&self, line: &str) {
        if let Err(e) = self.append(line).await {
            tracing::warn!(error = %e, path = ?self.path, "failed to append recorded step");
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }

    /// 已录制的行（文件不存在视为空）
    pub async fn lines(&self) -> std::io::Result<Vec<String>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        let _guard = self.lock.lock().await;
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    pub async fn clear(&self) -> std::io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let _guard = self.lock.lock().await;
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// 将录制内容包装为一个 @playwright/test 用例文件
    pub async fn render_test(&self, name: &str) -> std::io::Result<String> {
        let body = self.lines().await?;
        let mut out = String::new();
        out.push_str(&format!(
            "// Recorded by bee-browser at {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        out.push_str("import { test, expect } from '@playwright/test';\n\n");
        out.push_str(&format!(
            "test({}, async ({{ page }}) => {{\n",
            crate::browser::js_string(name)
        ));
        for line in body {
            out.push_str(&line);
            out.push('\n');
        }
        out.push_str("});\n");
        Ok(out)
    }
}
