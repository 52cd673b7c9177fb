//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `BEE__*` 覆盖（双下划线表示嵌套，如 `BEE__BROWSER__HEADLESS=false`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::browser::DEFAULT_EXPECT_TIMEOUT;
use crate::recorder::ScriptDialect;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub browser: BrowserSection,
    pub tools: ToolsSection,
    pub recorder: RecorderSection,
}

/// [browser] 段：Chrome 启动参数
#[derive(Debug, Clone, Deserialize)]
pub struct BrowserSection {
    #[serde(default = "default_true")]
    pub headless: bool,
    /// 容器内以 root 运行时需关闭
    #[serde(default = "default_true")]
    pub sandbox: bool,
    /// Chrome 可执行文件路径，未设置时自动探测
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// 导航与 CDP 调用的默认超时（秒）
    #[serde(default = "default_navigation_timeout_secs")]
    pub navigation_timeout_secs: u64,
    /// 无 CDP 活动多久后关闭浏览器（秒）
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_window_width() -> u32 {
    1280
}

fn default_window_height() -> u32 {
    800
}

fn default_navigation_timeout_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    600
}

impl Default for BrowserSection {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            chrome_path: None,
            window_width: default_window_width(),
            window_height: default_window_height(),
            navigation_timeout_secs: default_navigation_timeout_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

/// [tools] 段：工具超时、元素等待、严格模式、输出截断、导航白名单
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒），由 ToolExecutor 施加
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
    /// 点击 / 填写等动作等待元素就绪的超时（毫秒）
    #[serde(default = "default_action_timeout_ms")]
    pub action_timeout_ms: u64,
    /// expect_* 断言的超时（毫秒）
    #[serde(default = "default_expect_timeout_ms")]
    pub expect_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 只考虑可见元素
    #[serde(default = "default_true")]
    pub visible_only: bool,
    /// 严格模式：选择器匹配多个元素时报错
    #[serde(default)]
    pub strict: bool,
    #[serde(default = "default_max_result_chars")]
    pub max_result_chars: usize,
    /// 允许导航的域名；为空表示不限制
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

fn default_tool_timeout_secs() -> u64 {
    30
}

fn default_action_timeout_ms() -> u64 {
    1_000
}

fn default_expect_timeout_ms() -> u64 {
    DEFAULT_EXPECT_TIMEOUT.as_millis() as u64
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_max_result_chars() -> usize {
    8000
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
            action_timeout_ms: default_action_timeout_ms(),
            expect_timeout_ms: default_expect_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            visible_only: true,
            strict: false,
            max_result_chars: default_max_result_chars(),
            allowed_domains: Vec::new(),
        }
    }
}

/// [recorder] 段：脚本录制文件
#[derive(Debug, Clone, Deserialize)]
pub struct RecorderSection {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// 未设置时为 `<临时目录>/bee-browser-steps.ts`
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub dialect: ScriptDialect,
}

impl RecorderSection {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("bee-browser-steps.ts"))
    }
}

impl Default for RecorderSection {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
            dialect: ScriptDialect::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 BEE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 BEE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("BEE")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("tools.allowed_domains")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.browser.headless);
        assert_eq!(cfg.browser.window_width, 1280);
        assert_eq!(cfg.tools.action_timeout_ms, 1_000);
        assert_eq!(cfg.tools.expect_timeout_ms, 5_000);
        assert!(cfg.tools.visible_only);
        assert!(!cfg.tools.strict);
        assert!(cfg.recorder.enabled);
        assert!(cfg.recorder.resolved_path().ends_with("bee-browser-steps.ts"));
    }

    #[test]
    fn test_env_overrides_and_domain_list() {
        // 与 test_load_from_file_overrides 并行时取值保持一致（strict=true, headless=false）
        std::env::set_var("BEE__TOOLS__ALLOWED_DOMAINS", "example.com,docs.rs");
        std::env::set_var("BEE__TOOLS__STRICT", "true");
        std::env::set_var("BEE__BROWSER__HEADLESS", "false");
        let cfg = load_config(None);
        std::env::remove_var("BEE__TOOLS__ALLOWED_DOMAINS");
        std::env::remove_var("BEE__TOOLS__STRICT");
        std::env::remove_var("BEE__BROWSER__HEADLESS");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.tools.allowed_domains, vec!["example.com", "docs.rs"]);
        assert!(cfg.tools.strict);
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.tools.expect_timeout_ms, 5_000);
    }

    #[test]
    fn test_load_from_file_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[browser]\nheadless = false\n\n[tools]\nstrict = true\naction_timeout_ms = 250\n\n[recorder]\ndialect = \"sync\"\npath = \"/tmp/steps.ts\""
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert!(!cfg.browser.headless);
        assert_eq!(cfg.browser.window_height, 800);
        assert!(cfg.tools.strict);
        assert_eq!(cfg.tools.action_timeout_ms, 250);
        assert_eq!(cfg.tools.max_result_chars, 8000);
        assert_eq!(cfg.recorder.dialect, ScriptDialect::Sync);
        assert_eq!(cfg.recorder.resolved_path(), PathBuf::from("/tmp/steps.ts"));
    }
}
