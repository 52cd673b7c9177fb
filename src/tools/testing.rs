//! 工具测试夹具：MockPage + 临时目录中的录制文件 + 毫秒级超时

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use crate::browser::{MockPage, Page};
use crate::recorder::{ScriptDialect, ScriptRecorder};
use crate::tools::{BrowserContext, ToolSettings};

pub(crate) struct Fixture {
    pub mock: Arc<MockPage>,
    pub ctx: BrowserContext,
    _dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_settings(|_| {})
    }

    pub fn with_settings(customize: impl FnOnce(&mut ToolSettings)) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let mock = Arc::new(MockPage::new());
        let page = Page::new(mock.clone()).with_poll_interval(Duration::from_millis(5));
        let recorder = ScriptRecorder::new(dir.path().join("steps.ts"), ScriptDialect::Async);
        let mut settings = ToolSettings {
            action_timeout: Duration::from_millis(30),
            expect_timeout: Duration::from_millis(30),
            ..ToolSettings::default()
        };
        customize(&mut settings);
        let ctx = BrowserContext::new(Arc::new(page), Arc::new(recorder), settings);
        Self {
            mock,
            ctx,
            _dir: dir,
        }
    }

    pub async fn recorded(&self) -> Vec<String> {
        self.ctx.recorder.lines().await.expect("read recorder")
    }
}
