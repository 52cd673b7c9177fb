//! 浏览器工具箱：从同一个 BrowserContext 构建全部工具

use std::sync::Arc;

use crate::tools::{
    BrowserContext, ClickByTextTool, ClickTool, CurrentWebPageTool, ExpectTestIdTool,
    ExpectTextTool, ExpectTitleTool, ExtractHyperlinksTool, ExtractTextTool, FillTool,
    GetElementsTool, IframeClickByTextTool, IframeClickTool, IframeExpectHiddenTool,
    IframeUploadTool, NavigateBackTool, NavigateTool, TakeScreenshotTool, Tool, ToolRegistry,
};

pub struct BrowserToolkit {
    ctx: BrowserContext,
}

impl BrowserToolkit {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }

    /// 全部工具，顺序固定
    pub fn get_tools(&self) -> Vec<Arc<dyn Tool>> {
        let ctx = &self.ctx;
        vec![
            Arc::new(ClickTool::new(ctx.clone())),
            Arc::new(ClickByTextTool::new(ctx.clone())),
            Arc::new(IframeClickTool::new(ctx.clone())),
            Arc::new(IframeClickByTextTool::new(ctx.clone())),
            Arc::new(IframeExpectHiddenTool::new(ctx.clone())),
            Arc::new(IframeUploadTool::new(ctx.clone())),
            Arc::new(NavigateTool::new(ctx.clone())),
            Arc::new(NavigateBackTool::new(ctx.clone())),
            Arc::new(ExpectTestIdTool::new(ctx.clone())),
            Arc::new(ExpectTextTool::new(ctx.clone())),
            Arc::new(ExpectTitleTool::new(ctx.clone())),
            Arc::new(ExtractTextTool::new(ctx.clone())),
            Arc::new(ExtractHyperlinksTool::new(ctx.clone())),
            Arc::new(FillTool::new(ctx.clone())),
            Arc::new(GetElementsTool::new(ctx.clone())),
            Arc::new(CurrentWebPageTool::new(ctx.clone())),
            Arc::new(TakeScreenshotTool::new(ctx.clone())),
        ]
    }

    pub fn register_all(&self, registry: &mut ToolRegistry) {
        for tool in self.get_tools() {
            registry.register_arc(tool);
        }
    }

    pub fn into_registry(self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        self.register_all(&mut registry);
        registry
    }
}
