//! ChromeDriver：基于 Headless Chrome（CDP）的 PageDriver 实现
//!
//! 需启用 feature "browser" 且系统已安装 Chrome/Chromium。
//! headless_chrome 的调用都是阻塞的，统一放到 `spawn_blocking` 中执行；
//! 定位器序列化为 JSON 注入页面，由同一段解析脚本（RESOLVER_JS）在页面内求值。

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::protocol::cdp::Page::{
    CaptureScreenshotFormatOption, GetNavigationHistory, NavigateToHistoryEntry,
};
use headless_chrome::protocol::cdp::DOM;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::browser::{BrowserError, ElementState, HistoryEntry, Locator, PageDriver};
use crate::config::BrowserSection;

/// 页面内的定位器解析脚本：定义 `__beeResolve(query)`，返回匹配的元素数组
const RESOLVER_JS: &str = r#"
const __norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
const __visible = (el) => {
  const style = el.ownerDocument.defaultView.getComputedStyle(el);
  if (style.visibility === 'hidden' || style.display === 'none') return false;
  const rect = el.getBoundingClientRect();
  return rect.width > 0 && rect.height > 0;
};
const __implicitRoles = {
  button: 'button,input[type=button],input[type=submit],input[type=reset],input[type=image],summary',
  link: 'a[href],area[href]',
  textbox: 'input:not([type]),input[type=text],input[type=email],input[type=tel],input[type=url],input[type=password],textarea',
  searchbox: 'input[type=search]',
  checkbox: 'input[type=checkbox]',
  radio: 'input[type=radio]',
  combobox: 'select',
  option: 'option',
  heading: 'h1,h2,h3,h4,h5,h6',
  img: 'img[alt]',
  list: 'ul,ol',
  listitem: 'li',
  table: 'table',
  row: 'tr',
  cell: 'td',
  navigation: 'nav',
  main: 'main',
  dialog: 'dialog',
  form: 'form',
  article: 'article',
};
const __skipText = new Set(['SCRIPT', 'STYLE', 'NOSCRIPT', 'TEMPLATE', 'HEAD', 'TITLE']);
function __beeFind(doc, scope, step) {
  const all = (sel) => Array.from(scope.querySelectorAll(sel));
  switch (step.kind) {
    case 'css':
      return all(step.value);
    case 'xpath': {
      const res = doc.evaluate(step.value, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
      const out = [];
      for (let i = 0; i < res.snapshotLength; i++) {
        const node = res.snapshotItem(i);
        if (node.nodeType === 1) out.push(node);
      }
      return out;
    }
    case 'role': {
      const sel = ['[role="' + CSS.escape(step.role) + '"]'];
      if (__implicitRoles[step.role]) sel.push(__implicitRoles[step.role]);
      return all(sel.join(',')).filter((el) => !el.hasAttribute('role') || el.getAttribute('role') === step.role);
    }
    case 'test_id':
      return all('[data-testid]').filter((el) => el.getAttribute('data-testid') === step.id);
    case 'has_text': {
      const want = __norm(step.text).toLowerCase();
      return all(step.css).filter((el) => __norm(el.textContent).toLowerCase().includes(want));
    }
    case 'text': {
      const want = step.exact ? __norm(step.text) : __norm(step.text).toLowerCase();
      const hit = (el) => {
        const text = __norm(el.innerText || el.textContent);
        return step.exact ? text === want : text.toLowerCase().includes(want);
      };
      const candidates = scope === doc ? all('*') : [scope].concat(all('*'));
      return candidates.filter((el) => !__skipText.has(el.tagName) && hit(el) && !Array.from(el.children).some(hit));
    }
    default:
      throw new Error('unknown selector kind: ' + step.kind);
  }
}
function __beeResolve(query) {
  let doc = document;
  if (query.frame) {
    const frame = document.querySelector(query.frame);
    if (!frame || !frame.contentDocument) return [];
    doc = frame.contentDocument;
  }
  let scopes = [doc];
  for (const step of query.steps) {
    const next = [];
    for (const scope of scopes) {
      for (const el of __beeFind(doc, scope, step)) {
        if (!next.includes(el)) next.push(el);
      }
    }
    scopes = next;
  }
  return scopes.filter((node) => node !== doc);
}
"#;

const PROBE_BODY: &str = r#"
return JSON.stringify(els.map((el) => ({
  tag: el.tagName.toLowerCase(),
  visible: __visible(el),
  enabled: !el.disabled,
  text: __norm(el.innerText || el.textContent),
  attributes: Object.fromEntries(Array.from(el.attributes).map((a) => [a.name, a.value])),
})));
"#;

const NAVIGATION_STATUS_JS: &str = r#"(() => {
  const entry = performance.getEntriesByType('navigation')[0];
  return JSON.stringify(entry && entry.responseStatus ? entry.responseStatus : null);
})()"#;

/// 拼出「解析定位器 + 执行 body」的完整脚本
fn locator_script(locator: &Locator, body: &str) -> Result<String, BrowserError> {
    let query = serde_json::to_string(locator)
        .map_err(|e| BrowserError::JsEvalFailed(format!("serialize locator: {e}")))?;
    Ok(format!(
        "(() => {{\n{RESOLVER_JS}\nconst els = __beeResolve({query});\n{body}\n}})()"
    ))
}

fn eval_json<T: DeserializeOwned>(tab: &Tab, js: &str) -> Result<T, BrowserError> {
    let result = tab
        .evaluate(js, false)
        .map_err(|e| BrowserError::JsEvalFailed(e.to_string()))?;
    let raw = match result.value {
        Some(Value::String(s)) => s,
        other => {
            return Err(BrowserError::JsEvalFailed(format!(
                "expected JSON string, got {other:?}"
            )))
        }
    };
    serde_json::from_str(&raw).map_err(|e| BrowserError::JsEvalFailed(format!("decode: {e}")))
}

fn navigation_status(tab: &Tab) -> Option<u16> {
    eval_json::<Option<u16>>(tab, NAVIGATION_STATUS_JS)
        .ok()
        .flatten()
}

/// 元素动作脚本的返回约定：`"ok"` 或 `"detached"`
fn expect_ok(outcome: String, locator: &Locator, index: usize) -> Result<(), BrowserError> {
    if outcome == "ok" {
        Ok(())
    } else {
        Err(BrowserError::ElementDetached {
            locator: locator.to_string(),
            index,
        })
    }
}

/// 后退目标在历史列表中的下标；已在第一条（或下标越界）时为 None
fn previous_history_index(current_index: usize, len: usize) -> Option<usize> {
    if current_index == 0 || current_index >= len {
        None
    } else {
        Some(current_index - 1)
    }
}

/// Chrome 会话：持有 Browser（drop 时关闭进程）与唯一的工作 Tab
pub struct ChromeDriver {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// 启动 Chrome 并打开一个 Tab
    pub async fn launch(section: BrowserSection) -> Result<Self, BrowserError> {
        tokio::task::spawn_blocking(move || Self::launch_blocking(&section))
            .await
            .map_err(|e| BrowserError::LaunchFailed(format!("task join: {e}")))?
    }

    fn launch_blocking(section: &BrowserSection) -> Result<Self, BrowserError> {
        let options = LaunchOptions::default_builder()
            .headless(section.headless)
            .sandbox(section.sandbox)
            .window_size(Some((section.window_width, section.window_height)))
            .path(section.chrome_path.clone())
            .idle_browser_timeout(Duration::from_secs(section.idle_timeout_secs))
            .build()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;
        let browser = Browser::new(options).map_err(|e| {
            BrowserError::LaunchFailed(format!("{e}. Install Chrome/Chromium."))
        })?;
        let tab = browser
            .new_tab()
            .map_err(|e| BrowserError::LaunchFailed(format!("browser tab failed: {e}")))?;
        let navigation_timeout = Duration::from_secs(section.navigation_timeout_secs);
        tab.set_default_timeout(navigation_timeout);
        tracing::info!(headless = section.headless, "chrome launched");
        Ok(Self {
            _browser: browser,
            tab,
        })
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, BrowserError>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T, BrowserError> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| BrowserError::JsEvalFailed(format!("task join: {e}")))?
    }

    async fn run_on_nth(
        &self,
        locator: &Locator,
        index: usize,
        body: String,
    ) -> Result<(), BrowserError> {
        let js = locator_script(locator, &body)?;
        let outcome: String = self.blocking(move |tab| eval_json(tab, &js)).await?;
        expect_ok(outcome, locator, index)
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn goto(&self, url: &str) -> Result<Option<u16>, BrowserError> {
        let url = url.to_string();
        self.blocking(move |tab| {
            tab.navigate_to(&url)
                .and_then(|t| t.wait_until_navigated())
                .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
            Ok(navigation_status(tab))
        })
        .await
    }

    async fn go_back(&self) -> Result<Option<HistoryEntry>, BrowserError> {
        self.blocking(|tab| {
            let history = tab
                .call_method(GetNavigationHistory(None))
                .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
            let Some(target) =
                previous_history_index(history.current_index as usize, history.entries.len())
            else {
                return Ok(None);
            };
            let entry = &history.entries[target];
            tab.call_method(NavigateToHistoryEntry { entry_id: entry.id })
                .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
            tab.wait_until_navigated()
                .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
            Ok(Some(HistoryEntry {
                url: tab.get_url(),
                status: navigation_status(tab),
            }))
        })
        .await
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.tab.get_url())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        self.blocking(|tab| {
            tab.get_title()
                .map_err(|e| BrowserError::JsEvalFailed(format!("get title: {e}")))
        })
        .await
    }

    async fn content(&self) -> Result<String, BrowserError> {
        self.blocking(|tab| {
            tab.get_content()
                .map_err(|e| BrowserError::JsEvalFailed(format!("get content: {e}")))
        })
        .await
    }

    async fn query_elements(&self, locator: &Locator) -> Result<Vec<ElementState>, BrowserError> {
        let js = locator_script(locator, PROBE_BODY)?;
        self.blocking(move |tab| eval_json(tab, &js)).await
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), BrowserError> {
        let body = format!(
            "const el = els[{index}];\n\
             if (!el) return JSON.stringify('detached');\n\
             el.scrollIntoView({{ block: 'center', inline: 'center' }});\n\
             el.click();\n\
             return JSON.stringify('ok');"
        );
        self.run_on_nth(locator, index, body).await
    }

    async fn fill_nth(
        &self,
        locator: &Locator,
        index: usize,
        value: &str,
    ) -> Result<(), BrowserError> {
        let value = serde_json::to_string(value)
            .map_err(|e| BrowserError::JsEvalFailed(format!("serialize value: {e}")))?;
        let body = format!(
            "const el = els[{index}];\n\
             if (!el) return JSON.stringify('detached');\n\
             el.scrollIntoView({{ block: 'center' }});\n\
             el.focus();\n\
             const value = {value};\n\
             if (el.isContentEditable) {{\n\
               el.textContent = value;\n\
             }} else {{\n\
               const desc = Object.getOwnPropertyDescriptor(Object.getPrototypeOf(el), 'value');\n\
               if (desc && desc.set) desc.set.call(el, value); else el.value = value;\n\
             }}\n\
             el.dispatchEvent(new Event('input', {{ bubbles: true }}));\n\
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));\n\
             return JSON.stringify('ok');"
        );
        self.run_on_nth(locator, index, body).await
    }

    async fn set_input_files_nth(
        &self,
        locator: &Locator,
        index: usize,
        files: &[PathBuf],
    ) -> Result<(), BrowserError> {
        let js = locator_script(locator, &format!("return els[{index}] || null;"))?;
        let files: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        let locator = locator.clone();
        self.blocking(move |tab| {
            let element = tab
                .evaluate(&js, false)
                .map_err(|e| BrowserError::UploadFailed(e.to_string()))?;
            let object_id = element.object_id.ok_or_else(|| BrowserError::ElementDetached {
                locator: locator.to_string(),
                index,
            })?;
            tab.call_method(DOM::SetFileInputFiles {
                files,
                node_id: None,
                backend_node_id: None,
                object_id: Some(object_id),
            })
            .map_err(|e| BrowserError::UploadFailed(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError> {
        self.blocking(|tab| {
            tab.capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
                .map_err(|e| BrowserError::ScreenshotFailed(e.to_string()))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_script_embeds_locator_json() {
        let loc = Locator::role("button").get_by_text("O'K").in_frame("#pay");
        let js = locator_script(&loc, PROBE_BODY).unwrap();
        assert!(js.contains(r##""frame":"#pay""##));
        assert!(js.contains(r#""kind":"role""#));
        assert!(js.contains("O'K"));
        assert!(js.starts_with("(() => {"));
        assert!(js.trim_end().ends_with("})()"));
    }

    #[test]
    fn test_previous_history_index() {
        // a -> b -> back：停在第一条，前进记录仍在列表中
        assert_eq!(previous_history_index(0, 2), None);
        assert_eq!(previous_history_index(1, 2), Some(0));
        assert_eq!(previous_history_index(0, 1), None);
        assert_eq!(previous_history_index(3, 2), None);
    }

    #[test]
    fn test_expect_ok() {
        let loc = Locator::css("#a");
        assert!(expect_ok("ok".into(), &loc, 0).is_ok());
        assert!(matches!(
            expect_ok("detached".into(), &loc, 2),
            Err(BrowserError::ElementDetached { index: 2, .. })
        ));
    }
}
