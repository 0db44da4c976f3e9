//! Chromium implementation of the portal capability traits.
//!
//! Drives a local Chromium over the DevTools protocol via `chromiumoxide`.
//! Element lookup runs as JavaScript in the page: CSS selectors map to
//! `querySelector`, text locators resolve to the deepest element containing
//! the text, and row-cell locators walk the first matching `<tr>`. Waits are
//! bounded polls -- the protocol has no waitForSelector primitive.

use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::{GrantPermissionsParams, PermissionType};
use chromiumoxide::cdp::browser_protocol::emulation::SetGeolocationOverrideParams;
use chromiumoxide::Page;
use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use presensi_core::portal::{Locator, PortalBrowser, PortalError, PortalPage, SessionOptions};

/// Poll cadence for bounded waits.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

// ---------------------------------------------------------------------------
// ChromiumPortal
// ---------------------------------------------------------------------------

/// Launches one Chromium instance per session.
#[derive(Debug, Clone, Default)]
pub struct ChromiumPortal {
    /// Explicit Chrome/Chromium executable; `None` lets chromiumoxide detect.
    pub executable: Option<String>,
}

impl ChromiumPortal {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PortalBrowser for ChromiumPortal {
    type Page = ChromiumPage;

    async fn open(&self, options: &SessionOptions) -> Result<ChromiumPage, PortalError> {
        let (width, height) = options.viewport;

        let mut builder = BrowserConfig::builder()
            .window_size(width, height)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-first-run")
            .arg("--no-default-browser-check");
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        if !options.headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(PortalError::Browser)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| PortalError::Browser(format!("failed to launch browser: {e}")))?;
        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| PortalError::Browser(format!("failed to open page: {e}")))?;

        // The portal checks clock-in location, so the context must both hold
        // the geolocation permission and report the configured coordinates.
        let grant = GrantPermissionsParams::builder()
            .permission(PermissionType::Geolocation)
            .build()
            .map_err(PortalError::Browser)?;
        page.execute(grant)
            .await
            .map_err(|e| PortalError::Browser(format!("failed to grant geolocation: {e}")))?;

        let geolocation = SetGeolocationOverrideParams::builder()
            .latitude(options.geolocation.latitude)
            .longitude(options.geolocation.longitude)
            .accuracy(100.0)
            .build();
        page.execute(geolocation)
            .await
            .map_err(|e| PortalError::Browser(format!("failed to set geolocation: {e}")))?;

        tracing::debug!(
            headless = options.headless,
            width,
            height,
            "browser session opened"
        );

        Ok(ChromiumPage {
            browser,
            page,
            handler_task,
        })
    }
}

// ---------------------------------------------------------------------------
// ChromiumPage
// ---------------------------------------------------------------------------

/// One isolated browsing session: the browser process, its event handler
/// task, and a single page.
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumPage {
    async fn eval<T: serde::de::DeserializeOwned>(&self, js: String) -> Result<T, PortalError> {
        self.page
            .evaluate(js)
            .await
            .map_err(|e| PortalError::Browser(e.to_string()))?
            .into_value()
            .map_err(|e| PortalError::Browser(format!("unexpected evaluation result: {e}")))
    }

    async fn exists(&self, locator: &Locator) -> Result<bool, PortalError> {
        self.eval(format!("!!({})", locator_js(locator))).await
    }
}

impl PortalPage for ChromiumPage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), PortalError> {
        // Issue the navigation and await its completion signal together,
        // both under the same bound.
        let load = futures_util::future::try_join(
            self.page.goto(url),
            self.page.wait_for_navigation(),
        );
        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(PortalError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Err(PortalError::Navigation {
                url: url.to_string(),
                reason: format!("did not finish loading within {timeout:?}"),
            }),
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> Result<(), PortalError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.exists(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PortalError::timeout(locator, timeout));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn read_text(&self, locator: &Locator) -> Result<String, PortalError> {
        let js = format!(
            "(el => el ? (el.innerText !== undefined ? el.innerText : el.textContent) : null)({})",
            locator_js(locator)
        );
        let text: Option<String> = self.eval(js).await?;
        text.map(|t| t.trim().to_string())
            .ok_or_else(|| PortalError::not_found(locator))
    }

    async fn read_all_text(&self, locator: &Locator) -> Result<Vec<String>, PortalError> {
        let js = format!(
            "{}.map(el => (el.innerText !== undefined ? el.innerText : el.textContent || '').trim())",
            locator_all_js(locator)
        );
        self.eval(js).await
    }

    async fn fill(&self, locator: &Locator, value: &str) -> Result<(), PortalError> {
        let js = format!(
            r#"(el => {{
  if (!el) return false;
  el.focus();
  el.value = {value};
  el.dispatchEvent(new Event('input', {{ bubbles: true }}));
  el.dispatchEvent(new Event('change', {{ bubbles: true }}));
  return true;
}})({expr})"#,
            value = js_string(value),
            expr = locator_js(locator),
        );
        let filled: bool = self.eval(js).await?;
        if filled {
            Ok(())
        } else {
            Err(PortalError::not_found(locator))
        }
    }

    async fn click(&self, locator: &Locator) -> Result<(), PortalError> {
        let js = format!(
            "(el => el ? (el.click(), true) : false)({})",
            locator_js(locator)
        );
        let clicked: bool = self.eval(js).await?;
        if clicked {
            Ok(())
        } else {
            Err(PortalError::not_found(locator))
        }
    }

    async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            tracing::warn!(error = %err, "browser did not close cleanly");
        }
        if let Err(err) = self.browser.wait().await {
            tracing::debug!(error = %err, "browser process wait failed");
        }
        self.handler_task.abort();
        tracing::debug!("browser session closed");
    }
}

// ---------------------------------------------------------------------------
// Locator -> JavaScript
// ---------------------------------------------------------------------------

/// Quote a Rust string as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// Expression resolving the locator to a single element or `null`.
fn locator_js(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => {
            format!("document.querySelector({})", js_string(selector))
        }
        // The deepest element containing the text, mirroring how text
        // selectors behave in browser-automation tooling: clicking the
        // wrapping <div> of a link would miss the link itself.
        Locator::Text(text) => format!(
            r#"(() => {{
  const needle = {needle};
  const all = Array.from(document.querySelectorAll('*'))
    .filter(el => el.textContent && el.textContent.includes(needle));
  return all.find(el => !all.some(other => other !== el && el.contains(other))) || null;
}})()"#,
            needle = js_string(text),
        ),
        Locator::RowCell { row_text, column } => format!(
            r#"(() => {{
  const row = Array.from(document.querySelectorAll('tr'))
    .find(tr => tr.textContent && tr.textContent.includes({needle}));
  return row ? row.querySelector('td:nth-child({column})') : null;
}})()"#,
            needle = js_string(row_text),
        ),
    }
}

/// Expression resolving the locator to an array of elements.
fn locator_all_js(locator: &Locator) -> String {
    match locator {
        Locator::Css(selector) => format!(
            "Array.from(document.querySelectorAll({}))",
            js_string(selector)
        ),
        other => format!("[{}].filter(el => el !== null)", locator_js(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_string_escapes() {
        assert_eq!(js_string("plain"), r#""plain""#);
        assert_eq!(js_string(r#"a"b"#), r#""a\"b""#);
        assert_eq!(js_string("line\nbreak"), r#""line\nbreak""#);
    }

    #[test]
    fn test_css_locator_js() {
        let js = locator_js(&Locator::css("#user_email"));
        assert_eq!(js, r##"document.querySelector("#user_email")"##);
    }

    #[test]
    fn test_text_locator_picks_deepest() {
        let js = locator_js(&Locator::text("My Attendance Logs"));
        assert!(js.contains(r#""My Attendance Logs""#));
        assert!(js.contains("contains(other)"));
    }

    #[test]
    fn test_row_cell_locator_js() {
        let js = locator_js(&Locator::row_cell("15 Jun 2023", 7));
        assert!(js.contains(r#""15 Jun 2023""#));
        assert!(js.contains("td:nth-child(7)"));
    }

    #[test]
    fn test_read_all_on_non_css_degrades_to_single() {
        let js = locator_all_js(&Locator::text("Sign in"));
        assert!(js.starts_with('['));
        assert!(js.contains("filter(el => el !== null)"));
    }
}
