//! Portal capability traits: the seam between the workflow and the browser.
//!
//! The target portal has no API; everything happens through a rendered UI
//! with no stability contract. The engine therefore consumes the browser
//! through a narrow interface -- navigate, locate, read, fill, click, wait --
//! and `presensi-infra` substitutes the concrete automation library behind
//! it. Traits use RPITIT async methods, consistent with the project's Rust
//! 2024 edition approach.

use std::fmt;
use std::time::Duration;

use presensi_types::config::GeoPoint;

// ---------------------------------------------------------------------------
// Locator
// ---------------------------------------------------------------------------

/// How to find an element on the current page.
///
/// Three addressing modes cover the portal's markup: identity (CSS
/// selector), free text content, and position (a numbered cell inside the
/// first table row whose text contains a needle).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// CSS selector.
    Css(String),
    /// First element whose trimmed text content contains this string.
    Text(String),
    /// 1-based cell of the first `<tr>` whose text contains `row_text`.
    RowCell { row_text: String, column: u32 },
}

impl Locator {
    pub fn css(selector: impl Into<String>) -> Self {
        Locator::Css(selector.into())
    }

    pub fn text(content: impl Into<String>) -> Self {
        Locator::Text(content.into())
    }

    pub fn row_cell(row_text: impl Into<String>, column: u32) -> Self {
        Locator::RowCell {
            row_text: row_text.into(),
            column,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(sel) => write!(f, "css({sel})"),
            Locator::Text(text) => write!(f, "text({text})"),
            Locator::RowCell { row_text, column } => {
                write!(f, "row({row_text}).cell({column})")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SessionOptions
// ---------------------------------------------------------------------------

/// Options for opening one isolated browsing session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Launch without a visible window.
    pub headless: bool,
    /// Coordinates the context reports, with the geolocation permission
    /// pre-granted.
    pub geolocation: GeoPoint,
    /// Viewport width and height in pixels.
    pub viewport: (u32, u32),
}

// ---------------------------------------------------------------------------
// PortalError
// ---------------------------------------------------------------------------

/// Errors surfaced by the browser capability.
///
/// All of these are fatal to the current attempt and retryable by the
/// supervisor.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// A bounded wait elapsed without the condition holding.
    #[error("timed out after {timeout:?} waiting for {what}")]
    Timeout { what: String, timeout: Duration },

    /// A navigation did not complete.
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    /// The locator matched nothing on the current page.
    #[error("element not found: {0}")]
    NotFound(String),

    /// Launch, context, or protocol failure in the underlying browser.
    #[error("browser error: {0}")]
    Browser(String),
}

impl PortalError {
    /// Timeout for a locator wait.
    pub fn timeout(locator: &Locator, timeout: Duration) -> Self {
        PortalError::Timeout {
            what: locator.to_string(),
            timeout,
        }
    }

    /// Not-found for a locator.
    pub fn not_found(locator: &Locator) -> Self {
        PortalError::NotFound(locator.to_string())
    }
}

// ---------------------------------------------------------------------------
// PortalPage / PortalBrowser
// ---------------------------------------------------------------------------

/// One authenticated browsing session scoped to a single workflow run.
///
/// The engine owns the page exclusively and calls `close` exactly once on
/// every terminal path. `close` is infallible by contract: adapters log and
/// swallow shutdown errors so teardown can never mask the run's outcome.
pub trait PortalPage: Send + Sized {
    /// Navigate and await load completion, bounded by `timeout`.
    fn navigate(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), PortalError>> + Send;

    /// Wait until the locator matches something, bounded by `timeout`.
    fn wait_for(
        &self,
        locator: &Locator,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), PortalError>> + Send;

    /// Read the trimmed text content of the first match.
    fn read_text(
        &self,
        locator: &Locator,
    ) -> impl Future<Output = Result<String, PortalError>> + Send;

    /// Read the trimmed text content of every match, in document order.
    fn read_all_text(
        &self,
        locator: &Locator,
    ) -> impl Future<Output = Result<Vec<String>, PortalError>> + Send;

    /// Type a value into the first matching input.
    fn fill(
        &self,
        locator: &Locator,
        value: &str,
    ) -> impl Future<Output = Result<(), PortalError>> + Send;

    /// Click the first match.
    fn click(&self, locator: &Locator) -> impl Future<Output = Result<(), PortalError>> + Send;

    /// Release the session and its browser resources.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Launcher for portal sessions.
pub trait PortalBrowser: Send + Sync {
    type Page: PortalPage;

    /// Launch a browser and open one isolated session.
    fn open(
        &self,
        options: &SessionOptions,
    ) -> impl Future<Output = Result<Self::Page, PortalError>> + Send;
}
