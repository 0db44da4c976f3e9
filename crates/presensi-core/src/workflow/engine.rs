//! The attendance workflow engine.
//!
//! One `run` executes the fixed pipeline once: holiday check, session open,
//! authenticate, verify identity, off-today check, attendance-log lookup,
//! live attendance action, confirmation, teardown. Skip conditions are
//! successful early terminations; only genuine failures become errors and
//! reach the retry supervisor.
//!
//! The engine is generic over [`PortalBrowser`], so tests drive it with a
//! scripted in-memory page and production wires in the Chromium adapter.
//!
//! # Session ownership
//!
//! A run owns its session exclusively. `run` opens at most one page and
//! closes it exactly once on every terminal path: the pipeline body borrows
//! the page, and the close happens unconditionally on the way out before the
//! body's result is surfaced.

use presensi_types::attendance::{ActionResult, AttendanceDecision};
use presensi_types::calendar::{self, HolidayCalendar};
use presensi_types::config::{AppConfig, CheckType, Credentials, GeoPoint};
use secrecy::ExposeSecret;
use uuid::Uuid;

use crate::portal::{Locator, PortalBrowser, PortalError, PortalPage, SessionOptions};
use crate::talenta;

use super::decision;

// ---------------------------------------------------------------------------
// RunContext
// ---------------------------------------------------------------------------

/// Everything one workflow run needs, fixed at run start.
///
/// Built once from the immutable [`AppConfig`] plus the wall clock; the same
/// context is reused across retry attempts so all attempts agree on what
/// "today" is.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Time-sortable run identifier, shared by all attempts of the run.
    pub run_id: Uuid,
    /// Today's portal day string in Jakarta local time.
    pub today: String,
    pub credentials: Credentials,
    pub geolocation: GeoPoint,
    pub check_type: Option<CheckType>,
    pub headless: bool,
    pub skip_action: bool,
}

impl RunContext {
    /// Build a context for a run starting now.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::from_config_at(config, chrono::Utc::now())
    }

    /// Build a context for a run starting at an explicit instant.
    pub fn from_config_at(config: &AppConfig, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            today: calendar::portal_day(now),
            credentials: config.credentials.clone(),
            geolocation: config.geolocation,
            check_type: config.check_type,
            headless: config.headless,
            skip_action: config.skip_action,
        }
    }

    fn session_options(&self) -> SessionOptions {
        SessionOptions {
            headless: self.headless,
            geolocation: self.geolocation,
            viewport: talenta::VIEWPORT,
        }
    }
}

// ---------------------------------------------------------------------------
// RunOutcome
// ---------------------------------------------------------------------------

/// Result of one successful run (including skip terminations).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub decision: AttendanceDecision,
    pub action: ActionResult,
}

impl RunOutcome {
    fn skipped(decision: AttendanceDecision) -> Self {
        Self {
            decision,
            action: ActionResult::Skipped,
        }
    }

    /// Human-readable outcome line for reports and CLI output.
    pub fn message(&self) -> String {
        match (self.decision, self.action) {
            (AttendanceDecision::SkipHoliday, _) => {
                "today is a holiday, skipping clock in/out".to_string()
            }
            (AttendanceDecision::SkipLeave, _) => {
                "you are on leave (cuti) today, skipping clock in/out".to_string()
            }
            (AttendanceDecision::SkipOffToday, _) => {
                "you are off today, skipping clock in/out".to_string()
            }
            (AttendanceDecision::Proceed, ActionResult::Confirmed) => {
                "attendance action confirmed".to_string()
            }
            (AttendanceDecision::Proceed, _) => "attendance action skipped".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Failures of a single attempt. All variants are retryable; the supervisor
/// decides how many attempts to spend.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Portal(#[from] PortalError),

    /// The login URL loaded something other than the sign-in page.
    #[error("login page did not load as expected: got heading '{0}'")]
    LoginPageMismatch(String),

    /// The post-login dashboard marker never appeared.
    #[error("dashboard never appeared; authentication failed")]
    AuthenticationFailed,

    /// The profile element rendered empty, so roster matching is impossible.
    #[error("could not read the logged-in user's name")]
    MissingIdentity,

    /// No attendance-log row matched today's date string.
    #[error("no attendance-log row for {0}")]
    LogRowMissing(String),

    /// The click was issued but the confirmation toast never appeared.
    #[error("no confirmation: expected '{expected}' toast")]
    Unconfirmed { expected: String },
}

// ---------------------------------------------------------------------------
// AttendanceEngine
// ---------------------------------------------------------------------------

/// Executes the attendance pipeline against a portal browser.
pub struct AttendanceEngine<B: PortalBrowser> {
    browser: B,
    calendar: HolidayCalendar,
}

impl<B: PortalBrowser> AttendanceEngine<B> {
    pub fn new(browser: B, calendar: HolidayCalendar) -> Self {
        Self { browser, calendar }
    }

    /// Execute the pipeline once.
    ///
    /// The static holiday check runs before any session opens; on a calendar
    /// hit the run terminates with zero portal calls.
    pub async fn run(&self, ctx: &RunContext) -> Result<RunOutcome, EngineError> {
        tracing::info!(run_id = %ctx.run_id, today = %ctx.today, "starting attendance run");

        if self.calendar.contains(&ctx.today) {
            tracing::info!(today = %ctx.today, "today is a public holiday, skipping clock in/out");
            return Ok(RunOutcome::skipped(AttendanceDecision::SkipHoliday));
        }

        let page = self.browser.open(&ctx.session_options()).await?;
        let result = self.run_in_session(&page, ctx).await;
        // Teardown converges here for success, skip, and failure alike.
        page.close().await;

        match &result {
            Ok(outcome) => tracing::info!(
                run_id = %ctx.run_id,
                decision = %outcome.decision,
                action = %outcome.action,
                "attendance run finished"
            ),
            Err(err) => tracing::warn!(run_id = %ctx.run_id, error = %err, "attendance run failed"),
        }
        result
    }

    async fn run_in_session(
        &self,
        page: &B::Page,
        ctx: &RunContext,
    ) -> Result<RunOutcome, EngineError> {
        self.authenticate(page, &ctx.credentials).await?;

        let user = self.identify_user(page).await?;

        if self.is_off_today(page, &user).await? {
            tracing::info!(user = %user, "user is off today, skipping clock in/out");
            return Ok(RunOutcome::skipped(AttendanceDecision::SkipOffToday));
        }

        match self.attendance_log_decision(page, ctx).await? {
            AttendanceDecision::Proceed => {}
            skip => {
                tracing::info!(decision = %skip, "attendance log says today is off, skipping");
                return Ok(RunOutcome::skipped(skip));
            }
        }

        self.perform_action(page, ctx).await
    }

    /// Load the login page, fill credentials, sign in, and wait
    /// for the dashboard marker.
    async fn authenticate(
        &self,
        page: &B::Page,
        credentials: &Credentials,
    ) -> Result<(), EngineError> {
        page.navigate(talenta::LOGIN_URL, talenta::PAGE_TIMEOUT)
            .await?;

        let heading = Locator::css(talenta::SIGN_IN_HEADING);
        page.wait_for(&heading, talenta::PAGE_TIMEOUT).await?;
        let heading_text = page.read_text(&heading).await?;
        if !heading_text.contains(talenta::SIGN_IN_HEADING_TEXT) {
            return Err(EngineError::LoginPageMismatch(heading_text));
        }

        tracing::info!("filling in account email and password");
        fill_with_fallback(
            page,
            talenta::EMAIL_FIELD,
            talenta::EMAIL_FIELD_FALLBACK,
            &credentials.email,
        )
        .await?;
        fill_with_fallback(
            page,
            talenta::PASSWORD_FIELD,
            talenta::PASSWORD_FIELD_FALLBACK,
            credentials.password.expose_secret(),
        )
        .await?;

        tracing::info!("signing in");
        page.click(&Locator::css(talenta::SIGN_IN_BUTTON)).await?;

        let dashboard = Locator::css(talenta::DASHBOARD_LINK);
        match page.wait_for(&dashboard, talenta::PAGE_TIMEOUT).await {
            Ok(()) => {
                tracing::info!("signed in, dashboard is up");
                Ok(())
            }
            Err(PortalError::Timeout { .. }) => Err(EngineError::AuthenticationFailed),
            Err(err) => Err(err.into()),
        }
    }

    /// Read the displayed user name; it anchors roster matching.
    async fn identify_user(&self, page: &B::Page) -> Result<String, EngineError> {
        let name = page
            .read_text(&Locator::css(talenta::PROFILE_NAME))
            .await?;
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(EngineError::MissingIdentity);
        }
        tracing::info!(user = %name, "logged in as");
        Ok(name)
    }

    /// Scrape the "Who's Off" roster and test membership.
    async fn is_off_today(&self, page: &B::Page, user: &str) -> Result<bool, EngineError> {
        page.wait_for(&Locator::css(talenta::OFF_TODAY_PANEL), talenta::PAGE_TIMEOUT)
            .await?;
        let roster = page
            .read_all_text(&Locator::css(talenta::OFF_TODAY_NAMES))
            .await?;
        tracing::debug!(?roster, "people off today");
        Ok(decision::roster_contains(&roster, user))
    }

    /// Open the attendance log and read today's row.
    async fn attendance_log_decision(
        &self,
        page: &B::Page,
        ctx: &RunContext,
    ) -> Result<AttendanceDecision, EngineError> {
        page.click(&Locator::text(talenta::ATTENDANCE_LOGS_LINK))
            .await?;
        page.wait_for(
            &Locator::text(talenta::ATTENDANCE_LOG_HEADING),
            talenta::PAGE_TIMEOUT,
        )
        .await?;

        let day_type = self
            .read_log_cell(page, ctx, talenta::DAY_TYPE_COLUMN)
            .await?;
        let leave_status = self
            .read_log_cell(page, ctx, talenta::LEAVE_STATUS_COLUMN)
            .await?;

        let decided = decision::decide_from_log(&day_type, &leave_status);
        tracing::info!(
            today = %ctx.today,
            day_type = %day_type.trim(),
            leave_status = %leave_status.trim(),
            decision = %decided,
            "attendance log row"
        );
        Ok(decided)
    }

    async fn read_log_cell(
        &self,
        page: &B::Page,
        ctx: &RunContext,
        column: u32,
    ) -> Result<String, EngineError> {
        match page
            .read_text(&Locator::row_cell(&ctx.today, column))
            .await
        {
            Ok(text) => Ok(text),
            Err(PortalError::NotFound(_)) => Err(EngineError::LogRowMissing(ctx.today.clone())),
            Err(err) => Err(err.into()),
        }
    }

    /// The live attendance page and the click itself.
    async fn perform_action(
        &self,
        page: &B::Page,
        ctx: &RunContext,
    ) -> Result<RunOutcome, EngineError> {
        page.navigate(talenta::LIVE_ATTENDANCE_URL, talenta::PAGE_TIMEOUT)
            .await?;

        let current_time = Locator::css(talenta::CURRENT_TIME);
        let check_in = Locator::css(talenta::CHECK_IN_BUTTON);
        let check_out = Locator::css(talenta::CHECK_OUT_BUTTON);
        page.wait_for(&current_time, talenta::PAGE_TIMEOUT).await?;
        page.wait_for(&check_in, talenta::PAGE_TIMEOUT).await?;
        page.wait_for(&check_out, talenta::PAGE_TIMEOUT).await?;

        // Diagnostic only; nothing below branches on these.
        let current_time_text = page.read_text(&current_time).await?;
        let check_in_text = page.read_text(&check_in).await?;
        let check_out_text = page.read_text(&check_out).await?;
        tracing::info!(
            current_time = %current_time_text,
            check_in = %check_in_text,
            check_out = %check_out_text,
            "live attendance controls"
        );

        if ctx.skip_action {
            tracing::info!("skip override set, not clicking");
            return Ok(RunOutcome {
                decision: AttendanceDecision::Proceed,
                action: ActionResult::Skipped,
            });
        }

        let Some(check_type) = ctx.check_type else {
            tracing::info!("no check type configured, not clicking");
            return Ok(RunOutcome {
                decision: AttendanceDecision::Proceed,
                action: ActionResult::Skipped,
            });
        };

        let (button, toast) = match check_type {
            CheckType::CheckIn => (check_in, talenta::TOAST_CLOCK_IN),
            CheckType::CheckOut => (check_out, talenta::TOAST_CLOCK_OUT),
        };

        tracing::info!(action = %check_type, "clicking attendance control");
        page.click(&button).await?;

        match page
            .wait_for(&Locator::text(toast), talenta::CONFIRM_TIMEOUT)
            .await
        {
            Ok(()) => {
                tracing::info!(toast = %toast, "action confirmed");
                Ok(RunOutcome {
                    decision: AttendanceDecision::Proceed,
                    action: ActionResult::Confirmed,
                })
            }
            Err(PortalError::Timeout { .. }) => Err(EngineError::Unconfirmed {
                expected: toast.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }
}

/// Try the identified selector first, then the generic fallback.
///
/// Absorbs minor markup drift in the login form without a rewrite.
async fn fill_with_fallback<P: PortalPage>(
    page: &P,
    primary: &str,
    fallback: &str,
    value: &str,
) -> Result<(), PortalError> {
    match page.fill(&Locator::css(primary), value).await {
        Err(PortalError::NotFound(_)) => {
            tracing::debug!(primary, fallback, "primary selector missing, using fallback");
            page.fill(&Locator::css(fallback), value).await
        }
        other => other,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use secrecy::SecretString;

    // -------------------------------------------------------------------
    // Scripted portal mock
    // -------------------------------------------------------------------

    /// What the fake page "renders": text per locator, the off-today
    /// roster, waits that time out, and locators that match nothing.
    #[derive(Clone, Default)]
    struct PageScript {
        texts: HashMap<String, String>,
        roster: Vec<String>,
        timeouts: HashSet<String>,
        missing: HashSet<String>,
    }

    impl PageScript {
        fn with_text(mut self, locator: &Locator, text: &str) -> Self {
            self.texts.insert(locator.to_string(), text.to_string());
            self
        }

        fn with_timeout(mut self, locator: &Locator) -> Self {
            self.timeouts.insert(locator.to_string());
            self
        }

        fn with_missing(mut self, locator: &Locator) -> Self {
            self.missing.insert(locator.to_string());
            self
        }

        fn with_roster(mut self, names: &[&str]) -> Self {
            self.roster = names.iter().map(|s| s.to_string()).collect();
            self
        }
    }

    struct FakePage {
        script: PageScript,
        calls: Arc<Mutex<Vec<String>>>,
        closes: Arc<AtomicU32>,
    }

    impl FakePage {
        fn log(&self, entry: String) {
            self.calls.lock().unwrap().push(entry);
        }
    }

    impl PortalPage for FakePage {
        async fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), PortalError> {
            self.log(format!("navigate:{url}"));
            Ok(())
        }

        async fn wait_for(
            &self,
            locator: &Locator,
            timeout: Duration,
        ) -> Result<(), PortalError> {
            self.log(format!("wait:{locator}"));
            if self.script.timeouts.contains(&locator.to_string()) {
                return Err(PortalError::timeout(locator, timeout));
            }
            Ok(())
        }

        async fn read_text(&self, locator: &Locator) -> Result<String, PortalError> {
            self.log(format!("read:{locator}"));
            self.script
                .texts
                .get(&locator.to_string())
                .cloned()
                .ok_or_else(|| PortalError::not_found(locator))
        }

        async fn read_all_text(&self, locator: &Locator) -> Result<Vec<String>, PortalError> {
            self.log(format!("read_all:{locator}"));
            Ok(self.script.roster.clone())
        }

        async fn fill(&self, locator: &Locator, _value: &str) -> Result<(), PortalError> {
            self.log(format!("fill:{locator}"));
            if self.script.missing.contains(&locator.to_string()) {
                return Err(PortalError::not_found(locator));
            }
            Ok(())
        }

        async fn click(&self, locator: &Locator) -> Result<(), PortalError> {
            self.log(format!("click:{locator}"));
            if self.script.missing.contains(&locator.to_string()) {
                return Err(PortalError::not_found(locator));
            }
            Ok(())
        }

        async fn close(self) {
            self.log("close".to_string());
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeBrowser {
        script: PageScript,
        calls: Arc<Mutex<Vec<String>>>,
        opens: Arc<AtomicU32>,
        closes: Arc<AtomicU32>,
        fail_open: bool,
    }

    impl FakeBrowser {
        fn new(script: PageScript) -> Self {
            Self {
                script,
                calls: Arc::new(Mutex::new(Vec::new())),
                opens: Arc::new(AtomicU32::new(0)),
                closes: Arc::new(AtomicU32::new(0)),
                fail_open: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn opened(&self) -> u32 {
            self.opens.load(Ordering::SeqCst)
        }

        fn closed(&self) -> u32 {
            self.closes.load(Ordering::SeqCst)
        }
    }

    impl PortalBrowser for FakeBrowser {
        type Page = FakePage;

        async fn open(&self, _options: &SessionOptions) -> Result<FakePage, PortalError> {
            if self.fail_open {
                return Err(PortalError::Browser("launch failed".to_string()));
            }
            self.opens.fetch_add(1, Ordering::SeqCst);
            Ok(FakePage {
                script: self.script.clone(),
                calls: Arc::clone(&self.calls),
                closes: Arc::clone(&self.closes),
            })
        }
    }

    // -------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------

    const TODAY: &str = "15 Jun 2023";
    const USER: &str = "Budi Santoso";

    /// A script where every step succeeds through a confirmed check-in.
    fn happy_script() -> PageScript {
        PageScript::default()
            .with_text(&Locator::css(talenta::SIGN_IN_HEADING), "Sign in")
            .with_text(&Locator::css(talenta::PROFILE_NAME), USER)
            .with_roster(&["Siti Rahma"])
            .with_text(&Locator::row_cell(TODAY, talenta::DAY_TYPE_COLUMN), "N")
            .with_text(&Locator::row_cell(TODAY, talenta::LEAVE_STATUS_COLUMN), "-")
            .with_text(&Locator::css(talenta::CURRENT_TIME), "08:01:22")
            .with_text(&Locator::css(talenta::CHECK_IN_BUTTON), "Clock In")
            .with_text(&Locator::css(talenta::CHECK_OUT_BUTTON), "Clock Out")
    }

    fn ctx(check_type: Option<CheckType>, skip_action: bool) -> RunContext {
        RunContext {
            run_id: Uuid::now_v7(),
            today: TODAY.to_string(),
            credentials: Credentials {
                email: "budi@example.com".to_string(),
                password: SecretString::from("rahasia"),
            },
            geolocation: GeoPoint {
                latitude: -6.2,
                longitude: 106.8,
            },
            check_type,
            headless: true,
            skip_action,
        }
    }

    fn engine(browser: FakeBrowser, holidays: &[&str]) -> AttendanceEngine<FakeBrowser> {
        AttendanceEngine::new(browser, HolidayCalendar::from_dates(holidays.iter().copied()))
    }

    fn click_entry(selector: &str) -> String {
        format!("click:{}", Locator::css(selector))
    }

    // -------------------------------------------------------------------
    // Holiday short-circuit
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_calendar_holiday_opens_no_session() {
        let eng = engine(FakeBrowser::new(happy_script()), &["25 Dec 2023"]);
        let mut context = ctx(Some(CheckType::CheckIn), false);
        context.today = "25 Dec 2023".to_string();

        let outcome = eng.run(&context).await.unwrap();
        assert_eq!(outcome.decision, AttendanceDecision::SkipHoliday);
        assert_eq!(outcome.action, ActionResult::Skipped);
        assert_eq!(eng.browser.opened(), 0);
        assert_eq!(eng.browser.closed(), 0);
        assert!(eng.browser.calls().is_empty());
    }

    // -------------------------------------------------------------------
    // Full happy path
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_check_in_happy_path_confirms() {
        let eng = engine(FakeBrowser::new(happy_script()), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap();

        assert_eq!(outcome.decision, AttendanceDecision::Proceed);
        assert_eq!(outcome.action, ActionResult::Confirmed);
        assert_eq!(eng.browser.opened(), 1);
        assert_eq!(eng.browser.closed(), 1);

        let calls = eng.browser.calls();
        assert!(calls.contains(&format!("navigate:{}", talenta::LOGIN_URL)));
        assert!(calls.contains(&format!("navigate:{}", talenta::LIVE_ATTENDANCE_URL)));
        assert!(calls.contains(&click_entry(talenta::CHECK_IN_BUTTON)));
        assert!(!calls.contains(&click_entry(talenta::CHECK_OUT_BUTTON)));
        assert!(calls.contains(&format!("wait:{}", Locator::text(talenta::TOAST_CLOCK_IN))));
        assert!(!calls.contains(&format!("wait:{}", Locator::text(talenta::TOAST_CLOCK_OUT))));
    }

    #[tokio::test]
    async fn test_check_out_clicks_second_control_only() {
        let eng = engine(FakeBrowser::new(happy_script()), &[]);
        let outcome = eng
            .run(&ctx(Some(CheckType::CheckOut), false))
            .await
            .unwrap();

        assert_eq!(outcome.action, ActionResult::Confirmed);
        let calls = eng.browser.calls();
        assert!(calls.contains(&click_entry(talenta::CHECK_OUT_BUTTON)));
        assert!(!calls.contains(&click_entry(talenta::CHECK_IN_BUTTON)));
        assert!(calls.contains(&format!("wait:{}", Locator::text(talenta::TOAST_CLOCK_OUT))));
    }

    // -------------------------------------------------------------------
    // Skip paths
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_off_today_skips_before_attendance_log() {
        let script = happy_script().with_roster(&["Siti Rahma", USER]);
        let eng = engine(FakeBrowser::new(script), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap();

        assert_eq!(outcome.decision, AttendanceDecision::SkipOffToday);
        assert_eq!(outcome.action, ActionResult::Skipped);
        assert_eq!(eng.browser.closed(), 1);

        // Never reached the attendance-log step.
        let calls = eng.browser.calls();
        assert!(!calls.contains(&format!(
            "click:{}",
            Locator::text(talenta::ATTENDANCE_LOGS_LINK)
        )));
    }

    #[tokio::test]
    async fn test_log_day_type_not_normal_skips_as_holiday() {
        let script = happy_script()
            .with_text(&Locator::row_cell(TODAY, talenta::DAY_TYPE_COLUMN), "H")
            .with_text(&Locator::row_cell(TODAY, talenta::LEAVE_STATUS_COLUMN), "CT");
        let eng = engine(FakeBrowser::new(script), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap();

        // Day-type wins even when the leave column also matches.
        assert_eq!(outcome.decision, AttendanceDecision::SkipHoliday);
        assert_eq!(eng.browser.closed(), 1);
        assert!(!eng.browser.calls().contains(&click_entry(talenta::CHECK_IN_BUTTON)));
    }

    #[tokio::test]
    async fn test_log_on_leave_skips() {
        let script = happy_script()
            .with_text(&Locator::row_cell(TODAY, talenta::LEAVE_STATUS_COLUMN), "CT");
        let eng = engine(FakeBrowser::new(script), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap();

        assert_eq!(outcome.decision, AttendanceDecision::SkipLeave);
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_skip_override_reaches_controls_but_never_clicks() {
        let eng = engine(FakeBrowser::new(happy_script()), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), true)).await.unwrap();

        assert_eq!(outcome.decision, AttendanceDecision::Proceed);
        assert_eq!(outcome.action, ActionResult::Skipped);
        let calls = eng.browser.calls();
        assert!(calls.contains(&format!("wait:{}", Locator::css(talenta::CHECK_IN_BUTTON))));
        assert!(!calls.contains(&click_entry(talenta::CHECK_IN_BUTTON)));
        assert!(!calls.contains(&click_entry(talenta::CHECK_OUT_BUTTON)));
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_unset_check_type_clicks_nothing() {
        let eng = engine(FakeBrowser::new(happy_script()), &[]);
        let outcome = eng.run(&ctx(None, false)).await.unwrap();

        assert_eq!(outcome.action, ActionResult::Skipped);
        let calls = eng.browser.calls();
        assert!(!calls.contains(&click_entry(talenta::CHECK_IN_BUTTON)));
        assert!(!calls.contains(&click_entry(talenta::CHECK_OUT_BUTTON)));
    }

    // -------------------------------------------------------------------
    // Failure paths
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_failure_propagates_with_no_close() {
        let mut browser = FakeBrowser::new(happy_script());
        browser.fail_open = true;
        let eng = engine(browser, &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        assert!(matches!(err, EngineError::Portal(PortalError::Browser(_))));
        assert_eq!(eng.browser.closed(), 0);
    }

    #[tokio::test]
    async fn test_login_page_mismatch() {
        let script =
            happy_script().with_text(&Locator::css(talenta::SIGN_IN_HEADING), "Maintenance");
        let eng = engine(FakeBrowser::new(script), &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        assert!(matches!(err, EngineError::LoginPageMismatch(_)));
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_timeout_is_authentication_failure() {
        let script = happy_script().with_timeout(&Locator::css(talenta::DASHBOARD_LINK));
        let eng = engine(FakeBrowser::new(script), &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        assert!(matches!(err, EngineError::AuthenticationFailed));
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_empty_profile_name_fails() {
        let script = happy_script().with_text(&Locator::css(talenta::PROFILE_NAME), "  \n ");
        let eng = engine(FakeBrowser::new(script), &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        assert!(matches!(err, EngineError::MissingIdentity));
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_missing_log_row_names_the_date() {
        let mut script = happy_script();
        script
            .texts
            .remove(&Locator::row_cell(TODAY, talenta::DAY_TYPE_COLUMN).to_string());
        let eng = engine(FakeBrowser::new(script), &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        match err {
            EngineError::LogRowMissing(date) => assert_eq!(date, TODAY),
            other => panic!("expected LogRowMissing, got {other:?}"),
        }
        assert_eq!(eng.browser.closed(), 1);
    }

    #[tokio::test]
    async fn test_missing_toast_is_unconfirmed() {
        let script = happy_script().with_timeout(&Locator::text(talenta::TOAST_CLOCK_IN));
        let eng = engine(FakeBrowser::new(script), &[]);

        let err = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap_err();
        match err {
            EngineError::Unconfirmed { expected } => {
                assert_eq!(expected, talenta::TOAST_CLOCK_IN);
            }
            other => panic!("expected Unconfirmed, got {other:?}"),
        }
        // The click happened; there is no rollback, only teardown.
        assert!(eng.browser.calls().contains(&click_entry(talenta::CHECK_IN_BUTTON)));
        assert_eq!(eng.browser.closed(), 1);
    }

    // -------------------------------------------------------------------
    // Selector fallback
    // -------------------------------------------------------------------

    #[tokio::test]
    async fn test_email_field_falls_back_to_input_type() {
        let script = happy_script().with_missing(&Locator::css(talenta::EMAIL_FIELD));
        let eng = engine(FakeBrowser::new(script), &[]);
        let outcome = eng.run(&ctx(Some(CheckType::CheckIn), false)).await.unwrap();

        assert_eq!(outcome.action, ActionResult::Confirmed);
        let calls = eng.browser.calls();
        assert!(calls.contains(&format!("fill:{}", Locator::css(talenta::EMAIL_FIELD))));
        assert!(calls.contains(&format!(
            "fill:{}",
            Locator::css(talenta::EMAIL_FIELD_FALLBACK)
        )));
    }

    // -------------------------------------------------------------------
    // Under the retry supervisor
    // -------------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn test_supervised_attempts_each_use_a_fresh_session() {
        use super::super::retry::RetryPolicy;

        let script = happy_script().with_timeout(&Locator::css(talenta::DASHBOARD_LINK));
        let eng = engine(FakeBrowser::new(script), &[]);
        let context = ctx(Some(CheckType::CheckIn), false);

        let err = RetryPolicy::default()
            .supervise("attendance run", |_attempt| eng.run(&context))
            .await
            .unwrap_err();

        assert!(matches!(err, EngineError::AuthenticationFailed));
        // Three attempts, three independent sessions, three teardowns.
        assert_eq!(eng.browser.opened(), 3);
        assert_eq!(eng.browser.closed(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_outcomes_never_retry() {
        use super::super::retry::RetryPolicy;

        let script = happy_script().with_roster(&[USER]);
        let eng = engine(FakeBrowser::new(script), &[]);
        let context = ctx(Some(CheckType::CheckIn), false);

        let supervised = RetryPolicy::default()
            .supervise("attendance run", |_attempt| eng.run(&context))
            .await
            .unwrap();

        assert_eq!(supervised.value.decision, AttendanceDecision::SkipOffToday);
        assert_eq!(supervised.attempts, 1);
        assert_eq!(eng.browser.opened(), 1);
    }

    // -------------------------------------------------------------------
    // RunContext / RunOutcome
    // -------------------------------------------------------------------

    #[test]
    fn test_run_context_from_config_at_formats_today() {
        use chrono::TimeZone;

        let config = AppConfig {
            credentials: Credentials {
                email: "budi@example.com".to_string(),
                password: SecretString::from("rahasia"),
            },
            geolocation: GeoPoint {
                latitude: -6.2,
                longitude: 106.8,
            },
            check_type: Some(CheckType::CheckIn),
            headless: true,
            skip_action: false,
            port: 8080,
        };
        let now = chrono::Utc.with_ymd_and_hms(2023, 6, 15, 1, 0, 0).unwrap();
        let context = RunContext::from_config_at(&config, now);
        assert_eq!(context.today, "15 Jun 2023");
        assert!(context.headless);
    }

    #[test]
    fn test_outcome_messages() {
        let confirmed = RunOutcome {
            decision: AttendanceDecision::Proceed,
            action: ActionResult::Confirmed,
        };
        assert!(confirmed.message().contains("confirmed"));

        let leave = RunOutcome::skipped(AttendanceDecision::SkipLeave);
        assert!(leave.message().contains("cuti"));
    }
}
