//! The Talenta site contract.
//!
//! Every URL, selector, marker text, column index, and sentinel value the
//! workflow depends on, in one place. The portal ships no stability
//! guarantees; when its markup shifts, this module is what changes.

use std::time::Duration;

/// Mekari SSO login page, with the Talenta client id and return-to baked in.
pub const LOGIN_URL: &str = "https://account.mekari.com/users/sign_in?client_id=TAL-73645&return_to=L2F1dGg_Y2xpZW50X2lkPVRBTC03MzY0NSZyZXNwb25zZV90eXBlPWNvZGUmc2NvcGU9c3NvOnByb2ZpbGU%3D";

/// The live attendance page with the clock in/out buttons.
pub const LIVE_ATTENDANCE_URL: &str = "https://hr.talenta.co/live-attendance";

/// Heading that confirms the login page actually rendered.
pub const SIGN_IN_HEADING: &str = "div.my-5 > h1";

/// Expected text of [`SIGN_IN_HEADING`].
pub const SIGN_IN_HEADING_TEXT: &str = "Sign in";

/// Email input, with a generic fallback for markup drift.
pub const EMAIL_FIELD: &str = "#user_email";
pub const EMAIL_FIELD_FALLBACK: &str = r#"input[type="email"]"#;

/// Password input, with a generic fallback for markup drift.
pub const PASSWORD_FIELD: &str = "#user_password";
pub const PASSWORD_FIELD_FALLBACK: &str = r#"input[type="password"]"#;

pub const SIGN_IN_BUTTON: &str = "#new-signin-button";

/// Anchor that exists only after a successful login.
pub const DASHBOARD_LINK: &str = r#"a[href="/employee/dashboard"]"#;

/// The logged-in user's display name on the dashboard.
pub const PROFILE_NAME: &str = r#"[data-pixel-component="MpText"]"#;

/// The "Who's Off" card and the names listed inside it.
pub const OFF_TODAY_PANEL: &str = ".tl-card-small";
pub const OFF_TODAY_NAMES: &str = ".tl-leave-list__item .font-weight-bold";

/// In-page link to the attendance log, and the heading that confirms it.
pub const ATTENDANCE_LOGS_LINK: &str = "My Attendance Logs";
pub const ATTENDANCE_LOG_HEADING: &str = "My attendance log";

/// Attendance-log table columns (1-based).
pub const DAY_TYPE_COLUMN: u32 = 2;
pub const LEAVE_STATUS_COLUMN: u32 = 7;

/// Day-type value for a normal working day; anything else is a holiday or
/// weekend.
pub const NORMAL_DAY: &str = "N";

/// Leave-status value for approved leave (cuti).
pub const ON_LEAVE: &str = "CT";

/// Clock displayed on the live attendance page (diagnostic only).
pub const CURRENT_TIME: &str = ".current-time";

/// The two action buttons, by position.
pub const CHECK_IN_BUTTON: &str = ".col:nth-child(1) > .btn";
pub const CHECK_OUT_BUTTON: &str = ".col:nth-child(2) > .btn";

/// Confirmation toasts for each action.
pub const TOAST_CLOCK_IN: &str = "Successfully Clock In";
pub const TOAST_CLOCK_OUT: &str = "Successfully Clock Out";

/// Viewport the portal is known to render correctly at.
pub const VIEWPORT: (u32, u32) = (1080, 560);

/// Bound on page loads and login-flow waits.
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(60);

/// Bound on the confirmation toast wait.
pub const CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);
