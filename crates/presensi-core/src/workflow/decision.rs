//! Pure decision functions for the skip/proceed logic.
//!
//! Stateless, no portal access -- the engine feeds these with scraped values.

use presensi_types::attendance::AttendanceDecision;

use crate::talenta;

/// Whether the current user appears in the off-today roster.
///
/// Matching is exact on trimmed display names. Substring containment would
/// false-positive on shared name fragments, so a roster entry must equal the
/// profile name after trimming.
pub fn roster_contains(roster: &[String], user: &str) -> bool {
    let user = user.trim();
    roster.iter().any(|name| name.trim() == user)
}

/// Derive the day's decision from the attendance-log row.
///
/// Day-type wins over leave-status: any non-"N" day type is a holiday or
/// weekend regardless of what the leave column says.
pub fn decide_from_log(day_type: &str, leave_status: &str) -> AttendanceDecision {
    if day_type.trim() != talenta::NORMAL_DAY {
        return AttendanceDecision::SkipHoliday;
    }
    if leave_status.trim() == talenta::ON_LEAVE {
        return AttendanceDecision::SkipLeave;
    }
    AttendanceDecision::Proceed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // -------------------------------------------------------------------
    // roster_contains
    // -------------------------------------------------------------------

    #[test]
    fn test_roster_exact_match() {
        let names = roster(&["Budi Santoso", "Siti Rahma"]);
        assert!(roster_contains(&names, "Siti Rahma"));
    }

    #[test]
    fn test_roster_trims_both_sides() {
        let names = roster(&["  Budi Santoso \n"]);
        assert!(roster_contains(&names, "Budi Santoso"));
        assert!(roster_contains(&names, " Budi Santoso "));
    }

    #[test]
    fn test_roster_rejects_substring() {
        // "Adi" must not match "Aditya Pratama".
        let names = roster(&["Aditya Pratama"]);
        assert!(!roster_contains(&names, "Adi"));
    }

    #[test]
    fn test_roster_rejects_superstring() {
        let names = roster(&["Adi"]);
        assert!(!roster_contains(&names, "Aditya Pratama"));
    }

    #[test]
    fn test_roster_empty() {
        assert!(!roster_contains(&[], "Budi Santoso"));
    }

    // -------------------------------------------------------------------
    // decide_from_log
    // -------------------------------------------------------------------

    #[test]
    fn test_normal_day_no_leave_proceeds() {
        assert_eq!(decide_from_log("N", "-"), AttendanceDecision::Proceed);
        assert_eq!(decide_from_log("N", ""), AttendanceDecision::Proceed);
    }

    #[test]
    fn test_non_normal_day_is_holiday() {
        assert_eq!(decide_from_log("H", "-"), AttendanceDecision::SkipHoliday);
        assert_eq!(decide_from_log("", "-"), AttendanceDecision::SkipHoliday);
    }

    #[test]
    fn test_day_type_wins_over_leave_status() {
        // Holiday regardless of the leave column.
        assert_eq!(decide_from_log("H", "CT"), AttendanceDecision::SkipHoliday);
    }

    #[test]
    fn test_normal_day_on_leave_skips() {
        assert_eq!(decide_from_log("N", "CT"), AttendanceDecision::SkipLeave);
    }

    #[test]
    fn test_values_are_trimmed() {
        assert_eq!(decide_from_log(" N ", " CT\n"), AttendanceDecision::SkipLeave);
        assert_eq!(decide_from_log("N\n", " - "), AttendanceDecision::Proceed);
    }
}
