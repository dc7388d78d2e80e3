use crate::entities::booking::BookingStatus;
use crate::error::{AppError, AppResult};

/// Statuses reachable in one step from `from`
pub fn next_statuses(from: BookingStatus) -> &'static [BookingStatus] {
    use BookingStatus::*;

    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[Ongoing, Cancelled],
        Ongoing => &[Completed, Overdue],
        Overdue => &[Completed],
        Completed | Cancelled => &[],
    }
}

pub fn can_transition(from: BookingStatus, to: BookingStatus) -> bool {
    from == to || next_statuses(from).contains(&to)
}

pub fn is_terminal(status: BookingStatus) -> bool {
    next_statuses(status).is_empty()
}

/// Validate a status write; with `enforce` off every write is accepted
pub fn check_transition(from: BookingStatus, to: BookingStatus, enforce: bool) -> AppResult<()> {
    if !enforce || can_transition(from, to) {
        return Ok(());
    }
    Err(AppError::InvalidTransition { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::Iterable;

    #[test]
    fn test_happy_path_is_allowed() {
        let chain = [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Ongoing,
            BookingStatus::Completed,
        ];
        for pair in chain.windows(2) {
            assert!(can_transition(pair[0], pair[1]), "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_overdue_can_still_complete() {
        assert!(can_transition(BookingStatus::Ongoing, BookingStatus::Overdue));
        assert!(can_transition(BookingStatus::Overdue, BookingStatus::Completed));
        assert!(!can_transition(BookingStatus::Overdue, BookingStatus::Cancelled));
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        for to in BookingStatus::iter() {
            if to != BookingStatus::Completed {
                assert!(!can_transition(BookingStatus::Completed, to));
            }
            if to != BookingStatus::Cancelled {
                assert!(!can_transition(BookingStatus::Cancelled, to));
            }
        }
        assert!(is_terminal(BookingStatus::Completed));
        assert!(!is_terminal(BookingStatus::Pending));
    }

    #[test]
    fn test_skipping_states_is_rejected() {
        assert!(!can_transition(BookingStatus::Pending, BookingStatus::Ongoing));
        assert!(!can_transition(BookingStatus::Pending, BookingStatus::Completed));
        assert!(!can_transition(BookingStatus::Ongoing, BookingStatus::Cancelled));
    }

    #[test]
    fn test_rewriting_same_status_is_a_no_op() {
        for status in BookingStatus::iter() {
            assert!(can_transition(status, status));
        }
    }

    #[test]
    fn test_check_transition_errors_and_bypass() {
        let err = check_transition(BookingStatus::Completed, BookingStatus::Pending, true).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition {
                from: BookingStatus::Completed,
                to: BookingStatus::Pending
            }
        ));
        assert_eq!(err.to_string(), "Booking cannot move from completed to pending");

        assert!(check_transition(BookingStatus::Completed, BookingStatus::Pending, false).is_ok());
    }
}
