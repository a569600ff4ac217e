//! Due-date reminder sweep.
//!
//! Run on a schedule by the `send-reminders` binary: every active borrow due
//! before `now + horizon` gets one reminder notification per due date. The
//! reminder stamps the borrow, so later sweeps pass over it until an
//! extension moves the due date. A borrow returned between the scan and the
//! send is skipped; other failures are counted and the sweep carries on.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::domain::LendingError;
use crate::domain::ports::{LendingCommand, LendingRecords, SendReturnReminderRequest};

/// Outcome of one reminder sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSummary {
    /// Reminders written.
    pub sent: usize,
    /// Borrows closed before their reminder could be sent.
    pub skipped: usize,
    /// Reminders that failed for any other reason.
    pub failed: usize,
}

/// Send a reminder for every active borrow due within `horizon` of `now`.
///
/// # Errors
///
/// Returns [`LendingError`] only when the due-borrow scan itself fails.
pub async fn send_due_reminders(
    records: &dyn LendingRecords,
    lending: &dyn LendingCommand,
    now: DateTime<Utc>,
    horizon: Duration,
) -> Result<ReminderSummary, LendingError> {
    let cutoff = now + horizon;
    let due = records.borrows_due_before(cutoff).await?;
    let mut summary = ReminderSummary::default();
    for borrow in due {
        let borrow_id = borrow.id();
        match lending
            .send_return_reminder(SendReturnReminderRequest { borrow_id })
            .await
        {
            Ok(_) => summary.sent += 1,
            Err(LendingError::NotActive | LendingError::BorrowNotFound) => summary.skipped += 1,
            Err(err) => {
                warn!(%borrow_id, reason = err.reason(), "reminder failed");
                summary.failed += 1;
            }
        }
    }
    info!(
        %cutoff,
        sent = summary.sent,
        skipped = summary.skipped,
        failed = summary.failed,
        "reminder sweep finished"
    );
    Ok(summary)
}
