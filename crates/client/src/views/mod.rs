//! Per-screen state objects.
//!
//! A view is owned by one task and mutated through `&mut self`. Each user
//! action sends at most one mutating request and then re-fetches.

pub mod admin_approval;
pub mod donor_status;
pub mod matching;

#[cfg(test)]
pub(crate) mod fake;

pub use admin_approval::AdminApprovalView;
pub use donor_status::DonorStatusView;
pub use matching::{InviteInboxView, MatchingView};

use tracing::{debug, warn};

use crate::error::ClientError;
use crate::notice::Notice;

/// Records the failure as the view's notice and hands the error back.
pub(crate) fn record_failure<T>(
    notice: &mut Option<Notice>,
    view: &'static str,
    err: ClientError,
) -> Result<T, ClientError> {
    if err.is_local() {
        debug!(view, error = %err, "Action blocked");
    } else {
        warn!(view, error = %err, "Action failed");
    }
    *notice = Some(Notice::error(err.user_message()));
    Err(err)
}
