//! Operator and donor screens driven against the ReWear API.
//!
//! Each view keeps a snapshot of what the server last returned, runs the
//! shared lifecycle checks before sending anything, and re-fetches after
//! every successful change. Transport lives behind [`DonationBackend`].

pub mod backend;
pub mod error;
pub mod http;
pub mod notice;
pub mod views;

pub use backend::DonationBackend;
pub use error::ClientError;
pub use http::{HttpBackend, HttpBackendConfig};
pub use notice::{Notice, NoticeKind};
pub use views::{AdminApprovalView, DonorStatusView, InviteInboxView, MatchingView};
