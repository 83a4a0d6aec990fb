//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod delivery;
pub mod donation;
pub mod faq;
pub mod matching_invite;
pub mod organization;
pub mod post;
pub mod user;

pub use delivery::{DeliveryEntity, DeliveryStatusDb};
pub use donation::{
    DeliveryMethodDb, DonationEntity, DonationImageEntity, DonationMethodDb, DonationStatusDb,
    MediaKindDb,
};
pub use faq::FaqEntity;
pub use matching_invite::{InviteStatusDb, MatchingInviteEntity};
pub use organization::{JoinRequestStatusDb, OrganizationEntity};
pub use post::{PostEntity, PostTypeDb};
pub use user::{AdminUserEntity, UserEntity, UserRoleDb};
