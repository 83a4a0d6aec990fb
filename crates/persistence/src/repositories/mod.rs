//! Repository implementations for database operations.

pub mod delivery;
pub mod donation;
pub mod faq;
pub mod matching_invite;
pub mod organization;
pub mod post;
pub mod user;

pub use delivery::{DeliveryRepository, DeliveryUpdate};
pub use donation::{DonationRepository, NewDonationRecord, NewMedia};
pub use faq::FaqRepository;
pub use matching_invite::MatchingInviteRepository;
pub use organization::{NewOrganization, OrganizationRepository};
pub use post::{NewPost, PostRepository};
pub use user::{NewUser, UserRepository};
