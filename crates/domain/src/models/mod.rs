//! Domain models.

pub mod delivery;
pub mod donation;
pub mod faq;
pub mod matching_invite;
pub mod organization;
pub mod post;
pub mod status;
pub mod user;

pub use delivery::{
    Delivery, DeliveryListResponse, DeliveryResponse, DeliveryStatus, Party,
    UpdateDeliveryRequest, UpdateDeliveryResponse,
};
pub use donation::{
    ActionResponse, AdminDonationResponse, AssignOrganizationRequest, CancelDonationRequest,
    CreateDonationResponse, DeliveryMethod, DonationFormError, DonationImage, DonationItem,
    DonationListResponse, DonationMethod, DonationSummary, MediaKind, NewDonation,
    RejectDonationRequest,
};
pub use faq::{AnswerQuestionRequest, AskQuestionRequest, Faq, FaqListResponse, FaqResponse};
pub use matching_invite::{
    InviteDecision, InviteListResponse, InviteStatus, MatchingInvite, MatchingInviteResponse,
    RespondInviteRequest,
};
pub use organization::{
    JoinRequestListResponse, JoinRequestResponse, JoinRequestStatus, OrganSummary,
    Organization, OrganizationJoinRequest, OrganizationRef, OrgansResponse,
    ReviewJoinRequestBody,
};
pub use post::{CreatePostRequest, Post, PostListQuery, PostResponse, PostType};
pub use status::{
    is_completed_label, normalize, try_normalize, CanonicalStatus, DonationStatus,
};
pub use user::{
    AdminUserItem, AdminUsersResponse, LoginRequest, LoginResponse, SignupRequest, User,
    UserResponse, UserRole,
};
