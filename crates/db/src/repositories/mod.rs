//! Repository structs, one per aggregate. All are zero-sized and take a
//! `&PgPool` as the first argument.

pub mod account_repo;
pub mod affiliation_repo;
pub mod agency_repo;
pub mod announcement_repo;
pub mod auth_code_repo;
pub mod contact_repo;
pub mod group_repo;
pub mod identity_repo;
pub mod member_repo;
pub mod payment_repo;
pub mod session_repo;
pub mod settlement_repo;
pub mod song_repo;
pub mod wiki_repo;

pub use account_repo::AccountRepo;
pub use affiliation_repo::AffiliationRepo;
pub use agency_repo::AgencyRepo;
pub use announcement_repo::AnnouncementRepo;
pub use auth_code_repo::AuthCodeRepo;
pub use contact_repo::ContactRepo;
pub use group_repo::GroupRepo;
pub use identity_repo::{IdentityRepo, PrincipalRepo};
pub use member_repo::MemberRepo;
pub use payment_repo::PaymentRepo;
pub use session_repo::SessionRepo;
pub use settlement_repo::{SettlementRepo, TransferRepo};
pub use song_repo::SongRepo;
pub use wiki_repo::{DraftRepo, WikiResource};
