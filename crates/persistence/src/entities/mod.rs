//! Database row mappings.

mod activity_log;
mod app_user;
mod invite;
mod profile;
mod role;
mod session;
mod settings;

pub use activity_log::ActivityLogEntity;
pub use app_user::AppUserEntity;
pub use invite::InviteEntity;
pub use profile::UserProfileEntity;
pub use role::UserRoleEntity;
pub use session::{SessionEntity, SessionWithUserEntity};
pub use settings::JellyfinCredentialsEntity;
