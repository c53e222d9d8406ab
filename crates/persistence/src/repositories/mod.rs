//! Repository layer for database operations.

mod activity_log;
mod app_user;
mod invite;
mod profile;
mod role;
mod session;
mod settings;

pub use activity_log::ActivityLogRepository;
pub use app_user::{AppUserRepository, NewAppUserRow};
pub use invite::{InviteRepository, NewInviteRow};
pub use profile::{NewProfileRow, ProfileRepository};
pub use role::RoleRepository;
pub use session::SessionRepository;
pub use settings::SettingsRepository;
