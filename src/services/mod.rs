pub mod telegram_auth;
pub use telegram_auth::{TelegramAuthError, TelegramIdentity};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, PlayerListing, ProfileInfo, UserSummary};
pub use auth_service_impl::SeaOrmAuthService;

pub mod character_service;
pub mod character_service_impl;
pub use character_service::{CharacterError, CharacterInfo, CharacterPatch, CharacterService};
pub use character_service_impl::SeaOrmCharacterService;

pub mod party_service;
pub mod party_service_impl;
pub use party_service::{CreatePartyInput, PartyCreated, PartyError, PartyInfo, PartyService};
pub use party_service_impl::SeaOrmPartyService;

pub mod period_service;
pub mod period_service_impl;
pub use period_service::{PeriodError, PeriodInfo, PeriodService, RotationOutcome};
pub use period_service_impl::SeaOrmPeriodService;

pub mod statistics_service;
pub mod statistics_service_impl;
pub use statistics_service::{StatisticsError, StatisticsService};
pub use statistics_service_impl::SeaOrmStatisticsService;

pub mod visit_service;
pub mod visit_service_impl;
pub use visit_service::{VisitError, VisitRecord, VisitService};
pub use visit_service_impl::SeaOrmVisitService;
