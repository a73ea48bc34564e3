pub mod character;
pub mod party;
pub mod period;
pub mod user;
pub mod visit;
pub mod zone;
pub mod zone_stat;
