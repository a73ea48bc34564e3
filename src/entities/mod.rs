pub mod prelude;

pub mod characters;
pub mod parties;
pub mod party_members;
pub mod periods;
pub mod users;
pub mod visits;
pub mod zone_stats;
pub mod zones;
