pub use super::characters::Entity as Characters;
pub use super::parties::Entity as Parties;
pub use super::party_members::Entity as PartyMembers;
pub use super::periods::Entity as Periods;
pub use super::users::Entity as Users;
pub use super::visits::Entity as Visits;
pub use super::zone_stats::Entity as ZoneStats;
pub use super::zones::Entity as Zones;
