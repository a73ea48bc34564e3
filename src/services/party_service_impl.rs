//! `SeaORM` implementation of the `PartyService` trait.

use std::collections::HashMap;

use crate::db::Store;
use crate::entities::{users, zones};
use crate::services::party_service::{
    CreatePartyInput, PartyCreated, PartyError, PartyInfo, PartyMemberInfo, PartyService,
};
use async_trait::async_trait;

/// `@username` when one is set, otherwise the raw Telegram id.
fn mention(user: &users::Model) -> String {
    user.username.as_ref().map_or_else(
        || format!("ID:{}", user.telegram_id),
        |username| format!("@{username}"),
    )
}

fn member_info(user: &users::Model) -> PartyMemberInfo {
    PartyMemberInfo {
        telegram_id: user.telegram_id,
        username: user.username.clone(),
    }
}

/// Group-chat announcement, Ukrainian with HTML markup. Ready time is
/// shown in UTC; stored user timezones are free-form labels without a
/// tz database behind them.
fn build_notification(
    zone_name: &str,
    creator: &users::Model,
    ready_time: chrono::DateTime<chrono::Utc>,
    roster: &[String],
    mentions: &str,
) -> String {
    let formatted_time = ready_time.format("%m/%d/%Y, %H:%M");
    let invited_lines = roster
        .iter()
        .map(|entry| format!("  • {entry}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🎮 <b>Новий збір в інстанс!</b>\n\n\
         📍 <b>Інстанс:</b> {zone_name}\n\
         👤 <b>Організатор:</b> {organizer}\n\
         ⏰ <b>Час готовності:</b> {formatted_time} (UTC)\n\n\
         👥 <b>Запрошені гравці:</b>\n{invited_lines}\n\n\
         {mentions}",
        organizer = mention(creator),
    )
}

pub struct SeaOrmPartyService {
    store: Store,
}

impl SeaOrmPartyService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PartyService for SeaOrmPartyService {
    async fn create_party(
        &self,
        creator_id: i32,
        input: CreatePartyInput,
    ) -> Result<PartyCreated, PartyError> {
        let zone = self
            .store
            .get_zone_by_key(&input.zone_id)
            .await?
            .ok_or(PartyError::ZoneNotFound)?;

        let ready: chrono::DateTime<chrono::Utc> = input
            .ready_time
            .parse()
            .map_err(|_| PartyError::Validation("Invalid ready time".to_string()))?;

        // Dedup while keeping invitation order for the roster.
        let mut invited_ids: Vec<i32> = Vec::new();
        for id in &input.invited_user_ids {
            if !invited_ids.contains(id) {
                invited_ids.push(*id);
            }
        }

        let party = self
            .store
            .create_party(creator_id, zone.id, &ready.to_rfc3339(), &invited_ids)
            .await?;

        let creator = self
            .store
            .get_user_by_id(creator_id)
            .await?
            .ok_or_else(|| PartyError::Internal("Party creator not found".to_string()))?;

        let invited_users: HashMap<i32, users::Model> = self
            .store
            .get_users_by_ids(&invited_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();
        let ordered: Vec<&users::Model> = invited_ids
            .iter()
            .filter_map(|id| invited_users.get(id))
            .collect();

        let mentions = ordered
            .iter()
            .map(|user| mention(user))
            .collect::<Vec<_>>()
            .join(" ");

        let mut roster = Vec::with_capacity(ordered.len());
        for user in &ordered {
            let mut entry = mention(user);
            if let Some(&character_id) = input.selected_character_ids.get(&user.id) {
                if let Some(character) = self.store.get_character(character_id).await? {
                    // Someone else's character id is ignored, not an error.
                    if character.user_id == user.id {
                        entry = format!(
                            "{entry} ({}, {}, Lvl {})",
                            character.nickname, character.profession, character.level
                        );
                    }
                }
            }
            roster.push(entry);
        }

        let notification = build_notification(&zone.name, &creator, ready, &roster, &mentions);

        let info = PartyInfo {
            id: party.id,
            zone_id: zone.zone_id,
            zone_name: zone.name,
            creator: member_info(&creator),
            invited: ordered.iter().map(|user| member_info(user)).collect(),
            ready_time: party.ready_time,
            status: party.status,
            created_at: party.created_at,
        };

        tracing::info!(party_id = info.id, zone = %info.zone_id, "Created party");

        Ok(PartyCreated {
            party: info,
            notification,
        })
    }

    async fn parties_for_user(&self, user_id: i32) -> Result<Vec<PartyInfo>, PartyError> {
        let parties = self.store.list_parties_for_user(user_id).await?;
        if parties.is_empty() {
            return Ok(Vec::new());
        }

        let party_ids: Vec<i32> = parties.iter().map(|party| party.id).collect();
        let mut invited_by_party: HashMap<i32, Vec<PartyMemberInfo>> = HashMap::new();
        for (member, user) in self.store.party_members_with_users(&party_ids).await? {
            if let Some(user) = user {
                invited_by_party
                    .entry(member.party_id)
                    .or_default()
                    .push(member_info(&user));
            }
        }

        let mut creator_ids: Vec<i32> = Vec::new();
        for party in &parties {
            if !creator_ids.contains(&party.creator_id) {
                creator_ids.push(party.creator_id);
            }
        }
        let creators: HashMap<i32, users::Model> = self
            .store
            .get_users_by_ids(&creator_ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let zones_by_id: HashMap<i32, zones::Model> = self
            .store
            .list_zones()
            .await?
            .into_iter()
            .map(|zone| (zone.id, zone))
            .collect();

        let mut result = Vec::with_capacity(parties.len());
        for party in parties {
            let Some(creator) = creators.get(&party.creator_id) else {
                continue;
            };
            let Some(zone) = zones_by_id.get(&party.zone_id) else {
                continue;
            };

            result.push(PartyInfo {
                id: party.id,
                zone_id: zone.zone_id.clone(),
                zone_name: zone.name.clone(),
                creator: member_info(creator),
                invited: invited_by_party.remove(&party.id).unwrap_or_default(),
                ready_time: party.ready_time,
                status: party.status,
                created_at: party.created_at,
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(telegram_id: i64, username: Option<&str>) -> users::Model {
        users::Model {
            id: 1,
            telegram_id,
            username: username.map(str::to_string),
            first_name: None,
            last_name: None,
            timezone: "UTC".to_string(),
            language: "ua".to_string(),
            character_name: None,
            character_level: None,
            password_hash: None,
            password_reset_code: None,
            password_reset_expiry: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn mention_prefers_username() {
        assert_eq!(mention(&user(42, Some("orc_slayer"))), "@orc_slayer");
        assert_eq!(mention(&user(42, None)), "ID:42");
    }

    #[test]
    fn notification_carries_zone_time_and_roster() {
        let creator = user(7, Some("leader"));
        let ready = "2026-03-02T19:30:00Z"
            .parse::<chrono::DateTime<chrono::Utc>>()
            .unwrap();
        let roster = vec![
            "@tank (Varka, Paladin, Lvl 78)".to_string(),
            "ID:99".to_string(),
        ];

        let message = build_notification("Закен", &creator, ready, &roster, "@tank ID:99");

        assert!(message.starts_with("🎮 <b>Новий збір в інстанс!</b>\n\n"));
        assert!(message.contains("📍 <b>Інстанс:</b> Закен\n"));
        assert!(message.contains("👤 <b>Організатор:</b> @leader\n"));
        assert!(message.contains("⏰ <b>Час готовності:</b> 03/02/2026, 19:30 (UTC)\n"));
        assert!(message.contains("👥 <b>Запрошені гравці:</b>\n  • @tank (Varka, Paladin, Lvl 78)\n  • ID:99\n"));
        assert!(message.ends_with("@tank ID:99"));
    }
}
