//! Discord REST adapter.

use std::collections::HashMap;

use hangout_core::config::DiscordConfig;
use hangout_core::model::UserId;
use hangout_core::model::voting::DEFAULT_ATTENDEE_COLOR;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use super::{DisplayIdentity, Notifier, NotifyError, NotifyFuture, NotifyResult};

#[derive(Debug, Deserialize)]
struct DiscordUser {
    username: String,
    global_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GuildMember {
    user: Option<DiscordUser>,
    nick: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GuildRole {
    id: String,
    color: u32,
    position: i64,
}

pub struct DiscordNotifier {
    client: reqwest::Client,
    api_base: String,
    authorization: String,
}

impl DiscordNotifier {
    #[must_use]
    pub fn new(client: reqwest::Client, api_base: &str, bot_token: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_owned(),
            authorization: format!("Bot {bot_token}"),
        }
    }

    /// Builds a notifier when a bot token is configured.
    #[must_use]
    pub fn from_config(client: reqwest::Client, config: &DiscordConfig) -> Option<Self> {
        config
            .bot_token
            .as_deref()
            .map(|token| Self::new(client, &config.api_base, token))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> NotifyResult<T> {
        let response = self
            .client
            .get(format!("{}{path}", self.api_base))
            .header(AUTHORIZATION, &self.authorization)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    async fn member(&self, group_id: &str, user_id: &UserId) -> NotifyResult<GuildMember> {
        self.get_json(&format!("/guilds/{group_id}/members/{user_id}"))
            .await
    }
}

async fn check_status(response: reqwest::Response) -> NotifyResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Api {
        status: status.as_u16(),
        body,
    })
}

/// Nickname, then global name, then username.
fn display_name(member: &GuildMember) -> Option<String> {
    member
        .nick
        .clone()
        .filter(|nick| !nick.is_empty())
        .or_else(|| {
            member.user.as_ref().map(|user| {
                user.global_name
                    .clone()
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| user.username.clone())
            })
        })
}

/// Colour of the member's highest-positioned coloured role, falling back to the
/// `@everyone` role (whose id equals the guild id).
fn role_color(group_id: &str, roles: &[GuildRole], member_roles: &[String]) -> Option<String> {
    roles
        .iter()
        .filter(|role| role.color != 0 && member_roles.contains(&role.id))
        .max_by_key(|role| role.position)
        .or_else(|| {
            roles
                .iter()
                .find(|role| role.id == group_id && role.color != 0)
        })
        .map(|role| format!("#{:06X}", role.color))
}

impl Notifier for DiscordNotifier {
    #[tracing::instrument(skip(self, text))]
    fn post_message<'a>(&'a self, channel_id: &'a str, text: &'a str) -> NotifyFuture<'a, ()> {
        Box::pin(async move {
            let response = self
                .client
                .post(format!("{}/channels/{channel_id}/messages", self.api_base))
                .header(AUTHORIZATION, &self.authorization)
                .json(&serde_json::json!({ "content": text }))
                .send()
                .await?;
            check_status(response).await?;
            tracing::debug!("Message posted");
            Ok(())
        })
    }

    #[tracing::instrument(skip(self, user_ids), fields(users = user_ids.len()))]
    fn lookup_display_names<'a>(
        &'a self,
        group_id: &'a str,
        user_ids: &'a [UserId],
    ) -> NotifyFuture<'a, HashMap<UserId, DisplayIdentity>> {
        Box::pin(async move {
            let roles: Vec<GuildRole> = self.get_json(&format!("/guilds/{group_id}/roles")).await?;

            let mut identities = HashMap::new();
            for user_id in user_ids {
                if identities.contains_key(user_id) {
                    continue;
                }
                match self.member(group_id, user_id).await {
                    Ok(member) => {
                        let Some(name) = display_name(&member) else {
                            continue;
                        };
                        let color = role_color(group_id, &roles, &member.roles)
                            .unwrap_or_else(|| DEFAULT_ATTENDEE_COLOR.to_owned());
                        identities.insert(user_id.clone(), DisplayIdentity { name, color });
                    }
                    Err(error) => {
                        tracing::warn!(%user_id, %error, "Member lookup failed");
                    }
                }
            }
            Ok(identities)
        })
    }
}
