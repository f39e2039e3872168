//! Discord REST adapter for the `GuildApi` seam.
//!
//! # Design
//! - One `reqwest::Client` per adapter; the bot token travels as a default header.
//! - Status classification is centralised so grant and read agree on what a 404 or 429 means.
//! - Member reads send `Cache-Control: no-cache` so intermediaries never answer from cache.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CACHE_CONTROL, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use rolecast_core::{ApiError, ApiResult, GuildApi, MemberSnapshot};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::endpoint::{join, parse_base};
use crate::error::{HttpSetupError, HttpSetupResult};

const OP_GRANT_ROLE: &str = "grant_role";
const OP_MEMBER: &str = "member";

/// Discord REST client scoped to one bot token.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    base_url: Url,
}

impl DiscordClient {
    /// Build a client for `base_url` (e.g. `https://discord.com/api/v10`).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is unusable, the token is not a valid header value, or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> HttpSetupResult<Self> {
        let base_url = parse_base(base_url)?;
        let mut authorization = HeaderValue::from_str(&format!("Bot {token}"))
            .map_err(|_| HttpSetupError::InvalidToken)?;
        authorization.set_sensitive(true);

        let mut default_headers = HeaderMap::new();
        default_headers.insert(AUTHORIZATION, authorization);

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .user_agent(concat!("rolecast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| HttpSetupError::Client { source })?;

        Ok(Self { client, base_url })
    }

    fn member_url(&self, guild_id: &str, member_id: &str) -> Url {
        join(&self.base_url, &["guilds", guild_id, "members", member_id])
    }
}

#[async_trait]
impl GuildApi for DiscordClient {
    async fn grant_role(&self, guild_id: &str, member_id: &str, role_id: &str) -> ApiResult<()> {
        let url = join(
            &self.base_url,
            &["guilds", guild_id, "members", member_id, "roles", role_id],
        );
        let response = self
            .client
            .put(url)
            .body("")
            .send()
            .await
            .map_err(|err| transport(OP_GRANT_ROLE, err))?;

        if response.status().is_success() {
            debug!(member_id, role_id, "role grant accepted");
            Ok(())
        } else {
            Err(classify(OP_GRANT_ROLE, response).await)
        }
    }

    async fn member(&self, guild_id: &str, member_id: &str) -> ApiResult<MemberSnapshot> {
        let response = self
            .client
            .get(self.member_url(guild_id, member_id))
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|err| transport(OP_MEMBER, err))?;

        if response.status() != StatusCode::OK {
            return Err(classify(OP_MEMBER, response).await);
        }

        let payload = response
            .json::<MemberPayload>()
            .await
            .map_err(|err| ApiError::Decode {
                operation: OP_MEMBER,
                source: Box::new(err),
            })?;
        Ok(MemberSnapshot {
            member_id: payload
                .user
                .map_or_else(|| member_id.to_string(), |user| user.id),
            roles: payload.roles,
        })
    }
}

#[derive(Debug, Deserialize)]
struct MemberPayload {
    #[serde(default)]
    user: Option<UserPayload>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RateLimitPayload {
    retry_after: f64,
}

fn transport(operation: &'static str, err: reqwest::Error) -> ApiError {
    ApiError::Transport {
        operation,
        source: Box::new(err),
    }
}

/// Map a non-success response onto the API error taxonomy.
async fn classify(operation: &'static str, response: Response) -> ApiError {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound { operation },
        StatusCode::TOO_MANY_REQUESTS => {
            let header_hint = retry_after_header(response.headers());
            let retry_after = match header_hint {
                Some(hint) => Some(hint),
                None => response
                    .bytes()
                    .await
                    .ok()
                    .and_then(|body| retry_after_body(&body)),
            };
            ApiError::RateLimited {
                operation,
                retry_after,
            }
        }
        _ => ApiError::Status {
            operation,
            status: status.as_u16(),
        },
    }
}

/// `Retry-After` is whole seconds per RFC 9110; Discord may send fractional seconds.
fn retry_after_header(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<f64>().ok())
        .and_then(seconds)
}

fn retry_after_body(body: &[u8]) -> Option<Duration> {
    serde_json::from_slice::<RateLimitPayload>(body)
        .ok()
        .and_then(|payload| seconds(payload.retry_after))
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}
