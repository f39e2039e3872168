use std::time::Duration;

use httpmock::MockServer;
use httpmock::prelude::*;
use rolecast_core::{ApiError, GuildApi};
use rolecast_http::DiscordClient;
use serde_json::json;

const GUILD: &str = "1448975847657836668";
const MEMBER: &str = "388931035607597057";
const ROLE: &str = "735479013522276412";

fn client_for(server: &MockServer) -> anyhow::Result<DiscordClient> {
    Ok(DiscordClient::new(
        &format!("{}/api/v10", server.base_url()),
        "test-token",
        Duration::from_secs(5),
    )?)
}

#[tokio::test]
async fn grant_role_puts_with_bot_authorization() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(PUT)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}/roles/{ROLE}"))
            .header("authorization", "Bot test-token");
        then.status(204);
    });

    client_for(&server)?.grant_role(GUILD, MEMBER, ROLE).await?;
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn member_read_bypasses_cache_and_decodes_roles() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}"))
            .header("cache-control", "no-cache");
        then.status(200).json_body(json!({
            "user": { "id": MEMBER, "username": "someone" },
            "roles": [ROLE, "1142947458285060096"],
            "joined_at": "2024-01-01T00:00:00.000000+00:00"
        }));
    });

    let member = client_for(&server)?.member(GUILD, MEMBER).await?;
    assert_eq!(member.member_id, MEMBER);
    assert!(member.has_role(ROLE));
    assert!(!member.has_role("735463085489389621"));
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn unknown_member_maps_to_not_found() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}"));
        then.status(404)
            .json_body(json!({ "message": "Unknown Member", "code": 10007 }));
    });

    let err = client_for(&server)?
        .member(GUILD, MEMBER)
        .await
        .expect_err("member is unknown");
    assert!(matches!(err, ApiError::NotFound { operation: "member" }));
    Ok(())
}

#[tokio::test]
async fn rate_limit_reads_retry_after_header() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(PUT)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}/roles/{ROLE}"));
        then.status(429).header("retry-after", "2");
    });

    let err = client_for(&server)?
        .grant_role(GUILD, MEMBER, ROLE)
        .await
        .expect_err("rate limited");
    match err {
        ApiError::RateLimited {
            operation,
            retry_after,
        } => {
            assert_eq!(operation, "grant_role");
            assert_eq!(retry_after, Some(Duration::from_secs(2)));
        }
        other => panic!("unexpected error {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn rate_limit_falls_back_to_json_body_hint() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}"));
        then.status(429).json_body(json!({
            "message": "You are being rate limited.",
            "retry_after": 0.5,
            "global": false
        }));
    });

    let err = client_for(&server)?
        .member(GUILD, MEMBER)
        .await
        .expect_err("rate limited");
    assert!(matches!(
        err,
        ApiError::RateLimited {
            retry_after: Some(hint),
            ..
        } if hint == Duration::from_millis(500)
    ));
    Ok(())
}

#[tokio::test]
async fn other_statuses_are_reported_verbatim() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(PUT)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}/roles/{ROLE}"));
        then.status(403)
            .json_body(json!({ "message": "Missing Permissions", "code": 50013 }));
    });

    let err = client_for(&server)?
        .grant_role(GUILD, MEMBER, ROLE)
        .await
        .expect_err("forbidden");
    assert!(matches!(err, ApiError::Status { status: 403, .. }));
    Ok(())
}

#[tokio::test]
async fn malformed_member_payload_is_a_decode_error() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server.mock(|when, then| {
        when.method(GET)
            .path(format!("/api/v10/guilds/{GUILD}/members/{MEMBER}"));
        then.status(200).body("<html>gateway</html>");
    });

    let err = client_for(&server)?
        .member(GUILD, MEMBER)
        .await
        .expect_err("not json");
    assert!(matches!(err, ApiError::Decode { .. }));
    Ok(())
}
