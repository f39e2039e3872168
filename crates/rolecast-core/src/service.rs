//! Remote-service traits implemented by HTTP adapters and test fakes.

use async_trait::async_trait;

use crate::error::{ApiResult, FetchResult};
use crate::model::{MemberSnapshot, TargetId};
use crate::parse::parse_targets;

/// Guild-scoped member API used to grant and verify roles.
#[async_trait]
pub trait GuildApi: Send + Sync {
    /// Grant `role_id` to `member_id` within `guild_id`.
    async fn grant_role(&self, guild_id: &str, member_id: &str, role_id: &str) -> ApiResult<()>;

    /// Read the member's current state, bypassing any local cache.
    async fn member(&self, guild_id: &str, member_id: &str) -> ApiResult<MemberSnapshot>;
}

/// Remote text source listing target identifiers, one per line.
#[async_trait]
pub trait TargetSource: Send + Sync {
    /// Fetch the raw text published under `source_id`.
    async fn fetch_raw(&self, source_id: &str) -> FetchResult<String>;

    /// Fetch and parse `source_id`; an empty list is a valid result.
    async fn fetch(&self, source_id: &str) -> FetchResult<Vec<TargetId>> {
        let raw = self.fetch_raw(source_id).await?;
        Ok(parse_targets(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;

    struct StaticSource(&'static str);

    #[async_trait]
    impl TargetSource for StaticSource {
        async fn fetch_raw(&self, source_id: &str) -> FetchResult<String> {
            if source_id == "missing" {
                return Err(FetchError::Status {
                    url: format!("memory://{source_id}"),
                    status: 404,
                });
            }
            Ok(self.0.to_string())
        }
    }

    #[tokio::test]
    async fn fetch_parses_raw_text() -> anyhow::Result<()> {
        let source = StaticSource("junk\n12345678901234567\r\n98765432109876543\n");
        let targets = source.fetch("abc").await?;
        let ids: Vec<&str> = targets.iter().map(TargetId::as_str).collect();
        assert_eq!(ids, vec!["12345678901234567", "98765432109876543"]);
        Ok(())
    }

    #[tokio::test]
    async fn fetch_propagates_source_errors() {
        let source = StaticSource("");
        let err = source.fetch("missing").await.expect_err("missing source");
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }
}
