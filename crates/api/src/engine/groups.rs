//! Group membership and group-filtered rankings.

use super::error::StoreContext;
use super::{Engine, EngineError, GROUP_CACHE_TTL_SECS, MAX_GROUP_NAME_LEN, Ranking, group_key};
use crate::models::Article;

/// Group names are non-empty so a derived ranking key never equals the
/// global ranking it was built from.
fn check_group(group: &str) -> Result<(), EngineError> {
    if group.is_empty() || group.chars().count() > MAX_GROUP_NAME_LEN {
        return Err(EngineError::InvalidGroup(group.to_string()));
    }
    Ok(())
}

impl Engine {
    /// Add an article to each group. Already-present memberships are kept.
    pub async fn add_to_groups(
        &self,
        article_key: &str,
        groups: &[String],
    ) -> Result<(), EngineError> {
        groups.iter().try_for_each(|g| check_group(g))?;

        if !self
            .store
            .exists(article_key)
            .await
            .store_op("exists", article_key)?
        {
            return Err(EngineError::NotFound {
                key: article_key.to_string(),
            });
        }

        for group in groups {
            let key = group_key(group);
            self.store
                .sadd(&key, article_key)
                .await
                .store_op("sadd", &key)?;
        }

        tracing::info!(article = %article_key, ?groups, "added to groups");
        Ok(())
    }

    /// Remove an article from each group. Absent memberships are ignored.
    pub async fn remove_from_groups(
        &self,
        article_key: &str,
        groups: &[String],
    ) -> Result<(), EngineError> {
        groups.iter().try_for_each(|g| check_group(g))?;

        for group in groups {
            let key = group_key(group);
            self.store
                .srem(&key, article_key)
                .await
                .store_op("srem", &key)?;
        }

        tracing::info!(article = %article_key, ?groups, "removed from groups");
        Ok(())
    }

    /// Key of the ranking restricted to a group's members.
    ///
    /// The intersection is cached under `{ranking_key}{group}` for
    /// [`GROUP_CACHE_TTL_SECS`], written together with its TTL. A cached entry is reused as is, so
    /// membership changes show up only once it expires.
    pub async fn group_ranking(
        &self,
        group: &str,
        ranking_key: &str,
    ) -> Result<String, EngineError> {
        check_group(group)?;
        let cached = format!("{ranking_key}{group}");

        if self.store.exists(&cached).await.store_op("exists", &cached)? {
            return Ok(cached);
        }

        let members = group_key(group);
        let count = self
            .store
            .zinterstore(&cached, &members, ranking_key, GROUP_CACHE_TTL_SECS)
            .await
            .store_op("zinterstore", &cached)?;

        tracing::debug!(group, ranking = ranking_key, count, "group ranking rebuilt");
        Ok(cached)
    }

    /// One page of a global ranking restricted to a group.
    pub async fn group_articles(
        &self,
        group: &str,
        ranking: Ranking,
        page: u32,
    ) -> Result<Vec<Article>, EngineError> {
        let key = self.group_ranking(group, ranking.key()).await?;
        self.list_articles(&key, page).await
    }
}
