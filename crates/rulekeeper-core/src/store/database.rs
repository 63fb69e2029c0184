use super::RuleStore;
use crate::db::{converter, rule};
use crate::model::page_offset;
use crate::{NewRule, Result, Rule, RuleChanges, RuleError, RuleFilter};
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use std::sync::Arc;
use tracing::{debug, info};

/// 基于 sea-orm 的规则存储
///
/// 支持 SQLite 与 PostgreSQL，表结构由 `db::init_schema` 创建
pub struct SeaOrmRuleStore {
    /// 数据库连接
    db: Arc<DatabaseConnection>,
}

impl SeaOrmRuleStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// 创建规则表及索引
    pub async fn init_schema(&self) -> Result<()> {
        crate::db::init_schema(&*self.db).await?;
        Ok(())
    }

    fn filtered(&self, filter: &RuleFilter) -> Select<rule::Entity> {
        let mut query = rule::Entity::find();

        if let Some(rule_type) = &filter.rule_type {
            query = query.filter(rule::Column::RuleType.eq(rule_type.as_str()));
        }
        if let Some(status) = &filter.status {
            query = query.filter(rule::Column::Status.eq(status.as_str()));
        }
        if let Some(keyword) = &filter.content {
            query = query.filter(content_contains(self.db.get_database_backend(), keyword));
        }

        query
    }
}

/// 内容关键词按字面、区分大小写匹配，与 `RuleFilter::matches` 一致；
/// LIKE 会把 `_`、`%` 当作通配符且在 SQLite 中忽略大小写，因此不用 LIKE
fn content_contains(backend: DatabaseBackend, keyword: &str) -> SimpleExpr {
    let sql = match backend {
        DatabaseBackend::Postgres => "strpos(content, ?) > 0",
        _ => "instr(content, ?) > 0",
    };
    Expr::cust_with_values(sql, [keyword.to_string()])
}

#[async_trait]
impl RuleStore for SeaOrmRuleStore {
    async fn insert(&self, rule: NewRule) -> Result<Rule> {
        let active_model = converter::to_active_model(rule, Utc::now());
        let model = active_model.insert(&*self.db).await?;

        info!(rule_id = model.id, rule_type = %model.rule_type, "Rule inserted");
        Rule::try_from(model)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let result = rule::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(RuleError::NotFound(id));
        }

        info!(rule_id = id, "Rule deleted");
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = rule::Entity::delete_many()
            .filter(rule::Column::Id.is_in(ids.iter().copied()))
            .exec(&*self.db)
            .await?;

        info!(
            requested = ids.len(),
            deleted = result.rows_affected,
            "Rules deleted in batch"
        );
        Ok(result.rows_affected)
    }

    async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
        let mut query = rule::Entity::update_many()
            .col_expr(rule::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(rule::Column::Id.eq(id));

        if let Some(rule_type) = changes.rule_type {
            query = query.col_expr(rule::Column::RuleType, Expr::value(rule_type));
        }
        if let Some(content) = changes.content {
            query = query.col_expr(rule::Column::Content, Expr::value(content));
        }
        if let Some(status) = changes.status {
            query = query.col_expr(rule::Column::Status, Expr::value(status.as_str()));
        }

        let result = query.exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(RuleError::NotFound(id));
        }

        info!(rule_id = id, "Rule updated");

        // 并发删除时更新后的读取可能落空
        self.find_by_id(id).await?.ok_or(RuleError::NotFound(id))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Rule>> {
        let model = rule::Entity::find_by_id(id).one(&*self.db).await?;

        match model {
            Some(model) => {
                debug!(rule_id = id, "Rule found in database");
                Ok(Some(Rule::try_from(model)?))
            }
            None => {
                debug!(rule_id = id, "Rule not found");
                Ok(None)
            }
        }
    }

    async fn find_page(
        &self,
        filter: &RuleFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Rule>, u64)> {
        let query = self.filtered(filter);
        let total = query.clone().count(&*self.db).await?;

        // 超出范围的页直接返回；limit 不超过剩余条数，保证能转换为 i64
        let offset = page_offset(page, page_size);
        if page_size == 0 || offset >= total {
            return Ok((Vec::new(), total));
        }
        let limit = page_size.min(total - offset);

        let models = query
            .order_by_asc(rule::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(&*self.db)
            .await?;

        let rules = models
            .into_iter()
            .map(Rule::try_from)
            .collect::<Result<Vec<_>>>()?;

        debug!(count = rules.len(), total, page, page_size, "Rules listed from database");
        Ok((rules, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleStatus;
    use sea_orm::Database;

    async fn create_test_store() -> SeaOrmRuleStore {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        let store = SeaOrmRuleStore::new(Arc::new(db));
        store.init_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = create_test_store().await;

        let first = store.insert(NewRule::new("github", "AKIA")).await.unwrap();
        let second = store
            .insert(NewRule::new("github", "ghp_").with_status(RuleStatus::Disabled))
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(first.status, RuleStatus::Enabled);
        assert_eq!(second.status, RuleStatus::Disabled);
    }

    #[tokio::test]
    async fn test_delete_missing_rule() {
        let store = create_test_store().await;

        let result = store.delete_by_id(42).await;
        assert!(matches!(result.unwrap_err(), RuleError::NotFound(42)));
    }

    #[tokio::test]
    async fn test_delete_by_ids_tolerates_unknown_and_duplicates() {
        let store = create_test_store().await;
        let a = store.insert(NewRule::new("github", "a")).await.unwrap();
        let b = store.insert(NewRule::new("github", "b")).await.unwrap();
        store.insert(NewRule::new("github", "c")).await.unwrap();

        let deleted = store.delete_by_ids(&[a.id, a.id, b.id, 999]).await.unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(store.delete_by_ids(&[]).await.unwrap(), 0);

        let (rules, total) = store.find_page(&RuleFilter::default(), 1, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rules[0].content, "c");
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let store = create_test_store().await;
        let rule = store.insert(NewRule::new("github", "AKIA")).await.unwrap();

        let updated = store
            .update(rule.id, RuleChanges::status(RuleStatus::Disabled))
            .await
            .unwrap();

        assert_eq!(updated.rule_type, "github");
        assert_eq!(updated.content, "AKIA");
        assert_eq!(updated.status, RuleStatus::Disabled);
        assert_eq!(updated.created_at, rule.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_rule() {
        let store = create_test_store().await;

        let result = store.update(5, RuleChanges::status(RuleStatus::Enabled)).await;
        assert!(result.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_page_filters() {
        let store = create_test_store().await;
        store.insert(NewRule::new("github", "AKIA-1")).await.unwrap();
        store
            .insert(NewRule::new("github", "ghp-2").with_status(RuleStatus::Disabled))
            .await
            .unwrap();
        store.insert(NewRule::new("gitlab", "AKIA-3")).await.unwrap();

        let filter = RuleFilter {
            rule_type: Some("github".to_string()),
            ..Default::default()
        };
        let (_, total) = store.find_page(&filter, 1, 10).await.unwrap();
        assert_eq!(total, 2);

        let filter = RuleFilter {
            content: Some("AKIA".to_string()),
            status: Some(RuleStatus::Enabled),
            ..Default::default()
        };
        let (rules, total) = store.find_page(&filter, 1, 10).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rules[0].content, "AKIA-1");
        assert_eq!(rules[1].content, "AKIA-3");
    }

    #[tokio::test]
    async fn test_find_page_huge_page_values() {
        let store = create_test_store().await;
        for i in 0..3 {
            store
                .insert(NewRule::new("github", format!("rule-{}", i)))
                .await
                .unwrap();
        }
        let filter = RuleFilter::default();

        let (rules, total) = store.find_page(&filter, u64::MAX, 20).await.unwrap();
        assert!(rules.is_empty());
        assert_eq!(total, 3);

        let (rules, total) = store.find_page(&filter, 1, u64::MAX).await.unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(total, 3);

        let (rules, _) = store.find_page(&filter, u64::MAX, u64::MAX).await.unwrap();
        assert!(rules.is_empty());
    }

    #[tokio::test]
    async fn test_content_filter_is_literal_and_case_sensitive() {
        let store = create_test_store().await;
        for content in ["ghp_abc", "ghpXabc", "GHP_ABC", "100%"] {
            store.insert(NewRule::new("github", content)).await.unwrap();
        }

        let by_content = |keyword: &str| RuleFilter {
            content: Some(keyword.to_string()),
            ..Default::default()
        };
        assert_eq!(store.find_page(&by_content("ghp_"), 1, 10).await.unwrap().1, 1);
        assert_eq!(store.find_page(&by_content("%"), 1, 10).await.unwrap().1, 1);
        assert_eq!(store.find_page(&by_content("ghp"), 1, 10).await.unwrap().1, 2);
    }

    #[tokio::test]
    async fn test_find_page_zero_page_size() {
        let store = create_test_store().await;
        store.insert(NewRule::new("github", "a")).await.unwrap();

        let (rules, total) = store.find_page(&RuleFilter::default(), 1, 0).await.unwrap();
        assert!(rules.is_empty());
        assert_eq!(total, 1);
    }
}
