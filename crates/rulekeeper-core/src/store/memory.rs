use super::RuleStore;
use crate::model::page_offset;
use crate::{NewRule, Result, Rule, RuleChanges, RuleError, RuleFilter};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// 内存规则存储
///
/// 语义与 `SeaOrmRuleStore` 一致，ID 单调递增且不复用；
/// 用于测试和本地运行
#[derive(Default)]
pub struct MemoryRuleStore {
    inner: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    rules: BTreeMap<i64, Rule>,
    last_id: i64,
}

impl MemoryRuleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryRuleStore {
    async fn len(&self) -> usize {
        self.inner.read().await.rules.len()
    }

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RuleStore for MemoryRuleStore {
    async fn insert(&self, rule: NewRule) -> Result<Rule> {
        let mut state = self.inner.write().await;
        state.last_id += 1;

        let now = Utc::now();
        let rule = Rule {
            id: state.last_id,
            rule_type: rule.rule_type,
            content: rule.content,
            status: rule.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };
        state.rules.insert(rule.id, rule.clone());

        info!(rule_id = rule.id, rule_type = %rule.rule_type, "Rule inserted");
        Ok(rule)
    }

    async fn delete_by_id(&self, id: i64) -> Result<()> {
        let mut state = self.inner.write().await;
        state.rules.remove(&id).ok_or(RuleError::NotFound(id))?;

        info!(rule_id = id, "Rule deleted");
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        let mut state = self.inner.write().await;
        let deleted = ids
            .iter()
            .filter(|id| state.rules.remove(*id).is_some())
            .count() as u64;

        info!(requested = ids.len(), deleted, "Rules deleted in batch");
        Ok(deleted)
    }

    async fn update(&self, id: i64, changes: RuleChanges) -> Result<Rule> {
        let mut state = self.inner.write().await;
        let rule = state.rules.get_mut(&id).ok_or(RuleError::NotFound(id))?;

        changes.apply_to(rule);
        rule.updated_at = Utc::now();

        info!(rule_id = id, "Rule updated");
        Ok(rule.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Rule>> {
        let state = self.inner.read().await;
        let rule = state.rules.get(&id).cloned();

        debug!(rule_id = id, found = rule.is_some(), "Rule lookup in memory");
        Ok(rule)
    }

    async fn find_page(
        &self,
        filter: &RuleFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<Rule>, u64)> {
        let state = self.inner.read().await;
        let matching: Vec<&Rule> = state.rules.values().filter(|r| filter.matches(r)).collect();
        let total = matching.len() as u64;

        let rules = matching
            .into_iter()
            .skip(page_offset(page, page_size) as usize)
            .take(page_size as usize)
            .cloned()
            .collect::<Vec<_>>();

        debug!(count = rules.len(), total, page, page_size, "Rules listed from memory");
        Ok((rules, total))
    }
}
