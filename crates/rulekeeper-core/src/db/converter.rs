use super::rule;
use crate::{NewRule, Rule, RuleError, RuleStatus};
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::DbErr;

/// NewRule 到数据库实体的转换（ID 由数据库自增分配）
pub(crate) fn to_active_model(rule: NewRule, now: DateTime<Utc>) -> rule::ActiveModel {
    rule::ActiveModel {
        id: NotSet,
        rule_type: Set(rule.rule_type),
        content: Set(rule.content),
        status: Set(rule.status.unwrap_or_default().as_str().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

impl TryFrom<rule::Model> for Rule {
    type Error = RuleError;

    fn try_from(model: rule::Model) -> Result<Self, Self::Error> {
        let status = model.status.parse::<RuleStatus>().map_err(|_| {
            RuleError::Store(DbErr::Type(format!(
                "rule {} has corrupt status `{}`",
                model.id, model.status
            )))
        })?;

        Ok(Self {
            id: model.id,
            rule_type: model.rule_type,
            content: model.content,
            status,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(status: &str) -> rule::Model {
        let now = Utc::now();
        rule::Model {
            id: 7,
            rule_type: "gitlab".to_string(),
            content: "glpat-".to_string(),
            status: status.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_model_to_rule() {
        let rule = Rule::try_from(model("disabled")).unwrap();
        assert_eq!(rule.id, 7);
        assert_eq!(rule.status, RuleStatus::Disabled);
    }

    #[test]
    fn test_corrupt_status_is_store_error() {
        let err = Rule::try_from(model("1")).unwrap_err();
        assert!(matches!(err, RuleError::Store(_)));
    }

    #[test]
    fn test_new_rule_defaults_to_enabled() {
        let active = to_active_model(NewRule::new("github", "token"), Utc::now());
        assert_eq!(active.status, Set("enabled".to_string()));
        assert_eq!(active.id, NotSet);
    }
}
