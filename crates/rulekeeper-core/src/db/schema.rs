use sea_orm::{ConnectionTrait, DatabaseBackend, DbErr, Statement};
use tracing::info;

const SQLITE_RULES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rule_type TEXT NOT NULL,
    content TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'enabled',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
"#;

const POSTGRES_RULES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS rules (
    id BIGSERIAL PRIMARY KEY,
    rule_type VARCHAR NOT NULL,
    content TEXT NOT NULL,
    status VARCHAR NOT NULL DEFAULT 'enabled',
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)
"#;

/// 列表查询按类型和状态过滤，两列均需索引
const RULE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_rules_rule_type ON rules (rule_type)",
    "CREATE INDEX IF NOT EXISTS idx_rules_status ON rules (status)",
];

/// 创建规则表及索引（可重复执行）
pub async fn init_schema<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let table_sql = match backend {
        DatabaseBackend::Sqlite => SQLITE_RULES_TABLE,
        DatabaseBackend::Postgres => POSTGRES_RULES_TABLE,
        DatabaseBackend::MySql => {
            return Err(DbErr::Custom("MySQL backend is not supported".to_string()))
        }
    };

    db.execute(Statement::from_string(backend, table_sql.to_string()))
        .await?;

    for sql in RULE_INDEXES {
        db.execute(Statement::from_string(backend, sql.to_string()))
            .await?;
    }

    info!(backend = ?backend, "Rule schema initialized");
    Ok(())
}
