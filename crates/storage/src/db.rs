use chrono::NaiveDate;
use sqlx::{sqlite::SqlitePoolOptions, Pool, QueryBuilder, Sqlite};
use std::path::Path;
use tally_core::{Direction, Money, NewLedgerTransaction};
use uuid::Uuid;

pub type DbPool = Pool<Sqlite>;

pub async fn create_db(path: &Path) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await?;

    configure(&pool).await?;
    run_migrations(&pool).await?;

    Ok(pool)
}

/// In-memory database for tests and ephemeral runs. A single pinned
/// connection keeps the database alive for the lifetime of the pool.
pub async fn create_in_memory_db() -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    configure(&pool).await?;
    run_migrations(&pool).await?;

    Ok(pool)
}

async fn configure(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA synchronous = NORMAL")
        .execute(pool)
        .await?;
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(pool)
        .await?;
    Ok(())
}

async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS organizations (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accounts (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            name TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (organization_id) REFERENCES organizations(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS transactions (
            id TEXT PRIMARY KEY,
            organization_id TEXT NOT NULL,
            account_id TEXT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount_cents INTEGER NOT NULL CHECK (amount_cents >= 0),
            direction TEXT NOT NULL CHECK (direction IN ('debit', 'credit')),
            category TEXT,
            vendor TEXT,
            source_account_name TEXT NOT NULL,
            import_channel TEXT NOT NULL,
            import_origin TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            FOREIGN KEY (organization_id) REFERENCES organizations(id),
            FOREIGN KEY (account_id) REFERENCES accounts(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_transactions_org ON transactions(organization_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn insert_organization(pool: &DbPool, id: &str, name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO organizations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn insert_account(
    pool: &DbPool,
    id: &str,
    organization_id: &str,
    name: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO accounts (id, organization_id, name) VALUES (?, ?, ?)")
        .bind(id)
        .bind(organization_id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

/// Look up an account's display name. Scoped by organization so an account id
/// belonging to another tenant never resolves.
pub async fn get_account_name(
    pool: &DbPool,
    organization_id: &str,
    account_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    let row = sqlx::query_as::<_, (String,)>(
        "SELECT name FROM accounts WHERE id = ? AND organization_id = ?",
    )
    .bind(account_id)
    .bind(organization_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0))
}

/// Insert the whole batch as one statement and report the store's row count.
/// A failure rejects the entire batch; there is no partial success.
pub async fn insert_transactions(
    pool: &DbPool,
    rows: &[NewLedgerTransaction],
) -> Result<u64, sqlx::Error> {
    if rows.is_empty() {
        return Ok(0);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "INSERT INTO transactions (id, organization_id, account_id, date, description, \
         amount_cents, direction, category, vendor, source_account_name, import_channel, \
         import_origin) ",
    );
    qb.push_values(rows, |mut b, row| {
        b.push_bind(Uuid::new_v4().to_string())
            .push_bind(&row.organization_id)
            .push_bind(&row.account_id)
            .push_bind(row.date)
            .push_bind(&row.description)
            .push_bind(row.amount.to_cents())
            .push_bind(row.direction.as_str())
            .push_bind(&row.category)
            .push_bind(&row.vendor)
            .push_bind(&row.source_account_name)
            .push_bind(&row.import_channel)
            .push_bind(&row.import_origin);
    });

    let result = qb.build().execute(pool).await?;
    Ok(result.rows_affected())
}

#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub id: String,
    pub organization_id: String,
    pub account_id: Option<String>,
    pub date: NaiveDate,
    pub description: String,
    pub amount: Money,
    pub direction: Direction,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub source_account_name: String,
    pub import_channel: String,
    pub import_origin: String,
}

type StoredRow = (
    String,
    String,
    Option<String>,
    NaiveDate,
    String,
    i64,
    String,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
);

pub async fn get_transactions_for_org(
    pool: &DbPool,
    organization_id: &str,
) -> Result<Vec<StoredTransaction>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StoredRow>(
        "SELECT id, organization_id, account_id, date, description, amount_cents, direction, \
         category, vendor, source_account_name, import_channel, import_origin \
         FROM transactions WHERE organization_id = ? ORDER BY date, id",
    )
    .bind(organization_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| StoredTransaction {
            id: r.0,
            organization_id: r.1,
            account_id: r.2,
            date: r.3,
            description: r.4,
            amount: Money::from_cents(r.5),
            direction: r.6.parse().unwrap_or(Direction::Credit),
            category: r.7,
            vendor: r.8,
            source_account_name: r.9,
            import_channel: r.10,
            import_origin: r.11,
        })
        .collect())
}
