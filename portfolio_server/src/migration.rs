//! Schema migration and optional first-run seeding.

use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl, SimpleAsyncConnection};

use crate::schema::portfolio_profile;

/// SQL migration for the portfolio tables.
///
/// Idempotent: safe to run on every startup, including against databases
/// created before the avatar blob column existed.
pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS portfolio_profile (
    id              SERIAL PRIMARY KEY,
    name            TEXT,
    role            TEXT,
    bio             TEXT,
    avatar_url      TEXT,
    avatar_data     BYTEA,
    github_link     TEXT,
    linkedin_link   TEXT,
    resume_link     TEXT
);

ALTER TABLE portfolio_profile ADD COLUMN IF NOT EXISTS avatar_data BYTEA;

CREATE TABLE IF NOT EXISTS portfolio_projects (
    id              SERIAL PRIMARY KEY,
    title           TEXT NOT NULL,
    description     TEXT,
    github_link     TEXT,
    project_link    TEXT,
    doc_link        TEXT,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

ALTER TABLE portfolio_projects DROP CONSTRAINT IF EXISTS portfolio_projects_title_check;
ALTER TABLE portfolio_projects
    ADD CONSTRAINT portfolio_projects_title_check CHECK (title ~ '\S') NOT VALID;

CREATE INDEX IF NOT EXISTS idx_portfolio_projects_created
    ON portfolio_projects (created_at DESC, id DESC);
"#;

/// Run the portfolio migration.
pub async fn run_migration(conn: &mut AsyncPgConnection) -> anyhow::Result<()> {
    conn.batch_execute(MIGRATION_SQL)
        .await
        .map_err(|e| anyhow::anyhow!("portfolio migration failed: {e}"))?;
    Ok(())
}

/// Insert a placeholder profile when none exists yet.
///
/// Returns `true` when a row was inserted.
pub async fn seed_profile(conn: &mut AsyncPgConnection) -> anyhow::Result<bool> {
    let count: i64 = portfolio_profile::table.count().get_result(conn).await?;
    if count > 0 {
        return Ok(false);
    }

    diesel::insert_into(portfolio_profile::table)
        .values((
            portfolio_profile::name.eq("Your Name"),
            portfolio_profile::role.eq("Software Developer"),
            portfolio_profile::bio.eq("Tell visitors what you build."),
            portfolio_profile::avatar_url.eq("avatar.svg"),
            portfolio_profile::github_link.eq("https://github.com/"),
            portfolio_profile::linkedin_link.eq("https://www.linkedin.com/"),
            portfolio_profile::resume_link.eq("#"),
        ))
        .execute(conn)
        .await?;

    tracing::info!("Seeded placeholder profile");
    Ok(true)
}
