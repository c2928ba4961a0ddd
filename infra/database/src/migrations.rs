use crate::Backend;
use crate::error::{DatabaseError, DatabaseErrorExt};
use sha2::{Digest, Sha256};
use sqlx::{AnyPool, Row};
use std::collections::HashMap;

const TRACKING_TABLE: &str = "_corral_migrations";

/// One schema migration: a keyed, versioned script with a content checksum.
///
/// Hosting projects export these from their model modules; the loader
/// collects them and the runner applies them in declaration order.
#[derive(Debug, Clone)]
pub struct Migration {
    key: String,
    version: String,
    script: String,
    checksum: String,
}

impl Migration {
    /// Builds a migration; the checksum is the hex SHA-256 of the script.
    pub fn new(key: impl Into<String>, version: impl Into<String>, script: impl Into<String>) -> Self {
        let script = script.into();
        let checksum = hex::encode(Sha256::digest(script.as_bytes()));
        Self { key: key.into(), version: version.into(), script, checksum }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    fn tracking_key(&self) -> String {
        format!("{}:{}", self.key, self.version)
    }

    fn to_applied(&self) -> AppliedMigration {
        AppliedMigration {
            key: self.key.clone(),
            version: self.version.clone(),
            checksum: self.checksum.clone(),
        }
    }
}

/// A migration recorded in the tracking table.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    pub key: String,
    pub version: String,
    pub checksum: String,
}

/// Outcome of one runner pass.
#[derive(Debug, Default)]
pub struct MigrationReport {
    pub applied: Vec<AppliedMigration>,
    pub skipped: Vec<AppliedMigration>,
}

/// Applies migrations inside transactions, tracking them in
/// `_corral_migrations` and verifying checksums on replays.
#[derive(Debug)]
pub struct MigrationRunner {
    pool: AnyPool,
    backend: Backend,
}

impl MigrationRunner {
    #[must_use]
    pub const fn new(pool: AnyPool, backend: Backend) -> Self {
        Self { pool, backend }
    }

    /// Runs every pending migration, skipping already-applied versions.
    ///
    /// # Errors
    /// [`DatabaseError::Migration`] on checksum drift, [`DatabaseError::Sql`]
    /// when a script or the tracking table fails.
    pub async fn run(&self, migrations: &[Migration]) -> Result<MigrationReport, DatabaseError> {
        self.ensure_tracking_table().await?;

        let mut report = MigrationReport::default();
        let applied = self.applied_migrations().await?;

        for migration in migrations {
            if let Some(existing) = applied.get(&migration.tracking_key()) {
                ensure_checksum_match(migration, &existing.checksum)?;
                report.skipped.push(migration.to_applied());
                continue;
            }

            self.apply(migration).await?;
            report.applied.push(migration.to_applied());
        }

        Ok(report)
    }

    async fn ensure_tracking_table(&self) -> Result<(), DatabaseError> {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {TRACKING_TABLE} (
                migration_key VARCHAR(255) NOT NULL,
                version VARCHAR(64) NOT NULL,
                checksum VARCHAR(64) NOT NULL,
                PRIMARY KEY (migration_key, version)
            )"
        );
        sqlx::query(&ddl)
            .execute(&self.pool)
            .await
            .context("Creating the migration tracking table")?;
        Ok(())
    }

    async fn apply(&self, migration: &Migration) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await.context("Opening migration transaction")?;

        sqlx::query(&migration.script).execute(&mut *tx).await.context(format!(
            "SQL execution failed at {}:{}",
            migration.key, migration.version
        ))?;

        let insert = format!(
            "INSERT INTO {TRACKING_TABLE} (migration_key, version, checksum) VALUES ({})",
            self.backend.placeholders(3)
        );
        sqlx::query(&insert)
            .bind(&migration.key)
            .bind(&migration.version)
            .bind(&migration.checksum)
            .execute(&mut *tx)
            .await
            .context("Recording applied migration")?;

        tx.commit().await.context("Committing migration")?;
        Ok(())
    }

    async fn applied_migrations(
        &self,
    ) -> Result<HashMap<String, AppliedMigration>, DatabaseError> {
        let query = format!("SELECT migration_key, version, checksum FROM {TRACKING_TABLE}");
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .await
            .context("Loading applied migrations")?;

        let mut applied = HashMap::with_capacity(rows.len());
        for row in rows {
            let entry = AppliedMigration {
                key: row.try_get::<String, _>("migration_key").context("Parsing migration key")?,
                version: row.try_get::<String, _>("version").context("Parsing version")?,
                checksum: row.try_get::<String, _>("checksum").context("Parsing checksum")?,
            };
            applied.insert(format!("{}:{}", entry.key, entry.version), entry);
        }

        Ok(applied)
    }
}

fn ensure_checksum_match(migration: &Migration, existing: &str) -> Result<(), DatabaseError> {
    if existing != migration.checksum {
        return Err(DatabaseError::Migration {
            message: format!(
                "Checksum mismatch for {}:{} (expected {}, got {})",
                migration.key, migration.version, existing, migration.checksum
            )
            .into(),
            context: Some("Migration already applied with a different script".into()),
        });
    }
    Ok(())
}
