use anyhow::{Context, Result, bail};
use corral::domain::constants::SPECS_DIR;
use corral::kernel::hooks::{HookContext, HookRegistry, LifecycleEvent};
use corral::kernel::server::ApiState;
use corral::prelude::Profile;
use corral_database::{Migration, MigrationReport};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

/// Writes the OpenAPI JSON snapshot to `<cwd>/specs/openapi.json`.
pub(crate) fn write_openapi_snapshot(
    cwd: &Path,
    api_doc: &utoipa::openapi::OpenApi,
) -> Result<()> {
    let specs = cwd.join(SPECS_DIR);
    fs::create_dir_all(&specs)
        .with_context(|| format!("Failed to create {}", specs.display()))?;

    let file = fs::File::create(specs.join("openapi.json"))
        .context("Failed to create the OpenAPI snapshot file")?;
    serde_json::to_writer(file, api_doc).context("Failed to serialize the OpenAPI document")?;

    info!("OpenAPI specifications saved to {}", specs.display());
    Ok(())
}

/// Whether the startup lifecycle should launch the migration sequence.
pub(crate) fn migration_requested(profile: &Profile, state: &ApiState) -> bool {
    profile.database.upgrade_at_start && state.database.is_some()
}

/// Handle to the background migration sequence.
///
/// The startup lifecycle spawns the sequence and keeps serving without
/// waiting for it; callers that need the outcome can [`MigrationTask::join`]
/// it, everyone else may simply drop the handle (the task keeps running).
#[derive(Debug)]
pub struct MigrationTask {
    handle: JoinHandle<Result<MigrationReport>>,
}

impl MigrationTask {
    pub(crate) fn spawn(
        state: ApiState,
        hooks: Arc<HookRegistry>,
        migrations: Vec<Migration>,
    ) -> Self {
        Self { handle: tokio::spawn(run_migration_sequence(state, hooks, migrations)) }
    }

    /// Waits for the sequence and returns its report.
    ///
    /// # Errors
    /// Returns hook/migration failures, or a panic of the task itself.
    pub async fn join(self) -> Result<MigrationReport> {
        self.handle.await.context("Migration task panicked")?
    }

    /// Cancels the sequence. Never called by the startup lifecycle; offered
    /// to embedders that own the handle.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// `before_migration` -> migration execution -> `after_migration`, strictly
/// in that order.
async fn run_migration_sequence(
    state: ApiState,
    hooks: Arc<HookRegistry>,
    migrations: Vec<Migration>,
) -> Result<MigrationReport> {
    let ctx = HookContext { profile: state.profile.clone() };

    hooks.fire(LifecycleEvent::BeforeMigration, &ctx)?;

    let Some(database) = state.database.as_ref() else {
        bail!("Migration sequence requires a configured database");
    };
    info!("Running migration");
    let report = database.migrate(&migrations).await.context("Migration execution failed")?;
    info!(applied = report.applied.len(), skipped = report.skipped.len(), "Migration finished");

    hooks.fire(LifecycleEvent::AfterMigration, &ctx)?;

    Ok(report)
}
