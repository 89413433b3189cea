//! The after-prepare hook
//!
//! Control flow: locate the generated project, load it, ask the plugin
//! source whether the engine plugin is installed, merge the flag into every
//! build configuration of the first target, then write the project back.
//! Nothing is written until every configuration has been updated in memory.

mod report;

pub use report::{ConfigurationOutcome, HookReport, SCHEMA_VERSION};

use std::path::PathBuf;

use chrono::Utc;

use crate::config::{ConfigError, HookConfig};
use crate::definitions::{merge, normalize, SettingValue, Staleness};
use crate::flag::Flag;
use crate::plugins::{self, MetadataError, PluginSource};
use crate::project::{self, BuildSettings, ProjectError, XcodeProject};

/// Hook failures
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("{0}")]
    NotFound(ProjectError),

    #[error("Plugin metadata query failed: {0}")]
    MetadataQuery(#[from] MetadataError),

    #[error("{0}")]
    Persist(ProjectError),

    #[error("{0}")]
    Project(ProjectError),

    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl From<ProjectError> for HookError {
    fn from(e: ProjectError) -> Self {
        match e {
            ProjectError::NotFound(_) => HookError::NotFound(e),
            ProjectError::Write { .. } => HookError::Persist(e),
            _ => HookError::Project(e),
        }
    }
}

impl HookError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            HookError::NotFound(_) => 2,
            HookError::MetadataQuery(_) => 3,
            HookError::Persist(_) => 4,
            HookError::Project(_) | HookError::Config(_) => 5,
        }
    }
}

/// Inputs for one invocation
#[derive(Debug, Clone)]
pub struct HookContext {
    pub project_root: PathBuf,
    pub config: HookConfig,
    /// Skip plugin detection and use this answer
    pub engine_override: Option<bool>,
    /// Compute everything but leave the project file alone
    pub dry_run: bool,
}

impl HookContext {
    pub fn new(project_root: impl Into<PathBuf>, config: HookConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
            engine_override: None,
            dry_run: false,
        }
    }

    /// Directory holding the generated Xcode project
    pub fn project_dir(&self) -> PathBuf {
        self.project_root.join(&self.config.platform_dir)
    }
}

/// Merge `flag` into `setting_key` of every configuration of the first target.
///
/// Mutates the in-memory project only.
pub fn apply_to_all<P: BuildSettings + ?Sized>(
    project: &mut P,
    flag: &Flag,
    staleness: Staleness,
    setting_key: &str,
) -> Result<Vec<ConfigurationOutcome>, ProjectError> {
    let target = project.first_target()?;
    let configurations = project.configurations_of(&target)?;
    tracing::debug!(
        target = %target.name,
        count = configurations.len(),
        "applying flag to build configurations"
    );

    let mut outcomes = Vec::with_capacity(configurations.len());
    for config in configurations {
        let raw = project.setting(&config, setting_key)?;
        let before = normalize(&raw).into_owned();
        let after = merge(&before, flag, staleness);
        let changed = !matches!(&raw, SettingValue::List(existing) if *existing == after);

        project.set_setting(&config, setting_key, after.clone())?;
        tracing::debug!(configuration = %config.name, changed, "merged definitions");

        outcomes.push(ConfigurationOutcome {
            name: config.name,
            id: config.id,
            before,
            after,
            changed,
        });
    }
    Ok(outcomes)
}

/// Run the hook end to end.
pub fn run(ctx: &HookContext, source: &dyn PluginSource) -> Result<HookReport, HookError> {
    let project_dir = ctx.project_dir();
    let project_name = project::locate(&project_dir)?;
    let mut project = XcodeProject::load(&project_dir, &project_name)?;
    let digest_before = project.digest();

    let engine_used = match ctx.engine_override {
        Some(used) => used,
        None => plugins::is_engine_used(source, &ctx.project_root, &ctx.config.plugin_name)?,
    };
    let flag = Flag::new(ctx.config.flag_name.clone(), u8::from(engine_used));
    tracing::info!(project = %project_name, flag = %flag, "resolved flag");

    let target = project.first_target()?;
    let configurations = apply_to_all(
        &mut project,
        &flag,
        ctx.config.staleness,
        &ctx.config.setting_key,
    )?;

    let persisted = if ctx.dry_run {
        tracing::info!("dry run, project not written");
        false
    } else {
        project.persist()?
    };

    Ok(HookReport {
        schema_version: SCHEMA_VERSION,
        created_at: Utc::now(),
        project_name,
        pbxproj_path: project.path().display().to_string(),
        target: target.name,
        engine_used,
        flag: flag.entry(),
        configurations,
        digest_before,
        digest_after: project.digest(),
        dry_run: ctx.dry_run,
        persisted,
    })
}
