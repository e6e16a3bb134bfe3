use anyhow::{Context, Result};
use dacpac_lifecycle::cli::commands::{ModifyCommand, ScaffoldCommand, ScriptCommand, ValidateCommand};
use dacpac_lifecycle::cli::output::*;
use dacpac_lifecycle::cli::{Cli, Command};
use dacpac_lifecycle::core::{
    DeploySourcePaths, DeployTargetPaths, DirectoryPaths, PathCollection, SqlProject, SqlProjectProperties,
};
use dacpac_lifecycle::execution::units::LATEST_DIRECTORY;
use dacpac_lifecycle::services::{DacpacModelReader, LocalFileSystem, StaticSqlProjectService};
use dacpac_lifecycle::{
    CancellationFlag, Collaborators, ConfigurationModel, ModifierPipeline, RunSummary, ScaffoldingService,
    ScriptCreationService, ScriptModificationModel,
};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let success = match &cli.command {
        Command::Scaffold(cmd) => scaffold(cmd).await?,
        Command::Script(cmd) => create_script(cmd).await?,
        Command::Modify(cmd) => modify_script(cmd).await?,
        Command::Validate(cmd) => validate_configuration(cmd)?,
    };

    if !success {
        std::process::exit(1);
    }
    Ok(())
}

fn load_configuration(path: &Path) -> Result<ConfigurationModel> {
    ConfigurationModel::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))
}

/// Cancellation flag set on the first Ctrl-C
fn cancel_on_ctrl_c() -> CancellationFlag {
    let cancel = CancellationFlag::new();
    let flag = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Cancellation requested, stopping after the current step");
            flag.cancel();
        }
    });
    cancel
}

fn report(summary: &RunSummary) -> bool {
    println!("{}", format_summary(summary));
    summary.is_success()
}

async fn scaffold(cmd: &ScaffoldCommand) -> Result<bool> {
    let configuration = load_configuration(&cmd.project.config)?;
    let (project, properties) = cmd.project.project();

    println!(
        "{}Scaffolding {} {}",
        ROCKET,
        style(&project.name).bold(),
        style(cmd.project.dac_version).cyan()
    );

    let collaborators = Collaborators::production(Arc::new(StaticSqlProjectService::new(properties)));
    let spinner = create_spinner("Scaffolding");
    let service = ScaffoldingService::new(&collaborators).with_observer(spinner_observer(spinner));

    let summary = service.scaffold(project, configuration, &cancel_on_ctrl_c()).await;
    Ok(report(&summary))
}

async fn create_script(cmd: &ScriptCommand) -> Result<bool> {
    let configuration = load_configuration(&cmd.project.config)?;
    let (project, properties) = cmd.project.project();

    let target = if cmd.latest {
        LATEST_DIRECTORY.to_string()
    } else {
        cmd.project.dac_version.to_string()
    };
    println!(
        "{}Creating the deploy script of {} from {} to {}",
        ROCKET,
        style(&project.name).bold(),
        style(cmd.previous_version).cyan(),
        style(target).cyan()
    );

    let collaborators = Collaborators::production(Arc::new(StaticSqlProjectService::new(properties)));
    let spinner = create_spinner("Creating deploy script");
    let service = ScriptCreationService::new(&collaborators).with_observer(spinner_observer(spinner));

    let summary = service
        .create(
            project,
            configuration,
            cmd.previous_version,
            cmd.latest,
            &cancel_on_ctrl_c(),
        )
        .await;
    Ok(report(&summary))
}

async fn modify_script(cmd: &ModifyCommand) -> Result<bool> {
    let configuration = load_configuration(&cmd.config)?;

    let script_directory = cmd.script.parent().unwrap_or_else(|| Path::new(""));
    let new_artifacts_directory = cmd.new_dacpac.parent().unwrap_or(script_directory);
    let paths = PathCollection {
        directories: DirectoryPaths {
            project_directory: script_directory.to_path_buf(),
            latest_artifacts_directory: new_artifacts_directory
                .parent()
                .unwrap_or(new_artifacts_directory)
                .join(LATEST_DIRECTORY),
            new_artifacts_directory: new_artifacts_directory.to_path_buf(),
        },
        deploy_sources: DeploySourcePaths {
            new_dacpac_path: cmd.new_dacpac.clone(),
            publish_profile_path: None,
            previous_dacpac_path: Some(cmd.previous_dacpac.clone()),
        },
        deploy_targets: DeployTargetPaths {
            deploy_script_path: Some(cmd.script.clone()),
            deploy_report_path: None,
        },
    };

    let mut project = SqlProject::new(format!("{}.sqlproj", cmd.target_name));
    project.properties = SqlProjectProperties {
        sql_target_name: Some(cmd.target_name.clone()),
        binary_directory: None,
        dac_version: Some(cmd.dac_version),
    };

    let pipeline = ModifierPipeline::new(Arc::new(DacpacModelReader));
    let result = pipeline
        .modify_file(&LocalFileSystem, &cmd.script, |script| {
            ScriptModificationModel::new(
                script,
                &project,
                &configuration,
                &paths,
                &cmd.previous_version,
                cmd.latest,
            )
        })
        .await;

    match result {
        Ok(applied) => {
            println!("{}", format_applied_modifiers(&applied));
            Ok(true)
        }
        Err(e) => {
            error!("{:#}", anyhow::Error::from(e));
            println!("{}{} was not modified", CROSS, style(cmd.script.display()).bold());
            Ok(false)
        }
    }
}

fn validate_configuration(cmd: &ValidateCommand) -> Result<bool> {
    println!("{}Validating configuration...", INFO);

    match ConfigurationModel::from_file(&cmd.config) {
        Ok(configuration) => {
            println!("{}Configuration is valid!", CHECK);
            println!("  Artifacts: {}", style(&configuration.artifacts_path).bold());
            println!("  Version pattern: {}", style(&configuration.version_pattern).cyan());

            if cmd.json {
                let json = serde_json::to_string_pretty(&configuration)?;
                println!("\n{}", json);
            }
            Ok(true)
        }
        Err(e) => {
            println!("{}Validation failed:", CROSS);
            println!("  {}", style(e).red());
            Ok(false)
        }
    }
}
