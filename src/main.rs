//! webview-flag CLI
//!
//! Entry point for the `webview-flag` hook binary.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing::level_filters::LevelFilter;
use webview_flag::definitions::normalize;
use webview_flag::project::{self, BuildSettings};
use webview_flag::{
    hook, EffectiveConfig, HookContext, HookError, ProjectMetadata, StaticPlugins, XcodeProject,
};

#[derive(Parser)]
#[command(name = "webview-flag")]
#[command(about = "Inject WK_WEBVIEW_ENGINE_IS_USED into iOS build configurations", version)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
    /// Cordova project root (default: current directory)
    #[arg(long, env = "CORDOVA_PROJECT_ROOT")]
    project_root: Option<PathBuf>,

    /// Config file to use instead of <project root>/.webview-flag.toml
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Generated iOS project directory, relative to the project root
    #[arg(long)]
    platform_dir: Option<String>,
}

impl ProjectArgs {
    fn root(&self) -> PathBuf {
        self.project_root.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    fn load_config(&self, exact_match: bool) -> Result<EffectiveConfig, HookError> {
        let mut overrides = serde_json::Map::new();
        if let Some(ref dir) = self.platform_dir {
            overrides.insert("platform_dir".to_string(), json!(dir));
        }
        if exact_match {
            overrides.insert("staleness".to_string(), json!("exact_name"));
        }
        let overrides = (!overrides.is_empty()).then_some(Value::Object(overrides));

        Ok(EffectiveConfig::for_project(
            &self.root(),
            self.config.as_deref(),
            overrides,
        )?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the web engine and write the flag into the Xcode project
    Run {
        #[command(flatten)]
        project: ProjectArgs,

        /// Treat these plugins as installed instead of reading project metadata
        #[arg(long = "plugin", value_name = "NAME")]
        plugins: Vec<String>,

        /// Skip plugin detection and force the flag value
        #[arg(long, value_name = "BOOL")]
        engine_used: Option<bool>,

        /// Only replace entries that define exactly the flag name
        #[arg(long)]
        exact_match: bool,

        /// Compute the result without writing the project
        #[arg(long)]
        dry_run: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the first target's build configurations and their definitions
    Inspect {
        #[command(flatten)]
        project: ProjectArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration
    Config {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            project,
            plugins,
            engine_used,
            exact_match,
            dry_run,
            json,
        } => run_hook(project, plugins, engine_used, exact_match, dry_run, json),
        Commands::Inspect { project, json } => run_inspect(project, json),
        Commands::Config { project } => run_config(project),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

fn print_json(result: Result<String, serde_json::Error>) {
    match result {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_hook(
    project: ProjectArgs,
    plugins: Vec<String>,
    engine_used: Option<bool>,
    exact_match: bool,
    dry_run: bool,
    json_output: bool,
) -> Result<(), HookError> {
    if !json_output {
        println!("Running \"after-prepare\" hook:");
    }

    let effective = project.load_config(exact_match)?;
    let mut ctx = HookContext::new(project.root(), effective.hook_config().clone());
    ctx.engine_override = engine_used;
    ctx.dry_run = dry_run;

    let report = if plugins.is_empty() {
        hook::run(&ctx, &ProjectMetadata)?
    } else {
        hook::run(&ctx, &StaticPlugins::new(plugins))?
    };

    if json_output {
        print_json(report.to_json());
    } else {
        println!("{}", report.summary_line());
        if dry_run {
            println!(
                "\tDry run: {} of {} configurations would change",
                report.changed_count(),
                report.configurations.len()
            );
        }
    }
    Ok(())
}

fn run_inspect(args: ProjectArgs, json_output: bool) -> Result<(), HookError> {
    let effective = args.load_config(false)?;
    let config = effective.hook_config();

    let project_dir = args.root().join(&config.platform_dir);
    let name = project::locate(&project_dir)?;
    let xcode = XcodeProject::load(&project_dir, &name)?;
    let target = xcode.first_target()?;

    let mut rows = Vec::new();
    for build_config in xcode.configurations_of(&target)? {
        let raw = xcode.setting(&build_config, &config.setting_key)?;
        rows.push((build_config, normalize(&raw).into_owned()));
    }

    if json_output {
        let configurations: Vec<Value> = rows
            .iter()
            .map(|(c, definitions)| {
                json!({
                    "name": c.name,
                    "id": c.id,
                    "definitions": definitions,
                })
            })
            .collect();
        print_json(serde_json::to_string_pretty(&json!({
            "project": name,
            "pbxproj_path": xcode.path().display().to_string(),
            "target": target.name,
            "setting": config.setting_key,
            "configurations": configurations,
        })));
        return Ok(());
    }

    println!("Project: {} ({})", name, xcode.path().display());
    println!("Target: {}", target.name);
    println!();
    for (build_config, definitions) in rows {
        if definitions.is_empty() {
            println!("  {}: (no {})", build_config.name, config.setting_key);
        } else {
            println!("  {}: {}", build_config.name, definitions.join(", "));
        }
    }
    Ok(())
}

fn run_config(project: ProjectArgs) -> Result<(), HookError> {
    let effective = project.load_config(false)?;
    print_json(effective.to_json());
    Ok(())
}
