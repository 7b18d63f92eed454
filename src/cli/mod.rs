pub mod shutdown;
pub mod summary;
pub mod track;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, level_filters::LevelFilter};

use crate::{
    config::TrackerConfig,
    indicator::display::{IndicatorDisplay, TerminalDisplay},
    notify::DesktopNotifier,
    store::project_store::{JsonProjectStore, ProjectStore},
    tracking::Tracker,
    utils::{
        clock::DefaultClock,
        dir::create_application_default_path,
        logging::enable_logging,
        time::{entry_date, format_time_spent, whole_seconds},
    },
};

#[derive(Parser, Debug)]
#[command(name = "tracktime", version, long_about = None)]
#[command(about = "Track time spent on projects and sprints", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        help = "Data file. Defaults to projects.json inside the application directory"
    )]
    data: Option<PathBuf>,
    #[arg(
        long = "notify-time",
        global = true,
        value_name = "SECONDS",
        help = "Delay before the break reminder. Defaults to 25 minutes"
    )]
    notify_time: Option<u64>,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Log level (error, warn, info, debug, trace). Defaults to $RUST_LOG or info"
    )]
    log_level: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Manage projects")]
    Project {
        #[command(subcommand)]
        command: ProjectCommand,
    },
    #[command(about = "Manage sprints of a project")]
    Sprint {
        #[command(subcommand)]
        command: SprintCommand,
    },
    #[command(about = "Start tracking a project")]
    Start { project: String },
    #[command(about = "Stop tracking a project and record the session")]
    Stop {
        project: String,
        #[arg(short = 'm', long = "message", default_value = "")]
        description: String,
    },
    #[command(
        about = "Track a project in the foreground. Stops on Enter (the typed line becomes the description) or Ctrl-C"
    )]
    Track {
        project: String,
        #[arg(short = 'm', long = "message")]
        description: Option<String>,
    },
    #[command(about = "Show projects that are being tracked")]
    Status,
    #[command(about = "Show time totals per project and sprint")]
    Summary,
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    Create { name: String },
    Archive { name: String },
    Restore { name: String },
    List {
        #[arg(long, help = "Include archived projects")]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
enum SprintCommand {
    #[command(about = "Create a sprint. It becomes the active sprint of the project")]
    Create {
        project: String,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    #[command(about = "Make a sprint active, by name or id")]
    Select { project: String, sprint: String },
    List { project: String },
}

impl Args {
    fn config(&self, app_dir: PathBuf) -> TrackerConfig {
        TrackerConfig::in_dir(app_dir)
            .with_data_file(self.data.clone())
            .with_reminder_delay(self.notify_time.map(Duration::from_secs))
    }
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match &args.dir {
        Some(dir) => dir.clone(),
        None => create_application_default_path()?,
    };
    let log_dir = app_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Couldn't create log directory {log_dir:?}"))?;

    let logging_level = args
        .log_level
        .or_else(|| args.log.then_some(LevelFilter::TRACE));
    enable_logging(&log_dir, logging_level, args.log)?;

    let config = args.config(app_dir);
    let store = JsonProjectStore::new(config.data_file);
    info!("Using data file {:?}", store.path());

    // Only the foreground command shows the live indicator.
    let terminal = matches!(args.commands, Commands::Track { .. })
        .then(|| Arc::new(TerminalDisplay::default()));
    let tracker = Tracker::open(
        store,
        config.reminder_delay,
        Arc::new(DefaultClock),
        terminal
            .clone()
            .map(|v| v as Arc<dyn IndicatorDisplay>),
        Arc::new(DesktopNotifier),
    )
    .await?;

    let result = process_command(&tracker, args.commands, terminal).await;
    let saved = tracker.shutdown().await;
    result?;
    saved?;
    Ok(())
}

async fn process_command<S: ProjectStore + 'static>(
    tracker: &Tracker<S>,
    command: Commands,
    terminal: Option<Arc<TerminalDisplay>>,
) -> Result<()> {
    match command {
        Commands::Project { command } => match command {
            ProjectCommand::Create { name } => {
                tracker.create_project(&name).await?;
                println!("Created project {name}");
            }
            ProjectCommand::Archive { name } => {
                tracker.archive_project(&name).await?;
                println!("Archived project {name}");
            }
            ProjectCommand::Restore { name } => {
                tracker.restore_project(&name).await?;
                println!("Restored project {name}");
            }
            ProjectCommand::List { all } => {
                for name in tracker.list_project_names(all).await {
                    println!("{name}");
                }
            }
        },
        Commands::Sprint { command } => match command {
            SprintCommand::Create {
                project,
                name,
                description,
            } => {
                let id = tracker.create_sprint(&project, &name, &description).await?;
                println!("Created sprint {name} ({id}) in {project}");
            }
            SprintCommand::Select { project, sprint } => {
                let sprint = tracker.select_sprint(&project, &sprint).await?;
                println!("Active sprint of {project} is now {}", sprint.name);
            }
            SprintCommand::List { project } => {
                summary::print_sprints(&tracker.list_sprints(&project).await?);
            }
        },
        Commands::Start { project } => {
            let started = tracker.start_tracking(&project).await?;
            println!("Started tracking {project} at {}", entry_date(started));
        }
        Commands::Stop {
            project,
            description,
        } => {
            let elapsed = tracker.stop_tracking(&project, &description).await?;
            println!(
                "Stopped {project} after {}",
                format_time_spent(whole_seconds(elapsed))
            );
        }
        Commands::Track {
            project,
            description,
        } => track::track(tracker, &project, description, terminal).await?,
        Commands::Status => {
            summary::print_status(&tracker.tracking_sessions().await, tracker.clock());
        }
        Commands::Summary => summary::print_summary(&tracker.summary().await),
    }
    Ok(())
}
