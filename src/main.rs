use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use cantata_orchestrator::Orchestrator;
use cantata_registry::{FsWorkflowRegistry, WorkflowRegistry};
use cantata_run::RunStore;
use cantata_workflow::Workflow;

/// Cantata - a human-in-the-loop workflow orchestration engine
#[derive(Parser)]
#[command(name = "cantata")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.cantata)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// List available workflow definitions
  Workflows,

  /// Create a workflow run and execute its first tick
  Run {
    /// The workflow id to run
    workflow_id: String,

    /// The run id (generated when omitted)
    run_id: Option<String>,

    /// Display name for the run (defaults to the run id)
    #[arg(long)]
    name: Option<String>,
  },

  /// Execute one tick of an existing run
  Tick {
    /// The run id
    run_id: String,
  },

  /// List tasks waiting on a person
  Tasks {
    /// The run id
    run_id: String,
  },

  /// Complete a waiting task by index
  Complete {
    /// The run id
    run_id: String,

    /// Index into the current waiting-task list
    index: usize,
  },
}

struct App {
  registry: FsWorkflowRegistry,
  orchestrator: Orchestrator,
}

impl App {
  fn new(data_dir: PathBuf) -> Self {
    Self {
      registry: FsWorkflowRegistry::new(data_dir.join("workflows")),
      orchestrator: Orchestrator::new(RunStore::new(data_dir.join("runs"))),
    }
  }

  /// Resolve the workflow a run was created from.
  async fn workflow_for_run(&self, run_id: &str) -> Result<Workflow> {
    let state = self
      .orchestrator
      .runs()
      .load(run_id)
      .await
      .with_context(|| format!("failed to load run '{run_id}'"))?;

    let (workflow, _) = self
      .registry
      .get(&state.workflow_name)
      .await
      .with_context(|| format!("failed to load workflow '{}'", state.workflow_name))?;
    Ok(workflow)
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let data_dir = cli.data_dir.unwrap_or_else(|| {
    dirs::home_dir()
      .expect("could not determine home directory")
      .join(".cantata")
  });

  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async {
    let app = App::new(data_dir);

    match cli.command {
      Some(Commands::Workflows) => list_workflows(&app).await,
      Some(Commands::Run {
        workflow_id,
        run_id,
        name,
      }) => run(&app, &workflow_id, run_id, name).await,
      Some(Commands::Tick { run_id }) => tick(&app, &run_id).await,
      Some(Commands::Tasks { run_id }) => tasks(&app, &run_id).await,
      Some(Commands::Complete { run_id, index }) => complete(&app, &run_id, index).await,
      None => {
        println!("cantata - use --help to see available commands");
        Ok(())
      }
    }
  })
}

async fn list_workflows(app: &App) -> Result<()> {
  let workflows = app
    .registry
    .list()
    .await
    .context("failed to list workflows")?;

  if workflows.is_empty() {
    println!("No workflows found in {}", app.registry.root().display());
    return Ok(());
  }

  for workflow in workflows {
    if workflow.display_name.is_empty() {
      println!("{}", workflow.id);
    } else {
      println!("{} - {}", workflow.id, workflow.display_name);
    }
    if !workflow.description.is_empty() {
      println!("    {}", workflow.description);
    }
  }
  Ok(())
}

async fn run(
  app: &App,
  workflow_id: &str,
  run_id: Option<String>,
  name: Option<String>,
) -> Result<()> {
  let (workflow, path) = app
    .registry
    .get(workflow_id)
    .await
    .with_context(|| format!("failed to load workflow '{workflow_id}'"))?;

  println!("Loaded workflow from: {}", path.display());
  if !workflow.display_name.is_empty() {
    println!("{}", workflow.display_name);
  }
  if !workflow.message.is_empty() {
    println!("{}", workflow.message);
  }
  println!();

  let run_id = run_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
  let display_name = name.unwrap_or_else(|| run_id.clone());

  app
    .orchestrator
    .create_run(&workflow, &run_id, &display_name)
    .await
    .context("failed to create run")?;
  println!("Created run: {run_id}");

  let complete = app
    .orchestrator
    .tick(&workflow, &run_id)
    .await
    .context("failed to execute tick")?;
  report_tick(&run_id, complete);
  Ok(())
}

async fn tick(app: &App, run_id: &str) -> Result<()> {
  let workflow = app.workflow_for_run(run_id).await?;

  let complete = app
    .orchestrator
    .tick(&workflow, run_id)
    .await
    .context("failed to execute tick")?;
  report_tick(run_id, complete);
  Ok(())
}

async fn tasks(app: &App, run_id: &str) -> Result<()> {
  let workflow = app.workflow_for_run(run_id).await?;

  let tasks = app
    .orchestrator
    .list_waiting_tasks(&workflow, run_id)
    .await
    .context("failed to list waiting tasks")?;

  if tasks.is_empty() {
    println!("No tasks waiting.");
    return Ok(());
  }

  for (index, task) in tasks.iter().enumerate() {
    println!("[{index}] {}", task.name);
    if !task.prompt.is_empty() {
      println!("    {}", task.prompt);
    }
    if !task.inputs.is_empty() {
      println!("    inputs: {}", task.inputs.join(", "));
    }
    if !task.output.is_empty() {
      println!("    output: {}", task.output);
    }
  }
  Ok(())
}

async fn complete(app: &App, run_id: &str, index: usize) -> Result<()> {
  let workflow = app.workflow_for_run(run_id).await?;

  app
    .orchestrator
    .complete_task(&workflow, run_id, index)
    .await
    .context("failed to complete task")?;
  println!("Task {index} completed. Run 'cantata tick {run_id}' to continue.");
  Ok(())
}

fn report_tick(run_id: &str, complete: bool) {
  if complete {
    println!("Workflow complete!");
  } else {
    println!("Tick complete. Run 'cantata tick {run_id}' to continue.");
  }
}
