use clap::{Parser, Subcommand};
use dotenv::dotenv;
use flowgate_rs::engine::model::{Execution, Flow};
use flowgate_rs::engine::{InMemoryConditionStorage, MultipleConditionStorage};
use flowgate_rs::flowgate::{ConditionService, FlowBuilder, FlowLoader};

use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the listener tasks whose conditions pass
    Listeners {
        /// Path to the flow file
        #[arg(short, long)]
        flow: String,

        /// Path to the execution file (defaults to FLOWGATE_EXECUTION)
        #[arg(short, long)]
        execution: Option<String>,
    },
    /// Check whether an execution and its listener tasks have terminated
    Terminated {
        /// Path to the flow file
        #[arg(short, long)]
        flow: String,

        /// Path to the execution file (defaults to FLOWGATE_EXECUTION)
        #[arg(short, long)]
        execution: Option<String>,
    },
    /// Evaluate every trigger of a flow
    Triggers {
        /// Path to the flow file
        #[arg(short, long)]
        flow: String,

        /// Path to the execution file (defaults to FLOWGATE_EXECUTION)
        #[arg(short, long)]
        execution: Option<String>,

        /// Recorded multiple-condition windows (defaults to FLOWGATE_STORAGE)
        #[arg(short, long)]
        storage: Option<String>,
    },
}

fn resolve(arg: Option<String>, env_var: &str) -> Option<String> {
    arg.or_else(|| std::env::var(env_var).ok())
}

fn load_execution(loader: &FlowLoader, arg: Option<String>) -> anyhow::Result<Option<Execution>> {
    match resolve(arg, "FLOWGATE_EXECUTION") {
        Some(path) => {
            log::info!("Loading execution from {}", path);
            Ok(Some(loader.load_execution(&path)?))
        }
        None => Ok(None),
    }
}

fn require_execution(execution: Option<Execution>) -> anyhow::Result<Execution> {
    execution.ok_or_else(|| {
        anyhow::anyhow!("an execution is required (--execution or FLOWGATE_EXECUTION)")
    })
}

async fn load_storage(
    loader: &FlowLoader,
    arg: Option<String>,
) -> anyhow::Result<Option<Arc<dyn MultipleConditionStorage>>> {
    match resolve(arg, "FLOWGATE_STORAGE") {
        Some(path) => {
            let windows = loader.load_windows(&path)?;
            log::info!("Loaded {} condition window(s) from {}", windows.len(), path);
            let storage: Arc<dyn MultipleConditionStorage> =
                Arc::new(InMemoryConditionStorage::with_windows(windows).await);
            Ok(Some(storage))
        }
        None => Ok(None),
    }
}

async fn print_triggers(
    service: &ConditionService,
    flow: &Flow,
    execution: Option<&Execution>,
    storage: Option<Arc<dyn MultipleConditionStorage>>,
) -> anyhow::Result<()> {
    if flow.triggers().is_empty() {
        println!("Flow {} declares no triggers", flow.uid());
        return Ok(());
    }

    let context = service.context_for(flow, execution, storage);
    for trigger in flow.triggers() {
        match service.is_trigger_valid_in_context(trigger, &context).await {
            Ok(true) => println!("{} ({}): valid", trigger.id, trigger.kind),
            Ok(false) => println!("{} ({}): not valid", trigger.id, trigger.kind),
            Err(e) => println!("{} ({}): error: {}", trigger.id, trigger.kind, e),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let loader = FlowLoader::new();
    let builder = FlowBuilder::new();
    let service = ConditionService::default();

    match args.command {
        Commands::Listeners { flow, execution } => {
            let flow = builder.build_flow(&flow)?;
            let execution = require_execution(load_execution(&loader, execution)?)?;

            let tasks = service.find_valid_listeners(&flow, &execution).await?;
            if tasks.is_empty() {
                println!("No listener tasks for execution {}", execution.id);
            }
            for resolved in tasks {
                println!("{} ({})", resolved.task.id, resolved.task.kind);
            }
        }
        Commands::Terminated { flow, execution } => {
            let flow = builder.build_flow(&flow)?;
            let execution = require_execution(load_execution(&loader, execution)?)?;

            let terminated = service
                .is_terminated_with_listeners(&flow, &execution)
                .await?;
            println!(
                "Execution {} ({}) terminated with listeners: {}",
                execution.id, execution.state.current, terminated
            );
        }
        Commands::Triggers {
            flow,
            execution,
            storage,
        } => {
            let flow = builder.build_flow(&flow)?;
            let execution = load_execution(&loader, execution)?;
            let storage = load_storage(&loader, storage).await?;

            print_triggers(&service, &flow, execution.as_ref(), storage).await?;
        }
    }

    Ok(())
}
