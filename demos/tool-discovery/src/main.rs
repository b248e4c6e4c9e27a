//! Registers a handful of sample tools and prints the ones discovery selects
//! for a task description.

use std::path::PathBuf;
use std::sync::Arc;

use agent_config::AgentConfig;
use agent_tools::{
    FnToolProvider, ParamKind, ParameterSchema, Tool, ToolArgs, ToolDescriptor, ToolProvider,
    ToolRegistry, ToolResult,
};
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "tool-discovery", about = "Rank sample tools against a task")]
struct Args {
    /// Free-text task description.
    task: String,

    /// Restrict discovery to these categories (repeatable).
    #[arg(short, long = "category")]
    categories: Vec<String>,

    /// Maximum number of tools to return; defaults to the configured limit.
    #[arg(short = 'n', long)]
    max_results: Option<usize>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy)]
struct Sample {
    type_name: &'static str,
    name: &'static str,
    description: &'static str,
    categories: &'static [&'static str],
}

const SAMPLES: &[Sample] = &[
    Sample {
        type_name: "WeatherTool",
        name: "weather_lookup",
        description: "looks up current weather for a city",
        categories: &["info"],
    },
    Sample {
        type_name: "FlightTool",
        name: "flight_status",
        description: "looks up flight status and delays",
        categories: &["travel"],
    },
    Sample {
        type_name: "HotelTool",
        name: "hotel_booking",
        description: "books hotel rooms for travel dates",
        categories: &["travel", "booking"],
    },
    Sample {
        type_name: "CalendarTool",
        name: "calendar_events",
        description: "lists upcoming calendar events",
        categories: &["productivity"],
    },
];

fn sample_provider(sample: Sample) -> Arc<dyn ToolProvider> {
    Arc::new(FnToolProvider::new(
        sample.type_name,
        ParameterSchema::new().required("api_key", ParamKind::String),
        move |args: &ToolArgs| -> ToolResult<Box<dyn Tool>> {
            args.string("api_key")?;
            Ok(Box::new(ToolDescriptor::new(sample.name, sample.description)))
        },
    ))
}

fn main() -> Result<()> {
    agent_telemetry::init_tracing(agent_telemetry::DEFAULT_DIRECTIVE)?;
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AgentConfig::from_path(path)?,
        None => AgentConfig::default().with_env_overrides()?,
    };

    let registry: Arc<ToolRegistry> = config.build_registry();
    for sample in SAMPLES {
        registry.register(sample_provider(*sample), sample.categories.iter().copied());
    }
    info!(
        tools = registry.len(),
        categories = ?registry.list_categories(),
        "registry ready"
    );

    let discovery = config.build_discovery(registry);
    let max_results = args
        .max_results
        .unwrap_or_else(|| discovery.config().max_results());

    let categories = args.categories.as_slice();
    for candidate in discovery.rank(&args.task, categories) {
        info!(tool = candidate.name(), score = candidate.score(), "candidate");
    }

    let selected = discovery.select_for_task(&args.task, categories, max_results);
    if selected.is_empty() {
        println!("no tools selected");
    }
    for tool in &selected {
        println!("{}: {}", tool.name(), tool.description());
    }
    Ok(())
}
