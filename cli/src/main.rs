//! CLI entrypoint for entity-tools
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod demo;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use commands::{Cli, Command};
use entity_tools_application::tools::parse_identifier;
use entity_tools_application::{
    EntityTool, InvocationLogger, NoInvocationLogger, NoTemplates, TemplateRenderer, ToolRuntime,
    ToolSchemaPort, ToolSet,
};
use entity_tools_domain::entity::{Entity, EntityType};
use entity_tools_domain::tool::ToolResult;
use entity_tools_infrastructure::{
    ConfigLoader, DirectoryTemplateRenderer, FileConfig, JsonSchemaToolConverter,
    JsonlInvocationLogger, MemoryStore, Severity,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    for issue in config.validate() {
        match issue.severity {
            Severity::Warning => warn!("{}", issue),
            Severity::Error => error!("{}", issue),
        }
    }

    // === Dependency Injection ===
    let store = MemoryStore::new();
    demo::seed(&store);
    let runtime = build_runtime(&config, &store)?;
    info!(
        views = runtime.registry().len(),
        entities = store.len(),
        "Hotel domain ready"
    );

    let Some(command) = cli.command else {
        bail!("No command given. Run with --help to see the available commands.");
    };

    match command {
        Command::Views => {
            for descriptor in runtime.registry().mappings() {
                println!(
                    "{:<12} {:<16} {}",
                    descriptor.entity_type.name(),
                    descriptor.interface.name(),
                    descriptor.description
                );
            }
            for entity_type in demo::entity_types() {
                if !runtime.registry().has_view_for(entity_type)
                    && runtime.registry().exposes_operations(entity_type)
                {
                    println!("{:<12} {:<16} entity operations", entity_type.name(), "-");
                }
            }
        }
        Command::Tools {
            entity,
            id,
            read_only,
        } => {
            let entity = load(&runtime, &entity, &id).await?;
            let tools = runtime.tools_for(entity.as_ref())?;
            let definitions: Vec<_> = tools.iter().map(|t| t.definition().clone()).collect();
            let schemas = if read_only {
                JsonSchemaToolConverter.read_only_tools_schema(&definitions)
            } else {
                JsonSchemaToolConverter.tools_schema(&definitions)
            };
            println!("{}", serde_json::to_string_pretty(&schemas)?);
        }
        Command::Call {
            entity,
            id,
            tool,
            input,
        } => {
            let entity = load(&runtime, &entity, &id).await?;
            let mut tools = ToolSet::new().with_tools(runtime.tools_for(entity.as_ref())?);
            if !tools.contains(&tool) {
                bail!(
                    "{} has no tool '{}' (available: {})",
                    entity.entity_type(),
                    tool,
                    tools.names().join(", ")
                );
            }
            let result = tools.call(&tool, &input).await;
            print_result(&result, cli.json)?;
        }
        Command::Find { entity, input } => {
            let entity_type = entity_type(&entity)?;
            let finder = runtime.finder(entity_type)?;
            let result = finder.call(&input).await;
            print_result(&result, cli.json)?;
        }
        Command::Session => run_session(&runtime, cli.json).await?,
    }

    Ok(())
}

fn build_runtime(config: &FileConfig, store: &MemoryStore) -> Result<Arc<ToolRuntime>> {
    let (tooling, _) = config.tools.to_tooling_config();

    let templates: Arc<dyn TemplateRenderer> = match &config.templates.dir {
        Some(dir) if dir.is_dir() => Arc::new(
            DirectoryTemplateRenderer::from_dir(dir, &config.templates.extension)
                .with_context(|| format!("Failed to load templates from {}", dir.display()))?,
        ),
        _ => Arc::new(NoTemplates),
    };

    let logger: Arc<dyn InvocationLogger> = match config
        .logging
        .invocation_log
        .as_ref()
        .and_then(JsonlInvocationLogger::new)
    {
        Some(logger) => {
            info!("Invocation log: {}", logger.path().display());
            Arc::new(logger)
        }
        None => Arc::new(NoInvocationLogger),
    };

    let registry = demo::registry(&config.views.base_paths)?;
    Ok(ToolRuntime::new(registry, demo::locator(store), Arc::new(store.clone()))
        .with_templates(templates)
        .with_logger(logger)
        .with_config(tooling)
        .into_shared())
}

fn entity_type(name: &str) -> Result<EntityType> {
    demo::entity_type(name).ok_or_else(|| {
        let known: Vec<_> = demo::entity_types().iter().map(|t| t.name()).collect();
        anyhow!("Unknown entity type '{}' (known: {})", name, known.join(", "))
    })
}

/// Load one entity in a read-only transaction
async fn load(runtime: &ToolRuntime, type_name: &str, raw_id: &str) -> Result<Box<dyn Entity>> {
    let entity_type = entity_type(type_name)?;
    let repository = runtime.repositories().locate(entity_type)?;
    let id = parse_identifier(raw_id, repository.identifier_kind()).map_err(|e| anyhow!(e))?;

    let mut tx = runtime.transactions().begin().await?;
    let found = repository.find_by_id(tx.as_mut(), &id).await;
    tx.rollback().await?;

    found?.ok_or_else(|| anyhow!("{} {} not found", entity_type, id))
}

fn print_result(result: &ToolResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else if result.is_success() {
        println!("{}", result.text());
    } else {
        println!("error: {}", result.text());
    }
    Ok(())
}

async fn run_session(runtime: &Arc<ToolRuntime>, json: bool) -> Result<()> {
    let mut tools = ToolSet::new();
    for entity_type in demo::entity_types() {
        tools.add(Arc::new(runtime.finder(entity_type)?) as Arc<dyn EntityTool>);
    }
    println!("tools: {}", tools.names().join(", "));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (name, input) = line.split_once(char::is_whitespace).unwrap_or((line, ""));

        let result = tools.call(name, input.trim()).await;
        print_result(&result, json)?;
        println!("tools: {}", tools.names().join(", "));
    }
    Ok(())
}
