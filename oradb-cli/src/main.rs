mod config;

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;

use oradb_core::differ::{changed_attributes, requires_replacement};
use oradb_core::provider::Provider;
use oradb_core::resource::{Resource, ResourceId, State, attributes_to_json};
use oradb_core::schema::{AttributeSchema, ResourceSchema};
use oradb_provider::OracleProvider;
use oradb_provider::data_sources::data_sources;
use oradb_provider::resources::resources;
use oradb_state::{LocalBackend, LockInfo, ResourceState, StateBackend, StateFile};

use config::ConfigFile;

#[derive(Parser)]
#[command(name = "oradb")]
#[command(about = "Manage Oracle Database@Azure resources", long_about = None)]
struct Cli {
    /// Path to the state file
    #[arg(long, global = true, env = "ORADB_STATE", default_value = LocalBackend::DEFAULT_STATE_FILE)]
    state: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported types, or describe one
    Schema {
        /// Resource or data source type
        #[arg(value_name = "TYPE")]
        resource_type: Option<String>,
    },
    /// Validate every block in the configuration file
    Validate {
        #[arg(env = "ORADB_CONFIG", default_value = "oradb.json")]
        file: PathBuf,
    },
    /// Create or update the declared resources
    Apply {
        #[arg(env = "ORADB_CONFIG", default_value = "oradb.json")]
        file: PathBuf,
    },
    /// Re-read every tracked resource and update the state
    Refresh {
        #[arg(env = "ORADB_CONFIG", default_value = "oradb.json")]
        file: PathBuf,
    },
    /// Evaluate data sources and print their attributes
    Read {
        #[arg(env = "ORADB_CONFIG", default_value = "oradb.json")]
        file: PathBuf,
    },
    /// Delete the declared resources that are tracked in state
    Destroy {
        #[arg(env = "ORADB_CONFIG", default_value = "oradb.json")]
        file: PathBuf,

        /// Skip confirmation prompt (auto-approve)
        #[arg(long)]
        auto_approve: bool,
    },
    /// Release a state lock left behind by an interrupted run
    ForceUnlock {
        lock_id: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let backend = LocalBackend::with_path(cli.state);

    let result = match cli.command {
        Commands::Schema { resource_type } => run_schema(resource_type.as_deref()),
        Commands::Validate { file } => run_validate(&file),
        Commands::Apply { file } => run_apply(&file, &backend).await,
        Commands::Refresh { file } => run_refresh(&file, &backend).await,
        Commands::Read { file } => run_read(&file).await,
        Commands::Destroy { file, auto_approve } => {
            run_destroy(&file, &backend, auto_approve).await
        }
        Commands::ForceUnlock { lock_id } => run_force_unlock(&backend, &lock_id).await,
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

// =============================================================================
// Schemas
// =============================================================================

/// Schemas of every resource and data source type, keyed by type name
struct Catalogue {
    resources: BTreeMap<String, ResourceSchema>,
    data_sources: BTreeMap<String, ResourceSchema>,
}

impl Catalogue {
    fn load() -> Self {
        Self {
            resources: resources()
                .iter()
                .map(|r| (r.resource_type().to_string(), r.schema()))
                .collect(),
            data_sources: data_sources()
                .iter()
                .map(|d| (d.data_source_type().to_string(), d.schema()))
                .collect(),
        }
    }

    fn resource(&self, id: &ResourceId) -> Result<&ResourceSchema> {
        self.resources
            .get(&id.resource_type)
            .ok_or_else(|| anyhow!("{}: unknown resource type", id))
    }

    fn data_source(&self, id: &ResourceId) -> Result<&ResourceSchema> {
        self.data_sources
            .get(&id.resource_type)
            .ok_or_else(|| anyhow!("{}: unknown data source type", id))
    }
}

fn run_schema(resource_type: Option<&str>) -> Result<()> {
    let catalogue = Catalogue::load();

    let Some(resource_type) = resource_type else {
        println!("{}", "Resources:".bold());
        for name in catalogue.resources.keys() {
            println!("  {}", name);
        }
        println!("{}", "Data sources:".bold());
        for name in catalogue.data_sources.keys() {
            println!("  {}", name);
        }
        return Ok(());
    };

    let mut found = false;
    for (kind, schemas) in [
        ("resource", &catalogue.resources),
        ("data source", &catalogue.data_sources),
    ] {
        if let Some(schema) = schemas.get(resource_type) {
            found = true;
            print_schema(kind, schema);
        }
    }
    if !found {
        bail!("unknown type {}", resource_type);
    }
    Ok(())
}

fn print_schema(kind: &str, schema: &ResourceSchema) {
    println!("{} ({})", schema.resource_type.bold(), kind);
    if let Some(description) = &schema.description {
        println!("  {}", description);
    }
    println!();
    for attr in schema.attributes.values() {
        println!(
            "  {:<40} {:<28} {}",
            attr.name,
            attr.attr_type.to_string(),
            attribute_flags(attr).dimmed()
        );
    }
    println!();
}

fn attribute_flags(attr: &AttributeSchema) -> String {
    let mut flags = Vec::new();
    if attr.required {
        flags.push("required".to_string());
    } else if attr.computed && !attr.is_settable() {
        flags.push("computed".to_string());
    } else {
        flags.push("optional".to_string());
    }
    if attr.force_new {
        flags.push("force-new".to_string());
    }
    if attr.sensitive {
        flags.push("sensitive".to_string());
    }
    if let Some(default) = &attr.default {
        flags.push(format!("default {}", default.to_json()));
    }
    flags.join(", ")
}

// =============================================================================
// Validate
// =============================================================================

fn validate_config(config: &ConfigFile, catalogue: &Catalogue) -> Result<()> {
    let mut all_errors = Vec::new();

    let blocks = config
        .resources()
        .into_iter()
        .map(|r| (catalogue.resource(&r.id), r))
        .chain(
            config
                .data_sources()
                .into_iter()
                .map(|r| (catalogue.data_source(&r.id), r)),
        );
    for (schema, resource) in blocks {
        let schema = match schema {
            Ok(schema) => schema,
            Err(e) => {
                all_errors.push(e.to_string());
                continue;
            }
        };
        if let Err(errors) = schema.validate(&resource.attributes) {
            for error in errors {
                all_errors.push(format!("{}: {}", resource.id, error));
            }
        }
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(all_errors.join("\n")))
    }
}

fn run_validate(file: &Path) -> Result<()> {
    let config = ConfigFile::load(file)?;
    println!("{}", "Validating...".cyan());

    validate_config(&config, &Catalogue::load())?;

    println!(
        "{}",
        format!(
            "✓ {} resources and {} data sources validated successfully.",
            config.resources.len(),
            config.data.len()
        )
        .green()
        .bold()
    );
    for block in config.resources.iter().chain(&config.data) {
        println!("  • {}.{}", block.resource_type, block.name);
    }
    Ok(())
}

// =============================================================================
// State
// =============================================================================

/// State file held under lock; every change is written immediately
struct Tracker<'a> {
    backend: &'a LocalBackend,
    state: StateFile,
}

impl<'a> Tracker<'a> {
    async fn open(backend: &'a LocalBackend) -> Result<Self> {
        let state = backend.read_state().await?.unwrap_or_default();
        Ok(Self { backend, state })
    }

    fn get(&self, id: &ResourceId) -> Option<&ResourceState> {
        self.state.find_resource(&id.resource_type, &id.name)
    }

    async fn record(&mut self, schema: &ResourceSchema, state: &State) -> Result<()> {
        match ResourceState::from_state(state, schema) {
            Some(tracked) => self.state.upsert_resource(tracked),
            None => {
                self.state
                    .remove_resource(&state.id.resource_type, &state.id.name);
            }
        }
        self.save().await
    }

    async fn forget(&mut self, id: &ResourceId) -> Result<()> {
        self.state.remove_resource(&id.resource_type, &id.name);
        self.save().await
    }

    async fn save(&mut self) -> Result<()> {
        self.state.increment_serial();
        self.backend
            .write_state(&self.state)
            .await
            .context("Failed to write state")
    }
}

/// Release `lock` whatever the outcome of `result`
async fn unlock<T>(backend: &LocalBackend, lock: LockInfo, result: Result<T>) -> Result<T> {
    backend.release_lock(&lock).await?;
    result
}

fn connect(config: &ConfigFile) -> Result<Box<dyn Provider>> {
    let provider_config = config.provider_config()?;
    let provider = OracleProvider::from_config(&provider_config)?;
    Ok(Box::new(provider))
}

// =============================================================================
// Apply
// =============================================================================

/// What apply does with one declared resource
#[derive(Debug, PartialEq)]
enum Step {
    Create,
    Update(Vec<String>),
    Unchanged,
    /// Attributes that changed but cannot be updated in place
    Replace(Vec<String>),
}

fn plan_step(schema: &ResourceSchema, desired: &Resource, current: &State) -> Step {
    if !current.exists {
        return Step::Create;
    }

    let mut attributes = desired.attributes.clone();
    schema.apply_defaults(&mut attributes);
    let changed = changed_attributes(schema, &attributes, &current.attributes);

    let replace: Vec<String> = requires_replacement(schema, &changed)
        .into_iter()
        .map(String::from)
        .collect();
    if !replace.is_empty() {
        Step::Replace(replace)
    } else if changed.is_empty() {
        Step::Unchanged
    } else {
        Step::Update(changed)
    }
}

async fn apply(
    config: &ConfigFile,
    catalogue: &Catalogue,
    provider: &dyn Provider,
    backend: &LocalBackend,
) -> Result<usize> {
    let mut tracker = Tracker::open(backend).await?;
    let mut changes = 0;
    for resource in config.resources() {
        let schema = catalogue.resource(&resource.id)?;

        let current = match tracker.get(&resource.id) {
            Some(tracked) => provider.read(&resource.id, &tracked.identifier).await?,
            None => State::not_found(resource.id.clone()),
        };

        let state = match plan_step(schema, &resource, &current) {
            Step::Unchanged => {
                println!("  {} {}", "=".dimmed(), resource.id);
                current
            }
            Step::Create => {
                let state = provider.create(&resource).await?;
                println!("  {} {}", "+".green().bold(), resource.id);
                changes += 1;
                state
            }
            Step::Update(changed) => {
                let identifier = current.identifier.clone().unwrap_or_default();
                let state = provider
                    .update(&resource.id, &identifier, &current, &resource)
                    .await?;
                println!(
                    "  {} {} ({})",
                    "~".yellow().bold(),
                    resource.id,
                    changed.join(", ")
                );
                changes += 1;
                state
            }
            Step::Replace(attributes) => {
                bail!(
                    "{}: changing {} requires replacing the resource; destroy it first",
                    resource.id,
                    attributes.join(", ")
                );
            }
        };
        tracker.record(schema, &state).await?;
    }
    Ok(changes)
}

async fn run_apply(file: &Path, backend: &LocalBackend) -> Result<()> {
    let config = ConfigFile::load(file)?;
    let catalogue = Catalogue::load();
    validate_config(&config, &catalogue)?;
    let provider = connect(&config)?;

    println!("{}", "Applying changes...".cyan().bold());
    println!();

    let lock = backend.acquire_lock("apply").await?;
    let result = apply(&config, &catalogue, provider.as_ref(), backend).await;
    let changes = unlock(backend, lock, result).await?;

    println!();
    println!(
        "{}",
        format!("Apply complete! {} changes applied.", changes)
            .green()
            .bold()
    );
    Ok(())
}

// =============================================================================
// Refresh / Read
// =============================================================================

async fn run_refresh(file: &Path, backend: &LocalBackend) -> Result<()> {
    let config = ConfigFile::load(file)?;
    let catalogue = Catalogue::load();
    let provider = connect(&config)?;

    let lock = backend.acquire_lock("refresh").await?;
    let result = refresh(&catalogue, provider.as_ref(), backend).await;
    unlock(backend, lock, result).await
}

async fn refresh(
    catalogue: &Catalogue,
    provider: &dyn Provider,
    backend: &LocalBackend,
) -> Result<()> {
    let mut tracker = Tracker::open(backend).await?;
    let tracked: Vec<ResourceState> = tracker.state.resources.clone();
    for entry in tracked {
        let id = entry.resource_id();
        let schema = catalogue.resource(&id)?;
        let state = provider.read(&id, &entry.identifier).await?;
        if state.exists {
            let drifted = drift(schema, &entry, &state);
            if drifted.is_empty() {
                println!("  {} {}", "✓".green(), id);
            } else {
                println!(
                    "  {} {} (changed outside oradb: {})",
                    "~".yellow().bold(),
                    id,
                    drifted.join(", ")
                );
            }
            tracker.record(schema, &state).await?;
        } else {
            println!("  {} {} (gone, removed from state)", "-".red(), id);
            tracker.forget(&id).await?;
        }
    }
    Ok(())
}

/// Settable attributes whose remote value differs from the tracked one
fn drift(schema: &ResourceSchema, tracked: &ResourceState, fresh: &State) -> Vec<String> {
    changed_attributes(schema, &fresh.attributes, &tracked.to_state().attributes)
}

async fn run_read(file: &Path) -> Result<()> {
    let config = ConfigFile::load(file)?;
    let provider = connect(&config)?;

    let mut output = serde_json::Map::new();
    for data_source in config.data_sources() {
        let state = provider
            .read_data_source(&data_source)
            .await
            .with_context(|| format!("Failed to read {}", data_source.id))?;
        output.insert(
            data_source.id.to_string(),
            attributes_to_json(&state.attributes),
        );
    }
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::Object(output))?
    );
    Ok(())
}

// =============================================================================
// Destroy / Force unlock
// =============================================================================

fn confirm(question: &str) -> Result<bool> {
    println!("{}", question.yellow().bold());
    println!(
        "  {}",
        "This action cannot be undone. Type 'yes' to confirm.".yellow()
    );
    print!("\n  Enter a value: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    println!();
    Ok(input.trim() == "yes")
}

async fn run_destroy(file: &Path, backend: &LocalBackend, auto_approve: bool) -> Result<()> {
    let config = ConfigFile::load(file)?;
    let provider = connect(&config)?;

    let lock = backend.acquire_lock("destroy").await?;
    let result = destroy(&config, provider.as_ref(), backend, auto_approve).await;
    unlock(backend, lock, result).await
}

async fn destroy(
    config: &ConfigFile,
    provider: &dyn Provider,
    backend: &LocalBackend,
    auto_approve: bool,
) -> Result<()> {
    let mut tracker = Tracker::open(backend).await?;
    let targets: Vec<(ResourceId, String)> = config
        .resources()
        .into_iter()
        .rev()
        .filter_map(|r| {
            let identifier = tracker.get(&r.id)?.identifier.clone();
            Some((r.id, identifier))
        })
        .collect();

    if targets.is_empty() {
        println!("{}", "No resources to destroy.".green());
        return Ok(());
    }

    println!("{}", "Destroy Plan:".red().bold());
    println!();
    for (id, _) in &targets {
        println!("  {} {}", "-".red().bold(), id);
    }
    println!();
    println!("Plan: {} to destroy.", targets.len().to_string().red());
    println!();

    if !auto_approve && !confirm("Do you really want to destroy all resources?")? {
        println!("{}", "Destroy cancelled.".yellow());
        return Ok(());
    }

    let mut failure_count = 0;
    for (id, identifier) in &targets {
        match provider.delete(id, identifier).await {
            Ok(()) => {
                println!("  {} {}", "✓".green(), id);
                tracker.forget(id).await?;
            }
            Err(e) if e.is_not_found() => {
                println!("  {} {} (already gone)", "✓".green(), id);
                tracker.forget(id).await?;
            }
            Err(e) => {
                println!("  {} {} - {}", "✗".red(), id, e);
                failure_count += 1;
            }
        }
    }

    println!();
    if failure_count == 0 {
        println!(
            "{}",
            format!("Destroy complete! {} resources destroyed.", targets.len())
                .green()
                .bold()
        );
        Ok(())
    } else {
        Err(anyhow!(
            "Destroy failed. {} succeeded, {} failed.",
            targets.len() - failure_count,
            failure_count
        ))
    }
}

async fn run_force_unlock(backend: &LocalBackend, lock_id: &str) -> Result<()> {
    backend.force_unlock(lock_id).await?;
    println!("{}", format!("Lock {} released.", lock_id).green());
    Ok(())
}
