//! `poe-kb`: crafting knowledge base and plan assembler.
//!
//! Every command prints pretty JSON on stdout; logs go to stderr (or the
//! configured log file).

use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{ArgGroup, Parser, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};

use poe_craft_kb::config::{self, KbConfig};
use poe_craft_kb::craft_of_exile::CraftingPlanBuilder;
use poe_craft_kb::knowledge::{KnowledgeBase, KnowledgeDomain};
use poe_craft_kb::planner::{assemble_plan_from_pob, enrich_actions, ItemBlueprint};
use poe_craft_kb::pob::{blueprint_from_item, parse_pob_build};
use poe_craft_kb::repoe::{repoe_data_root, CraftingAnalyzer, RePoEData};
use poe_craft_kb::strategy::{build_crafting_prompt, normalize_crafting_plan};
use poe_craft_kb::sync::{sync_craft_of_exile, sync_repoe};

#[derive(Parser)]
#[command(name = "poe-kb", version)]
#[command(about = "Path of Exile crafting knowledge base and plan assembler")]
struct Cli {
    /// Config file (defaults to POE_KB_CONFIG, then poe-kb.yaml in a parent directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding the curated datasets
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a crafting plan from item blueprints or a Path of Building export
    #[command(group(ArgGroup::new("input").required(true).args(["blueprints", "pob"])))]
    Plan {
        /// JSON file with one blueprint or a list of them ("-" for stdin)
        #[arg(long)]
        blueprints: Option<String>,
        /// File with a PoB export string ("-" for stdin)
        #[arg(long)]
        pob: Option<String>,
        /// Influence to add to every imported item (repeatable)
        #[arg(long = "influence")]
        influences: Vec<String>,
    },

    /// Keyword search in one knowledge domain
    Search {
        /// essences, harvest, bench, fossils, bosses, vendor, bestiary,
        /// betrayal, strategies, currency, incursion or fundamentals
        domain: String,
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Turn free-text crafting actions into steps annotated with dataset hits
    Enrich {
        #[arg(required = true, num_args = 1..)]
        actions: Vec<String>,
    },

    /// Decode a Path of Building export string
    Decode {
        /// File with the export string ("-" for stdin)
        input: String,
    },

    /// Print the strategist prompt for a crafting goal
    Prompt {
        goal: String,
        #[arg(long)]
        context: Option<String>,
    },

    /// Normalise loosely structured plan JSON into the typed plan schema
    Normalize {
        /// JSON file ("-" for stdin)
        input: String,
    },

    /// Attach Craft of Exile records to raw plan steps
    Resolve {
        /// JSON list of steps ("-" for stdin)
        input: String,
        /// League folder inside the Craft of Exile cache
        #[arg(long)]
        league: Option<String>,
    },

    /// Download external datasets
    #[command(group(ArgGroup::new("target").required(true).multiple(true).args(["craft_of_exile", "repoe"])))]
    Sync {
        /// Refresh the Craft of Exile simulator bundle
        #[arg(long)]
        craft_of_exile: bool,
        /// Refresh the RePoE export
        #[arg(long)]
        repoe: bool,
        /// Craft of Exile bundle URL
        #[arg(long)]
        url: Option<String>,
        /// Craft of Exile output directory
        #[arg(long)]
        output: Option<PathBuf>,
        /// League folder for the synced data
        #[arg(long)]
        league: Option<String>,
        /// Write the Craft of Exile bundle without pretty-printing
        #[arg(long)]
        compact: bool,
        /// Network timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// RePoE branch
        #[arg(long)]
        branch: Option<String>,
        /// Re-download RePoE files that are already cached
        #[arg(long)]
        force: bool,
    },

    /// Analyse an item base against desired mods using the RePoE export
    Analyze {
        /// Base item display name or metadata id
        #[arg(long)]
        base: String,
        /// Desired mod id or display name (repeatable)
        #[arg(long = "mod", required = true)]
        mods: Vec<String>,
        /// Influence considered for spawn weights (repeatable)
        #[arg(long = "influence")]
        influences: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => {
            let cwd = std::env::current_dir().context("cannot determine current directory")?;
            KbConfig::discover(&cwd)?.0
        }
    };
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir.clone();
    }

    poe_craft_kb::init_tracing(
        config.log_filter(),
        cli.log_json || config.log_json,
        config.log_file.as_deref(),
    )
    .context("failed to initialise logging")?;

    let data_dir = poe_craft_kb::data_dir(&config);
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");

    match cli.command {
        Command::Plan {
            blueprints,
            pob,
            influences,
        } => {
            let blueprints = match (blueprints, pob) {
                (Some(path), _) => read_blueprints(&path)?,
                (None, Some(path)) => pob_blueprints(&path, &influences)?,
                (None, None) => bail!("pass --blueprints or --pob"),
            };
            let kb = KnowledgeBase::new(&data_dir);
            print_json(&assemble_plan_from_pob(&kb, &blueprints)?)
        }
        Command::Search { domain, query } => {
            let domain = KnowledgeDomain::from_str(&domain)?;
            let kb = KnowledgeBase::new(&data_dir);
            print_json(&kb.search_json(domain, &query.join(" "))?)
        }
        Command::Enrich { actions } => {
            let kb = KnowledgeBase::new(&data_dir);
            print_json(&enrich_actions(&kb, &actions)?)
        }
        Command::Decode { input } => {
            let build = parse_pob_build(&read_input(&input)?)?;
            print_json(&build)
        }
        Command::Prompt { goal, context } => {
            println!("{}", build_crafting_prompt(&goal, context.as_deref()));
            Ok(())
        }
        Command::Normalize { input } => {
            let raw: Value = serde_json::from_str(&read_input(&input)?)
                .with_context(|| format!("{input} is not valid JSON"))?;
            print_json(&normalize_crafting_plan(&raw))
        }
        Command::Resolve { input, league } => {
            let steps = read_steps(&input)?;
            let league = league.or_else(|| config.craft_of_exile.league.clone());
            let builder =
                CraftingPlanBuilder::new(config.craft_of_exile.output_dir(&data_dir), league);
            print_json(&builder.build(&steps)?)
        }
        Command::Sync {
            craft_of_exile,
            repoe,
            url,
            output,
            league,
            compact,
            timeout,
            branch,
            force,
        } => {
            let mut reports = Vec::new();
            if craft_of_exile {
                let mut settings = config.craft_of_exile.clone();
                settings.url = url.or(settings.url);
                settings.output_dir = output.or(settings.output_dir);
                settings.league = league.clone().or(settings.league);
                settings.compact |= compact;
                if let Some(secs) = timeout {
                    settings.timeout_secs = secs;
                }
                reports.push(sync_craft_of_exile(&settings, &data_dir).await?);
            }
            if repoe {
                let mut settings = config.repoe.clone();
                if let Some(branch) = branch {
                    settings.branch = branch;
                }
                settings.league = league.or(settings.league);
                reports.push(sync_repoe(&settings, &data_dir, force).await?);
            }
            print_json(&reports)
        }
        Command::Analyze {
            base,
            mods,
            influences,
        } => {
            let settings = &config.repoe;
            let root = repoe_data_root(
                &settings.base_path(&data_dir),
                &settings.branch,
                settings.league.as_deref(),
            );
            let data = RePoEData::load(root)?;
            let analyzer =
                CraftingAnalyzer::new(data, settings.branch.clone(), settings.league.clone());
            print_json(&analyzer.analyse_item(&base, &mods, &influences)?)
        }
    }
}

// ─── Input / Output ─────────────────────────────────────────────────────────

/// Read a file, or stdin when `path` is `-`.
fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read_to_string(Path::new(path)).with_context(|| format!("failed to read {path}"))
}

fn read_json(path: &str) -> Result<Value> {
    serde_json::from_str(&read_input(path)?).with_context(|| format!("{path} is not valid JSON"))
}

fn read_blueprints(path: &str) -> Result<Vec<ItemBlueprint>> {
    let value = read_json(path)?;
    let blueprints = match value {
        Value::Array(_) => serde_json::from_value(value),
        single => serde_json::from_value(single).map(|blueprint| vec![blueprint]),
    };
    blueprints.with_context(|| format!("{path} does not contain item blueprints"))
}

fn read_steps(path: &str) -> Result<Vec<Map<String, Value>>> {
    match read_json(path)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(step) => Some(step),
                _ => None,
            })
            .collect()),
        Value::Object(step) => Ok(vec![step]),
        _ => bail!("{path} must hold a step object or a list of them"),
    }
}

fn pob_blueprints(path: &str, influences: &[String]) -> Result<Vec<ItemBlueprint>> {
    let build = parse_pob_build(&read_input(path)?)?;
    let blueprints: Vec<ItemBlueprint> = build
        .items
        .iter()
        .filter_map(|item| blueprint_from_item(item, influences))
        .collect();
    tracing::info!(items = build.items.len(), blueprints = blueprints.len(), "imported PoB build");
    Ok(blueprints)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
