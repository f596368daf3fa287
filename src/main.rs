//! Command-line entry point for cookitup.
//!
//! # Startup sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info`).
//! 2. Load [`AppConfig`] from `--config` or the platform `settings.toml`.
//! 3. Open the recipe database and run migrations.
//! 4. Dispatch the subcommand.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use cookitup::{
    config::AppConfig,
    cooking::{parse_duration_to_seconds, CookingCommand, CookingRunner, CookingState, SessionSnapshot},
    fetch::{GeminiClient, RecipeFetcher, RecipeSearch, SearchState},
    recipe::{save_draft, save_manual, ManualRecipe, RecipeDraft, RecipeId},
    store::{RecipeStore, SqliteStore},
};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "cookitup", version, about = "Recipe book with cooking timers")]
struct Cli {
    /// Settings file to load instead of the platform default.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List saved recipes, newest first.
    List,
    /// Show one recipe with its steps.
    Show { id: i64 },
    /// Add a recipe by hand.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        ingredients: String,
        /// A step as `"description|duration"`; repeat for each step.
        #[arg(long = "step", value_parser = parse_step_arg)]
        steps: Vec<(String, String)>,
        /// Free-form instructions, used when no `--step` is given.
        #[arg(long, default_value = "")]
        steps_text: String,
        #[arg(long, default_value = "")]
        prep_time: String,
    },
    /// Delete a recipe and its steps.
    Delete { id: i64 },
    /// Ask the recipe API for a recipe.
    Search {
        query: String,
        /// Store the result.
        #[arg(long)]
        save: bool,
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },
    /// Cook a recipe step by step: p pause, r resume, n next, q stop.
    Cook { id: i64 },
}

fn parse_step_arg(raw: &str) -> Result<(String, String), String> {
    raw.split_once('|')
        .map(|(description, duration)| (description.to_string(), duration.to_string()))
        .ok_or_else(|| format!("expected \"description|duration\", got {raw:?}"))
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    let store = SqliteStore::from_config(&config.storage)
        .await
        .context("failed to open recipe database")?;
    store.health_check().await.context("recipe database health check failed")?;

    match cli.command {
        Command::List => list(&store).await,
        Command::Show { id } => show(&store, RecipeId(id)).await,
        Command::Add {
            name,
            ingredients,
            steps,
            steps_text,
            prep_time,
        } => add(&store, name, ingredients, steps, steps_text, prep_time).await,
        Command::Delete { id } => {
            store.delete_recipe(RecipeId(id)).await?;
            println!("deleted recipe {id}");
            Ok(())
        }
        Command::Search {
            query,
            save,
            api_key,
        } => {
            let client = match api_key {
                Some(key) => GeminiClient::with_api_key(&config.fetch, key),
                None => GeminiClient::from_config(&config.fetch),
            };
            search(&store, Arc::new(client), &query, save).await
        }
        Command::Cook { id } => cook(&store, &config, RecipeId(id)).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

async fn list(store: &SqliteStore) -> Result<()> {
    let recipes = store.list_recipes().next().await.unwrap_or_default();
    if recipes.is_empty() {
        println!("no recipes yet");
    }
    for recipe in recipes {
        let id = recipe.id.map(|id| id.to_string()).unwrap_or_default();
        println!("{id:>4}  {}", recipe.name);
    }
    Ok(())
}

async fn show(store: &SqliteStore, id: RecipeId) -> Result<()> {
    let Some(recipe) = store.get_recipe(id).await? else {
        bail!("no recipe with id {id}");
    };

    println!("{}", recipe.name);
    if !recipe.preparation_time.is_empty() {
        println!("Preparation: {}", recipe.preparation_time);
    }
    if !recipe.ingredients.is_empty() {
        println!("\nIngredients:\n{}", recipe.ingredients);
    }
    if !recipe.steps_text.is_empty() {
        println!("\nInstructions:\n{}", recipe.steps_text);
    }

    let steps = store.list_steps(id).await?;
    if !steps.is_empty() {
        println!("\nSteps:");
    }
    for step in steps {
        let secs = parse_duration_to_seconds(&step.duration);
        println!("{:>3}. {} ({}, {})", step.position, step.description, step.duration, clock(secs));
    }
    Ok(())
}

async fn add(
    store: &SqliteStore,
    name: String,
    ingredients: String,
    steps: Vec<(String, String)>,
    steps_text: String,
    prep_time: String,
) -> Result<()> {
    let id = if steps.is_empty() {
        let manual = ManualRecipe {
            name,
            ingredients,
            steps_text,
            preparation_time: prep_time,
        };
        save_manual(store, &manual).await?
    } else {
        let mut draft = RecipeDraft::new(name, ingredients);
        for (description, duration) in &steps {
            draft.add_step(description, duration)?;
        }
        save_draft(store, &draft).await?
    };

    println!("saved recipe {id}");
    Ok(())
}

async fn search(store: &SqliteStore, fetcher: Arc<dyn RecipeFetcher>, query: &str, save: bool) -> Result<()> {
    let search = RecipeSearch::new(fetcher);

    match search.search(query).await {
        Some(SearchState::Found(candidate)) => {
            println!("{}", candidate.recipe_name.as_deref().unwrap_or_default());
            if let Some(time) = candidate.preparation_time.as_deref().filter(|t| !t.is_empty()) {
                println!("Preparation: {time}");
            }
            if let Some(ingredients) = candidate.ingredients.as_deref() {
                println!("\nIngredients:\n{ingredients}");
            }
            if let Some(steps) = candidate.steps.as_deref() {
                println!("\nInstructions:\n{steps}");
            }
        }
        Some(SearchState::Failed(message)) => bail!(message),
        _ => bail!("search did not complete"),
    }

    if save {
        if let Some(id) = search.save_result(store).await? {
            println!("\nsaved recipe {id}");
        }
    }
    Ok(())
}

async fn cook(store: &SqliteStore, config: &AppConfig, id: RecipeId) -> Result<()> {
    let Some(recipe) = store.get_recipe(id).await? else {
        bail!("no recipe with id {id}");
    };
    let steps = store.list_steps(id).await?;
    if steps.is_empty() {
        bail!("{} has no steps to cook", recipe.name);
    }

    println!("Cooking {} ({} steps). p pause, r resume, n next, q stop", recipe.name, steps.len());

    let runner = CookingRunner::new(config.cooking.tick_interval());
    let mut snapshots = runner.subscribe();
    let (tx, rx) = mpsc::channel(8);
    let handle = tokio::spawn(runner.run(rx));

    tx.send(CookingCommand::Start(steps)).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snap = snapshots.borrow_and_update().clone();
                render(&snap);
                if matches!(snap.state, CookingState::Completed { .. }) {
                    println!("All steps done. Enjoy!");
                    break;
                }
                if !snap.active {
                    break;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let command = match line? {
                    Some(line) => match line.trim() {
                        "p" => CookingCommand::Pause,
                        "r" => CookingCommand::Resume,
                        "n" => CookingCommand::NextStep,
                        "q" => CookingCommand::Stop,
                        "" => continue,
                        other => {
                            println!("unknown command {other:?}");
                            continue;
                        }
                    },
                    None => {
                        stdin_open = false;
                        continue;
                    }
                };
                tx.send(command).await?;
            }
        }
    }

    drop(tx);
    handle.await.context("cooking runner failed")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(snap: &SessionSnapshot) {
    let Some(step) = &snap.current_step else {
        return;
    };
    println!(
        "[{}/{}] {:<9} {}  {}",
        snap.step_index + 1,
        snap.step_count,
        snap.state.label(),
        clock(snap.remaining_secs),
        step.description
    );
}

fn clock(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
