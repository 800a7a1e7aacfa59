mod census;
mod config;
mod opener;
mod rank;
mod store;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use dialoguer::{Input, Select};

use crate::config::Config;
use crate::opener::BrowserOpener;
use crate::rank::Target;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let matches = Command::new("twspy")
        .version("0.1.0")
        .about("Opens spy runs on the closest village of every player around you")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("Settings file (KEY=value lines)")
                .default_value("config.txt"),
        )
        .get_matches();

    let config_path = matches.get_one::<String>("config").unwrap(); // Safe due to default
    let config = Config::load(Path::new(config_path))
        .with_context(|| format!("failed to load settings from {config_path}"))?;

    print_instructions(&config);

    let browser = BrowserOpener::from_name(&config.browser);
    loop {
        print_status(&config);
        let choice = Select::new()
            .with_prompt("Action")
            .items(&["Fetch & Prepare", "Open next batch", "Quit"])
            .default(0)
            .interact()?;

        match choice {
            0 => {
                if let Err(e) = fetch_and_prepare(&config).await {
                    eprintln!("Fetch failed: {e}");
                }
            }
            1 => match opener::open_next_batch(&config, &browser).await {
                Ok(report) => {
                    if report.opened == 0 && report.failures.is_empty() {
                        println!("No more unopened URLs.");
                    } else {
                        println!("{} URLs opened.", report.opened);
                    }
                    for failure in &report.failures {
                        eprintln!("Could not open {}: {}", failure.url, failure.message);
                    }
                }
                Err(store::StoreError::NotFound { path }) => {
                    eprintln!("{} not found. Run 'Fetch & Prepare' first.", path.display());
                }
                Err(e) => eprintln!("Opening failed: {e}"),
            },
            _ => break,
        }
        println!();
    }

    Ok(())
}

/// Prompts for world and home coordinates, then runs the whole pipeline:
/// download census -> rank targets -> overwrite the store.
async fn fetch_and_prepare(config: &Config) -> Result<()> {
    let world: u32 = Input::new()
        .with_prompt("World number")
        .default(239)
        .validate_with(|world: &u32| {
            if *world >= 1 {
                Ok(())
            } else {
                Err("world number must be at least 1")
            }
        })
        .interact_text()?;
    let home_x: u32 = Input::new().with_prompt("Home x").default(500).interact_text()?;
    let home_y: u32 = Input::new().with_prompt("Home y").default(500).interact_text()?;

    if config.csv_path.exists() {
        println!(
            "Note: this overwrites {} and resets all opened progress.",
            config.csv_path.display()
        );
    }

    println!("Downloading {} ...", census::feed_url(world, config));
    let villages = census::download(world, config).await?;
    let targets = rank::rank(villages, home_x as i64, home_y as i64, world, config);
    store::save(&config.csv_path, &targets)?;

    println!("Saved {} targets to {}.", targets.len(), config.csv_path.display());
    print_preview(&targets);
    Ok(())
}

fn print_instructions(config: &Config) {
    println!("Tribal Wars spy tool");
    println!("====================");
    println!("Prepares one spy run per player around your village, closest first,");
    println!(
        "and opens up to {} of them per batch in {}.",
        config.num_to_open, config.browser
    );
    println!();
    println!("Run 'Fetch & Prepare' only once per world: fetching again overwrites");
    println!(
        "{} and resets which targets were already opened.",
        config.csv_path.display()
    );
    println!("Out of spies? Come back later and continue with 'Open next batch'.");
    println!("Attacks are prepared from the village currently selected in the game;");
    println!("switch villages there when one runs dry.");
    println!();
}

/// Passive status line, shown whenever a store exists.
fn print_status(config: &Config) {
    if !config.csv_path.exists() {
        return;
    }
    match store::load(&config.csv_path) {
        Ok(targets) => {
            let status = store::status(&targets);
            match status.min_distance {
                Some(distance) => println!(
                    "Store: {} unopened targets, closest at distance {:.2}.",
                    status.remaining, distance
                ),
                None => println!("Store: all targets opened."),
            }
        }
        Err(e) => eprintln!(
            "Warning: could not read {}: {e}",
            config.csv_path.display()
        ),
    }
}

fn print_preview(targets: &[Target]) {
    for target in targets.iter().take(20) {
        println!(
            "  {:>8.2}  ({}|{})  {}",
            target.distance, target.x, target.y, target.name
        );
    }
    if targets.len() > 20 {
        println!("  ... and {} more", targets.len() - 20);
    }
}
