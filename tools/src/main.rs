//! case-runner: headless draw runner for the CaseOGO engine.
//!
//! Usage:
//!   case-runner --seed 42 --opens 25 --db run.db --data-dir ./data
//!   case-runner --seed 7 --opens 1000 --gcoins 200000

use anyhow::Result;
use caseogo_core::{
    catalog::Item,
    config::CaseConfig,
    error::DrawError,
    session::CaseSession,
    store::CaseStore,
};
use std::collections::BTreeMap;
use std::env;

#[derive(serde::Deserialize)]
struct ItemSeedFile {
    items: Vec<Item>,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let opens = parse_arg(&args, "--opens", 25u64);
    let viewport = parse_arg(&args, "--viewport", 1000.0f64);
    let db = args
        .windows(2)
        .find(|w| w[0] == "--db")
        .map(|w| w[1].as_str())
        .unwrap_or(":memory:");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let profile = args
        .windows(2)
        .find(|w| w[0] == "--profile")
        .map(|w| w[1].as_str())
        .unwrap_or("runner");

    let config = CaseConfig::load(data_dir)?;

    // Default bankroll covers every requested open.
    let gcoins = parse_arg(&args, "--gcoins", opens as i64 * config.case_price);

    println!("CaseOGO — case-runner");
    println!("  seed:      {seed}");
    println!("  opens:     {opens}");
    println!("  db:        {db}");
    println!("  data_dir:  {data_dir}");
    println!("  profile:   {profile}");
    println!("  bankroll:  {gcoins} gcoins");
    println!();

    let store = if db == ":memory:" {
        CaseStore::in_memory()?
    } else {
        CaseStore::open(db)?
    };
    store.migrate()?;

    if store.item_count()? == 0 {
        seed_catalog(&store, data_dir)?;
    }
    let profile_id = profile.to_string();
    if !store.profile_exists(&profile_id)? {
        store.insert_profile(&profile_id, profile, gcoins)?;
    }

    let mut session = CaseSession::new(profile_id, store, config.clone(), seed)?;

    let mut rarity_counts: BTreeMap<String, u64> = BTreeMap::new();
    let mut completed = 0u64;
    for _ in 0..opens {
        match session.open() {
            Ok(()) => {}
            Err(DrawError::InsufficientFunds { balance, price }) => {
                println!("Stopping: balance {balance} below price {price}");
                break;
            }
            Err(e) => return Err(e.into()),
        }
        session.launch(viewport)?;
        let outcome = session
            .advance(config.reveal_duration_ms)?
            .ok_or_else(|| anyhow::anyhow!("deadline elapsed but draw did not settle"))?;
        *rarity_counts.entry(outcome.item.rarity.clone()).or_default() += 1;
        completed += 1;
        session.acknowledge();
    }

    print_summary(&session, &rarity_counts, completed)?;
    Ok(())
}

fn seed_catalog(store: &CaseStore, data_dir: &str) -> Result<()> {
    let path = format!("{data_dir}/items.json");
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
    let file: ItemSeedFile = serde_json::from_str(&content)?;
    for item in &file.items {
        store.insert_item(item)?;
    }
    log::info!("Seeded {} catalog items from {path}", file.items.len());
    Ok(())
}

fn print_summary(
    session: &CaseSession,
    rarity_counts: &BTreeMap<String, u64>,
    completed: u64,
) -> Result<()> {
    let denom = completed.max(1);
    println!("=== RUN SUMMARY ===");
    println!("  opens:          {completed}");
    println!("  final balance:  {} gcoins", session.balance());
    println!("  inventory rows: {}", session.inventory()?.len());

    println!();
    println!("=== RARITY DISTRIBUTION ===");
    if rarity_counts.is_empty() {
        println!("  (no draws completed)");
    }
    for (rarity, count) in rarity_counts {
        let pct = *count as f64 / denom as f64 * 100.0;
        println!("  {rarity:<12} {count:>6}  ({pct:.1}%)");
    }
    Ok(())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
