use std::env;
use std::process::ExitCode;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rb_tree_map::RbTreeMap;

const DEFAULT_KEY_COUNT: u32 = 14;

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse() {
        Ok(n) => Some(n),
        Err(_) => {
            warn!("ignoring {}={:?}: not a number", name, raw);
            None
        }
    }
}

/// Keys from the command line, or `1..=RB_DEMO_KEYS` when none are given.
fn demo_keys() -> Result<Vec<u32>, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut keys = if args.is_empty() {
        let count = env_number("RB_DEMO_KEYS").unwrap_or(DEFAULT_KEY_COUNT);
        (1..=count).collect()
    } else {
        args.iter()
            .map(|a| a.parse::<u32>().map_err(|e| format!("bad key {:?}: {}", a, e)))
            .collect::<Result<Vec<_>, _>>()?
    };

    if let Some(seed) = env_number::<u64>("RB_DEMO_SEED") {
        keys.shuffle(&mut StdRng::seed_from_u64(seed));
        info!("shuffled insertion order with seed {}", seed);
    }
    Ok(keys)
}

fn main() -> ExitCode {
    env_logger::init();

    let keys = match demo_keys() {
        Ok(keys) => keys,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let mut map = RbTreeMap::new();
    for key in keys {
        if let Err(e) = map.insert(key, ()) {
            error!("insert {}: {}", key, e);
        }
    }
    info!("{} keys, height {}", map.len(), map.height());

    let stdout = std::io::stdout();
    if let Err(e) = map.print(&mut stdout.lock()) {
        error!("printing tree: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
