use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use clap::Parser;
use linear_probe::HashTable;
use linear_probe::RebuildPolicy;
use linear_probe::hash_table::Entry;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_count", default_value_t = 1000)]
    target_count: usize,

    /// Fraction of the inserted values to remove again before reporting.
    #[arg(short = 'e', long = "erase_fraction", default_value_t = 0.25)]
    erase_fraction: f64,

    #[arg(short = 'd', long = "density", default_value_t = RebuildPolicy::default().density())]
    density: usize,
}

fn hash_u64(value: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

fn main() -> linear_probe::Result<()> {
    let args = Args::parse();
    let policy = RebuildPolicy::new(args.density)?;

    println!(
        "Creating HashTable for {} values with density {}",
        args.target_count,
        policy.density()
    );

    let mut table: HashTable<u64> = HashTable::with_policy(policy);
    let mut rebuilds = 0;

    println!("Filling table with u64 values...");
    for i in 0..args.target_count {
        let value = i as u64;
        let hash = hash_u64(value);
        let slots = table.slot_count();

        match table.entry(hash, |&v| v == value) {
            Entry::Vacant(entry) => {
                entry.insert(value);
            }
            Entry::Occupied(_) => {
                panic!("Value already exists in table: {}", value);
            }
        }

        if table.slot_count() != slots {
            rebuilds += 1;
        }
    }

    println!(
        "Inserted {} values into {} slots ({} growth rebuilds)",
        table.len(),
        table.slot_count(),
        rebuilds
    );

    let to_erase = (args.target_count as f64 * args.erase_fraction.clamp(0.0, 1.0)) as usize;
    for i in 0..to_erase {
        let value = i as u64;
        table.remove(hash_u64(value), |&v| v == value);
    }

    println!("Erased {} values, {} remain", to_erase, table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.slot_count() as f64) * 100.0
    );

    table.probe_histogram().print();
    table.debug_stats().print();

    Ok(())
}
