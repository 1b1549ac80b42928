use data_loader::{aggregate, summarize, DataSource, FileSource};
use std::env;
use std::time::Instant;

fn main() {
    let path = env::args().nth(1).unwrap_or_else(|| "data/interactions.csv".to_string());

    println!("Loading interactions from {}...\n", path);

    let start = Instant::now();
    let records = FileSource::new(&path)
        .load()
        .expect("Failed to load interactions");
    let elapsed = start.elapsed();

    let summary = summarize(&records);
    let aggregated = aggregate(&records);

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Records: {}", summary.records);
    println!("Users: {}", summary.distinct_users);
    println!("Items: {}", summary.distinct_items);
    println!("Distinct pairs: {}", aggregated.len());
    println!("\nPerformance: {:.0} records/second",
             records.len() as f64 / elapsed.as_secs_f64());
}
