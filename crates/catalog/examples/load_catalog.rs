use catalog::CatalogIndex;
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/catalog.json");

    println!("Loading catalog...\n");

    let start = Instant::now();
    let index = CatalogIndex::load_from_file(path).expect("Failed to load catalog");
    let elapsed = start.elapsed();

    println!("=== Load Complete ===");
    println!("Time taken: {:?}", elapsed);
    println!("Items: {}", index.len());
    println!("Origins: {}", index.origins().join(", "));
}
