//! Step through the classic "ushers" example
//!
//! Prints the automaton state and any matches after every symbol, then
//! undoes the last step and dumps the driver.
//!
//! Run with:
//!   cargo run --example ushers_walkthrough

use stepmatch::Driver;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut driver = Driver::new();
    for pattern in ["he", "she", "his", "hers"] {
        driver.add_pattern(pattern)?;
    }
    driver.set_text("ushers");

    println!("Automaton: {} nodes", driver.automaton().node_count());

    let symbols: Vec<char> = driver.text().chars().collect();
    while driver.step() {
        let index = driver.cursor() - 1;
        let found: Vec<&str> = driver
            .raw_results()
            .iter()
            .filter(|record| record.index == index)
            .map(|record| driver.patterns()[record.pattern as usize].as_str())
            .collect();
        println!(
            "  [{}] {:?} -> state {} {:?}",
            index,
            symbols[index],
            driver.automaton().current_state(),
            found
        );
    }

    println!("\nMatches (start:pattern): {}", driver.results_to_string());
    println!("Status: {}", driver.status());

    driver.undo();
    println!("\nAfter undo, cursor = {}", driver.cursor());
    println!("\nDump:\n{}", driver);

    Ok(())
}
