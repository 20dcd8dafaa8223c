//! Check-seed command implementation.

use devreg_core::Seed;
use std::path::Path;

/// Runs the check-seed command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Checking seed file {:?}", path);

    let seed = Seed::load(path)?;
    let active = seed.accounts.iter().filter(|a| a.active).count();

    match seed.validate() {
        Ok(()) => {
            println!("  Accounts: {} ({} active)", seed.accounts.len(), active);
            println!("  Devices:  {}", seed.device_count());
            println!("✓ Seed file is valid");
            Ok(())
        }
        Err(e) => {
            println!("✗ Seed file is invalid: {e}");
            Err(e.into())
        }
    }
}
