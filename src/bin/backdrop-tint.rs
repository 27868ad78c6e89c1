//! Backdrop Tint CLI Tool
//!
//! Command-line interface for recoloring studio photo backdrops.

#[cfg(feature = "cli")]
use backdrop_tint::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
