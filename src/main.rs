//! qrng-nist CLI entry point
//!
//! QRNG sample collector and NIST SP800-22r1a test runner

use qrng_nist::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
