//! # margin
//!
//! Entry point of the `margin` binary. Setup and dispatch live in
//! `lib.rs` so commands can be tested without spawning a process.

use std::process::ExitCode;

fn main() -> ExitCode {
    margin_cli::run()
}
