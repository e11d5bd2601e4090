//! Heartfelt - command-line tool for validating and simulating the greeting page

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    heartfelt::cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
