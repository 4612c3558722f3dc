use std::process::ExitCode;

fn main() -> ExitCode {
    storepulse_cli::run()
}
