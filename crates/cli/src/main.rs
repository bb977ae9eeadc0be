use std::process::ExitCode;

fn main() -> ExitCode {
    tableside_cli::run()
}
