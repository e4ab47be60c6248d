use std::process::ExitCode;

fn main() -> ExitCode {
    goodhuman_cli::run()
}
