use std::process::ExitCode;

fn main() -> ExitCode {
    braseiro_cli::run()
}
