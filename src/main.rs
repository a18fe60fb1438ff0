use std::process::ExitCode;

fn main() -> ExitCode {
    risk_triage::run()
}
