use intake_wizard_cli::run;

fn main() {
    if let Err(err) = run() {
        eprintln!("intake error: {err}");
        std::process::exit(err.exit_code());
    }
}
