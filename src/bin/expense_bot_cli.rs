use expense_bot::cli::{output, run_cli};

fn main() {
    expense_bot::init();
    if let Err(err) = run_cli() {
        output::error(&err);
        std::process::exit(1);
    }
}
