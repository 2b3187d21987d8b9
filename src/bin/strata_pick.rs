fn main() {
    if let Err(err) = strata::cli::run_pick(std::env::args().skip(1)) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
