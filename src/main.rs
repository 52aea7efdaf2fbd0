fn main() {
    if let Err(e) = neurochat::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
