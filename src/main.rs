fn main() {
    if let Err(e) = ocichat::cli::main() {
        eprintln!("❌ {e}");
        std::process::exit(1);
    }
}
