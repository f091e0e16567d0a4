fn main() {
    if let Err(err) = gexf_layout::cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
