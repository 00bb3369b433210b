fn main() {
    if let Err(err) = include_chord::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
