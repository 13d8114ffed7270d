fn main() {
    if let Err(err) = topology_circles::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
