fn main() {
    if let Err(e) = complaint_tracker_lib::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
