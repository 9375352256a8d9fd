// Forwards to the wfc-app front end.
fn main() {
    std::process::exit(match wfc_app::run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    });
}
