//! Roboter entry point
//!
//! Runs one interactive session on stdin/stdout.

use roboter::Settings;
use roboter::conversation::talk_about_restaurant;

fn main() {
    env_logger::init();
    log::info!("Roboter starting...");

    let settings = Settings::load();
    log::debug!("Settings: {:?}", settings);

    if let Err(e) = talk_about_restaurant(&settings) {
        log::error!("Session failed: {}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
