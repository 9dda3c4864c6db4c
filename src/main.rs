use std::io;

use gemini_chat::app::{self, Settings};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let settings = Settings::load();
    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    if let Err(e) = app::run(&settings, &mut input, &mut out) {
        log::error!("gemini-chat: {e}");
        std::process::exit(1);
    }
}
