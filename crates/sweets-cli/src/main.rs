mod app;
mod cli;
mod render;

fn main() {
    if let Err(e) = cli::run() {
        // The login view is already on screen; nothing more to say.
        if e.downcast_ref::<app::SessionEnded>().is_some() {
            std::process::exit(1);
        }
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}
