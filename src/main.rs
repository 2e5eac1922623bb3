#[tokio::main]
async fn main() {
    if let Err(e) = er_roster_lib::run().await {
        tracing::error!("{e}");
        eprintln!("er-roster: {e}");
        std::process::exit(1);
    }
}
