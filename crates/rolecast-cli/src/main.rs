use std::process;

#[tokio::main]
async fn main() {
    let code = rolecast_cli::run().await;
    process::exit(code);
}
