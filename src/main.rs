use bird_media_proxy::{Config, run};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::load().expect("Failed to load configuration");
    run(config).await;
}
