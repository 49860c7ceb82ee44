use llama_launcher::app::App;
use tracing_subscriber::EnvFilter;

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("llama_launcher=info")),
        )
        .with_target(false)
        .try_init();

    tracing::info!("Starting llama-launcher");
    dioxus::launch(App);
}
