use ray_cli::run_cli;

fn main() {
    // Initialize logging if available
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    run_cli();
}
