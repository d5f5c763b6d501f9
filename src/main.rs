fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("karmabot=info")),
        )
        .init();

    if let Err(e) = karmabot::run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
