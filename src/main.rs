use order_matching_engine::cli::run_cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    run_cli()
}
