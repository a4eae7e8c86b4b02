mod cli;

use cli::args::{Args, Parser};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let config = args.into_config();

    let guards = elasticfs::process::init_logging(&config);

    let result = elasticfs::process::run(config).await;
    if let Err(e) = &result {
        tracing::error!("{}", e);
    }

    // Flush buffered log lines before exiting
    drop(guards);

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
