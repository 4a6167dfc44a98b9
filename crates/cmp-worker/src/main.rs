use clap::Parser;
use cmp_worker::{logging, options::Options, pipeline};

#[tokio::main]
async fn main() {
    let options = Options::parse();
    logging::init_logging(&options.log);

    if let Err(err) = pipeline::run(options).await {
        tracing::error!("{err:?}");
        std::process::exit(1);
    }
}
