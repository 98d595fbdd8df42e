use anyhow::Context;
use polycase_kernel::config::load_config;
use polycase_kernel::domain::config::ApiConfig;
use polycase_logger::Logger;
use polycase_server::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg: ApiConfig =
        load_config(Some("server")).context("Critical: Configuration is malformed")?;

    let logging = &cfg.logging;
    let mut logger = Logger::builder().name(&logging.name).json(logging.json);
    logger = logger.level_name(&logging.level)?;
    if let Some(filter) = &logging.filter {
        logger = logger.env_filter(filter);
    }
    if let Some(directory) = &logging.directory {
        logger = logger.directory(directory);
    }
    let _log = logger.init()?;

    Server::builder().config(cfg).build()?.run().await
}
