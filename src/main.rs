use clap::Parser;

use opentribe::cli::{Cli, Commands};
use opentribe::config::{get_config, init_config_from};
use opentribe::errors::OpentribeError;
use opentribe::runtime::modes;
use opentribe::system::init_logging;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_config_from(&cli.config);

    let result = match cli.command_or_default() {
        // 只输出配置，不需要日志
        Commands::ConfigGen { output } => modes::run_config_gen(output.as_deref()),
        Commands::Cleanup => {
            let _guard = init_logging(&get_config().logging)?;
            modes::run_cleanup().await
        }
        Commands::Serve => {
            let _guard = init_logging(&get_config().logging)?;
            modes::run_server().await
        }
    };

    if let Err(ref e) = result
        && let Some(err) = e.downcast_ref::<OpentribeError>()
    {
        eprintln!("{}", err.format_colored());
    }

    result
}
