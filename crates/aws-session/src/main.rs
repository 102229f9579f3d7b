mod aws;
mod cli;
mod config;
mod console;
mod export;
mod logging;
mod platform;
mod session;
mod validate;

use anyhow::Result;
use log::debug;

use crate::aws::Sts;
use crate::cli::{Args, Command};
use crate::config::Config;
use crate::console::Federation;
use crate::platform::{DefaultPathProvider, HomeDirectory, Terminal};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::new();
    logging::init(args.verbose);

    let path = match args.config {
        Some(path) => path,
        None => HomeDirectory.default_config_path()?,
    };
    let config = Config::load(&path)?;
    debug!("Loaded {} aliases", config.alias_names().len());

    let out = match &args.command {
        Command::List => session::list(&config),
        Command::Auth(auth) => session::auth(&config, auth, &Terminal, &Sts).await?,
        Command::Web(web) => {
            let federation = Federation::new()?;
            session::web(&config, web, &Terminal, &Sts, &federation).await?
        }
    };

    if out.is_empty() || out.ends_with('\n') {
        print!("{out}");
    } else {
        println!("{out}");
    }

    Ok(())
}
