use std::path::{Path, PathBuf};
use std::sync::Arc;

use env_logger::Env;
use ipso::{
    cli::{parse_cli, CliOptions},
    cmds::{self, data, events, lifecycle},
    config::{Config, ConfigProperties},
    error, Result,
};

const CONFIG_PATH: &str = ".config/ipso/config.toml";
const CACHE_PATH: &str = ".cache/ipso";

fn main() -> Result<()> {
    let option_args = parse_cli();
    let cli_args = option_args.cli_args;
    if cli_args.verbose {
        let env = Env::default().default_filter_or("info");
        env_logger::init_from_env(env);
    }
    let home_dir = std::env::var("HOME").map_err(|_| error::gen("HOME is not set"))?;
    let config_file = cli_args
        .config
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(&home_dir).join(CONFIG_PATH));
    let mut config = Config::load(&config_file)?;
    if config.cache_location().is_none() {
        let cache_dir = Path::new(&home_dir).join(CACHE_PATH);
        config = config.with_cache_location(&cache_dir.to_string_lossy());
    }
    let controller = cmds::desktop_controller(&config)?;
    let stdout = std::io::stdout();
    match option_args.cli_options {
        CliOptions::Lifecycle(options) => lifecycle::execute(options, controller, stdout),
        CliOptions::Event(options) => {
            controller.resume()?;
            events::execute(options, &controller, stdout)
        }
        CliOptions::Data(options) => {
            controller.resume()?;
            let origin = config.origin().to_string();
            data::execute(options, Arc::new(controller), &origin, stdout)
        }
    }
}
