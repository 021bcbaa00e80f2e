use clap::Parser;

use crate::cmds::lifecycle::FetchCliArgs;
use crate::http::Method;

#[derive(Parser)]
pub struct FetchCommand {
    /// Absolute URL, or a path resolved against the configured origin
    #[clap()]
    url: String,
    /// Issue the request as a top-level page navigation
    #[clap(long)]
    navigate: bool,
    /// HTTP method. Only GET requests are served by the offline policy
    #[clap(long, short = 'X', default_value = "GET", value_parser = parse_method)]
    method: Method,
}

fn parse_method(method: &str) -> Result<Method, String> {
    Method::try_from(method).map_err(|err| err.to_string())
}

pub enum LifecycleOptions {
    Install,
    Update,
    Fetch(FetchCliArgs),
    Caches,
    Entries,
}

impl From<FetchCommand> for LifecycleOptions {
    fn from(options: FetchCommand) -> Self {
        LifecycleOptions::Fetch(
            FetchCliArgs::builder()
                .url(options.url)
                .navigate(options.navigate)
                .method(options.method)
                .build()
                .unwrap(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Args, CliOptions, Command, OptionArgs};

    #[test]
    fn test_fetch_command_defaults() {
        let args = Args::parse_from(["ipso", "fetch", "/noticias"]);
        let fetch_command = match args.command {
            Command::Fetch(options) => options,
            _ => panic!("Expected fetch command"),
        };
        let options: LifecycleOptions = fetch_command.into();
        match options {
            LifecycleOptions::Fetch(args) => {
                assert_eq!("/noticias", args.url);
                assert!(!args.navigate);
                assert_eq!(Method::GET, args.method);
            }
            _ => panic!("Expected LifecycleOptions::Fetch"),
        }
    }

    #[test]
    fn test_fetch_navigation_with_method() {
        let option_args: OptionArgs =
            Args::parse_from(["ipso", "fetch", "/", "--navigate", "-X", "post"]).into();
        match option_args.cli_options {
            CliOptions::Lifecycle(LifecycleOptions::Fetch(args)) => {
                assert!(args.navigate);
                assert_eq!(Method::POST, args.method);
            }
            _ => panic!("Expected LifecycleOptions::Fetch"),
        }
    }

    #[test]
    fn test_fetch_rejects_unknown_method() {
        assert!(Args::try_parse_from(["ipso", "fetch", "/", "--method", "BREW"]).is_err());
    }
}
