pub mod data;
pub mod events;
pub mod lifecycle;

use clap::Parser;

use self::data::{DataCommand, DataOptions, ImageCommand};
use self::events::{ClickCommand, EventOptions, PushCommand, SyncCommand};
use self::lifecycle::{FetchCommand, LifecycleOptions};

#[derive(Parser)]
#[command(about = "IPStream offline cache controller", version)]
struct Args {
    #[clap(subcommand)]
    pub command: Command,
    /// Verbose mode. Logs lifecycle and fetch decisions to STDERR
    #[clap(long, short, global = true)]
    pub verbose: bool,
    /// Path to the config file. Defaults to $HOME/.config/ipso/config.toml
    #[clap(long, global = true, value_name = "PATH")]
    pub config: Option<String>,
}

#[derive(Parser)]
enum Command {
    #[clap(about = "Pre-cache the seed manifest into the current generation")]
    Install,
    #[clap(about = "Install the current generation and take over, dropping stale ones")]
    Update,
    #[clap(about = "Fetch a URL through the controller")]
    Fetch(FetchCommand),
    #[clap(about = "List cache generations")]
    Caches,
    #[clap(about = "List the entries of the current generation")]
    Entries,
    #[clap(about = "Deliver a push message")]
    Push(PushCommand),
    #[clap(about = "Click on the push notification")]
    Click(ClickCommand),
    #[clap(about = "Deliver a background sync event")]
    Sync(SyncCommand),
    #[clap(about = "Query the dashboard API through the controller")]
    Data(DataCommand),
    #[clap(name = "now-playing", about = "Show what is on air")]
    NowPlaying,
    #[clap(about = "Resolve an image path returned by the API")]
    Image(ImageCommand),
}

pub enum CliOptions {
    Lifecycle(LifecycleOptions),
    Event(EventOptions),
    Data(DataOptions),
}

impl From<Command> for CliOptions {
    fn from(command: Command) -> Self {
        match command {
            Command::Install => CliOptions::Lifecycle(LifecycleOptions::Install),
            Command::Update => CliOptions::Lifecycle(LifecycleOptions::Update),
            Command::Fetch(options) => CliOptions::Lifecycle(options.into()),
            Command::Caches => CliOptions::Lifecycle(LifecycleOptions::Caches),
            Command::Entries => CliOptions::Lifecycle(LifecycleOptions::Entries),
            Command::Push(options) => CliOptions::Event(options.into()),
            Command::Click(options) => CliOptions::Event(options.into()),
            Command::Sync(options) => CliOptions::Event(options.into()),
            Command::Data(options) => CliOptions::Data(options.into()),
            Command::NowPlaying => CliOptions::Data(DataOptions::NowPlaying),
            Command::Image(options) => CliOptions::Data(options.into()),
        }
    }
}

/// Global flags shared by every command.
pub struct CliArgs {
    pub verbose: bool,
    pub config: Option<String>,
}

pub struct OptionArgs {
    pub cli_options: CliOptions,
    pub cli_args: CliArgs,
}

impl From<Args> for OptionArgs {
    fn from(args: Args) -> Self {
        OptionArgs {
            cli_args: CliArgs {
                verbose: args.verbose,
                config: args.config,
            },
            cli_options: args.command.into(),
        }
    }
}

// Parse cli and return the options plus the global flags. Clap types stay in
// this module; commands only see the domain structs.
pub fn parse_cli() -> OptionArgs {
    Args::parse().into()
}
