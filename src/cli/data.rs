use clap::{Parser, ValueEnum};

use crate::api_defaults;
use crate::cmds::data::{DataCliArgs, Resource};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq)]
pub enum ResourceCli {
    All,
    BasicData,
    Programs,
    News,
    Videos,
    Sponsors,
    Promotions,
    Podcasts,
    Videocasts,
    SocialNetworks,
}

impl From<ResourceCli> for Resource {
    fn from(resource: ResourceCli) -> Self {
        match resource {
            ResourceCli::All => Resource::All,
            ResourceCli::BasicData => Resource::BasicData,
            ResourceCli::Programs => Resource::Programs,
            ResourceCli::News => Resource::News,
            ResourceCli::Videos => Resource::Videos,
            ResourceCli::Sponsors => Resource::Sponsors,
            ResourceCli::Promotions => Resource::Promotions,
            ResourceCli::Podcasts => Resource::Podcasts,
            ResourceCli::Videocasts => Resource::Videocasts,
            ResourceCli::SocialNetworks => Resource::SocialNetworks,
        }
    }
}

#[derive(Parser)]
pub struct DataCommand {
    #[clap()]
    resource: ResourceCli,
    /// Page to retrieve (news, podcasts, videocasts)
    #[clap(long, default_value_t = api_defaults::DEFAULT_PAGE)]
    page: u32,
    /// Items per page (news, podcasts, videocasts)
    #[clap(long, default_value_t = api_defaults::DEFAULT_LIMIT)]
    limit: u32,
    /// Retrieve a single item: news slug, podcast or videocast id
    #[clap(long)]
    id: Option<String>,
}

#[derive(Parser)]
pub struct ImageCommand {
    /// Image path as returned by the API, e.g. /uploads/logo.png
    #[clap()]
    path: String,
}

pub enum DataOptions {
    Resource(DataCliArgs),
    NowPlaying,
    ImageUrl { path: String },
}

impl From<DataCommand> for DataOptions {
    fn from(options: DataCommand) -> Self {
        DataOptions::Resource(
            DataCliArgs::builder()
                .resource(options.resource.into())
                .page(options.page)
                .limit(options.limit)
                .id(options.id)
                .build()
                .unwrap(),
        )
    }
}

impl From<ImageCommand> for DataOptions {
    fn from(options: ImageCommand) -> Self {
        DataOptions::ImageUrl { path: options.path }
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Args, CliOptions, OptionArgs};

    use super::*;

    fn data_args(argv: &[&str]) -> DataCliArgs {
        let option_args: OptionArgs = Args::parse_from(argv).into();
        match option_args.cli_options {
            CliOptions::Data(DataOptions::Resource(args)) => args,
            _ => panic!("Expected DataOptions::Resource"),
        }
    }

    #[test]
    fn test_data_command_pagination_defaults() {
        let args = data_args(&["ipso", "data", "news"]);
        assert_eq!(Resource::News, args.resource);
        assert_eq!(1, args.page);
        assert_eq!(10, args.limit);
        assert!(args.id.is_none());
    }

    #[test]
    fn test_data_command_kebab_case_resource_and_id() {
        let args = data_args(&["ipso", "data", "social-networks"]);
        assert_eq!(Resource::SocialNetworks, args.resource);
        let args = data_args(&["ipso", "data", "podcasts", "--id", "42", "--page", "3"]);
        assert_eq!(Resource::Podcasts, args.resource);
        assert_eq!(Some("42".to_string()), args.id);
        assert_eq!(3, args.page);
    }

    #[test]
    fn test_data_command_rejects_unknown_resource() {
        assert!(Args::try_parse_from(["ipso", "data", "weather"]).is_err());
    }

    #[test]
    fn test_image_command() {
        let option_args: OptionArgs = Args::parse_from(["ipso", "image", "/uploads/a.png"]).into();
        match option_args.cli_options {
            CliOptions::Data(DataOptions::ImageUrl { path }) => assert_eq!("/uploads/a.png", path),
            _ => panic!("Expected DataOptions::ImageUrl"),
        }
    }
}
