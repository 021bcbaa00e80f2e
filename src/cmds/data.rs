use std::io::Write;
use std::sync::Arc;

use serde_json::Value;

use crate::api::DataClient;
use crate::cli::data::DataOptions;
use crate::error;
use crate::io::HttpRunner;
use crate::Result;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Resource {
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

#[derive(Builder, Debug)]
pub struct DataCliArgs {
    pub resource: Resource,
    pub page: u32,
    pub limit: u32,
    #[builder(default)]
    pub id: Option<String>,
}

impl DataCliArgs {
    pub fn builder() -> DataCliArgsBuilder {
        DataCliArgsBuilder::default()
    }
}

/// Runs dashboard queries through `runner`. Handing it the controller gives
/// them the offline policy.
pub fn execute<R: HttpRunner, W: Write>(
    options: DataOptions,
    runner: Arc<R>,
    origin: &str,
    mut writer: W,
) -> Result<()> {
    let client = DataClient::new(runner, origin);
    match options {
        DataOptions::Resource(args) => {
            let data = get_resource(&client, &args)?;
            writeln!(writer, "{}", serde_json::to_string_pretty(&data)?)?;
        }
        DataOptions::NowPlaying => {
            let song = client.current_song();
            writeln!(writer, "{}", serde_json::to_string_pretty(&song)?)?;
        }
        DataOptions::ImageUrl { path } => {
            writeln!(writer, "{}", client.build_image_url(&path)?)?;
        }
    }
    Ok(())
}

pub fn get_resource<R: HttpRunner>(client: &DataClient<R>, args: &DataCliArgs) -> Result<Value> {
    match (args.resource, args.id.as_deref()) {
        (Resource::News, Some(slug)) => client.news_by_slug(slug),
        (Resource::Podcasts, Some(id)) => client.podcast_by_id(id),
        (Resource::Videocasts, Some(id)) => client.videocast_by_id(id),
        (resource, Some(_)) => Err(error::gen(format!(
            "{resource:?} cannot be retrieved by id, only news, podcasts and videocasts"
        ))),
        (Resource::All, None) => client.all_client_data(),
        (Resource::BasicData, None) => client.basic_data(),
        (Resource::Programs, None) => client.programs(),
        (Resource::News, None) => client.news(args.page, args.limit),
        (Resource::Videos, None) => client.videos(),
        (Resource::Sponsors, None) => client.sponsors(),
        (Resource::Promotions, None) => client.promotions(),
        (Resource::Podcasts, None) => client.podcasts(args.page, args.limit),
        (Resource::Videocasts, None) => client.videocasts(args.page, args.limit),
        (Resource::SocialNetworks, None) => client.social_networks(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::InMemoryStorage;
    use crate::controller::{CacheController, ControllerConfig};
    use crate::test::utils::{MockClients, MockRunner, ORIGIN};

    const RUNTIME_CONFIG: &str = r#"{
        "ipstream_base_url": "https://dashboard.ipstream.cl/api/public",
        "clientId": "7",
        "sonicpanel_stream_url": "https://stream.ipstream.cl:8040/stream"
    }"#;

    const BASE: &str = "https://dashboard.ipstream.cl/api/public/7";

    fn runner() -> MockRunner {
        MockRunner::new().with_response(&format!("{ORIGIN}/config/config.json"), 200, RUNTIME_CONFIG)
    }

    fn args(resource: Resource, id: Option<&str>) -> DataCliArgs {
        DataCliArgs::builder()
            .resource(resource)
            .page(1)
            .limit(10)
            .id(id.map(|id| id.to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_resource_by_id() {
        let runner = runner().with_response(&format!("{BASE}/podcasts/42"), 200, r#"{"id": 42}"#);
        let mut writer = Vec::new();
        execute(
            DataOptions::Resource(args(Resource::Podcasts, Some("42"))),
            Arc::new(runner),
            ORIGIN,
            &mut writer,
        )
        .unwrap();
        assert_eq!("{\n  \"id\": 42\n}\n", String::from_utf8(writer).unwrap());
    }

    #[test]
    fn test_id_not_supported_for_resource() {
        let client = DataClient::new(Arc::new(runner()), ORIGIN);
        assert!(get_resource(&client, &args(Resource::Sponsors, Some("1"))).is_err());
    }

    #[test]
    fn test_image_url() {
        let mut writer = Vec::new();
        execute(
            DataOptions::ImageUrl {
                path: "/uploads/logo.png".to_string(),
            },
            Arc::new(runner()),
            ORIGIN,
            &mut writer,
        )
        .unwrap();
        assert_eq!(
            "https://dashboard.ipstream.cl/uploads/logo.png\n",
            String::from_utf8(writer).unwrap()
        );
    }

    #[test]
    fn test_data_served_from_cache_when_offline() {
        let runner = Arc::new(
            runner()
                .with_response(&format!("{ORIGIN}/offline.html"), 200, "offline")
                .with_response(&format!("{ORIGIN}/manifest.json"), 200, "{}")
                .with_response(&format!("{ORIGIN}/assets/js/config.js"), 200, "export {}")
                .with_response(&format!("{BASE}/programs"), 200, r#"[{"name": "Mañanas"}]"#),
        );
        let config = ControllerConfig {
            origin: ORIGIN.to_string(),
            ..ControllerConfig::default()
        };
        let controller = Arc::new(CacheController::new(
            config,
            Arc::new(InMemoryStorage::new()),
            runner.clone(),
            Arc::new(MockClients::new()),
        ));
        controller.install().unwrap();
        controller.activate().unwrap();

        let options = || DataOptions::Resource(args(Resource::Programs, None));
        execute(options(), controller.clone(), ORIGIN, Vec::new()).unwrap();

        runner.set_offline(true);
        let mut writer = Vec::new();
        execute(options(), controller, ORIGIN, &mut writer).unwrap();
        let output: Value = serde_json::from_slice(&writer).unwrap();
        assert_eq!("Mañanas", output[0]["name"]);
    }

    #[test]
    fn test_now_playing_offline_is_placeholder() {
        let runner = runner();
        runner.set_offline(true);
        let mut writer = Vec::new();
        execute(DataOptions::NowPlaying, Arc::new(runner), ORIGIN, &mut writer).unwrap();
        let output: Value = serde_json::from_slice(&writer).unwrap();
        assert_eq!("Radio en Vivo", output["title"]);
        assert_eq!("N/A", output["bitrate"]);
    }
}
