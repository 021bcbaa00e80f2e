use std::io::Write;

use crate::cache::CacheStorage;
use crate::cli::lifecycle::LifecycleOptions;
use crate::clients::Clients;
use crate::controller::{CacheController, ControllerState};
use crate::http::{resolve_url, Method, Request, RequestMode};
use crate::io::{HttpRunner, Response};
use crate::registration::{Registration, UpdateOutcome};
use crate::Result;
use crate::log_warn;

#[derive(Builder, Debug)]
pub struct FetchCliArgs {
    pub url: String,
    #[builder(default)]
    pub navigate: bool,
    #[builder(default)]
    pub method: Method,
}

impl FetchCliArgs {
    pub fn builder() -> FetchCliArgsBuilder {
        FetchCliArgsBuilder::default()
    }
}

pub fn execute<S: CacheStorage, R: HttpRunner, C: Clients, W: Write>(
    options: LifecycleOptions,
    controller: CacheController<S, R, C>,
    mut writer: W,
) -> Result<()> {
    match options {
        LifecycleOptions::Install => {
            controller.install()?;
            writeln!(writer, "Installed {}", controller.cache_name())?;
        }
        LifecycleOptions::Update => update(controller, &mut writer)?,
        LifecycleOptions::Fetch(args) => {
            controller.resume()?;
            let response = fetch(&controller, &args)?;
            print_response(&response, &mut writer)?;
        }
        LifecycleOptions::Caches => {
            for name in controller.generations()? {
                let marker = if name == controller.cache_name() { "*" } else { " " };
                writeln!(writer, "{marker} {name}")?;
            }
        }
        LifecycleOptions::Entries => {
            for key in controller.entries()? {
                writeln!(writer, "{key}")?;
            }
        }
    }
    Ok(())
}

fn update<S: CacheStorage, R: HttpRunner, C: Clients, W: Write>(
    controller: CacheController<S, R, C>,
    writer: &mut W,
) -> Result<()> {
    let mut registration = Registration::new(controller.runner());
    match registration.update(controller)? {
        UpdateOutcome::Activated(report) => {
            for name in &report.deleted {
                writeln!(writer, "Deleted {name}")?;
            }
            for name in &report.failed {
                writeln!(writer, "Could not delete {name}")?;
            }
        }
        UpdateOutcome::Waiting => {}
    }
    if let Some(active) = registration.active() {
        writeln!(writer, "Active {}", active.cache_name())?;
    }
    Ok(())
}

pub fn fetch<S: CacheStorage, R: HttpRunner, C: Clients>(
    controller: &CacheController<S, R, C>,
    args: &FetchCliArgs,
) -> Result<Response> {
    if controller.state() != ControllerState::Active {
        log_warn!(
            "Cache generation {} is not installed, requests go to the network",
            controller.cache_name()
        );
    }
    let url = resolve_url(&controller.config().origin, &args.url);
    let mode = if args.navigate {
        RequestMode::Navigate
    } else {
        RequestMode::default()
    };
    let request = Request::builder()
        .method(args.method)
        .url(url)
        .mode(mode)
        .build()?;
    controller.fetch(&request)
}

fn print_response<W: Write>(response: &Response, writer: &mut W) -> Result<()> {
    writeln!(writer, "{} {}", response.status, response.status_text)?;
    writeln!(writer)?;
    writer.write_all(&response.body)?;
    Ok(())
}
