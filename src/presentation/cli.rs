use crate::application::services::HttpRequestService;
use crate::domain::entities::Request;
use crate::infrastructure::config::Config;
use crate::infrastructure::output::{RenderOptions, print_response};
use anyhow::{Result, anyhow};
use clap::{ArgAction, CommandFactory, Parser};
use std::collections::HashMap;
use std::io::Write;
use tracing::debug;

/// CLI configuration for curlpp
#[derive(Parser, Debug)]
#[command(name = "curlpp", version = "0.1.0")]
#[command(about = "curlpp: one HTTP request, authenticated and pretty-printed", long_about = None)]
pub struct Cli {
    /// URL to request
    #[arg(long)]
    pub url: Option<String>,

    /// HTTP method
    #[arg(short, long, default_value = "GET")]
    pub method: String,

    /// Pretty print response
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        default_missing_value = "true",
        action = ArgAction::Set
    )]
    pub pretty: bool,

    /// Number of parallel requests (accepted, not implemented)
    #[arg(long, default_value_t = 1)]
    pub parallel: u32,

    /// Number of retries for failed requests (accepted, not implemented)
    #[arg(long, default_value_t = 3)]
    pub retries: u32,

    /// Config profile to use; only "default" exists
    #[arg(long, default_value = "")]
    pub profile: String,

    /// Header in format 'key:value' (accepted, not parsed yet)
    #[arg(short = 'H', long = "header")]
    pub header: Option<String>,

    /// CSS selector to extract specific elements from HTML
    #[arg(long)]
    pub selector: Option<String>,
}

/// Long flags that may also be spelled with a single dash, as in `-url=...`.
const LONG_FLAGS: &[&str] = &[
    "url", "method", "pretty", "parallel", "retries", "profile", "header", "selector",
];

/// Rewrites single-dash long flags (`-url`, `-pretty=false`) to their `--` form.
///
/// The program name, short flags and anything after a bare `--` pass through.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();
    let mut options_ended = false;
    for arg in args {
        if arg == "--" {
            options_ended = true;
        }
        let name = arg
            .strip_prefix('-')
            .filter(|rest| !options_ended && !rest.starts_with('-'))
            .map(|rest| rest.split_once('=').map_or(rest, |(name, _)| name));
        match name {
            Some(name) if LONG_FLAGS.contains(&name) => normalized.push(format!("-{}", arg)),
            _ => normalized.push(arg),
        }
    }
    normalized
}

impl Cli {
    /// The target URL, if one was given and is non-empty
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn usage() -> String {
        Self::command().render_help().to_string()
    }

    pub fn config(&self) -> Config {
        Config::from_env(self.profile.clone())
    }

    pub fn request(&self) -> Result<Request> {
        let url = self.url().ok_or_else(|| anyhow!("URL is required"))?;

        let headers = HashMap::new();
        if let Some(header) = &self.header {
            // TODO: split "key:value" into `headers`.
            debug!(%header, "header flag is not parsed, ignoring");
        }

        Ok(Request {
            url: url.to_string(),
            method: self.method.clone(),
            pretty: self.pretty,
            parallel: self.parallel,
            retries: self.retries,
            headers,
            body: None,
        })
    }

    pub async fn run<W: Write>(
        &self,
        request_service: &HttpRequestService,
        out: &mut W,
    ) -> Result<()> {
        let request = self.request()?;
        let response = request_service.send_request(request).await?;

        let options = RenderOptions {
            pretty: self.pretty,
            selector: self.selector.as_deref(),
        };
        print_response(out, &response, &options)?;
        out.flush()?;
        Ok(())
    }
}
