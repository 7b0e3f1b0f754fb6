mod application;
mod domain;
mod infrastructure;
mod presentation;

use crate::infrastructure::http_client::HyperHttpClient;
use crate::infrastructure::logging;
use crate::presentation::cli::{Cli, normalize_args};
use clap::Parser;
use std::io::{self, Write};

/// curlpp: a single HTTP request from the command line
///
/// Applies the selected profile's credentials, prints the status, timing and
/// headers, then renders the body as coloured JSON, extracted HTML or plain
/// text. Parallel requests, retries and `-H` parsing are accepted but not
/// implemented.
#[tokio::main]
async fn main() {
    logging::init();
    let cli = Cli::parse_from(normalize_args(std::env::args()));

    if cli.url().is_none() {
        println!("URL is required");
        println!("{}", Cli::usage());
        std::process::exit(1);
    }

    let request_service = match HyperHttpClient::new() {
        Ok(client) => client.create_request_service(cli.config()),
        Err(err) => {
            println!("Error: {}", err);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = cli.run(&request_service, &mut out).await {
        let _ = writeln!(out, "Error: {}", err);
        let _ = out.flush();
        std::process::exit(1);
    }
}
