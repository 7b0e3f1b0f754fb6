use crate::domain::entities::Response;
use crate::infrastructure::highlight::highlight_text;
use anyhow::Result;
use colored::Colorize;
use scraper::{Html, Selector};
use serde_json::value::RawValue;
use std::io::{self, Write};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid CSS selector '{selector}': {message}")]
    Selector { selector: String, message: String },
    #[error("failed to highlight HTML: {0}")]
    Highlight(#[from] syntect::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Only consulted for HTML bodies
    pub pretty: bool,
    pub selector: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Html,
    Text,
}

/// Decides how to render a body.
///
/// The body is tried as JSON first, whatever the declared content type says.
pub fn classify(body: &[u8], content_type: Option<&str>) -> BodyKind {
    // RawValue only validates, so out-of-range numbers still count as JSON.
    if serde_json::from_slice::<Box<RawValue>>(body).is_ok() {
        return BodyKind::Json;
    }
    match content_type {
        Some(ct) if ct.contains("text/html") || ct.contains("application/html") => BodyKind::Html,
        _ => BodyKind::Text,
    }
}

/// Writes the status line, timing, headers and rendered body.
pub fn print_response<W: Write>(
    out: &mut W,
    response: &Response,
    options: &RenderOptions,
) -> Result<()> {
    writeln!(out, "{}", format!("Status Code: {}", response.status.as_u16()).green())?;
    writeln!(
        out,
        "{}",
        format!("Time taken: {:?}", response.timing.total_duration).green()
    )?;

    writeln!(out, "\n{}", "Headers:".blue())?;
    // First value only for repeated headers
    for name in response.headers.keys() {
        if let Some(value) = response.headers.get(name) {
            writeln!(
                out,
                "{} {}",
                format!("{}:", name).cyan(),
                String::from_utf8_lossy(value.as_bytes())
            )?;
        }
    }

    writeln!(out, "\nResponse Body:")?;
    print_response_body(out, response, options)
}

pub fn print_response_body<W: Write>(
    out: &mut W,
    response: &Response,
    options: &RenderOptions,
) -> Result<()> {
    let kind = classify(&response.body, response.content_type());
    debug!(?kind, pretty = options.pretty, "rendering body");

    match kind {
        BodyKind::Json => print_json(out, &response.body)?,
        BodyKind::Html => match print_html(out, &response.body, options) {
            Ok(()) => {}
            Err(RenderError::Io(e)) => return Err(e.into()),
            Err(e) => print_html_fallback(out, &response.body, &e)?,
        },
        BodyKind::Text => print_text(out, &response.body)?,
    }
    Ok(())
}

// Always reformatted and coloured, whatever `pretty` says.
fn print_json<W: Write>(out: &mut W, body: &[u8]) -> Result<()> {
    let text = std::str::from_utf8(body)?;
    let pretty = indent_json(text);
    writeln!(out, "{}", highlight_text(&pretty, "json")?)?;
    Ok(())
}

/// Re-indents already validated JSON with two spaces per level.
///
/// Numbers and strings are copied as written, so `1e2` or a 30-digit integer
/// come out exactly as the server sent them.
fn indent_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = json.chars().peekable();

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' | '[' => {
                out.push(c);
                while chars.next_if(|c| c.is_ascii_whitespace()).is_some() {}
                if let Some(close) = chars.next_if(|c| matches!(*c, '}' | ']')) {
                    out.push(close);
                } else {
                    depth += 1;
                    push_newline(&mut out, depth);
                }
            }
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                push_newline(&mut out, depth);
                out.push(c);
            }
            ',' => {
                out.push(c);
                push_newline(&mut out, depth);
            }
            ':' => out.push_str(": "),
            c if c.is_ascii_whitespace() => {}
            c => out.push(c),
        }
    }
    out
}

fn push_newline(out: &mut String, depth: usize) {
    out.push('\n');
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn print_html_fallback<W: Write>(out: &mut W, body: &[u8], err: &RenderError) -> io::Result<()> {
    debug!(error = %err, "falling back to raw body");
    writeln!(out, "{}", format!("Error processing HTML: {}", err).red())?;
    print_text(out, body)
}

fn print_text<W: Write>(out: &mut W, body: &[u8]) -> io::Result<()> {
    writeln!(out, "{}", String::from_utf8_lossy(body).white())
}

fn parse_selector(selector: &str) -> Result<Selector, RenderError> {
    Selector::parse(selector).map_err(|e| RenderError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Prints the page title and description, then either the selector matches
/// or the whole document.
fn print_html<W: Write>(
    out: &mut W,
    body: &[u8],
    options: &RenderOptions,
) -> Result<(), RenderError> {
    let text = String::from_utf8_lossy(body);
    let document = Html::parse_document(&text);

    let title: String = document
        .select(&parse_selector("title")?)
        .flat_map(|e| e.text())
        .collect();
    if !title.is_empty() {
        writeln!(out, "{}", format!("Title: {}", title.trim()).green())?;
    }

    let description = document
        .select(&parse_selector("meta[name=description]")?)
        .next()
        .and_then(|e| e.value().attr("content"));
    if let Some(description) = description {
        writeln!(out, "{}", format!("Description: {}", description).green())?;
    }

    if let Some(selector) = options.selector.filter(|s| !s.is_empty()) {
        // An invalid selector matches nothing.
        let selector = match parse_selector(selector) {
            Ok(selector) => selector,
            Err(e) => {
                debug!(error = %e, "selector matches nothing");
                return Ok(());
            }
        };
        for (i, element) in document.select(&selector).enumerate() {
            let content: String = element.text().collect();
            let line = format!("Match {}: {}", i + 1, content.trim());
            writeln!(out, "{}", line.yellow())?;
        }
        return Ok(());
    }

    if options.pretty {
        writeln!(out, "{}", highlight_text(&text, "html")?)?;
    } else {
        writeln!(out, "{}", text)?;
    }
    Ok(())
}
