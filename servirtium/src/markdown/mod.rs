pub mod error;

use crate::data::{Headers, InteractionData, RequestData, ResponseData};
pub use error::Error;
use error::{
    MarkdownsBodyDifference, MarkdownsDifferenceLocation, MarkdownsDifferenceType,
    MarkdownsHeaderDifference,
};
use lazy_static::lazy_static;
use regex::Regex;
use std::{fmt::Write as _, fs, path::Path};

lazy_static! {
    static ref HEADER_REGEX: Regex =
        Regex::new(r"(?m)^(?P<header_key>[a-zA-Z0-9_\-]+): (?P<header_value>.*?)$").unwrap();
    static ref MARKDOWN_REGEX: Regex = Regex::new(concat!(
        r"(?ms)^## Interaction (?P<interaction_number>[0-9]+): (?P<http_method>[A-Z]+) (?P<uri>\S+)\s*",
        r"### Request headers recorded for playback:\s*```\r?\n(?P<request_headers_part>.*?)```\s*",
        r"### Request body recorded for playback[^\n]*\n\s*```\r?\n(?P<request_body_part>.*?)```\s*",
        r"### Response headers recorded for playback:\s*```\r?\n(?P<response_headers_part>.*?)```\s*",
        r"### Response body recorded for playback \((?P<status_code>[0-9]+)[^)]*\):\s*```\r?\n(?P<response_body_part>.*?)```",
    ))
    .unwrap();
}

pub fn load_markdown<P: AsRef<Path>>(filename: P) -> Result<Vec<InteractionData>, Error> {
    let file_contents = fs::read_to_string(filename)?;
    parse_markdown(&file_contents)
}

pub fn parse_markdown(file_contents: &str) -> Result<Vec<InteractionData>, Error> {
    let mut data = Vec::new();

    for captures in MARKDOWN_REGEX.captures_iter(file_contents) {
        let interaction_number = captures["interaction_number"]
            .parse()
            .map_err(|_| Error::InvalidInteractionNumber)?;
        let status_code = captures["status_code"]
            .parse()
            .map_err(|_| Error::InvalidStatusCode)?;

        data.push(InteractionData {
            interaction_number,
            request_data: RequestData {
                uri: captures["uri"].into(),
                method: captures["http_method"].into(),
                headers: parse_headers(&captures["request_headers_part"]),
                body: fenced_body(&captures["request_body_part"]).into(),
            },
            response_data: ResponseData {
                status_code,
                headers: parse_headers(&captures["response_headers_part"]),
                body: fenced_body(&captures["response_body_part"]).into(),
            },
        });
    }

    if data.is_empty() {
        Err(Error::InvalidMarkdownFormat)
    } else {
        Ok(data)
    }
}

// the closing fence sits on its own line, everything before that newline is the body
fn fenced_body(part: &str) -> &str {
    let part = part.strip_suffix('\n').unwrap_or(part);
    part.strip_suffix('\r').unwrap_or(part)
}

fn parse_headers<T: AsRef<str>>(headers_part: T) -> Headers {
    HEADER_REGEX
        .captures_iter(headers_part.as_ref())
        .map(|capture| {
            (
                capture["header_key"].trim().to_lowercase(),
                String::from(capture["header_value"].trim()),
            )
        })
        .collect()
}

pub fn render_interactions<'a, I: IntoIterator<Item = &'a InteractionData>>(
    interactions: I,
) -> String {
    let mut markdown = String::new();

    for (number, interaction) in interactions.into_iter().enumerate() {
        let request = &interaction.request_data;
        let response = &interaction.response_data;

        // writing into a String can't fail
        let _ = write!(
            markdown,
            "## Interaction {}: {} {}\n\n",
            number, request.method, request.uri
        );
        markdown.push_str("### Request headers recorded for playback:\n\n```\n");
        push_headers(&mut markdown, &request.headers);
        markdown.push_str("```\n\n");

        let _ = write!(
            markdown,
            "### Request body recorded for playback ({}):\n\n```\n{}\n```\n\n",
            request
                .headers
                .get("content-type")
                .map(String::as_str)
                .unwrap_or(""),
            request.body,
        );

        markdown.push_str("### Response headers recorded for playback:\n\n```\n");
        push_headers(&mut markdown, &response.headers);
        markdown.push_str("```\n\n");

        let _ = write!(
            markdown,
            "### Response body recorded for playback ({}: {}):\n\n```\n{}\n```\n\n",
            response.status_code,
            response
                .headers
                .get("content-type")
                .map(String::as_str)
                .unwrap_or(""),
            response.body
        );
    }

    markdown
}

fn push_headers(markdown: &mut String, headers: &Headers) {
    for (key, value) in headers {
        let _ = writeln!(markdown, "{}: {}", key, value);
    }
}

pub fn save_interactions<'a, P: AsRef<Path>, I: IntoIterator<Item = &'a InteractionData>>(
    markdown_path: P,
    interactions: I,
) -> Result<(), Error> {
    fs::write(markdown_path.as_ref(), render_interactions(interactions))?;
    Ok(())
}

/// Compares freshly recorded interactions with the ones already saved in the markdown and
/// reports the first difference found.
pub fn check_markdown_data_unchanged<P: AsRef<Path>>(
    markdown_path: P,
    interactions: &[InteractionData],
) -> Result<(), Error> {
    let markdown_data = load_markdown(markdown_path)?;

    if markdown_data.len() != interactions.len() {
        return Err(Error::InteractionCountDiffers {
            old: markdown_data.len(),
            new: interactions.len(),
        });
    }

    for (number, (old, new)) in markdown_data.iter().zip(interactions).enumerate() {
        if let Some((difference, location)) = find_difference(old, new) {
            return Err(Error::MarkdownsDiffer {
                number,
                difference,
                location,
            });
        }
    }

    Ok(())
}

fn find_difference(
    old: &InteractionData,
    new: &InteractionData,
) -> Option<(MarkdownsDifferenceType, MarkdownsDifferenceLocation)> {
    use MarkdownsDifferenceLocation::{Request, Response};

    if old.request_data.describe() != new.request_data.describe() {
        return Some((
            MarkdownsDifferenceType::Request {
                old: old.request_data.describe(),
                new: new.request_data.describe(),
            },
            Request,
        ));
    }

    if let Some(difference) = headers_difference(&old.request_data.headers, &new.request_data.headers)
    {
        return Some((MarkdownsDifferenceType::Header(difference), Request));
    }

    if let Some(difference) = body_difference(&old.request_data.body, &new.request_data.body) {
        return Some((MarkdownsDifferenceType::Body(difference), Request));
    }

    if old.response_data.status_code != new.response_data.status_code {
        return Some((
            MarkdownsDifferenceType::StatusCode {
                old: old.response_data.status_code,
                new: new.response_data.status_code,
            },
            Response,
        ));
    }

    if let Some(difference) =
        headers_difference(&old.response_data.headers, &new.response_data.headers)
    {
        return Some((MarkdownsDifferenceType::Header(difference), Response));
    }

    body_difference(&old.response_data.body, &new.response_data.body)
        .map(|difference| (MarkdownsDifferenceType::Body(difference), Response))
}

fn headers_difference(old: &Headers, new: &Headers) -> Option<MarkdownsHeaderDifference> {
    let names = old.keys().chain(new.keys());

    for name in names {
        let old_value = old.get(name).map(|v| v.trim());
        let new_value = new.get(name).map(|v| v.trim());

        if old_value != new_value {
            return Some(MarkdownsHeaderDifference {
                header_name: name.clone(),
                old_header_value: old_value.map(String::from),
                new_header_value: new_value.map(String::from),
            });
        }
    }

    None
}

fn body_difference(old: &str, new: &str) -> Option<MarkdownsBodyDifference> {
    let (old, new) = (old.trim(), new.trim());
    if old == new {
        return None;
    }

    let mut old_lines = old.lines();
    let mut new_lines = new.lines();
    let mut line = 1;

    loop {
        match (old_lines.next(), new_lines.next()) {
            (Some(old_line), Some(new_line)) if old_line == new_line => line += 1,
            (old_line, new_line) => {
                let old_line = old_line.unwrap_or("");
                let new_line = new_line.unwrap_or("");
                let column = old_line
                    .chars()
                    .zip(new_line.chars())
                    .take_while(|(o, n)| o == n)
                    .count() as u32
                    + 1;

                return Some(MarkdownsBodyDifference {
                    line,
                    column,
                    old_context: old_line.into(),
                    new_context: new_line.into(),
                });
            }
        }
    }
}
