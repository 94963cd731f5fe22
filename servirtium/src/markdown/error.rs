use std::{fmt::Display, io};
use thiserror::Error;

#[derive(Debug, PartialEq, Eq)]
pub struct MarkdownsBodyDifference {
    pub line: u32,
    pub column: u32,
    pub old_context: String,
    pub new_context: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct MarkdownsHeaderDifference {
    pub header_name: String,
    pub old_header_value: Option<String>,
    pub new_header_value: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum MarkdownsDifferenceType {
    Body(MarkdownsBodyDifference),
    Header(MarkdownsHeaderDifference),
    StatusCode { old: u16, new: u16 },
    Request { old: String, new: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownsDifferenceLocation {
    Request,
    Response,
}

impl Display for MarkdownsDifferenceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkdownsDifferenceLocation::Request => write!(f, "Request"),
            MarkdownsDifferenceLocation::Response => write!(f, "Response"),
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("Markdown format is invalid")]
    InvalidMarkdownFormat,
    #[error("Couldn't parse interaction number from the markdown file")]
    InvalidInteractionNumber,
    #[error("The status code is invalid")]
    InvalidStatusCode,
    #[error("The markdown has {old} interactions but {new} were recorded")]
    InteractionCountDiffers { old: usize, new: usize },
    #[error("Interaction {number}: {}", describe_difference(.difference, .location))]
    MarkdownsDiffer {
        number: usize,
        difference: MarkdownsDifferenceType,
        location: MarkdownsDifferenceLocation,
    },
}

fn describe_difference(
    difference: &MarkdownsDifferenceType,
    location: &MarkdownsDifferenceLocation,
) -> String {
    match difference {
        MarkdownsDifferenceType::Body(MarkdownsBodyDifference {
            line,
            column,
            old_context,
            new_context,
        }) => format!(
            "{} bodies differ at line {}, column {}. Old: \"{}\". New: \"{}\"",
            location,
            line,
            column,
            old_context.escape_default(),
            new_context.escape_default()
        ),
        MarkdownsDifferenceType::Header(MarkdownsHeaderDifference {
            old_header_value,
            header_name,
            new_header_value,
        }) => {
            let describe = |value: &Option<String>| match value {
                Some(value) => format!("\"{}\": \"{}\"", header_name, value),
                None => "<no header value>".into(),
            };

            format!(
                "{} headers differ. old - {}, new - {}",
                location,
                describe(old_header_value),
                describe(new_header_value)
            )
        }
        MarkdownsDifferenceType::StatusCode { old, new } => {
            format!("{} status codes differ. old - {}, new - {}", location, old, new)
        }
        MarkdownsDifferenceType::Request { old, new } => {
            format!("{} lines differ. old - {}, new - {}", location, old, new)
        }
    }
}
