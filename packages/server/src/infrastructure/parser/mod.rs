//! XML document parsers for the remote API.

pub mod catalog;
pub mod snapshot;

use std::{fmt::Display, str::FromStr};

use roxmltree::Node;
use thiserror::Error;

use crate::domain::SnapshotError;

pub use catalog::{CatalogError, parse_catalog};
pub use snapshot::parse_snapshot;

/// A single attribute that is missing or does not parse
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttributeError {
    #[error("missing attribute `{0}`")]
    Missing(&'static str),

    #[error("invalid attribute `{attribute}`={value:?}: {reason}")]
    Invalid {
        attribute: &'static str,
        value: String,
        reason: String,
    },
}

impl AttributeError {
    /// Attach the element path, turning this into a snapshot rejection
    pub fn at(self, path: &str) -> SnapshotError {
        match self {
            Self::Missing(attribute) => SnapshotError::MissingAttribute {
                path: path.to_string(),
                attribute,
            },
            Self::Invalid {
                attribute,
                value,
                reason,
            } => SnapshotError::InvalidAttribute {
                path: path.to_string(),
                attribute,
                value,
                reason,
            },
        }
    }
}

pub(crate) fn required<'a>(
    node: Node<'a, '_>,
    attribute: &'static str,
) -> Result<&'a str, AttributeError> {
    node.attribute(attribute)
        .ok_or(AttributeError::Missing(attribute))
}

pub(crate) fn required_parsed<T>(node: Node<'_, '_>, attribute: &'static str) -> Result<T, AttributeError>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = required(node, attribute)?;
    convert(attribute, raw, |v| v.trim().parse::<T>().map_err(|e| e.to_string()))
}

pub(crate) fn convert<T>(
    attribute: &'static str,
    raw: &str,
    f: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, AttributeError> {
    f(raw).map_err(|reason| AttributeError::Invalid {
        attribute,
        value: raw.to_string(),
        reason,
    })
}

/// Element children only, skipping text and comments
pub(crate) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}
