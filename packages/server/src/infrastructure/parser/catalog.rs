//! Addon catalog document to [`AddonRecord`]s.

use roxmltree::{Document, Node};
use thiserror::Error;

use super::{AttributeError, elements, required, required_parsed};
use crate::domain::AddonRecord;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog document is not well-formed: {0}")]
    Document(String),
}

/// Parse the `<track>` children of the catalog root.
///
/// Other asset kinds are ignored. A track with a missing or invalid attribute is logged
/// and skipped; the rest of the catalog is still usable.
pub fn parse_catalog(xml: &str) -> Result<Vec<AddonRecord>, CatalogError> {
    let doc = Document::parse(xml).map_err(|e| CatalogError::Document(e.to_string()))?;

    let records = elements(doc.root_element())
        .filter(|n| n.has_tag_name("track"))
        .enumerate()
        .filter_map(|(index, node)| match parse_track(node) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping catalog track #{}: {}", index, e);
                None
            }
        })
        .collect();

    Ok(records)
}

fn parse_track(node: Node<'_, '_>) -> Result<AddonRecord, AttributeError> {
    Ok(AddonRecord {
        id: required(node, "id")?.to_string(),
        name: required(node, "name")?.to_string(),
        file: required(node, "file")?.to_string(),
        date: required_parsed(node, "date")?,
        uploader: required(node, "uploader")?.to_string(),
        designer: required(node, "designer")?.to_string(),
        description: required(node, "description")?.to_string(),
        image: node.attribute("image").unwrap_or_default().to_string(),
        format: required_parsed(node, "format")?,
        revision: required_parsed(node, "revision")?,
        status: required_parsed(node, "status")?,
        size: required_parsed(node, "size")?,
        rating: required_parsed(node, "rating")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog() {
        // テスト項目: track 要素だけがアドオンとして読み込まれる
        // given (前提条件):
        let xml = r#"<assets>
  <track id="frosty_peak" name="Frosty Peak" file="https://example.invalid/f.zip"
         date="1700000000" uploader="u" designer="d" description="cold"
         format="7" revision="3" status="1024" size="4096" rating="2.75"/>
  <kart id="tux" name="Tux"/>
  <track id="broken" name="Broken"/>
</assets>"#;

        // when (操作):
        let records = parse_catalog(xml).unwrap();

        // then (期待する結果): 不正な track はスキップされる
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.id, "frosty_peak");
        assert_eq!(record.name, "Frosty Peak");
        assert_eq!(record.image, "");
        assert_eq!(record.revision, 3);
        assert_eq!(record.size, 4096);
        assert_eq!(record.rating, 2.75);
    }

    #[test]
    fn test_parse_catalog_not_xml() {
        // テスト項目: XML でない入力はエラーになる
        assert!(matches!(
            parse_catalog("not xml"),
            Err(CatalogError::Document(_))
        ));
    }
}
