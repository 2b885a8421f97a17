//! Archive validation for bundled article submissions.
//!
//! A submission arrives as a gzip-compressed tar containing `meta.json`,
//! the markdown source `document.md`, the rendered markup `document.xml`,
//! and an `img/` directory with every image the markup references. The
//! validator extracts and cross-checks all four parts and hands the
//! reconciliation engine a single in-memory value; nothing partial ever
//! escapes here.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::Deserialize;

use crate::services::markup::MarkupDocument;
use scribe_common::{AppError, AppResult};

/// Metadata entry name inside the archive.
pub const META_FILENAME: &str = "meta.json";
/// Markdown source entry name inside the archive.
pub const RAW_DOC_FILENAME: &str = "document.md";
/// Rendered markup entry name inside the archive.
pub const MARKUP_FILENAME: &str = "document.xml";
/// Directory holding image files inside the archive.
pub const IMG_SOURCE_DIR: &str = "img";
/// Attribute linking a markup image element to an archive image.
pub const IMAGE_ALIAS_ATTR: &str = "alias";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArchiveMeta {
    document_title: String,
    document_tags: Vec<String>,
    version: String,
    alias_mapping: BTreeMap<String, String>,
}

/// An image file extracted from the archive.
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// File extension without the dot, taken from the mapped path.
    pub extension: String,
    /// Raw file bytes.
    pub bytes: Vec<u8>,
}

/// Fully validated article submission.
#[derive(Debug)]
pub struct ValidatedDocument {
    /// Article title from the metadata.
    pub title: String,
    /// Tag names from the metadata.
    pub tags: Vec<String>,
    /// Caller-supplied document version.
    pub version: String,
    /// Markdown source text.
    pub raw_body: String,
    /// Parsed rendered markup.
    pub markup: MarkupDocument,
    /// Image bytes per alias, for every alias the markup references.
    pub images_by_alias: BTreeMap<String, ImageFile>,
}

/// Reader over an extracted article archive.
pub struct ArchiveReader {
    entries: HashMap<String, Vec<u8>>,
}

impl ArchiveReader {
    /// Open and fully extract a gzip-compressed tar archive.
    pub fn open(path: &Path) -> AppResult<Self> {
        let file = std::fs::File::open(path)?;
        let mut archive = tar::Archive::new(GzDecoder::new(file));

        let mut entries = HashMap::new();
        let iter = archive
            .entries()
            .map_err(|e| AppError::ArchiveFormat(e.to_string()))?;
        for entry in iter {
            let mut entry = entry.map_err(|e| AppError::ArchiveFormat(e.to_string()))?;
            if !entry.header().entry_type().is_file() {
                continue;
            }
            let name = entry
                .path()
                .map_err(|e| AppError::ArchiveFormat(e.to_string()))?
                .to_string_lossy()
                .trim_start_matches("./")
                .to_string();
            let mut bytes = Vec::new();
            entry
                .read_to_end(&mut bytes)
                .map_err(|e| AppError::ArchiveFormat(e.to_string()))?;
            entries.insert(name, bytes);
        }

        Ok(Self { entries })
    }

    /// Validate the archive contents and assemble the parsed submission.
    pub fn validate(&self) -> AppResult<ValidatedDocument> {
        let meta = self.parsed_meta()?;
        let raw_body = self.raw_document()?;
        let markup = self.parsed_markup()?;

        // Every image element in the markup must resolve to an archive
        // file through the alias mapping.
        let mut images_by_alias = BTreeMap::new();
        for image_tag in markup.find_by_tag("img") {
            let Some(alias) = image_tag.get_attribute(IMAGE_ALIAS_ATTR) else {
                return Err(AppError::ArchiveFormat(
                    "markup contains an img element without an alias attribute".to_string(),
                ));
            };
            if images_by_alias.contains_key(alias) {
                continue;
            }
            let Some(relative) = meta.alias_mapping.get(alias) else {
                return Err(AppError::MissingImageReference(alias.to_string()));
            };
            let Some(bytes) = self.entries.get(&format!("{IMG_SOURCE_DIR}/{relative}")) else {
                return Err(AppError::MissingImageReference(alias.to_string()));
            };
            images_by_alias.insert(
                alias.to_string(),
                ImageFile {
                    extension: extension_of(relative),
                    bytes: bytes.clone(),
                },
            );
        }

        Ok(ValidatedDocument {
            title: meta.document_title,
            tags: meta.document_tags,
            version: meta.version,
            raw_body,
            markup,
            images_by_alias,
        })
    }

    fn entry(&self, name: &str) -> AppResult<&[u8]> {
        self.entries
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| AppError::ArchiveFormat(format!("missing required entry '{name}'")))
    }

    fn parsed_meta(&self) -> AppResult<ArchiveMeta> {
        serde_json::from_slice(self.entry(META_FILENAME)?)
            .map_err(|e| AppError::ArchiveFormat(format!("invalid {META_FILENAME}: {e}")))
    }

    fn raw_document(&self) -> AppResult<String> {
        String::from_utf8(self.entry(RAW_DOC_FILENAME)?.to_vec()).map_err(|_| {
            AppError::ArchiveFormat(format!("{RAW_DOC_FILENAME} is not valid UTF-8"))
        })
    }

    fn parsed_markup(&self) -> AppResult<MarkupDocument> {
        let text = String::from_utf8(self.entry(MARKUP_FILENAME)?.to_vec()).map_err(|_| {
            AppError::ArchiveFormat(format!("{MARKUP_FILENAME} is not valid UTF-8"))
        })?;

        MarkupDocument::parse(&text).map_err(|e| match e {
            AppError::Validation(message) => AppError::ArchiveFormat(message),
            other => other,
        })
    }
}

fn extension_of(relative_path: &str) -> String {
    Path::new(relative_path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::Write;

    const META: &str = r#"{
        "documentTitle": "A Post",
        "documentTags": ["rust", "blog"],
        "version": "v2",
        "aliasMapping": {"cover": "cover.png"}
    }"#;

    fn build_archive(entries: &[(&str, &[u8])]) -> tempfile::NamedTempFile {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (name, bytes) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(bytes.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *bytes).unwrap();
        }
        let compressed = builder.into_inner().unwrap().finish().unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_valid_archive() {
        let file = build_archive(&[
            (META_FILENAME, META.as_bytes()),
            (RAW_DOC_FILENAME, b"# A Post\n\nbody\n"),
            (MARKUP_FILENAME, br#"<article><img alias="cover"/></article>"#),
            ("img/cover.png", b"png-bytes"),
        ]);

        let doc = ArchiveReader::open(file.path()).unwrap().validate().unwrap();

        assert_eq!(doc.title, "A Post");
        assert_eq!(doc.tags, vec!["rust".to_string(), "blog".to_string()]);
        assert_eq!(doc.version, "v2");
        assert_eq!(doc.images_by_alias.len(), 1);
        assert_eq!(doc.images_by_alias["cover"].extension, "png");
        assert_eq!(doc.images_by_alias["cover"].bytes, b"png-bytes");
    }

    #[test]
    fn test_missing_raw_document_fails() {
        let file = build_archive(&[
            (META_FILENAME, META.as_bytes()),
            (MARKUP_FILENAME, b"<article/>"),
        ]);

        let result = ArchiveReader::open(file.path()).unwrap().validate();
        assert!(matches!(result, Err(AppError::ArchiveFormat(_))));
    }

    #[test]
    fn test_unmapped_alias_fails() {
        let file = build_archive(&[
            (META_FILENAME, META.as_bytes()),
            (RAW_DOC_FILENAME, b"body"),
            (
                MARKUP_FILENAME,
                br#"<article><img alias="unmapped"/></article>"#,
            ),
            ("img/cover.png", b"png-bytes"),
        ]);

        let result = ArchiveReader::open(file.path()).unwrap().validate();
        assert!(
            matches!(result, Err(AppError::MissingImageReference(alias)) if alias == "unmapped")
        );
    }

    #[test]
    fn test_mapped_but_absent_file_fails() {
        let file = build_archive(&[
            (META_FILENAME, META.as_bytes()),
            (RAW_DOC_FILENAME, b"body"),
            (MARKUP_FILENAME, br#"<article><img alias="cover"/></article>"#),
        ]);

        let result = ArchiveReader::open(file.path()).unwrap().validate();
        assert!(matches!(result, Err(AppError::MissingImageReference(alias)) if alias == "cover"));
    }
}
