//! Article ingestion and reconciliation.
//!
//! One ingestion call takes a validated archive submission and reconciles
//! it against whatever is already stored for the synonym: it computes the
//! minimal set of row changes (title, raw document, tags, images), builds
//! an edit-history record when the textual content changed, regenerates
//! the compiled markup with rewritten image references, and commits it all
//! through the transactional writer. Image files are materialized on disk
//! only after the metadata commit succeeds; a file failure afterwards
//! triggers a best-effort cleanup of this call's files and leaves the
//! committed metadata in place.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use ::image::DynamicImage;
use sea_orm::{IntoActiveModel, Set};
use tracing::{info, warn};

use scribe_common::{AppError, AppResult, IdGenerator};
use scribe_db::entities::{
    article, compiled_document, edit_history,
    image::{self, ImageStatus, Resolution},
    raw_document,
};
use scribe_db::repositories::{
    ArticleRepository, ArticleTagRepository, CompiledDocumentRepository, ImageRepository,
    IngestRepository, RawDocumentRepository, WritePlan,
};

use crate::services::archive::{ArchiveReader, IMAGE_ALIAS_ATTR, ImageFile, ValidatedDocument};
use crate::services::image_store::ImageStore;
use crate::services::markup::MarkupDocument;
use crate::services::patch::make_patch_pair;
use crate::services::variant::generate_variants;

const IMAGE_TAG: &str = "img";
const CLASS_ATTR: &str = "class";
const SRC_ATTR: &str = "src";
const SRCSET_ATTR: &str = "data-srcset";
const LAZYLOAD_SIZES_ATTR: &str = "data-sizes";

const CLASS_LAZYLOAD: &str = "lazyload";
const LAZYLOAD_SIZE_AUTO: &str = "auto";

/// What an ingestion call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// A new article was created.
    Created,
    /// An existing article was updated.
    Updated,
    /// Nothing differed from the stored state; no writes were issued.
    Unchanged,
}

/// Article ingestion service.
#[derive(Clone)]
pub struct IngestService {
    article_repo: ArticleRepository,
    raw_repo: RawDocumentRepository,
    compiled_repo: CompiledDocumentRepository,
    article_tag_repo: ArticleTagRepository,
    image_repo: ImageRepository,
    ingest_repo: IngestRepository,
    store: ImageStore,
    id_gen: IdGenerator,
}

impl IngestService {
    /// Create a new ingestion service.
    #[must_use]
    pub const fn new(
        article_repo: ArticleRepository,
        raw_repo: RawDocumentRepository,
        compiled_repo: CompiledDocumentRepository,
        article_tag_repo: ArticleTagRepository,
        image_repo: ImageRepository,
        ingest_repo: IngestRepository,
        store: ImageStore,
    ) -> Self {
        Self {
            article_repo,
            raw_repo,
            compiled_repo,
            article_tag_repo,
            image_repo,
            ingest_repo,
            store,
            id_gen: IdGenerator::new(),
        }
    }

    /// Ingest a bundled article archive for the given synonym.
    ///
    /// With `create_only` set, an already-registered synonym fails with
    /// [`AppError::DuplicateArticle`] before anything is mutated.
    pub async fn ingest(
        &self,
        archive_path: &Path,
        synonym: &str,
        create_only: bool,
    ) -> AppResult<IngestOutcome> {
        info!(archive = %archive_path.display(), synonym, "Reading target archive");
        let validated = ArchiveReader::open(archive_path)?.validate()?;

        match self.article_repo.find_by_synonym(synonym).await? {
            Some(stored) => {
                if create_only {
                    return Err(AppError::DuplicateArticle(synonym.to_string()));
                }
                info!(synonym, "Synonym already registered, updating existing entry");
                self.update_article(stored, validated).await
            }
            None => {
                info!(synonym, "Synonym not registered, creating new article entry");
                self.create_article(synonym, validated).await
            }
        }
    }

    async fn create_article(
        &self,
        synonym: &str,
        mut validated: ValidatedDocument,
    ) -> AppResult<IngestOutcome> {
        let now = Utc::now();
        let article_id = self.id_gen.generate();

        let tags = dedup_preserving_order(validated.tags.clone());
        info!(tags = %tags.join(", "), "Article tags");

        info!(
            count = validated.images_by_alias.len(),
            "Generating image variant data"
        );
        let new_rows = self.build_image_rows(&validated.images_by_alias, None)?;

        let mut render_refs = render_refs_from_rows(&self.store, &new_rows);
        render_refs.sort_by(|a, b| (&a.alias, a.resolution).cmp(&(&b.alias, b.resolution)));
        let attr_sets = build_alias_attribute_sets(&render_refs);
        rewrite_image_references(&mut validated.markup, &attr_sets);

        let plan = WritePlan {
            article_id: article_id.clone(),
            is_new_article: true,
            article: article::ActiveModel {
                id: Set(article_id.clone()),
                synonym: Set(synonym.to_string()),
                title: Set(validated.title.clone()),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            },
            raw_document: Some(raw_document::ActiveModel {
                article_id: Set(article_id.clone()),
                version: Set(validated.version.clone()),
                body: Set(validated.raw_body.clone()),
                created_at: Set(now.into()),
                last_update: Set(now.into()),
            }),
            edit_history: None,
            tag_names: tags.clone(),
            link_tag_names: tags,
            removed_link_ids: Vec::new(),
            images_created: new_rows
                .iter()
                .map(|row| row.active_model(&article_id, now))
                .collect(),
            image_ids_deleted: Vec::new(),
            compiled_document: Some(compiled_document::ActiveModel {
                article_id: Set(article_id),
                content: Set(validated.markup.serialize()),
                last_update: Set(now.into()),
            }),
        };

        info!("Handling DB write operations");
        self.ingest_repo.commit(plan).await?;
        info!("Done with writing to the DB");

        self.materialize_files(&new_rows).await?;
        Ok(IngestOutcome::Created)
    }

    async fn update_article(
        &self,
        stored: article::Model,
        mut validated: ValidatedDocument,
    ) -> AppResult<IngestOutcome> {
        let now = Utc::now();
        let article_id = stored.id.clone();

        // Article fields (title)
        let mut previous_title = None;
        if stored.title != validated.title {
            info!(
                old_title = %stored.title,
                new_title = %validated.title,
                "Title changed"
            );
            previous_title = Some(stored.title.clone());
        }

        // Raw document (body and version are independent triggers but land
        // in the same staged update)
        let raw = self.raw_repo.get_by_article(&article_id).await?;
        let mut patches = None;
        if raw.body != validated.raw_body {
            info!("Detected modification on raw markdown document, creating patch");
            patches = Some(make_patch_pair(&raw.body, &validated.raw_body));
        }
        let mut previous_version = None;
        if raw.version != validated.version {
            info!(
                old_version = %raw.version,
                new_version = %validated.version,
                "Version changed"
            );
            previous_version = Some(raw.version.clone());
        }

        // Images: three-way classification by alias against live originals
        let mut created_aliases: BTreeSet<String> =
            validated.images_by_alias.keys().cloned().collect();
        let mut removed_aliases = BTreeSet::new();
        let mut renewed_aliases = BTreeSet::new();

        let existing_originals = self.image_repo.find_live_originals(&article_id).await?;
        for entry in &existing_originals {
            if let Some(file) = validated.images_by_alias.get(&entry.alias) {
                if self
                    .store
                    .matches_original(&entry.file_name(), &file.bytes)
                    .await?
                {
                    // Byte-identical: drop the alias from the touched set
                    created_aliases.remove(&entry.alias);
                } else {
                    info!(alias = %entry.alias, "Detected image change");
                    renewed_aliases.insert(entry.alias.clone());
                }
            } else {
                info!(alias = %entry.alias, "Detected image removal");
                removed_aliases.insert(entry.alias.clone());
            }
        }

        // `created_aliases` now holds net-new plus renewed aliases; renewal
        // is delete-old + create-new, never an in-place update.
        let deleted_aliases: Vec<String> = removed_aliases
            .union(&renewed_aliases)
            .cloned()
            .collect();
        let deleted_rows = if deleted_aliases.is_empty() {
            Vec::new()
        } else {
            self.image_repo
                .find_live_by_aliases(&article_id, &deleted_aliases, true)
                .await?
        };

        let touched_aliases: Vec<String> = created_aliases
            .iter()
            .cloned()
            .chain(deleted_aliases.iter().cloned())
            .collect();
        let kept_rows = self
            .image_repo
            .find_live_excluding_aliases(&article_id, &touched_aliases)
            .await?;

        let new_rows = if created_aliases.is_empty() {
            Vec::new()
        } else {
            self.build_image_rows(&validated.images_by_alias, Some(&created_aliases))?
        };

        // Tags: make the link set exactly match the incoming names
        let incoming_tags = dedup_preserving_order(validated.tags.clone());
        let incoming_set: BTreeSet<&str> = incoming_tags.iter().map(String::as_str).collect();
        let mut kept_tags = BTreeSet::new();
        let mut removed_tags = BTreeSet::new();
        let mut removed_link_ids = Vec::new();
        for (link, tag_model) in self.article_tag_repo.find_with_tags(&article_id).await? {
            let Some(tag_model) = tag_model else {
                continue;
            };
            if incoming_set.contains(tag_model.name.as_str()) {
                kept_tags.insert(tag_model.name);
            } else {
                removed_tags.insert(tag_model.name);
                removed_link_ids.push(link.id);
            }
        }
        let created_tags: Vec<String> = incoming_tags
            .iter()
            .filter(|name| !kept_tags.contains(*name))
            .cloned()
            .collect();
        info!(
            kept = %kept_tags.iter().cloned().collect::<Vec<_>>().join(", "),
            removed = %removed_tags.iter().cloned().collect::<Vec<_>>().join(", "),
            created = %created_tags.join(", "),
            "Tag reconciliation"
        );

        let title_changed = previous_title.is_some();
        let body_changed = patches.is_some();
        let version_changed = previous_version.is_some();
        let tags_changed = !removed_link_ids.is_empty() || !created_tags.is_empty();
        let images_changed = !created_aliases.is_empty() || !removed_aliases.is_empty();

        if !(title_changed || body_changed || version_changed || tags_changed || images_changed) {
            info!("No required update detected");
            return Ok(IngestOutcome::Unchanged);
        }

        let mut article_active = stored.into_active_model();
        if title_changed {
            article_active.title = Set(validated.title.clone());
        }
        article_active.updated_at = Set(now.into());

        let raw_update = if body_changed || version_changed {
            let mut active = raw.into_active_model();
            if body_changed {
                active.body = Set(validated.raw_body.clone());
            }
            if version_changed {
                active.version = Set(validated.version.clone());
            }
            active.last_update = Set(now.into());
            Some(active)
        } else {
            None
        };

        let edit_entry = if title_changed || body_changed || version_changed {
            info!("New edit history entry required");
            Some(edit_history::ActiveModel {
                id: Set(self.id_gen.generate()),
                article_id: Set(article_id.clone()),
                previous_title: Set(previous_title),
                previous_synonym: Set(None),
                previous_version: Set(previous_version),
                forward_patch: Set(patches.as_ref().map(|p| p.forward.clone())),
                reverse_patch: Set(patches.as_ref().map(|p| p.reverse.clone())),
                created_at: Set(now.into()),
            })
        } else {
            None
        };

        // The compiled document is regenerated when the version or body
        // changed, or when any image was created or removed.
        let regenerate =
            version_changed || body_changed || !created_aliases.is_empty() || !removed_aliases.is_empty();
        let compiled_update = if regenerate {
            info!("Compiled document regeneration required");
            let current = self.compiled_repo.get_by_article(&article_id).await?;

            let mut render_refs = render_refs_from_rows(&self.store, &new_rows);
            render_refs.extend(render_refs_from_models(&self.store, &kept_rows));
            render_refs.sort_by(|a, b| (&a.alias, a.resolution).cmp(&(&b.alias, b.resolution)));
            let attr_sets = build_alias_attribute_sets(&render_refs);
            rewrite_image_references(&mut validated.markup, &attr_sets);

            let mut active = current.into_active_model();
            active.content = Set(validated.markup.serialize());
            active.last_update = Set(now.into());
            Some(active)
        } else {
            None
        };

        let images_created = new_rows
            .iter()
            .map(|row| row.active_model(&article_id, now))
            .collect();

        let plan = WritePlan {
            article_id,
            is_new_article: false,
            article: article_active,
            raw_document: raw_update,
            edit_history: edit_entry,
            tag_names: incoming_tags,
            link_tag_names: created_tags,
            removed_link_ids,
            images_created,
            image_ids_deleted: deleted_rows.into_iter().map(|m| m.id).collect(),
            compiled_document: compiled_update,
        };

        info!("Handling DB write operations");
        self.ingest_repo.commit(plan).await?;
        info!("Done with writing to the DB");

        self.materialize_files(&new_rows).await?;
        Ok(IngestOutcome::Updated)
    }

    fn build_image_rows(
        &self,
        images_by_alias: &BTreeMap<String, ImageFile>,
        filter: Option<&BTreeSet<String>>,
    ) -> AppResult<Vec<NewImageRow>> {
        let mut rows = Vec::new();

        for (alias, file) in images_by_alias {
            if let Some(wanted) = filter {
                if !wanted.contains(alias) {
                    continue;
                }
            }

            for variant in generate_variants(&file.bytes)? {
                let payload = if variant.resolution == Resolution::Original {
                    // The original file is copied verbatim from the archive
                    // rather than re-encoded from the decoded buffer.
                    NewImagePayload::OriginalBytes(file.bytes.clone())
                } else {
                    NewImagePayload::Resized(variant.image)
                };
                rows.push(NewImageRow {
                    id: self.id_gen.generate(),
                    alias: alias.clone(),
                    extension: file.extension.clone(),
                    resolution: variant.resolution,
                    width: variant.width as i32,
                    height: variant.height as i32,
                    payload,
                });
            }
        }

        Ok(rows)
    }

    async fn materialize_files(&self, rows: &[NewImageRow]) -> AppResult<()> {
        if let Err(error) = self.save_files(rows).await {
            warn!(%error, "Error happened during image saving, running cleanup");
            self.cleanup_files(rows).await;
            return Err(error);
        }
        Ok(())
    }

    async fn save_files(&self, rows: &[NewImageRow]) -> AppResult<()> {
        for row in rows {
            let file_name = row.file_name();
            match &row.payload {
                NewImagePayload::OriginalBytes(bytes) => {
                    self.store.save_original(&file_name, bytes).await?;
                    info!(file = %file_name, alias = %row.alias, "Original image saved");
                }
                NewImagePayload::Resized(image) => {
                    self.store
                        .save_variant(&file_name, row.resolution, image, &row.extension)
                        .await?;
                    info!(
                        file = %file_name,
                        alias = %row.alias,
                        resolution = ?row.resolution,
                        "Resized image saved"
                    );
                }
            }
        }
        Ok(())
    }

    async fn cleanup_files(&self, rows: &[NewImageRow]) {
        for row in rows {
            let file_name = row.file_name();
            warn!(file = %file_name, "Trying to remove file");
            if let Err(error) = self.store.remove(&file_name, row.resolution).await {
                warn!(file = %file_name, %error, "Cleanup failed for file");
            }
        }
    }
}

struct NewImageRow {
    id: String,
    alias: String,
    extension: String,
    resolution: Resolution,
    width: i32,
    height: i32,
    payload: NewImagePayload,
}

enum NewImagePayload {
    OriginalBytes(Vec<u8>),
    Resized(DynamicImage),
}

impl NewImageRow {
    fn file_name(&self) -> String {
        format!("{}.{}", self.id, self.extension)
    }

    fn active_model(&self, article_id: &str, now: DateTime<Utc>) -> image::ActiveModel {
        image::ActiveModel {
            id: Set(self.id.clone()),
            article_id: Set(article_id.to_string()),
            alias: Set(self.alias.clone()),
            extension: Set(self.extension.clone()),
            resolution: Set(self.resolution),
            width: Set(self.width),
            height: Set(self.height),
            status: Set(ImageStatus::Live),
            deleted_at: Set(None),
            created_at: Set(now.into()),
        }
    }
}

struct RenderImage {
    alias: String,
    resolution: Resolution,
    width: i32,
    served_path: String,
}

fn render_refs_from_rows(store: &ImageStore, rows: &[NewImageRow]) -> Vec<RenderImage> {
    rows.iter()
        .map(|row| RenderImage {
            alias: row.alias.clone(),
            served_path: store.served_path(&row.file_name()),
            resolution: row.resolution,
            width: row.width,
        })
        .collect()
}

fn render_refs_from_models(store: &ImageStore, models: &[image::Model]) -> Vec<RenderImage> {
    models
        .iter()
        .map(|model| RenderImage {
            alias: model.alias.clone(),
            served_path: store.served_path(&model.file_name()),
            resolution: model.resolution,
            width: model.width,
        })
        .collect()
}

/// Attribute sets to overwrite on markup image elements, keyed by alias.
///
/// Assumes the input is sorted by (alias, resolution) so the candidate
/// source list ends up ordered by width; the lazyload library on the
/// front end picks the actual candidate via the `auto` sizes marker.
fn build_alias_attribute_sets(refs: &[RenderImage]) -> BTreeMap<String, Vec<(String, String)>> {
    let mut per_alias: BTreeMap<String, (String, Vec<String>)> = BTreeMap::new();

    for image_ref in refs {
        let slot = per_alias.entry(image_ref.alias.clone()).or_default();
        if image_ref.resolution == Resolution::Original {
            continue;
        }
        if image_ref.resolution == Resolution::Low {
            slot.0.clone_from(&image_ref.served_path);
        }
        slot.1
            .push(format!("{} {}w", image_ref.served_path, image_ref.width));
    }

    per_alias
        .into_iter()
        .map(|(alias, (src, srcset_tokens))| {
            let attributes = vec![
                (CLASS_ATTR.to_string(), CLASS_LAZYLOAD.to_string()),
                (SRC_ATTR.to_string(), src),
                (SRCSET_ATTR.to_string(), srcset_tokens.join(",")),
                (
                    LAZYLOAD_SIZES_ATTR.to_string(),
                    LAZYLOAD_SIZE_AUTO.to_string(),
                ),
            ];
            (alias, attributes)
        })
        .collect()
}

/// Overwrite attributes on every image element carrying a known alias and
/// drop the alias attribute, which has no meaning downstream.
fn rewrite_image_references(
    markup: &mut MarkupDocument,
    attr_sets: &BTreeMap<String, Vec<(String, String)>>,
) {
    markup.visit_elements_mut(IMAGE_TAG, |element| {
        let Some(alias) = element.get_attribute(IMAGE_ALIAS_ATTR).map(String::from) else {
            return;
        };
        if let Some(attributes) = attr_sets.get(&alias) {
            element.set_attributes(
                attributes
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str())),
            );
            element.remove_attribute(IMAGE_ALIAS_ATTR);
        }
    });
}

fn dedup_preserving_order(names: Vec<String>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn render_ref(alias: &str, resolution: Resolution, width: i32, file: &str) -> RenderImage {
        RenderImage {
            alias: alias.to_string(),
            resolution,
            width,
            served_path: format!("/img/{file}"),
        }
    }

    #[test]
    fn test_attribute_sets_for_full_ladder() {
        let refs = vec![
            render_ref("cover", Resolution::Original, 2560, "o.png"),
            render_ref("cover", Resolution::Low, 320, "l.png"),
            render_ref("cover", Resolution::Medium, 640, "m.png"),
        ];

        let sets = build_alias_attribute_sets(&refs);
        let attrs = &sets["cover"];

        assert!(attrs.contains(&("class".to_string(), "lazyload".to_string())));
        assert!(attrs.contains(&("src".to_string(), "/img/l.png".to_string())));
        assert!(attrs.contains(&(
            "data-srcset".to_string(),
            "/img/l.png 320w,/img/m.png 640w".to_string()
        )));
        assert!(attrs.contains(&("data-sizes".to_string(), "auto".to_string())));
    }

    #[test]
    fn test_original_is_never_listed_as_candidate() {
        let refs = vec![render_ref("cover", Resolution::Original, 2560, "o.png")];

        let sets = build_alias_attribute_sets(&refs);
        let attrs = &sets["cover"];

        assert!(attrs.contains(&("src".to_string(), String::new())));
        assert!(attrs.contains(&("data-srcset".to_string(), String::new())));
    }

    #[test]
    fn test_rewrite_drops_alias_and_applies_attributes() {
        let mut markup = MarkupDocument::parse(
            r#"<article><img alias="cover"/><img alias="unknown"/></article>"#,
        )
        .unwrap();
        let refs = vec![render_ref("cover", Resolution::Low, 320, "l.png")];
        let sets = build_alias_attribute_sets(&refs);

        rewrite_image_references(&mut markup, &sets);
        let out = markup.serialize();

        assert!(out.contains(r#"src="/img/l.png""#));
        assert!(!out.contains(r#"alias="cover""#));
        // Elements without a staged alias are left untouched
        assert!(out.contains(r#"alias="unknown""#));
    }

    #[test]
    fn test_dedup_preserves_first_occurrence_order() {
        let names = vec![
            "rust".to_string(),
            "blog".to_string(),
            "rust".to_string(),
            "async".to_string(),
        ];

        assert_eq!(
            dedup_preserving_order(names),
            vec!["rust".to_string(), "blog".to_string(), "async".to_string()]
        );
    }
}
