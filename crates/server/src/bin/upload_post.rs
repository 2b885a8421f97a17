//! Upload a bundled post archive to create or update an article.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use scribe_common::{Config, is_valid_synonym};
use scribe_core::{ImageStore, IngestOutcome, IngestService};
use scribe_db::repositories::{
    ArticleRepository, ArticleTagRepository, CompiledDocumentRepository, ImageRepository,
    IngestRepository, RawDocumentRepository,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Upload post from bundled post data to create a new post, or update an
/// existing post.
#[derive(Parser)]
#[command(name = "upload-post")]
struct Args {
    /// Path to the tar bundle file.
    archive_path: PathBuf,

    /// Article's synonym, used in the article's URL. Only lower-case
    /// alphabets, digits, and hyphens can be used, and it can't start or
    /// end with a hyphen.
    #[arg(long)]
    synonym: String,

    /// Only create a new article and stop when the synonym is already
    /// used by an existing article.
    #[arg(long = "new")]
    new_article: bool,
}

fn expand_user(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if !is_valid_synonym(&args.synonym) {
        return Err(format!("'{}' is not a valid article synonym", args.synonym).into());
    }

    dotenvy::dotenv().ok();
    let config = Config::load()?;

    let db = scribe_db::init(&config).await?;
    scribe_db::migrate(&db).await?;
    let db = Arc::new(db);

    let service = IngestService::new(
        ArticleRepository::new(Arc::clone(&db)),
        RawDocumentRepository::new(Arc::clone(&db)),
        CompiledDocumentRepository::new(Arc::clone(&db)),
        ArticleTagRepository::new(Arc::clone(&db)),
        ImageRepository::new(Arc::clone(&db)),
        IngestRepository::new(Arc::clone(&db)),
        ImageStore::new(&config.images),
    );

    let archive_path = expand_user(&args.archive_path);
    let outcome = service
        .ingest(&archive_path, &args.synonym, args.new_article)
        .await?;

    match outcome {
        IngestOutcome::Created => info!(synonym = %args.synonym, "Article created"),
        IngestOutcome::Updated => info!(synonym = %args.synonym, "Article updated"),
        IngestOutcome::Unchanged => info!(synonym = %args.synonym, "Article already up to date"),
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scribe=info".into()),
        )
        .init();

    let args = Args::parse();
    if let Err(error) = run(args).await {
        eprintln!("upload-post: {error}");
        std::process::exit(1);
    }
}
