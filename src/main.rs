//! aktenwart batch driver.
//!
//! Walks an inbox of scanned PDFs (one subdirectory per scan source),
//! resolves each document to a (filename, category) pair, uploads it to
//! the matching kDrive folder and archives the original. One document's
//! failure never aborts the batch.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aktenwart::config::Config;
use aktenwart::kdrive::{KdriveUploader, Uploader};
use aktenwart::pipeline::extraction::{TextLayerSource, TextSource};
use aktenwart::pipeline::llm::InfomaniakClient;
use aktenwart::pipeline::resolve::DocumentResolver;

#[derive(Parser, Debug)]
#[command(name = "aktenwart", version, about)]
struct Args {
    /// Path to the secrets/config file.
    #[arg(long, default_value = "secrets.json")]
    config: PathBuf,

    /// Inbox directory; each subdirectory is one scan source.
    #[arg(long, default_value = "input")]
    inbox: PathBuf,

    /// Where processed originals are moved under their new name.
    #[arg(long, default_value = "Archive")]
    archive: PathBuf,

    /// Tesseract data directory for OCR of image-only scans
    /// (requires the `ocr` build feature; otherwise the PDF text
    /// layer is used).
    #[arg(long)]
    tessdata: Option<PathBuf>,

    /// Resolve and report only; no uploads, no archiving.
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::load(&args.config)
        .with_context(|| format!("loading config from {}", args.config.display()))?;

    let source = build_text_source(args.tessdata.as_deref())?;
    let llm = InfomaniakClient::new(
        &config.ai_product_id,
        &config.kdrive_api_token,
        config.http_timeout_secs,
    );
    let mut resolver = DocumentResolver::new(
        Box::new(llm),
        config.name_registry(),
        config.labels(),
        config.resolver.clone(),
    )?;
    let uploader = KdriveUploader::new(
        &config.kdrive_api_token,
        &config.kdrive_drive_id,
        config.http_timeout_secs,
    );

    std::fs::create_dir_all(&args.archive)
        .with_context(|| format!("creating archive directory {}", args.archive.display()))?;

    run_batch(
        &config,
        &mut resolver,
        source.as_ref(),
        &uploader,
        &args.inbox,
        &args.archive,
        args.dry_run,
    )?;

    resolver.stats().report();
    Ok(())
}

fn build_text_source(tessdata: Option<&Path>) -> Result<Box<dyn TextSource>> {
    #[cfg(feature = "ocr")]
    if let Some(tessdata) = tessdata {
        use aktenwart::pipeline::extraction::{TesseractOcr, DEFAULT_RENDER_DPI};
        let ocr = TesseractOcr::new(tessdata, DEFAULT_RENDER_DPI)
            .context("initializing Tesseract OCR")?;
        return Ok(Box::new(ocr));
    }

    #[cfg(not(feature = "ocr"))]
    if tessdata.is_some() {
        tracing::warn!("--tessdata given but built without the `ocr` feature; using text layer");
    }

    Ok(Box::new(
        TextLayerSource::new().context("initializing PDFium")?,
    ))
}

/// Process every document in every inbox subdirectory. Per-document
/// failures are logged and skipped; only setup-level problems (an
/// unreadable inbox) abort the run.
fn run_batch(
    config: &Config,
    resolver: &mut DocumentResolver,
    source: &dyn TextSource,
    uploader: &dyn Uploader,
    inbox: &Path,
    archive: &Path,
    dry_run: bool,
) -> Result<()> {
    for entry in std::fs::read_dir(inbox)
        .with_context(|| format!("reading inbox {}", inbox.display()))?
    {
        let directory = entry?.path();
        if !directory.is_dir() {
            continue;
        }
        let inbox_name = directory
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!(directory = %directory.display(), "Processing directory");

        for file in std::fs::read_dir(&directory)? {
            let file_path = file?.path();
            if !file_path.is_file() {
                continue;
            }

            let started = Instant::now();
            match process_document(config, resolver, source, uploader, &file_path, &inbox_name, archive, dry_run)
            {
                Ok(()) => {}
                Err(e) => {
                    tracing::error!(
                        file = %file_path.display(),
                        error = %e,
                        "Error processing document, continuing with next"
                    );
                }
            }
            tracing::info!(
                file = %file_path.display(),
                elapsed_secs = started.elapsed().as_secs_f32(),
                "Processing time"
            );
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn process_document(
    config: &Config,
    resolver: &mut DocumentResolver,
    source: &dyn TextSource,
    uploader: &dyn Uploader,
    file_path: &Path,
    inbox_name: &str,
    archive: &Path,
    dry_run: bool,
) -> Result<()> {
    let text = source.document_text(file_path)?;
    let result = resolver.resolve_document(&text, None)?;
    tracing::info!(
        file = %file_path.display(),
        filename = %result.filename,
        category = %result.category,
        "Document resolved"
    );

    if dry_run {
        return Ok(());
    }

    if let Some(extra_category) = config.extra_upload_for(inbox_name) {
        try_upload(config, uploader, file_path, &result.filename, extra_category);
    }

    if try_upload(config, uploader, file_path, &result.filename, &result.category) {
        let target = archive.join(&result.filename);
        std::fs::rename(file_path, &target)
            .with_context(|| format!("archiving to {}", target.display()))?;
        tracing::info!(
            original = %file_path.display(),
            archived_as = %result.filename,
            "Archived"
        );
    }

    Ok(())
}

/// Upload to the folder configured for `category`. Failures are logged
/// and reported as `false`; the caller decides whether to archive.
fn try_upload(
    config: &Config,
    uploader: &dyn Uploader,
    file_path: &Path,
    new_filename: &str,
    category: &str,
) -> bool {
    let Some(directory_id) = config.directory_id(category) else {
        tracing::error!(category, "No kDrive directory configured for category");
        return false;
    };
    match uploader.upload(file_path, new_filename, directory_id) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(
                file = %file_path.display(),
                category,
                error = %e,
                "Upload failed"
            );
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aktenwart::kdrive::MockUploader;
    use aktenwart::pipeline::extraction::MockTextSource;
    use aktenwart::pipeline::llm::MockLlmClient;
    use aktenwart::pipeline::resolve::ResolverPolicy;

    fn test_config() -> Config {
        serde_json::from_str(
            r#"{
                "first_names": ["Anna"],
                "last_name": "Berger",
                "categories": [
                    {"label": "Rechnung", "directory_id": "101"},
                    {"label": "Vertrag", "directory_id": "102"},
                    {"label": "Unsicher", "directory_id": "199"}
                ],
                "kdrive_api_token": "t",
                "kdrive_drive_id": "d",
                "ai_product_id": "p",
                "extra_uploads": [{"inbox": "Steuern", "category": "Unsicher"}]
            }"#,
        )
        .unwrap()
    }

    fn test_resolver(responses: &[&str]) -> DocumentResolver {
        let config = test_config();
        DocumentResolver::new(
            Box::new(MockLlmClient::new(responses)),
            config.name_registry(),
            config.labels(),
            ResolverPolicy::default(),
        )
        .unwrap()
    }

    fn seed_inbox(subdir: &str) -> (tempfile::TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        let inbox = root.path().join("input");
        std::fs::create_dir_all(inbox.join(subdir)).unwrap();
        std::fs::write(inbox.join(subdir).join("scan_001.pdf"), b"%PDF-1.4").unwrap();
        (root, inbox)
    }

    #[test]
    fn successful_document_is_uploaded_and_archived() {
        let (root, inbox) = seed_inbox("Ablegen");
        let archive = root.path().join("Archive");
        std::fs::create_dir_all(&archive).unwrap();

        let config = test_config();
        let mut resolver = test_resolver(&["Rechnung_TelekomAG_Mobilfunk.pdf", "Rechnung"]);
        let source = MockTextSource::new("rechnung nr. 123 von telekomag");
        let uploader = MockUploader::new();

        run_batch(&config, &mut resolver, &source, &uploader, &inbox, &archive, false).unwrap();

        let uploads = uploader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1, "101");
        assert!(uploads[0].0.starts_with("Rechnung_TelekomAG_Mobilfunk"));

        // Original gone, archive populated.
        assert!(!inbox.join("Ablegen/scan_001.pdf").exists());
        assert_eq!(std::fs::read_dir(&archive).unwrap().count(), 1);
    }

    #[test]
    fn extra_upload_inbox_uploads_twice() {
        let (root, inbox) = seed_inbox("Steuern");
        let archive = root.path().join("Archive");
        std::fs::create_dir_all(&archive).unwrap();

        let config = test_config();
        let mut resolver = test_resolver(&["Rechnung_Finanzamt_Bescheid.pdf", "Rechnung"]);
        let source = MockTextSource::new("bescheid vom finanzamt");
        let uploader = MockUploader::new();

        run_batch(&config, &mut resolver, &source, &uploader, &inbox, &archive, false).unwrap();

        let uploads = uploader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 2);
        // Extra folder first, then the category folder.
        assert_eq!(uploads[0].1, "199");
        assert_eq!(uploads[1].1, "101");
    }

    #[test]
    fn failed_upload_keeps_the_original_in_place() {
        let (root, inbox) = seed_inbox("Ablegen");
        let archive = root.path().join("Archive");
        std::fs::create_dir_all(&archive).unwrap();

        let config = test_config();
        let mut resolver = test_resolver(&["Rechnung_TelekomAG_Mobilfunk.pdf", "Rechnung"]);
        let source = MockTextSource::new("rechnung");
        let uploader = MockUploader::failing();

        run_batch(&config, &mut resolver, &source, &uploader, &inbox, &archive, false).unwrap();

        assert!(inbox.join("Ablegen/scan_001.pdf").exists());
        assert_eq!(std::fs::read_dir(&archive).unwrap().count(), 0);
    }

    #[test]
    fn dry_run_neither_uploads_nor_moves() {
        let (root, inbox) = seed_inbox("Ablegen");
        let archive = root.path().join("Archive");
        std::fs::create_dir_all(&archive).unwrap();

        let config = test_config();
        let mut resolver = test_resolver(&["Rechnung_TelekomAG_Mobilfunk.pdf", "Rechnung"]);
        let source = MockTextSource::new("rechnung");
        let uploader = MockUploader::new();

        run_batch(&config, &mut resolver, &source, &uploader, &inbox, &archive, true).unwrap();

        assert!(uploader.uploads.lock().unwrap().is_empty());
        assert!(inbox.join("Ablegen/scan_001.pdf").exists());
    }

    #[test]
    fn unresolved_document_files_under_unsicher() {
        let (root, inbox) = seed_inbox("Ablegen");
        let archive = root.path().join("Archive");
        std::fs::create_dir_all(&archive).unwrap();

        let config = test_config();
        // Never a filename, never a unique category.
        let mut resolver = test_resolver(&["keine ahnung"]);
        let source = MockTextSource::new("unleserlicher scan");
        let uploader = MockUploader::new();

        run_batch(&config, &mut resolver, &source, &uploader, &inbox, &archive, false).unwrap();

        let uploads = uploader.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].1, "199");
        assert!(uploads[0].0.starts_with("Unsicher_"));
    }
}
