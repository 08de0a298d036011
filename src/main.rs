use havruta::config::Config;
use havruta::embeddings::EmbeddingsClient;
use havruta::ingestion::{download_corpus, download_targets, IngestionPipeline};
use havruta::stores::{SegmentStore, SqliteSegmentStore};
use havruta::{assistant::Assistant, HavrutaError};
use tracing::error;
use tracing_subscriber::EnvFilter;

fn usage() -> ! {
    eprintln!(
        "usage: havruta <command>\n\n\
         commands:\n  \
         download [torah|mishnah|talmud]   fetch export files into the data directory\n  \
         ingest [dir]                      chunk, embed, and store every JSON file\n  \
         ask <question>                    answer a question from the stored corpus\n  \
         stats                             show how many segments are stored"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        error!(%err, "command failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), HavrutaError> {
    let config = Config::from_env();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.first().map(String::as_str) {
        Some("download") => {
            let filter = match args.get(1).map(String::as_str) {
                Some(label) => Some(capitalize(label).parse::<havruta::SourceCategory>()?),
                None => None,
            };
            let summary =
                download_corpus(download_targets(filter), &config.data_dir, 3, 3).await?;
            println!(
                "fetched {}, skipped {}, failed {}",
                summary.fetched,
                summary.skipped,
                summary.failed.len()
            );
            for (filename, error) in &summary.failed {
                println!("  failed: {filename}: {error}");
            }
        }
        Some("ingest") => {
            let dir = args
                .get(1)
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| config.data_dir.clone());
            let store =
                SqliteSegmentStore::open(&config.store_path, config.embeddings.dimension).await?;
            let pipeline =
                IngestionPipeline::new(EmbeddingsClient::new(&config.embeddings), store);
            let report = pipeline.ingest_directory(&dir).await?;
            println!(
                "ingested {} segments from {} files ({} failed)",
                report.segments_stored,
                report.files_ingested,
                report.failures.len()
            );
        }
        Some("ask") => {
            let question = args[1..].join(" ");
            if question.is_empty() {
                usage();
            }
            let store =
                SqliteSegmentStore::open(&config.store_path, config.embeddings.dimension).await?;
            let assistant = Assistant::new(
                EmbeddingsClient::new(&config.embeddings),
                store,
                config.llm.clone(),
                config.retrieval.clone(),
            );
            println!("{}", assistant.answer(&question).await?);
        }
        Some("stats") => {
            let store =
                SqliteSegmentStore::open(&config.store_path, config.embeddings.dimension).await?;
            println!("{} segments stored", store.count().await?);
        }
        _ => usage(),
    }
    Ok(())
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
