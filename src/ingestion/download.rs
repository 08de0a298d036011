//! Corpus downloader for the Sefaria-Export GitHub repository.
//!
//! Builds the fixed target list (Torah books, Mishnah and Talmud Bavli
//! tractates, English and Hebrew merged files) and fetches it with a small
//! worker pool, retries with exponential backoff, and skip-existing resume.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::types::{HavrutaError, SourceCategory};

const SEFARIA_EXPORT_BASE: &str =
    "https://raw.githubusercontent.com/Sefaria/Sefaria-Export/master";

const LANGUAGES: &[&str] = &["English", "Hebrew"];

const TORAH_BOOKS: &[&str] = &["Genesis", "Exodus", "Leviticus", "Numbers", "Deuteronomy"];

const MISHNAH_STRUCTURE: &[(&str, &[&str])] = &[
    (
        "Seder Zeraim",
        &[
            "Berakhot", "Peah", "Demai", "Kilayim", "Sheviit", "Terumot", "Maasrot",
            "Maaser Sheni", "Challah", "Orlah", "Bikkurim",
        ],
    ),
    (
        "Seder Moed",
        &[
            "Shabbat", "Eruvin", "Pesachim", "Shekalim", "Yoma", "Sukkah", "Beitzah",
            "Rosh Hashanah", "Ta'anit", "Megillah", "Moed Katan", "Chagigah",
        ],
    ),
    (
        "Seder Nashim",
        &["Yevamot", "Ketubot", "Nedarim", "Nazir", "Sotah", "Gittin", "Kiddushin"],
    ),
    (
        "Seder Nezikin",
        &[
            "Bava Kamma", "Bava Metzia", "Bava Batra", "Sanhedrin", "Makkot", "Shevuot",
            "Eduyot", "Avodah Zarah", "Pirkei Avot", "Horayot",
        ],
    ),
    (
        "Seder Kodashim",
        &[
            "Zevachim", "Menachot", "Chullin", "Bekhorot", "Arakhin", "Temurah", "Keritot",
            "Meilah", "Tamid", "Middot", "Kinnim",
        ],
    ),
    (
        "Seder Tahorot",
        &[
            "Kelim", "Oholot", "Negaim", "Parah", "Tahorot", "Mikvaot", "Niddah",
            "Makhshirin", "Zavim", "Tevul Yom", "Yadayim", "Oktzin",
        ],
    ),
];

// Bavli only; tractates without Gemara are absent from the export.
const TALMUD_STRUCTURE: &[(&str, &[&str])] = &[
    ("Seder Zeraim", &["Berakhot"]),
    (
        "Seder Moed",
        &[
            "Shabbat", "Eruvin", "Pesachim", "Yoma", "Sukkah", "Beitzah", "Rosh Hashanah",
            "Taanit", "Megillah", "Moed Katan", "Chagigah",
        ],
    ),
    (
        "Seder Nashim",
        &["Yevamot", "Ketubot", "Nedarim", "Nazir", "Sotah", "Gittin", "Kiddushin"],
    ),
    (
        "Seder Nezikin",
        &[
            "Bava Kamma", "Bava Metzia", "Bava Batra", "Sanhedrin", "Makkot", "Shevuot",
            "Avodah Zarah", "Horayot",
        ],
    ),
    (
        "Seder Kodashim",
        &[
            "Zevachim", "Menachot", "Chullin", "Bekhorot", "Arakhin", "Temurah", "Keritot",
            "Meilah", "Tamid",
        ],
    ),
    ("Seder Tahorot", &["Niddah"]),
];

/// One file to fetch: its repository path and the local filename it lands as.
#[derive(Debug, Clone)]
pub struct DownloadTarget {
    pub repo_path: String,
    pub filename: String,
    pub category: SourceCategory,
}

/// Outcome of a corpus download run.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub fetched: usize,
    pub skipped: usize,
    /// Filename and final error for each target that exhausted its retries.
    pub failed: Vec<(String, String)>,
}

/// Builds the full target list, optionally restricted to one category.
pub fn download_targets(filter: Option<SourceCategory>) -> Vec<DownloadTarget> {
    let mut targets = Vec::new();
    let wanted = |category| filter.is_none() || filter == Some(category);

    if wanted(SourceCategory::Torah) {
        for book in TORAH_BOOKS {
            for lang in LANGUAGES {
                targets.push(DownloadTarget {
                    repo_path: format!("json/Tanakh/Torah/{book}/{lang}/merged.json"),
                    filename: format!("{book}_{lang}.json"),
                    category: SourceCategory::Torah,
                });
            }
        }
    }

    if wanted(SourceCategory::Mishnah) {
        for (seder, tractates) in MISHNAH_STRUCTURE {
            for tractate in *tractates {
                // Pirkei Avot is the one tractate directory without the
                // "Mishnah " prefix in the export.
                let dir_name = if *tractate == "Pirkei Avot" {
                    tractate.to_string()
                } else {
                    format!("Mishnah {tractate}")
                };
                for lang in LANGUAGES {
                    targets.push(DownloadTarget {
                        repo_path: format!(
                            "json/Mishnah/{}/{}/{lang}/merged.json",
                            escape_spaces(seder),
                            escape_spaces(&dir_name),
                        ),
                        filename: format!(
                            "Mishnah_{}_{lang}.json",
                            tractate.replace(' ', "_").replace('\'', "")
                        ),
                        category: SourceCategory::Mishnah,
                    });
                }
            }
        }
    }

    if wanted(SourceCategory::Talmud) {
        for (seder, tractates) in TALMUD_STRUCTURE {
            for tractate in *tractates {
                for lang in LANGUAGES {
                    targets.push(DownloadTarget {
                        repo_path: format!(
                            "json/Talmud/Bavli/{}/{}/{lang}/merged.json",
                            escape_spaces(seder),
                            escape_spaces(tractate),
                        ),
                        filename: format!(
                            "Talmud_{}_{lang}.json",
                            tractate.replace(' ', "_")
                        ),
                        category: SourceCategory::Talmud,
                    });
                }
            }
        }
    }

    targets
}

fn escape_spaces(segment: &str) -> String {
    segment.replace(' ', "%20")
}

/// Fetches every target into `data_dir` with `concurrency` workers.
///
/// Existing files are skipped; each miss is retried up to `retry_attempts`
/// times with 1s, 2s, 4s... backoff. Individual failures land in the summary
/// instead of aborting the run.
pub async fn download_corpus(
    targets: Vec<DownloadTarget>,
    data_dir: impl AsRef<Path>,
    concurrency: usize,
    retry_attempts: u32,
) -> Result<DownloadSummary, HavrutaError> {
    let data_dir: PathBuf = data_dir.as_ref().to_path_buf();
    tokio::fs::create_dir_all(&data_dir).await?;

    let total = targets.len();
    info!(total, concurrency, "starting corpus download");

    let queue = Arc::new(Mutex::new(targets.into_iter().collect::<VecDeque<_>>()));
    let summary = Arc::new(Mutex::new(DownloadSummary::default()));
    let client = reqwest::Client::new();

    let workers = concurrency.clamp(1, total.max(1));
    let mut handles = Vec::with_capacity(workers);
    for _ in 0..workers {
        let queue = Arc::clone(&queue);
        let summary = Arc::clone(&summary);
        let client = client.clone();
        let data_dir = data_dir.clone();

        handles.push(tokio::spawn(async move {
            loop {
                let target = match queue.lock().await.pop_front() {
                    Some(target) => target,
                    None => break,
                };
                let destination = data_dir.join(&target.filename);
                if tokio::fs::try_exists(&destination).await.unwrap_or(false) {
                    summary.lock().await.skipped += 1;
                    continue;
                }

                match fetch_with_retry(&client, &target, &destination, retry_attempts).await {
                    Ok(()) => summary.lock().await.fetched += 1,
                    Err(err) => {
                        warn!(filename = %target.filename, error = %err, "download failed");
                        summary
                            .lock()
                            .await
                            .failed
                            .push((target.filename.clone(), err.to_string()));
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle
            .await
            .map_err(|err| HavrutaError::Download(format!("worker panicked: {err}")))?;
    }

    let summary = Arc::try_unwrap(summary)
        .map_err(|_| HavrutaError::Download("summary still shared after join".into()))?
        .into_inner();
    info!(
        fetched = summary.fetched,
        skipped = summary.skipped,
        failed = summary.failed.len(),
        "corpus download finished"
    );
    Ok(summary)
}

async fn fetch_with_retry(
    client: &reqwest::Client,
    target: &DownloadTarget,
    destination: &Path,
    retry_attempts: u32,
) -> Result<(), HavrutaError> {
    let url = Url::parse(&format!("{SEFARIA_EXPORT_BASE}/{}", target.repo_path))
        .map_err(|err| HavrutaError::Download(err.to_string()))?;

    let mut last_error = None;
    for attempt in 1..=retry_attempts.max(1) {
        match fetch_once(client, url.clone(), destination).await {
            Ok(()) => {
                info!(filename = %target.filename, attempt, "fetched");
                return Ok(());
            }
            Err(err) => {
                if attempt < retry_attempts {
                    let backoff = Duration::from_secs(1u64 << (attempt - 1));
                    warn!(
                        filename = %target.filename,
                        attempt,
                        backoff_secs = backoff.as_secs(),
                        error = %err,
                        "retrying download"
                    );
                    tokio::time::sleep(backoff).await;
                }
                last_error = Some(err);
            }
        }
    }
    Err(last_error
        .unwrap_or_else(|| HavrutaError::Download("no attempts were made".into())))
}

async fn fetch_once(
    client: &reqwest::Client,
    url: Url,
    destination: &Path,
) -> Result<(), HavrutaError> {
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        return Err(HavrutaError::Download(format!(
            "server returned {}",
            response.status()
        )));
    }
    let bytes = response.bytes().await?;
    tokio::fs::write(destination, &bytes).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn full_target_list_covers_all_categories_in_both_languages() {
        let targets = download_targets(None);
        // 5 Torah books, 63 Mishnah tractates, 37 Bavli tractates, two
        // languages each.
        assert_eq!(targets.len(), (5 + 63 + 37) * 2);
        assert!(targets
            .iter()
            .any(|t| t.repo_path == "json/Tanakh/Torah/Genesis/English/merged.json"));
    }

    #[test]
    fn filter_restricts_to_one_category() {
        let targets = download_targets(Some(SourceCategory::Torah));
        assert_eq!(targets.len(), 10);
        assert!(targets.iter().all(|t| t.category == SourceCategory::Torah));
    }

    #[test]
    fn pirkei_avot_has_no_directory_prefix() {
        let targets = download_targets(Some(SourceCategory::Mishnah));
        let avot = targets
            .iter()
            .find(|t| t.filename == "Mishnah_Pirkei_Avot_English.json")
            .unwrap();
        assert!(avot.repo_path.contains("/Pirkei%20Avot/"));
        assert!(!avot.repo_path.contains("Mishnah%20Pirkei"));
    }

    #[test]
    fn spaces_are_escaped_in_repo_paths() {
        let targets = download_targets(Some(SourceCategory::Talmud));
        let bava = targets
            .iter()
            .find(|t| t.filename == "Talmud_Bava_Kamma_English.json")
            .unwrap();
        assert!(bava.repo_path.contains("Bava%20Kamma"));
    }

    #[tokio::test]
    async fn existing_files_are_skipped() {
        let dir = tempdir().unwrap();
        let target = DownloadTarget {
            repo_path: "unused".to_string(),
            filename: "already_here.json".to_string(),
            category: SourceCategory::Torah,
        };
        tokio::fs::write(dir.path().join(&target.filename), "{}")
            .await
            .unwrap();

        let summary = download_corpus(vec![target], dir.path(), 2, 1).await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.fetched, 0);
        assert!(summary.failed.is_empty());
    }

    #[tokio::test]
    async fn failures_are_collected_not_fatal() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(404);
        });

        let dir = tempdir().unwrap();
        let target = DownloadTarget {
            repo_path: "missing.json".to_string(),
            filename: "missing.json".to_string(),
            category: SourceCategory::Torah,
        };
        // Point at the mock by fetching directly.
        let client = reqwest::Client::new();
        let err = fetch_once(
            &client,
            Url::parse(&server.url("/missing.json")).unwrap(),
            &dir.path().join(&target.filename),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HavrutaError::Download(_)));
    }

    #[tokio::test]
    async fn fetch_writes_response_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/merged.json");
            then.status(200).body(r#"{"title":"T","text":[]}"#);
        });

        let dir = tempdir().unwrap();
        let destination = dir.path().join("T_English.json");
        let client = reqwest::Client::new();
        fetch_once(
            &client,
            Url::parse(&server.url("/merged.json")).unwrap(),
            &destination,
        )
        .await
        .unwrap();

        let written = tokio::fs::read_to_string(&destination).await.unwrap();
        assert!(written.contains("\"title\""));
    }
}
