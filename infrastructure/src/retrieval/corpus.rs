//! Local reference corpus
//!
//! Reads `.md` and `.txt` files below a corpus directory, splits them into
//! paragraph passages and ranks passages by term overlap with the query.
//! A corpus scope selects a sub-directory of the corpus.

use async_trait::async_trait;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use valgen_application::ports::retrieval::{RetrievalError, RetrievalPort, RetrievalQuery};
use valgen_domain::RankedPassage;

/// Terms shorter than this are ignored when scoring.
const MIN_TERM_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct LocalCorpusRetriever {
    root: Option<PathBuf>,
    passage_chars: usize,
}

impl LocalCorpusRetriever {
    pub fn new(root: impl Into<PathBuf>, passage_chars: usize) -> Self {
        Self {
            root: Some(root.into()),
            passage_chars,
        }
    }

    /// A retriever with no corpus: every query returns no passages.
    pub fn empty() -> Self {
        Self {
            root: None,
            passage_chars: 0,
        }
    }

    fn search(&self, query: &RetrievalQuery) -> Result<Vec<RankedPassage>, RetrievalError> {
        let Some(root) = &self.root else {
            return Ok(Vec::new());
        };

        let base = match &query.corpus_scope {
            Some(scope) => {
                if Path::new(scope)
                    .components()
                    .any(|c| !matches!(c, std::path::Component::Normal(_)))
                {
                    return Err(RetrievalError::InvalidQuery(format!(
                        "corpus scope '{}' must be a relative sub-directory",
                        scope
                    )));
                }
                root.join(scope)
            }
            None => root.clone(),
        };
        if !base.is_dir() {
            return Err(RetrievalError::Unavailable(format!(
                "corpus directory {} does not exist",
                base.display()
            )));
        }

        let terms = terms_of(&query.query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut passages = Vec::new();
        for path in corpus_files(&base)? {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping unreadable corpus file {}: {}", path.display(), e);
                    continue;
                }
            };
            let source = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .display()
                .to_string();
            for paragraph in paragraphs(&content, self.passage_chars) {
                let relevance = overlap(&terms, &terms_of(&paragraph));
                if relevance > 0.0 {
                    passages.push(RankedPassage::new(source.clone(), paragraph, relevance));
                }
            }
        }

        debug!("Corpus search matched {} passages", passages.len());
        Ok(valgen_domain::coordination::rank(passages, query.limit))
    }
}

#[async_trait]
impl RetrievalPort for LocalCorpusRetriever {
    async fn retrieve(&self, query: &RetrievalQuery) -> Result<Vec<RankedPassage>, RetrievalError> {
        let retriever = self.clone();
        let query = query.clone();
        tokio::task::spawn_blocking(move || retriever.search(&query))
            .await
            .map_err(|e| RetrievalError::Io(format!("corpus search task failed: {}", e)))?
    }
}

fn corpus_files(base: &Path) -> Result<Vec<PathBuf>, RetrievalError> {
    let mut files = Vec::new();
    for extension in ["md", "txt"] {
        let pattern = format!("{}/**/*.{}", base.display(), extension);
        let entries =
            glob::glob(&pattern).map_err(|e| RetrievalError::InvalidQuery(e.to_string()))?;
        files.extend(entries.filter_map(Result::ok).filter(|p| p.is_file()));
    }
    files.sort();
    Ok(files)
}

/// Blank-line separated paragraphs, each cut to `max_chars`.
fn paragraphs(content: &str, max_chars: usize) -> Vec<String> {
    content
        .split("\n\n")
        .map(|p| p.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|p| !p.is_empty())
        .map(|p| match p.char_indices().nth(max_chars) {
            Some((idx, _)) => p[..idx].to_string(),
            None => p,
        })
        .collect()
}

fn terms_of(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}

/// Share of query terms present in the passage.
fn overlap(query: &HashSet<String>, passage: &HashSet<String>) -> f64 {
    let hits = query.intersection(passage).count();
    hits as f64 / query.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use valgen_domain::Category;

    fn query(text: &str, scope: Option<&str>, limit: usize) -> RetrievalQuery {
        RetrievalQuery {
            query: text.to_string(),
            category: Category::Configured,
            corpus_scope: scope.map(String::from),
            limit,
        }
    }

    fn corpus() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("backup.md"),
            "# Backup SOP\n\nBackups are verified weekly by restoring a sample.\n\nUnrelated cafeteria notes.",
        )
        .unwrap();
        fs::create_dir(dir.path().join("sops")).unwrap();
        fs::write(
            dir.path().join("sops").join("audit.txt"),
            "Audit trail entries record the operator and a timestamp for every configuration change.",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.pdf"), "audit trail timestamp").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_ranks_matching_paragraphs() {
        let dir = corpus();
        let retriever = LocalCorpusRetriever::new(dir.path(), 500);
        let passages = retriever
            .retrieve(&query("audit trail with operator timestamp", None, 5))
            .await
            .unwrap();

        assert!(!passages.is_empty());
        assert!(passages[0].source.ends_with("audit.txt"));
        assert!(passages.iter().all(|p| !p.source.ends_with(".pdf")));
        assert!(passages.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[tokio::test]
    async fn test_scope_restricts_search() {
        let dir = corpus();
        let retriever = LocalCorpusRetriever::new(dir.path(), 500);
        let passages = retriever
            .retrieve(&query("backups verified weekly", Some("sops"), 5))
            .await
            .unwrap();
        assert!(passages.is_empty());

        let err = retriever
            .retrieve(&query("backups", Some("../etc"), 5))
            .await
            .unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn test_missing_corpus_is_unavailable() {
        let retriever = LocalCorpusRetriever::new("/nonexistent/corpus", 500);
        let err = retriever.retrieve(&query("anything", None, 5)).await.unwrap_err();
        assert!(matches!(err, RetrievalError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_retriever_returns_nothing() {
        let passages = LocalCorpusRetriever::empty()
            .retrieve(&query("audit", None, 5))
            .await
            .unwrap();
        assert!(passages.is_empty());
    }

    #[test]
    fn test_paragraphs_are_trimmed_and_capped() {
        let paras = paragraphs("first   line\nwraps\n\n\n\nsecond paragraph here", 10);
        assert_eq!(paras, vec!["first line", "second par"]);
    }
}
