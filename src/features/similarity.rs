//! Pairwise comment similarity.
//!
//! Primary path: TF-IDF vectors over cleaned text, cosine similarity computed as one dense
//! `X · Xᵀ` product. Fallback when the vocabulary is empty: 1 - normalized edit distance.
//! Both paths are O(n²) in the number of comments, in time and memory; size batches
//! accordingly.

use super::lexicon;
use ndarray::{Array2, Axis};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;
use tracing::{debug, warn};

static URL_RE: OnceLock<Regex> = OnceLock::new();
static MENTION_RE: OnceLock<Regex> = OnceLock::new();
static HASHTAG_RE: OnceLock<Regex> = OnceLock::new();
static TOKEN_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| Regex::new(r"https?://\S+").expect("valid regex"))
}

fn mention_re() -> &'static Regex {
    MENTION_RE.get_or_init(|| Regex::new(r"@[A-Za-z0-9_]+").expect("valid regex"))
}

fn hashtag_re() -> &'static Regex {
    HASHTAG_RE.get_or_init(|| Regex::new(r"#[A-Za-z0-9_]+").expect("valid regex"))
}

fn token_re() -> &'static Regex {
    TOKEN_RE.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("valid regex"))
}

/// Strip URLs, mentions and hashtags, collapse whitespace, case-fold.
pub fn clean_text(text: &str) -> String {
    let text = url_re().replace_all(text, "");
    let text = mention_re().replace_all(&text, "");
    let text = hashtag_re().replace_all(&text, "");
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lowercased word tokens of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    token_re()
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 1 - Levenshtein distance / longer length, over characters. Two empty strings score 1.
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMethod {
    Lexical,
    EditDistance,
}

/// Symmetric comment-by-comment similarity with a unit diagonal.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    pub values: Array2<f64>,
    pub method: SimilarityMethod,
}

impl SimilarityMatrix {
    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }
}

/// TF-IDF over a capped vocabulary with English stop words removed.
pub struct LexicalVectorizer {
    max_features: usize,
}

impl LexicalVectorizer {
    pub fn new(max_features: usize) -> Self {
        Self { max_features }
    }

    /// Row-normalized TF-IDF matrix, or `None` when no document yields a usable token.
    pub fn fit_transform(&self, docs: &[String]) -> Option<Array2<f64>> {
        let tokenized: Vec<Vec<String>> = docs
            .iter()
            .map(|d| {
                tokenize(d)
                    .into_iter()
                    .filter(|t| !lexicon::is_stop_word(t))
                    .collect()
            })
            .collect();

        let mut term_totals: BTreeMap<&str, usize> = BTreeMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for tokens in &tokenized {
            let mut seen = std::collections::HashSet::new();
            for t in tokens {
                *term_totals.entry(t.as_str()).or_default() += 1;
                if seen.insert(t.as_str()) {
                    *doc_freq.entry(t.as_str()).or_default() += 1;
                }
            }
        }
        if term_totals.is_empty() {
            return None;
        }

        let mut ranked: Vec<(&str, usize)> = term_totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);
        ranked.sort_by(|a, b| a.0.cmp(b.0));
        let vocab: HashMap<&str, usize> = ranked
            .iter()
            .enumerate()
            .map(|(i, (t, _))| (*t, i))
            .collect();

        let n = docs.len() as f64;
        let idf: Vec<f64> = ranked
            .iter()
            .map(|(t, _)| ((1.0 + n) / (1.0 + doc_freq[t] as f64)).ln() + 1.0)
            .collect();

        let mut matrix = Array2::<f64>::zeros((docs.len(), vocab.len()));
        for (row, tokens) in tokenized.iter().enumerate() {
            for t in tokens {
                if let Some(&col) = vocab.get(t.as_str()) {
                    matrix[[row, col]] += 1.0;
                }
            }
        }
        for mut row in matrix.axis_iter_mut(Axis(0)) {
            for (v, w) in row.iter_mut().zip(&idf) {
                *v *= w;
            }
            let norm = row.dot(&row).sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }
        Some(matrix)
    }
}

/// All-pairs similarity over already-cleaned texts. Identical texts always score exactly 1.
pub fn similarity_matrix(cleaned: &[String], max_features: usize) -> SimilarityMatrix {
    let n = cleaned.len();
    let (mut values, method) = match LexicalVectorizer::new(max_features).fit_transform(cleaned) {
        Some(x) => (x.dot(&x.t()), SimilarityMethod::Lexical),
        None => {
            warn!(comments = n, "empty vocabulary; falling back to edit similarity");
            (edit_similarity_matrix(cleaned), SimilarityMethod::EditDistance)
        }
    };

    values.mapv_inplace(|v| v.clamp(0.0, 1.0));
    let mut by_text: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, t) in cleaned.iter().enumerate() {
        by_text.entry(t.as_str()).or_default().push(i);
    }
    for idxs in by_text.values().filter(|v| v.len() > 1) {
        for &i in idxs {
            for &j in idxs {
                values[[i, j]] = 1.0;
            }
        }
    }
    for i in 0..n {
        values[[i, i]] = 1.0;
    }
    debug!(comments = n, ?method, "similarity matrix computed");
    SimilarityMatrix { values, method }
}

fn edit_similarity_matrix(texts: &[String]) -> Array2<f64> {
    let n = texts.len();
    let mut m = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        m[[i, i]] = 1.0;
        for j in (i + 1)..n {
            let s = edit_similarity(&texts[i], &texts[j]);
            m[[i, j]] = s;
            m[[j, i]] = s;
        }
    }
    m
}
