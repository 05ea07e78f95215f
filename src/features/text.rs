//! Per-author text signals: templates, spam indicators, diversity, linguistic statistics,
//! and corpus-wide duplicate detection.

use super::lexicon::{self, Sentiment};
use super::similarity::{clean_text, edit_similarity, similarity_matrix, tokenize, SimilarityMatrix};
use crate::comments::{AuthorId, Comment, CommentCorpus};
use crate::config::TextConfig;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::OnceLock;
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub total_comments: usize,
    pub avg_comment_length: f64,
    pub std_comment_length: f64,
    /// Distinct non-stop-word tokens
    pub vocabulary_size: usize,
    /// vocabulary_size / non-stop-word tokens
    pub vocabulary_richness: f64,
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub avg_sentiment_compound: f64,
    pub std_sentiment_compound: f64,
    pub avg_sentiment_positive: f64,
    pub avg_sentiment_negative: f64,
    pub avg_sentiment_neutral: f64,
    pub exclamation_ratio: f64,
    pub question_ratio: f64,
    pub caps_ratio: f64,
    pub emoji_count: usize,
    pub url_count: usize,
    pub repeated_words_ratio: f64,
    /// Distinct 2/3-grams of this author seen more than twice across the corpus
    pub repeated_phrases_count: usize,
    pub template_score: f64,
    pub spam_score: f64,
    pub diversity_score: f64,
}

/// Groups of comment ids with identical or nearly identical text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroups {
    /// Same cleaned text (SHA-256 of the cleaned form)
    pub exact: Vec<BTreeSet<String>>,
    /// Connected sets of comments linked by high edit similarity
    pub near: Vec<BTreeSet<String>>,
}

static SPAM_LOWER: OnceLock<Vec<Regex>> = OnceLock::new();
static CAPS_RE: OnceLock<Regex> = OnceLock::new();
static EMOJI_RE: OnceLock<Regex> = OnceLock::new();
static URL_PREFIX_RE: OnceLock<Regex> = OnceLock::new();

fn spam_patterns() -> &'static [Regex] {
    SPAM_LOWER.get_or_init(|| {
        [
            r"\b(?:click|subscribe|follow|check out|visit)\b",
            r"\b(?:free|win|prize|giveaway|discount)\b",
            r"\b(?:bit\.ly|tinyurl|goo\.gl|shorturl)\b",
            r"[\$€£¥₹]+[\d,]+",
            r"\b(?:make money|earn cash|work from home)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("valid regex"))
        .collect()
    })
}

fn caps_re() -> &'static Regex {
    CAPS_RE.get_or_init(|| Regex::new(r"[A-Z]{5,}").expect("valid regex"))
}

fn emoji_re() -> &'static Regex {
    EMOJI_RE.get_or_init(|| {
        Regex::new(r"[\x{1F600}-\x{1F64F}\x{1F300}-\x{1F5FF}\x{1F680}-\x{1F6FF}\x{1F1E0}-\x{1F1FF}]+")
            .expect("valid regex")
    })
}

fn url_prefix_re() -> &'static Regex {
    URL_PREFIX_RE.get_or_init(|| Regex::new(r"https?://").expect("valid regex"))
}

/// True when any promotional, link-shortener, caps, repetition or currency indicator fires.
pub fn is_spam(text: &str) -> bool {
    let lower = text.to_lowercase();
    spam_patterns().iter().any(|re| re.is_match(&lower))
        || caps_re().is_match(text)
        || has_char_run(text, 5)
}

/// Some character repeated `run` or more times in a row.
fn has_char_run(text: &str, run: usize) -> bool {
    let mut prev = None;
    let mut len = 0;
    for c in text.chars() {
        if Some(c) == prev {
            len += 1;
        } else {
            prev = Some(c);
            len = 1;
        }
        if len >= run {
            return true;
        }
    }
    false
}

pub struct TextFeatureExtractor {
    config: TextConfig,
}

impl TextFeatureExtractor {
    pub fn new(config: TextConfig) -> Self {
        Self { config }
    }

    /// All per-author text features. Computes the O(n²) similarity matrix once.
    pub fn extract(&self, corpus: &CommentCorpus) -> BTreeMap<AuthorId, TextFeatures> {
        let similarity = self.similarity_matrix(corpus);
        let templates = self.template_scores(corpus, &similarity);
        let phrase_counts = corpus_ngram_counts(corpus.comments());

        let mut out = BTreeMap::new();
        for (author, comments) in corpus.by_author() {
            let mut features = linguistic_features(&comments, &phrase_counts);
            features.template_score = templates.get(author).copied().unwrap_or(0.0);
            features.spam_score = spam_score(&comments);
            features.diversity_score = diversity_score(&comments);
            out.insert(author.to_string(), features);
        }
        debug!(authors = out.len(), "text features extracted");
        out
    }

    /// Similarity between every pair of comments, indexed like `corpus.comments()`.
    pub fn similarity_matrix(&self, corpus: &CommentCorpus) -> SimilarityMatrix {
        let cleaned: Vec<String> = corpus.comments().iter().map(|c| clean_text(&c.text)).collect();
        similarity_matrix(&cleaned, self.config.max_features)
    }

    /// Fraction of each author's comments resembling some other comment above the threshold.
    pub fn template_scores(
        &self,
        corpus: &CommentCorpus,
        similarity: &SimilarityMatrix,
    ) -> BTreeMap<AuthorId, f64> {
        let n = similarity.len();
        let templated: Vec<bool> = (0..n)
            .map(|i| {
                (0..n).any(|j| j != i && similarity.get(i, j) > self.config.similarity_threshold)
            })
            .collect();

        corpus
            .authors()
            .map(|author| {
                let idxs = corpus.author_indices(author);
                let hits = idxs.iter().filter(|&&i| templated[i]).count();
                let score = if idxs.is_empty() {
                    0.0
                } else {
                    hits as f64 / idxs.len() as f64
                };
                (author.to_string(), score)
            })
            .collect()
    }

    /// Exact duplicates by content hash and near duplicates by transitive edit similarity.
    pub fn duplicate_groups(&self, corpus: &CommentCorpus) -> DuplicateGroups {
        let comments = corpus.comments();

        let mut by_hash: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for c in comments {
            let digest = Sha256::digest(clean_text(&c.text).as_bytes());
            let key: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
            by_hash.entry(key).or_default().insert(c.id.clone());
        }
        let mut exact: Vec<BTreeSet<String>> =
            by_hash.into_values().filter(|g| g.len() > 1).collect();
        exact.sort();

        let n = comments.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for i in 0..n {
            for j in (i + 1)..n {
                if edit_similarity(&comments[i].text, &comments[j].text)
                    > self.config.near_duplicate_threshold
                {
                    let (a, b) = (find(&mut parent, i), find(&mut parent, j));
                    if a != b {
                        parent[a.max(b)] = a.min(b);
                    }
                }
            }
        }
        let mut components: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
        for i in 0..n {
            let root = find(&mut parent, i);
            components.entry(root).or_default().insert(comments[i].id.clone());
        }
        let mut near: Vec<BTreeSet<String>> =
            components.into_values().filter(|g| g.len() > 1).collect();
        near.sort();

        info!(exact = exact.len(), near = near.len(), "duplicate groups found");
        DuplicateGroups { exact, near }
    }
}

/// Fraction of comments tripping at least one spam indicator.
pub fn spam_score(comments: &[&Comment]) -> f64 {
    if comments.is_empty() {
        return 0.0;
    }
    comments.iter().filter(|c| is_spam(&c.text)).count() as f64 / comments.len() as f64
}

/// 1 - mean pairwise edit similarity of an author's cleaned comments; 1 for a single comment.
pub fn diversity_score(comments: &[&Comment]) -> f64 {
    if comments.len() < 2 {
        return 1.0;
    }
    let cleaned: Vec<String> = comments.iter().map(|c| clean_text(&c.text)).collect();
    let mut total = 0.0;
    let mut pairs = 0usize;
    for i in 0..cleaned.len() {
        for j in (i + 1)..cleaned.len() {
            total += edit_similarity(&cleaned[i], &cleaned[j]);
            pairs += 1;
        }
    }
    1.0 - total / pairs as f64
}

fn ngrams(text: &str) -> Vec<String> {
    let words = tokenize(text);
    let mut out = Vec::new();
    for n in [2usize, 3] {
        if words.len() < n {
            continue;
        }
        for w in words.windows(n) {
            out.push(w.join(" "));
        }
    }
    out
}

fn corpus_ngram_counts(comments: &[Comment]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for c in comments {
        for g in ngrams(&c.text) {
            *counts.entry(g).or_insert(0) += 1;
        }
    }
    counts
}

fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn linguistic_features(
    comments: &[&Comment],
    phrase_counts: &HashMap<String, usize>,
) -> TextFeatures {
    let texts: Vec<&str> = comments.iter().map(|c| c.text.as_str()).collect();
    let all_text = texts.join(" ");
    let total_chars = all_text.chars().count().max(1) as f64;

    let lengths: Vec<f64> = texts.iter().map(|t| t.chars().count() as f64).collect();

    let words: Vec<String> = tokenize(&all_text)
        .into_iter()
        .filter(|w| w.chars().all(char::is_alphanumeric) && !lexicon::is_stop_word(w))
        .collect();
    let mut word_counts: HashMap<&str, usize> = HashMap::new();
    for w in &words {
        *word_counts.entry(w.as_str()).or_default() += 1;
    }
    let vocabulary_size = word_counts.len();
    let repeated_words_ratio = if word_counts.is_empty() {
        0.0
    } else {
        word_counts.values().filter(|&&c| c > 1).count() as f64 / word_counts.len() as f64
    };

    let (flesch_reading_ease, flesch_kincaid_grade) = if all_text.chars().count() > 10 {
        readability(&all_text)
    } else {
        (0.0, 0.0)
    };

    let sentiments: Vec<Sentiment> = texts.iter().map(|t| lexicon::sentiment(t)).collect();
    let compounds: Vec<f64> = sentiments.iter().map(|s| s.compound).collect();

    let author_phrases: HashSet<String> = texts.iter().flat_map(|t| ngrams(t)).collect();
    let repeated_phrases_count = author_phrases
        .iter()
        .filter(|g| phrase_counts.get(*g).copied().unwrap_or(0) > 2)
        .count();

    TextFeatures {
        total_comments: comments.len(),
        avg_comment_length: mean(&lengths),
        std_comment_length: sample_std(&lengths),
        vocabulary_size,
        vocabulary_richness: vocabulary_size as f64 / words.len().max(1) as f64,
        flesch_reading_ease,
        flesch_kincaid_grade,
        avg_sentiment_compound: mean(&compounds),
        std_sentiment_compound: sample_std(&compounds),
        avg_sentiment_positive: mean(&sentiments.iter().map(|s| s.positive).collect::<Vec<_>>()),
        avg_sentiment_negative: mean(&sentiments.iter().map(|s| s.negative).collect::<Vec<_>>()),
        avg_sentiment_neutral: mean(&sentiments.iter().map(|s| s.neutral).collect::<Vec<_>>()),
        exclamation_ratio: all_text.matches('!').count() as f64 / total_chars,
        question_ratio: all_text.matches('?').count() as f64 / total_chars,
        caps_ratio: all_text.chars().filter(|c| c.is_uppercase()).count() as f64 / total_chars,
        emoji_count: texts.iter().map(|t| emoji_re().find_iter(t).count()).sum(),
        url_count: texts.iter().map(|t| url_prefix_re().find_iter(t).count()).sum(),
        repeated_words_ratio,
        repeated_phrases_count,
        template_score: 0.0,
        spam_score: 0.0,
        diversity_score: 1.0,
    }
}

/// Flesch reading ease and Flesch–Kincaid grade.
fn readability(text: &str) -> (f64, f64) {
    let sentences = text
        .split(|c: char| matches!(c, '.' | '!' | '?'))
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
        .max(1) as f64;
    let words: Vec<&str> = text
        .split_whitespace()
        .filter(|w| w.chars().any(char::is_alphabetic))
        .collect();
    if words.is_empty() {
        return (0.0, 0.0);
    }
    let n_words = words.len() as f64;
    let syllables: usize = words.iter().map(|w| syllable_count(w)).sum();
    let wps = n_words / sentences;
    let spw = syllables as f64 / n_words;
    (
        206.835 - 1.015 * wps - 84.6 * spw,
        0.39 * wps + 11.8 * spw - 15.59,
    )
}

/// Vowel-group heuristic with silent trailing 'e'; at least one per word.
fn syllable_count(word: &str) -> usize {
    let w: Vec<char> = word
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphabetic())
        .collect();
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &w {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }
    if w.len() > 2 && w.ends_with(&['e']) && !w.ends_with(&['l', 'e']) && count > 1 {
        count -= 1;
    }
    count.max(1)
}
