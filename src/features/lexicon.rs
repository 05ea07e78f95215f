//! Word lists: English stop words and a small valence lexicon for sentiment.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down",
    "during", "each", "even", "ever", "few", "for", "from", "further", "get", "got", "had",
    "has", "have", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "however", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "might", "more", "most", "must", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over",
    "own", "same", "she", "should", "so", "some", "such", "than", "that", "the", "their",
    "theirs", "them", "themselves", "then", "there", "these", "they", "this", "those",
    "through", "to", "too", "under", "until", "up", "us", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
    "would", "you", "your", "yours", "yourself", "yourselves",
];

/// Word valences on a -4..4 scale.
const VALENCE: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("beautiful", 2.9),
    ("best", 3.2),
    ("brilliant", 2.8),
    ("congrats", 2.4),
    ("cool", 1.3),
    ("excellent", 2.7),
    ("fantastic", 2.6),
    ("fun", 2.3),
    ("glad", 2.0),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("helpful", 1.8),
    ("honest", 2.3),
    ("hope", 1.9),
    ("interesting", 1.7),
    ("love", 3.2),
    ("nice", 1.8),
    ("perfect", 2.7),
    ("proud", 2.1),
    ("right", 0.9),
    ("support", 1.7),
    ("thank", 1.5),
    ("thanks", 1.9),
    ("true", 1.1),
    ("trust", 2.3),
    ("useful", 1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("wow", 2.8),
    ("angry", -2.3),
    ("awful", -2.0),
    ("bad", -2.5),
    ("boring", -1.3),
    ("corrupt", -3.0),
    ("crap", -1.6),
    ("crazy", -1.4),
    ("disgusting", -2.4),
    ("dumb", -2.3),
    ("evil", -3.4),
    ("fail", -2.5),
    ("fake", -2.1),
    ("fraud", -2.8),
    ("garbage", -2.1),
    ("hate", -2.7),
    ("horrible", -2.5),
    ("idiot", -2.3),
    ("liar", -2.7),
    ("lie", -1.6),
    ("lies", -1.8),
    ("loser", -2.4),
    ("pathetic", -2.5),
    ("poor", -2.1),
    ("sad", -2.1),
    ("scam", -2.5),
    ("shame", -2.1),
    ("stupid", -2.4),
    ("terrible", -2.5),
    ("trash", -1.8),
    ("ugly", -2.3),
    ("useless", -1.8),
    ("worst", -3.1),
    ("wrong", -2.1),
];

/// Tokenized forms: "don't" becomes "don".
const NEGATIONS: &[&str] = &[
    "not", "no", "never", "nothing", "nobody", "dont", "don", "doesn", "didn", "isn", "wasn",
    "aren", "cant",
];

/// VADER-style normalization constant for the compound score.
const COMPOUND_ALPHA: f64 = 15.0;
const NEGATION_FACTOR: f64 = -0.74;

static STOP_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
static VALENCE_MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET
        .get_or_init(|| STOP_WORDS.iter().copied().collect())
        .contains(word)
}

fn valence(word: &str) -> Option<f64> {
    VALENCE_MAP
        .get_or_init(|| VALENCE.iter().copied().collect())
        .get(word)
        .copied()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// Normalized sum of valences in [-1, 1]
    pub compound: f64,
    pub positive: f64,
    pub negative: f64,
    pub neutral: f64,
}

/// Lexicon polarity of one text. Texts without tokens are fully neutral.
pub fn sentiment(text: &str) -> Sentiment {
    let tokens = super::similarity::tokenize(text);
    if tokens.is_empty() {
        return Sentiment {
            neutral: 1.0,
            ..Sentiment::default()
        };
    }
    let mut sum = 0.0;
    let (mut pos, mut neg, mut neu) = (0.0, 0.0, 0.0);
    for (i, tok) in tokens.iter().enumerate() {
        match valence(tok) {
            Some(mut v) => {
                let negated = tokens[i.saturating_sub(3)..i]
                    .iter()
                    .any(|t| NEGATIONS.contains(&t.as_str()));
                if negated {
                    v *= NEGATION_FACTOR;
                }
                sum += v;
                if v > 0.0 {
                    pos += v + 1.0;
                } else {
                    neg += -v + 1.0;
                }
            }
            None => neu += 1.0,
        }
    }
    let total = pos + neg + neu;
    Sentiment {
        compound: sum / (sum * sum + COMPOUND_ALPHA).sqrt(),
        positive: pos / total,
        negative: neg / total,
        neutral: neu / total,
    }
}
