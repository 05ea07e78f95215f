use super::{AuthorId, Comment};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

/// Immutable, time-ordered comment collection indexed by author and comment id.
///
/// Comments are ordered by `(published_at, id)` so every downstream pass sees the
/// same sequence regardless of input order.
#[derive(Debug, Clone, Default)]
pub struct CommentCorpus {
    comments: Vec<Comment>,
    by_author: BTreeMap<AuthorId, Vec<usize>>,
    by_id: HashMap<String, usize>,
}

impl CommentCorpus {
    /// Build the corpus, dropping records without identifiers and repeated comment ids.
    pub fn new(comments: Vec<Comment>) -> Self {
        let total = comments.len();
        let mut seen = HashSet::new();
        let mut kept: Vec<Comment> = comments
            .into_iter()
            .filter(|c| c.is_well_formed())
            .filter(|c| seen.insert(c.id.clone()))
            .collect();
        if kept.len() < total {
            warn!(
                dropped = total - kept.len(),
                kept = kept.len(),
                "dropped malformed or duplicate comment records"
            );
        }
        kept.sort_by(|a, b| {
            a.published_at
                .cmp(&b.published_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut by_author: BTreeMap<AuthorId, Vec<usize>> = BTreeMap::new();
        let mut by_id = HashMap::with_capacity(kept.len());
        for (idx, c) in kept.iter().enumerate() {
            by_author.entry(c.author_id.clone()).or_default().push(idx);
            by_id.insert(c.id.clone(), idx);
        }
        debug!(comments = kept.len(), authors = by_author.len(), "corpus built");

        Self {
            comments: kept,
            by_author,
            by_id,
        }
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn author_count(&self) -> usize {
        self.by_author.len()
    }

    /// Author ids in ascending order.
    pub fn authors(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_author.keys().map(String::as_str)
    }

    /// Each author with its comments in time order.
    pub fn by_author(&self) -> impl Iterator<Item = (&str, Vec<&Comment>)> + '_ {
        self.by_author.iter().map(move |(author, idxs)| {
            (
                author.as_str(),
                idxs.iter().map(|&i| &self.comments[i]).collect(),
            )
        })
    }

    /// Positions in [`comments`](Self::comments) of an author's comments, in time order.
    pub fn author_indices(&self, author_id: &str) -> &[usize] {
        self.by_author
            .get(author_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn author_comments(&self, author_id: &str) -> impl Iterator<Item = &Comment> + '_ {
        self.author_indices(author_id)
            .iter()
            .map(move |&i| &self.comments[i])
    }

    pub fn get(&self, comment_id: &str) -> Option<&Comment> {
        self.by_id.get(comment_id).map(|&i| &self.comments[i])
    }
}
