use nr_core::Article;
use tracing::{debug, info};

use crate::config::DEFAULT_MATCH_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleMatch {
    pub index: usize,
    pub title: String,
    pub ratio: u8,
}

/// Resolves free-text title queries against a corpus by edit similarity.
#[derive(Debug, Clone, Copy)]
pub struct TitleResolver {
    threshold: u8,
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MATCH_THRESHOLD)
    }
}

impl TitleResolver {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Find the article whose title best matches `query`, or `None` when the
    /// best ratio falls below the threshold. Ties go to the earliest article.
    pub fn resolve(&self, query: &str, corpus: &[Article]) -> Option<TitleMatch> {
        let query = query.trim().to_lowercase();

        let mut best: Option<(usize, u8)> = None;
        for (index, article) in corpus.iter().enumerate() {
            let ratio = ratio(&query, &article.title.trim().to_lowercase());
            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((index, ratio));
            }
        }

        let (best_index, best_ratio) = match best {
            Some(found) if found.1 >= self.threshold => found,
            Some((_, ratio)) => {
                info!("No match for title '{}' (best ratio {} < {})", query, ratio, self.threshold);
                return None;
            }
            None => {
                info!("No match for title '{}': corpus is empty", query);
                return None;
            }
        };

        let best_title = corpus[best_index].title.to_lowercase();
        let index = corpus
            .iter()
            .position(|article| article.title.to_lowercase() == best_title)
            .unwrap_or(best_index);

        debug!("Best match for '{}': {} (ratio {})", query, corpus[index].title, best_ratio);

        Some(TitleMatch {
            index,
            title: corpus[index].title.clone(),
            ratio: best_ratio,
        })
    }
}

/// Indel similarity of two strings on a 0-100 scale:
/// `100 * (1 - indel_distance / (len_a + len_b))`, where only insertions and
/// deletions count, so `indel_distance = len_a + len_b - 2 * lcs`.
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 100;
    }

    let matched = 2 * longest_common_subsequence(&a, &b);
    (100.0 * matched as f64 / total as f64).round().clamp(0.0, 100.0) as u8
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                row[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use nr_core::RawArticle;

    fn corpus(titles: &[&str]) -> Vec<Article> {
        titles
            .iter()
            .enumerate()
            .map(|(id, title)| {
                let raw = RawArticle {
                    title: title.to_string(),
                    link: format!("http://news.test/{}", id),
                    summary: "summary".to_string(),
                    category: "World".to_string(),
                    image: None,
                    published: None,
                };
                Article::from_raw(id, raw, "summary".to_string())
            })
            .collect()
    }

    #[test]
    fn test_ratio_bounds() {
        assert_eq!(ratio("election results", "election results"), 100);
        assert_eq!(ratio("abc", "xyz"), 0);
        assert_eq!(ratio("", ""), 100);
        assert_eq!(ratio("", "abc"), 0);
    }

    #[test]
    fn test_ratio_counts_insertions_and_deletions() {
        // One deleted character out of 7 + 6.
        assert_eq!(ratio("kitten", "kittens"), 92);
        // lcs("kitten", "sitting") = 4 ("ittn").
        assert_eq!(ratio("kitten", "sitting"), 62);
    }

    #[test]
    fn test_shortened_headline_resolves() {
        let corpus = corpus(&[
            "Storm hits coast",
            "Israeli air strike kills top Hamas official in Gaza",
        ]);
        let query = "israeli air strike kills hamas official";
        assert_eq!(ratio(query, &corpus[1].title.to_lowercase()), 87);

        let found = TitleResolver::default().resolve(query, &corpus).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.ratio, 87);
    }

    #[test]
    fn test_exact_match_ignores_case_and_whitespace() {
        let corpus = corpus(&["Storm hits coast", "Markets rally on jobs data"]);
        let found = TitleResolver::default()
            .resolve("  MARKETS RALLY ON JOBS DATA ", &corpus)
            .unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.ratio, 100);
    }

    #[test]
    fn test_close_match_resolves() {
        let corpus = corpus(&["Storm hits coast", "Markets rally on jobs data"]);
        let found = TitleResolver::default()
            .resolve("markets rally on job data", &corpus)
            .unwrap();
        assert_eq!(found.index, 1);
        assert!(found.ratio >= 80 && found.ratio < 100);
    }

    #[test]
    fn test_no_shared_characters_is_not_found() {
        let corpus = corpus(&["abc", "cab"]);
        assert!(TitleResolver::default().resolve("zzz-xyz", &corpus).is_none());
        assert!(TitleResolver::default().resolve("anything", &[]).is_none());
    }

    #[test]
    fn test_threshold_is_configurable() {
        let corpus = corpus(&["Storm hits coast"]);
        assert!(TitleResolver::new(80).resolve("storm hit", &corpus).is_none());
        assert!(TitleResolver::new(50).resolve("storm hit", &corpus).is_some());
    }

    #[test]
    fn test_ties_resolve_to_first_occurrence() {
        let corpus = corpus(&["Other news", "Budget vote", "BUDGET VOTE"]);
        let found = TitleResolver::default().resolve("budget vote", &corpus).unwrap();
        assert_eq!(found.index, 1);
        assert_eq!(found.title, "Budget vote");
    }
}
