//! Bag-of-n-grams intent classifier.
//!
//! A tf-idf vectorizer over unigrams and bigrams plus a multinomial naive
//! Bayes model (linear in log space), trained once at startup from the
//! normalized pattern corpus. Training is skipped — never an error — when
//! the corpus cannot separate classes: fewer than 2 distinct tags or fewer
//! than 5 patterns. Callers treat an absent model exactly like a
//! low-confidence prediction and move to the next resolution stage.

use std::collections::{HashMap, HashSet};

use crate::kb::PatternEntry;

/// Vocabulary cap for the vectorizer.
pub const VOCABULARY_CAP: usize = 5000;

/// Minimum distinct tags required to train.
pub const MIN_TAGS: usize = 2;

/// Minimum total patterns required to train.
pub const MIN_PATTERNS: usize = 5;

/// Laplace smoothing mass per vocabulary slot.
const SMOOTHING: f64 = 0.1;

/// One classifier inference: the top tag and its posterior probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub tag: String,
    /// Maximum posterior across all trained classes, in `[0, 1]`.
    pub confidence: f64,
}

/// A fitted vectorizer plus fitted multinomial model.
#[derive(Debug, Clone)]
pub struct IntentModel {
    vocab: HashMap<String, usize>,
    idf: Vec<f64>,
    tags: Vec<String>,
    /// log P(term | tag), row-major `[tags.len() * vocab.len()]`.
    log_likelihood: Vec<f64>,
    /// log P(tag).
    log_prior: Vec<f64>,
}

/// Unigrams plus adjacent bigrams of a normalized string.
fn ngrams(text: &str) -> Vec<String> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut grams: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
    for pair in tokens.windows(2) {
        grams.push(format!("{} {}", pair[0], pair[1]));
    }
    grams
}

/// Sparse tf-idf vector of `text`, sorted by vocabulary slot.
fn vectorize(text: &str, vocab: &HashMap<String, usize>, idf: &[f64]) -> Vec<(usize, f64)> {
    let mut tf: HashMap<usize, f64> = HashMap::new();
    for gram in ngrams(text) {
        if let Some(&slot) = vocab.get(&gram) {
            *tf.entry(slot).or_insert(0.0) += 1.0;
        }
    }

    let mut weights: Vec<(usize, f64)> = tf
        .into_iter()
        .map(|(slot, count)| (slot, count * idf[slot]))
        .collect();
    // HashMap iteration order is arbitrary; sort for determinism.
    weights.sort_unstable_by_key(|&(slot, _)| slot);
    weights
}

impl IntentModel {
    /// Train from the normalized corpus.
    ///
    /// Returns `None` below the data floor (`MIN_TAGS` distinct tags and
    /// `MIN_PATTERNS` examples). Ties in document frequency and in the
    /// final posterior are broken by first appearance, so training and
    /// inference are fully deterministic.
    pub fn train(corpus: &[PatternEntry]) -> Option<Self> {
        let distinct: HashSet<&str> = corpus.iter().map(|e| e.tag.as_str()).collect();
        if distinct.len() < MIN_TAGS || corpus.len() < MIN_PATTERNS {
            tracing::info!(
                tags = distinct.len(),
                patterns = corpus.len(),
                "classifier disabled: corpus below training floor"
            );
            return None;
        }

        // Document frequency per n-gram, in first-seen order.
        let mut df: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for entry in corpus {
            let mut seen = HashSet::new();
            for gram in ngrams(&entry.normalized) {
                if !seen.insert(gram.clone()) {
                    continue;
                }
                match index.get(&gram) {
                    Some(&i) => df[i].1 += 1,
                    None => {
                        index.insert(gram.clone(), df.len());
                        df.push((gram, 1));
                    }
                }
            }
        }

        // Cap the vocabulary at the highest document frequencies, ties in
        // first-seen order.
        let mut order: Vec<usize> = (0..df.len()).collect();
        order.sort_by(|&a, &b| df[b].1.cmp(&df[a].1).then(a.cmp(&b)));
        order.truncate(VOCABULARY_CAP);

        let n_docs = corpus.len() as f64;
        let mut vocab = HashMap::with_capacity(order.len());
        let mut idf = Vec::with_capacity(order.len());
        for (slot, &i) in order.iter().enumerate() {
            let (gram, count) = &df[i];
            vocab.insert(gram.clone(), slot);
            // Smoothed idf, the sklearn formulation.
            idf.push(((1.0 + n_docs) / (1.0 + *count as f64)).ln() + 1.0);
        }

        // Tags in first-seen order.
        let mut tags: Vec<String> = Vec::new();
        let mut tag_index: HashMap<&str, usize> = HashMap::new();
        for entry in corpus {
            if !tag_index.contains_key(entry.tag.as_str()) {
                tag_index.insert(entry.tag.as_str(), tags.len());
                tags.push(entry.tag.clone());
            }
        }

        // Accumulate per-tag tf-idf mass.
        let vocab_size = vocab.len();
        let mut term_mass = vec![0.0f64; tags.len() * vocab_size];
        let mut tag_docs = vec![0usize; tags.len()];
        for entry in corpus {
            let t = tag_index[entry.tag.as_str()];
            tag_docs[t] += 1;
            for (slot, weight) in vectorize(&entry.normalized, &vocab, &idf) {
                term_mass[t * vocab_size + slot] += weight;
            }
        }

        let log_prior: Vec<f64> = tag_docs
            .iter()
            .map(|&docs| (docs as f64 / n_docs).ln())
            .collect();

        let mut log_likelihood = vec![0.0f64; tags.len() * vocab_size];
        for t in 0..tags.len() {
            let row = &term_mass[t * vocab_size..(t + 1) * vocab_size];
            let total: f64 = row.iter().sum::<f64>() + SMOOTHING * vocab_size as f64;
            for (slot, &mass) in row.iter().enumerate() {
                log_likelihood[t * vocab_size + slot] = ((mass + SMOOTHING) / total).ln();
            }
        }

        tracing::info!(
            tags = tags.len(),
            vocabulary = vocab_size,
            patterns = corpus.len(),
            "intent classifier trained"
        );

        Some(Self {
            vocab,
            idf,
            tags,
            log_likelihood,
            log_prior,
        })
    }

    /// Predict the tag of an already-normalized input.
    ///
    /// Confidence is the maximum posterior probability, obtained by
    /// normalizing the per-class log joints with log-sum-exp. Input with no
    /// known n-grams degenerates to the class priors, which keeps such
    /// predictions below any sensible acceptance threshold.
    pub fn predict(&self, normalized: &str) -> Prediction {
        let weights = vectorize(normalized, &self.vocab, &self.idf);
        let vocab_size = self.vocab.len();

        let scores: Vec<f64> = (0..self.tags.len())
            .map(|t| {
                let mut score = self.log_prior[t];
                for &(slot, weight) in &weights {
                    score += weight * self.log_likelihood[t * vocab_size + slot];
                }
                score
            })
            .collect();

        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let denom: f64 = scores.iter().map(|s| (s - max).exp()).sum();

        let mut best = 0;
        let mut best_posterior = f64::NEG_INFINITY;
        for (t, score) in scores.iter().enumerate() {
            let posterior = (score - max).exp() / denom;
            // Strict comparison keeps the first-seen tag on exact ties.
            if posterior > best_posterior {
                best = t;
                best_posterior = posterior;
            }
        }

        Prediction {
            tag: self.tags[best].clone(),
            confidence: best_posterior,
        }
    }

    /// Tags the model was trained on, in first-seen order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, &str)]) -> Vec<PatternEntry> {
        pairs
            .iter()
            .map(|(text, tag)| PatternEntry {
                raw: (*text).to_string(),
                normalized: crate::normalize::normalize(text),
                tag: (*tag).to_string(),
            })
            .collect()
    }

    fn trained() -> IntentModel {
        IntentModel::train(&entries(&[
            ("vpn baglanamiyorum", "vpn_sorun"),
            ("vpn surekli kopuyor", "vpn_sorun"),
            ("vpn hata veriyor", "vpn_sorun"),
            ("yazici calismiyor", "yazici_sorun"),
            ("yazicidan cikti alamiyorum", "yazici_sorun"),
            ("yazici kagit sikistirdi", "yazici_sorun"),
        ]))
        .expect("corpus is above the training floor")
    }

    #[test]
    fn absent_below_pattern_floor() {
        let corpus = entries(&[
            ("vpn koptu", "vpn"),
            ("vpn gitti", "vpn"),
            ("yazici bozuk", "yazici"),
            ("yazici durdu", "yazici"),
        ]);
        assert!(IntentModel::train(&corpus).is_none());
    }

    #[test]
    fn absent_with_single_tag() {
        let corpus = entries(&[
            ("vpn koptu", "vpn"),
            ("vpn gitti", "vpn"),
            ("vpn durdu", "vpn"),
            ("vpn yok", "vpn"),
            ("vpn hata", "vpn"),
        ]);
        assert!(IntentModel::train(&corpus).is_none());
    }

    #[test]
    fn absent_on_empty_corpus() {
        assert!(IntentModel::train(&[]).is_none());
    }

    #[test]
    fn predicts_training_phrases_confidently() {
        let model = trained();
        let p = model.predict("vpn surekli kopuyor");
        assert_eq!(p.tag, "vpn_sorun");
        assert!(p.confidence > 0.6, "confidence was {}", p.confidence);

        let p = model.predict("yazicidan cikti alamiyorum");
        assert_eq!(p.tag, "yazici_sorun");
        assert!(p.confidence > 0.6, "confidence was {}", p.confidence);
    }

    #[test]
    fn confidence_stays_in_unit_interval() {
        let model = trained();
        for text in ["vpn", "yazici", "tamamen alakasiz bir cumle", ""] {
            let p = model.predict(text);
            assert!((0.0..=1.0).contains(&p.confidence), "{}", p.confidence);
        }
    }

    #[test]
    fn unknown_vocabulary_degenerates_to_priors() {
        let model = trained();
        let p = model.predict("tamamen alakasiz kelimeler burada");
        // Equal priors: the posterior must sit at ~0.5, far below the gate.
        assert!(p.confidence < 0.6, "confidence was {}", p.confidence);
    }

    #[test]
    fn deterministic_across_trainings() {
        let a = trained().predict("vpn hata veriyor");
        let b = trained().predict("vpn hata veriyor");
        assert_eq!(a.tag, b.tag);
        assert!((a.confidence - b.confidence).abs() < 1e-12);
    }

    #[test]
    fn tags_keep_first_seen_order() {
        let model = trained();
        assert_eq!(model.tags(), ["vpn_sorun", "yazici_sorun"]);
    }
}
