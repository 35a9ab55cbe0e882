// Rule-based lexical language model — the default for the CLI.
//
// Zero downloads, runs locally, deterministic. It does what a statistical
// pipeline would do, but with rules:
//
//   1. Tokenize into words, punctuation, and symbols (keeping byte offsets)
//   2. Mark stop words using the `stop-words` English list
//   3. Find named entities with anno's stacked pattern + heuristic NER
//   4. Tag parts of speech: words inside a name are proper nouns, the rest
//      come from a closed-class lexicon plus suffix and capitalization rules
//   5. Add bare numbers the NER left alone as quantity entities
//   6. Build a hashed term-frequency vector over content words
//
// The tagging is approximate. It only has to be good enough that nouns,
// proper nouns, and adjectives surface as keywords and names surface as
// entities.

use std::collections::HashSet;

use anno::{Entity, EntityType, Language, Model, StackedNER};
use anyhow::{Context, Result};
use regex_lite::Regex;
use stop_words::{get, LANGUAGE};
use tracing::debug;
use xxhash_rust::xxh64::xxh64;

use super::traits::LanguageModel;
use crate::document::{AnnotatedDocument, EntityLabel, EntitySpan, PartOfSpeech, Token};

/// Number of hash buckets in the term-frequency vector.
pub const VECTOR_DIM: usize = 1024;

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "this", "that", "these", "those", "each", "every", "some", "any", "no",
    "another", "either", "neither", "all", "both",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "he", "him", "his",
    "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us", "our", "ours",
    "ourselves", "they", "them", "their", "theirs", "themselves", "who", "whom", "whose", "which",
    "what", "someone", "something", "anyone", "anything", "everyone", "everything", "nobody",
    "nothing",
];

const ADPOSITIONS: &[&str] = &[
    "in", "on", "at", "by", "for", "with", "about", "against", "between", "into", "through",
    "during", "before", "after", "above", "below", "to", "from", "up", "down", "of", "off", "over",
    "under", "across", "along", "among", "around", "behind", "beyond", "near", "toward",
    "towards", "upon", "within", "without", "via", "per",
];

const CONJUNCTIONS: &[&str] = &["and", "or", "but", "nor", "yet", "so"];

const SUBORDINATORS: &[&str] = &[
    "if", "because", "although", "though", "while", "whereas", "unless", "since", "until",
    "whether", "than", "once", "when", "where", "as",
];

const AUXILIARIES: &[&str] = &[
    "is", "am", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having", "do",
    "does", "did", "will", "would", "shall", "should", "can", "could", "may", "might", "must",
];

const PARTICLES: &[&str] = &["not", "n't", "'s"];

const INTERJECTIONS: &[&str] = &["oh", "ah", "hey", "wow", "yes", "ok", "okay", "hello"];

const ADVERBS: &[&str] = &[
    "very", "too", "also", "just", "only", "even", "still", "already", "often", "never",
    "always", "sometimes", "here", "there", "now", "then", "again", "soon", "quite", "rather",
    "almost", "perhaps", "however", "therefore", "thus",
];

const ADJECTIVES: &[&str] = &[
    "good", "great", "bad", "new", "old", "big", "small", "high", "low", "large", "long", "short",
    "young", "early", "late", "best", "better", "worse", "worst", "major", "minor", "main",
    "different", "same", "similar", "important", "public", "private", "free", "full", "hard",
    "easy", "clear", "strong", "weak", "real", "true", "false", "whole", "fast", "slow", "hot",
    "cold", "red", "blue", "green", "black", "white", "open", "simple", "certain", "likely",
    "possible", "recent", "current", "final", "local", "national", "global",
];

/// Symbols that aren't punctuation (spaCy-style: `$` is SYM, not PUNCT).
const SYMBOL_CHARS: &str = "$%&+<=>^`|~#@*";

/// Lexical token kind before tagging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Punct,
    Symbol,
}

/// A token with its byte range in the source text.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    kind: Kind,
}

/// A recognized entity located by byte range in the source text.
#[derive(Debug, Clone, PartialEq)]
struct Mention {
    start: usize,
    end: usize,
    span: EntitySpan,
}

/// Rule-based model: anno for named entities, regex-lite for number and
/// suffix patterns, a stop-word set, and closed-class word lists.
pub struct LexicalModel {
    ner: StackedNER,
    stop_words: HashSet<String>,
    number: Regex,
    adjective_suffix: Regex,
    verb_suffix: Regex,
}

impl LexicalModel {
    pub fn new() -> Result<Self> {
        let stop_words: HashSet<String> = get(LANGUAGE::English)
            .into_iter()
            .map(|w| w.to_string())
            .collect();

        let number = Regex::new(r"^[0-9]+(?:[.,][0-9]+)*(?:st|nd|rd|th|s)?$")
            .context("Failed to compile number pattern")?;
        let adjective_suffix =
            Regex::new(r"(?:able|ible|ful|ical|ic|ive|less|ous|ish|ary|ant|ent|al)$")
                .context("Failed to compile adjective suffix pattern")?;
        let verb_suffix =
            Regex::new(r"(?:ing|ed|ize|ise|ify)$").context("Failed to compile verb suffix pattern")?;

        debug!(stop_words = stop_words.len(), "Loaded lexical model");

        Ok(Self {
            ner: StackedNER::default(),
            stop_words,
            number,
            adjective_suffix,
            verb_suffix,
        })
    }

    /// Whether a word is on the stop-word list (case-insensitive).
    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(&word.to_lowercase())
    }

    /// Named entities from the NER backend, with byte offsets.
    fn named_entities(&self, text: &str) -> Result<Vec<Mention>> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let found = self
            .ner
            .extract_entities(text, Some(Language::English))
            .map_err(|e| anyhow::anyhow!("Named-entity recognition failed: {}", e))?;

        let offsets = char_byte_offsets(text);
        let mentions = found
            .iter()
            .filter_map(|entity| mention_from(text, &offsets, entity))
            .collect();
        Ok(mentions)
    }

    /// Tag each span, returning tokens in source order.
    fn tag(&self, text: &str, spans: &[Span], mentions: &[Mention]) -> Vec<Token> {
        // Words that appear capitalized somewhere other than a sentence start
        // are treated as names wherever they appear capitalized.
        let starts = sentence_starts(text, spans);
        let known_names: HashSet<&str> = spans
            .iter()
            .zip(&starts)
            .filter(|(s, initial)| s.kind == Kind::Word && !**initial)
            .map(|(s, _)| &text[s.start..s.end])
            .filter(|w| is_capitalized(w))
            .collect();

        let mut tokens = Vec::with_capacity(spans.len());
        for (i, span) in spans.iter().enumerate() {
            let word = &text[span.start..span.end];
            let token = match span.kind {
                Kind::Punct => Token::new(word, PartOfSpeech::Punct, false, true),
                Kind::Symbol => Token::new(word, PartOfSpeech::Sym, false, false),
                Kind::Word => {
                    let next_is_name = spans
                        .get(i + 1)
                        .filter(|n| n.kind == Kind::Word)
                        .map(|n| &text[n.start..n.end])
                        .is_some_and(|w| is_capitalized(w) && !self.is_stop_word(w));
                    let in_name = mentions.iter().any(|m| {
                        m.span.label == EntityLabel::Name
                            && m.start <= span.start
                            && span.end <= m.end
                    });
                    let pos = if in_name && !self.number.is_match(word) {
                        PartOfSpeech::Propn
                    } else {
                        self.tag_word(
                            word,
                            starts[i],
                            next_is_name || known_names.contains(word),
                            tokens.last(),
                        )
                    };
                    Token::new(word, pos, self.is_stop_word(word), false)
                }
            };
            tokens.push(token);
        }
        tokens
    }

    fn tag_word(
        &self,
        word: &str,
        sentence_initial: bool,
        looks_like_name: bool,
        previous: Option<&Token>,
    ) -> PartOfSpeech {
        if self.number.is_match(word) {
            return PartOfSpeech::Num;
        }

        // Acronyms are names wherever they appear
        if word.len() > 1 && word.chars().all(|c| c.is_uppercase() || c.is_ascii_digit()) {
            return PartOfSpeech::Propn;
        }

        let lower = word.to_lowercase();
        if let Some(pos) = closed_class(&lower) {
            return pos;
        }

        if is_capitalized(word) && (!sentence_initial || looks_like_name) {
            return PartOfSpeech::Propn;
        }

        if ADVERBS.contains(&lower.as_str()) || (lower.len() > 4 && lower.ends_with("ly")) {
            return PartOfSpeech::Adv;
        }
        if ADJECTIVES.contains(&lower.as_str()) {
            return PartOfSpeech::Adj;
        }

        let after_verb_trigger = previous.is_some_and(|p| {
            matches!(p.pos, PartOfSpeech::Pron | PartOfSpeech::Aux)
                || p.text.eq_ignore_ascii_case("to")
        });
        if after_verb_trigger || (lower.len() > 4 && self.verb_suffix.is_match(&lower)) {
            return PartOfSpeech::Verb;
        }
        if lower.len() > 4 && self.adjective_suffix.is_match(&lower) {
            return PartOfSpeech::Adj;
        }

        PartOfSpeech::Noun
    }

    /// Runs of number tokens that no named entity already covers become
    /// QUANTITY spans. The NER only knows formatted dates and amounts, so
    /// bare counts and years would otherwise be lost.
    fn quantity_entities(
        &self,
        text: &str,
        spans: &[Span],
        tokens: &[Token],
        mentions: &[Mention],
    ) -> Vec<Mention> {
        let covered = |span: &Span| {
            mentions
                .iter()
                .any(|m| span.start < m.end && m.start < span.end)
        };

        let mut quantities = Vec::new();
        let mut run: Option<(usize, usize)> = None;
        for (span, token) in spans.iter().zip(tokens) {
            let is_number = token.pos == PartOfSpeech::Num && !covered(span);
            run = match (run, is_number) {
                (Some((start, _)), true) => Some((start, span.end)),
                (None, true) => Some((span.start, span.end)),
                (Some((start, end)), false) => {
                    quantities.push(quantity(text, start, end));
                    None
                }
                (None, false) => None,
            };
        }
        if let Some((start, end)) = run {
            quantities.push(quantity(text, start, end));
        }

        quantities
    }

    /// Hashed, log-scaled term frequency over content words. `None` when the
    /// text has no content words at all.
    fn vectorize(&self, tokens: &[Token]) -> Option<Vec<f64>> {
        let mut counts = vec![0u32; VECTOR_DIM];
        let mut any = false;

        for token in tokens.iter().filter(|t| !t.is_stop && !t.is_punct) {
            if token.pos == PartOfSpeech::Sym {
                continue;
            }
            let hash = xxh64(token.text.to_lowercase().as_bytes(), 0);
            let bucket = (hash % VECTOR_DIM as u64) as usize;
            counts[bucket] += 1;
            any = true;
        }

        any.then(|| {
            counts
                .into_iter()
                .map(|c| if c == 0 { 0.0 } else { 1.0 + (c as f64).ln() })
                .collect()
        })
    }
}

impl LanguageModel for LexicalModel {
    fn name(&self) -> &str {
        "lexical"
    }

    fn annotate(&self, text: &str) -> Result<AnnotatedDocument> {
        let spans = tokenize(text);
        let mut mentions = self.named_entities(text)?;
        let tokens = self.tag(text, &spans, &mentions);

        let quantities = self.quantity_entities(text, &spans, &tokens, &mentions);
        mentions.extend(quantities);
        mentions.sort_by_key(|m| m.start);
        let entities: Vec<EntitySpan> = mentions.into_iter().map(|m| m.span).collect();

        let vector = self.vectorize(&tokens);

        debug!(
            tokens = tokens.len(),
            entities = entities.len(),
            has_vector = vector.is_some(),
            "Annotated text"
        );

        Ok(AnnotatedDocument::new(tokens, entities, vector))
    }
}

/// Split text into word, punctuation, and symbol spans.
///
/// A word is a run of alphanumerics, allowing single internal apostrophes,
/// hyphens, and periods between alphanumerics ("don't", "state-of-the-art",
/// "U.S"). Every other non-space character is its own token.
fn tokenize(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if !c.is_alphanumeric() {
            let kind = if SYMBOL_CHARS.contains(c) {
                Kind::Symbol
            } else {
                Kind::Punct
            };
            spans.push(Span {
                start,
                end: start + c.len_utf8(),
                kind,
            });
            continue;
        }

        let mut end = start + c.len_utf8();
        while let Some(&(i, next)) = chars.peek() {
            if next.is_alphanumeric() {
                end = i + next.len_utf8();
                chars.next();
                continue;
            }
            // Joiner: only if an alphanumeric follows it directly
            let joins = matches!(next, '\'' | '\u{2019}' | '-' | '.')
                && text[i + next.len_utf8()..]
                    .chars()
                    .next()
                    .is_some_and(char::is_alphanumeric);
            if !joins {
                break;
            }
            chars.next();
            end = i + next.len_utf8();
        }

        spans.push(Span {
            start,
            end,
            kind: Kind::Word,
        });
    }

    spans
}

/// For each span, whether it begins a sentence.
fn sentence_starts(text: &str, spans: &[Span]) -> Vec<bool> {
    let mut starts = Vec::with_capacity(spans.len());
    let mut at_start = true;
    for span in spans {
        starts.push(at_start && span.kind == Kind::Word);
        match span.kind {
            Kind::Word => at_start = false,
            Kind::Punct => {
                if matches!(&text[span.start..span.end], "." | "!" | "?") {
                    at_start = true;
                }
            }
            Kind::Symbol => {}
        }
    }
    starts
}

fn closed_class(lower: &str) -> Option<PartOfSpeech> {
    let lists: [(&[&str], PartOfSpeech); 9] = [
        (DETERMINERS, PartOfSpeech::Det),
        (PRONOUNS, PartOfSpeech::Pron),
        (AUXILIARIES, PartOfSpeech::Aux),
        (CONJUNCTIONS, PartOfSpeech::Cconj),
        (SUBORDINATORS, PartOfSpeech::Sconj),
        (ADPOSITIONS, PartOfSpeech::Adp),
        (PARTICLES, PartOfSpeech::Part),
        (INTERJECTIONS, PartOfSpeech::Intj),
        (&["etc"], PartOfSpeech::X),
    ];
    lists
        .iter()
        .find(|(words, _)| words.contains(&lower))
        .map(|(_, pos)| *pos)
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn quantity(text: &str, start: usize, end: usize) -> Mention {
    Mention {
        start,
        end,
        span: EntitySpan::new(&text[start..end], EntityLabel::Quantity),
    }
}

/// Byte offset of every char boundary, including the end of the text.
/// anno reports entity offsets in chars.
fn char_byte_offsets(text: &str) -> Vec<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect()
}

fn mention_from(text: &str, offsets: &[usize], entity: &Entity) -> Option<Mention> {
    let start = *offsets.get(entity.start())?;
    let end = *offsets.get(entity.end())?;
    if start >= end {
        return None;
    }

    let raw = &text[start..end];
    let surface = raw.trim();
    if surface.is_empty() {
        return None;
    }
    let start = start + (raw.len() - raw.trim_start().len());
    let end = start + surface.len();

    Some(Mention {
        start,
        end,
        span: EntitySpan::new(surface, label_for(&entity.entity_type, surface)),
    })
}

/// People, organizations, and places are names. Anything else with a digit
/// in it is a quantity (dates, money, percentages).
fn label_for(entity_type: &EntityType, surface: &str) -> EntityLabel {
    match entity_type {
        EntityType::Person | EntityType::Organization | EntityType::Location => EntityLabel::Name,
        _ if surface.chars().any(|c| c.is_ascii_digit()) => EntityLabel::Quantity,
        _ => EntityLabel::Other,
    }
}
