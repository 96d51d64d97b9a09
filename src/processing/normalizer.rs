//! Reduction of raw course text to a canonical stream of content lemmas.
//!
//! The normalizer keeps nouns, verbs and adjectives and drops stopwords,
//! punctuation and every other word class. Linguistic analysis is delegated
//! to a [`Tokenizer`]; match quality for a language depends entirely on how
//! well the tokenizer supports it; no per-language branching happens here.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

/// Coarse word class assigned by a [`Tokenizer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordClass {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Numeral,
    Punctuation,
    /// Function words: determiners, pronouns, conjunctions and the like.
    Other,
}

impl WordClass {
    /// Whether tokens of this class carry content worth embedding.
    pub fn is_content(self) -> bool {
        matches!(self, WordClass::Noun | WordClass::Verb | WordClass::Adjective)
    }
}

/// A single linguistic token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub text: String,
    pub lower: String,
    pub lemma: String,
    pub class: WordClass,
    pub is_stop: bool,
    pub is_punct: bool,
}

/// Splits text into tokens annotated with lemma, lowercase form and class.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Canonicalizes text before it is embedded.
pub struct TextNormalizer {
    tokenizer: Box<dyn Tokenizer>,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(RuleTokenizer)
    }
}

impl TextNormalizer {
    pub fn new<T>(tokenizer: T) -> Self
    where
        T: Tokenizer + 'static,
    {
        Self {
            tokenizer: Box::new(tokenizer),
        }
    }

    /// Return the space-joined lemmas of the content tokens of `text`, in
    /// order of appearance. Empty input yields an empty string.
    pub fn normalize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return String::new();
        }

        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|token| !token.is_stop && !token.is_punct && token.class.is_content())
            .map(|token| token.lemma)
            .filter(|lemma| !lemma.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{M}]+(?:['’][\p{L}\p{M}]+)*|\p{N}+(?:[.,]\p{N}+)*|[^\s\p{L}\p{M}\p{N}]")
        .expect("token pattern is valid")
});

static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
        "anywhere", "are", "around", "as", "at", "be", "became", "because", "become", "becomes",
        "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
        "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did",
        "do", "does", "doing", "done", "down", "due", "during", "each", "either", "else",
        "elsewhere", "enough", "etc", "even", "ever", "every", "everyone", "everything",
        "everywhere", "except", "few", "first", "for", "former", "formerly", "from", "further",
        "get", "give", "go", "had", "has", "have", "he", "hence", "her", "here", "hereby",
        "herein", "hers", "herself", "him", "himself", "his", "how", "however", "i", "if", "in",
        "indeed", "into", "is", "it", "its", "itself", "just", "keep", "last", "latter", "least",
        "less", "made", "make", "many", "may", "me", "meanwhile", "might", "mine", "more",
        "moreover", "most", "mostly", "much", "must", "my", "myself", "namely", "neither",
        "never", "nevertheless", "next", "no", "nobody", "none", "nor", "not", "nothing", "now",
        "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto", "or", "other",
        "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own", "part", "per",
        "perhaps", "please", "put", "quite", "rather", "really", "same", "say", "see", "seem",
        "seemed", "seeming", "seems", "several", "she", "should", "show", "since", "so", "some",
        "somehow", "someone", "something", "sometime", "sometimes", "somewhere", "still",
        "such", "take", "than", "that", "the", "their", "them", "themselves", "then", "thence",
        "there", "thereafter", "thereby", "therefore", "therein", "these", "they", "this",
        "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
        "top", "toward", "towards", "under", "unless", "until", "up", "upon", "us", "used",
        "using", "various", "very", "via", "was", "we", "well", "were", "what", "whatever",
        "when", "whence", "whenever", "where", "whereas", "whereby", "wherein", "whether",
        "which", "while", "whither", "who", "whoever", "whole", "whom", "whose", "why", "will",
        "with", "within", "without", "would", "yet", "you", "your", "yours", "yourself",
        "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Irregular inflections mapped to their lemma and word class.
static IRREGULAR: LazyLock<HashMap<&'static str, (&'static str, WordClass)>> =
    LazyLock::new(|| {
        [
            ("taught", ("teach", WordClass::Verb)),
            ("written", ("write", WordClass::Verb)),
            ("wrote", ("write", WordClass::Verb)),
            ("built", ("build", WordClass::Verb)),
            ("began", ("begin", WordClass::Verb)),
            ("begun", ("begin", WordClass::Verb)),
            ("chosen", ("choose", WordClass::Verb)),
            ("drawn", ("draw", WordClass::Verb)),
            ("understood", ("understand", WordClass::Verb)),
            ("thought", ("think", WordClass::Verb)),
            ("found", ("find", WordClass::Verb)),
            ("held", ("hold", WordClass::Verb)),
            ("known", ("know", WordClass::Verb)),
            ("shown", ("show", WordClass::Verb)),
            ("learnt", ("learn", WordClass::Verb)),
            ("children", ("child", WordClass::Noun)),
            ("men", ("man", WordClass::Noun)),
            ("women", ("woman", WordClass::Noun)),
            ("people", ("person", WordClass::Noun)),
            ("criteria", ("criterion", WordClass::Noun)),
            ("phenomena", ("phenomenon", WordClass::Noun)),
            ("analyses", ("analysis", WordClass::Noun)),
            ("theses", ("thesis", WordClass::Noun)),
            ("indices", ("index", WordClass::Noun)),
            ("matrices", ("matrix", WordClass::Noun)),
            ("better", ("good", WordClass::Adjective)),
            ("best", ("good", WordClass::Adjective)),
        ]
        .into_iter()
        .collect()
    });

/// Words ending in `-ly` that are not adverbs.
const LY_NON_ADVERBS: &[&str] = &[
    "anomaly", "apply", "assembly", "butterfly", "family", "fly", "italy", "monopoly", "reply",
    "supply", "early", "daily", "weekly", "monthly", "yearly", "likely", "only",
];

/// Words ending in `-ing` that are not verb forms.
const ING_NON_VERBS: &[&str] = &[
    "anything", "ceiling", "during", "evening", "everything", "king", "morning", "nothing",
    "ring", "something", "spring", "string", "thing", "wing",
];

/// Words ending in `-ed` that are not verb forms.
const ED_NON_VERBS: &[&str] = &[
    "embed", "hundred", "kindred", "naked", "sacred", "wicked", "speed", "need", "seed", "shed",
];

/// Nouns spelled the same in singular and plural.
const INVARIANT_NOUNS: &[&str] = &[
    "series", "species", "means", "news", "mathematics", "physics", "economics", "statistics",
    "ethics", "linguistics", "electronics", "robotics", "graphics",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ical", "able", "ible", "ive", "ous", "ful", "less", "ic", "al",
];

/// Suffixes after which a stripped verb stem regains its silent `e`.
const SILENT_E_ENDINGS: &[&str] = &[
    "at", "ut", "iz", "ys", "uc", "ir", "ak", "ag", "rit", "ov", "lv", "rv", "us", "ur", "as",
    "ic", "nc",
];

/// Lightweight English tokenizer driven by suffix rules and word lists.
///
/// Scripts other than Latin are tokenized on letter runs and treated as
/// nouns with their lowercase form as lemma.
#[derive(Clone, Copy, Debug, Default)]
pub struct RuleTokenizer;

impl Tokenizer for RuleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        TOKEN_RE
            .find_iter(text)
            .map(|found| analyze(found.as_str()))
            .collect()
    }
}

fn analyze(text: &str) -> Token {
    let first = text.chars().next().unwrap_or(' ');

    if !first.is_alphanumeric() {
        return Token {
            text: text.to_string(),
            lower: text.to_string(),
            lemma: text.to_string(),
            class: WordClass::Punctuation,
            is_stop: false,
            is_punct: true,
        };
    }

    let lower = text.to_lowercase();

    if first.is_numeric() {
        return Token {
            text: text.to_string(),
            lemma: lower.clone(),
            lower,
            class: WordClass::Numeral,
            is_stop: false,
            is_punct: false,
        };
    }

    let bare = strip_possessive(&lower);
    let is_stop = STOP_WORDS.contains(bare);
    let (lemma, class) = if is_stop {
        (bare.to_string(), WordClass::Other)
    } else {
        lemmatize(bare)
    };

    Token {
        text: text.to_string(),
        lower,
        lemma,
        class,
        is_stop,
        is_punct: false,
    }
}

fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("’s"))
        .unwrap_or(word)
}

fn lemmatize(word: &str) -> (String, WordClass) {
    if let Some((lemma, class)) = IRREGULAR.get(word) {
        return (lemma.to_string(), *class);
    }

    let length = word.chars().count();

    if length > 4 && word.ends_with("ly") && !LY_NON_ADVERBS.contains(&word) {
        return (word.to_string(), WordClass::Adverb);
    }

    if length > 5 && word.ends_with("ing") && !ING_NON_VERBS.contains(&word) {
        return (verb_stem(&word[..word.len() - 3]), WordClass::Verb);
    }

    if length > 4 && word.ends_with("ied") {
        return (format!("{}y", &word[..word.len() - 3]), WordClass::Verb);
    }

    if length > 4 && word.ends_with("ed") && !ED_NON_VERBS.contains(&word) {
        return (verb_stem(&word[..word.len() - 2]), WordClass::Verb);
    }

    if ADJECTIVE_SUFFIXES.iter().any(|suffix| word.ends_with(suffix)) {
        return (word.to_string(), WordClass::Adjective);
    }

    (singular(word), WordClass::Noun)
}

/// Undo consonant doubling and restore a dropped silent `e`.
fn verb_stem(stem: &str) -> String {
    let chars: Vec<char> = stem.chars().collect();
    if let &[.., a, b] = chars.as_slice()
        && a == b
        && !is_vowel(b)
        && !matches!(b, 'l' | 's' | 'z' | 'f')
    {
        return chars[..chars.len() - 1].iter().collect();
    }

    if stem.ends_with('e') {
        return stem.to_string();
    }

    if SILENT_E_ENDINGS.iter().any(|ending| stem.ends_with(ending))
        && !stem.ends_with("ss")
        && !stem.ends_with("ous")
    {
        return format!("{stem}e");
    }

    stem.to_string()
}

fn singular(word: &str) -> String {
    if INVARIANT_NOUNS.contains(&word) {
        return word.to_string();
    }

    let length = word.chars().count();

    if length > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if ["sses", "xes", "ches", "shes"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return word[..word.len() - 2].to_string();
    }
    if ["ss", "us", "is"].iter().any(|suffix| word.ends_with(suffix)) {
        return word.to_string();
    }
    if length > 3
        && let Some(stem) = word.strip_suffix('s')
    {
        return stem.to_string();
    }

    word.to_string()
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u')
}
