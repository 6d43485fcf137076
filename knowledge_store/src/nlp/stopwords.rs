//! Portuguese and English stop words.

use std::collections::HashSet;
use std::sync::LazyLock;

const PORTUGUESE: &[&str] = &[
    "a", "à", "ao", "aos", "aquela", "aquelas", "aquele", "aqueles", "aquilo", "as", "às",
    "até", "com", "como", "da", "das", "de", "dela", "delas", "dele", "deles", "depois",
    "do", "dos", "e", "é", "ela", "elas", "ele", "eles", "em", "entre", "era", "eram",
    "essa", "essas", "esse", "esses", "esta", "está", "estas", "estava", "este", "estes",
    "eu", "foi", "for", "foram", "há", "isso", "isto", "já", "lhe", "lhes", "mais", "mas",
    "me", "mesmo", "meu", "meus", "minha", "minhas", "muito", "na", "não", "nas", "nem",
    "no", "nos", "nós", "nossa", "nossas", "nosso", "nossos", "num", "numa", "o", "os",
    "ou", "para", "pela", "pelas", "pelo", "pelos", "por", "qual", "quando", "que", "quem",
    "são", "se", "seja", "sem", "ser", "será", "seu", "seus", "só", "sua", "suas", "também",
    "te", "tem", "têm", "tenho", "ter", "teu", "teus", "tu", "tua", "tuas", "um", "uma",
    "umas", "uns", "você", "vocês", "vos",
];

const ENGLISH: &[&str] = &[
    "a", "about", "after", "all", "am", "an", "and", "any", "are", "as", "at", "be",
    "because", "been", "before", "being", "but", "by", "can", "could", "did", "do", "does",
    "doing", "for", "from", "had", "has", "have", "having", "he", "her", "here", "him",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "me", "my", "no", "nor",
    "not", "of", "on", "or", "our", "ours", "she", "should", "so", "some", "such", "than",
    "that", "the", "their", "them", "then", "there", "these", "they", "this", "those",
    "to", "too", "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
];

static STOP_WORDS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| PORTUGUESE.iter().chain(ENGLISH).copied().collect());

/// Check whether a lower-cased word is a Portuguese or English stop word.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}
