use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Contraction expansion is applied in this exact order with plain substring
/// replacement, so the table is a slice rather than a map.
const CONTRACTIONS: &[(&str, &str)] = &[
    ("ain't", "is not"),
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'll", "he will"),
    ("he's", "he is"),
    ("i'd", "i would"),
    ("i'll", "i will"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it'd", "it would"),
    ("it'll", "it will"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("shouldn't", "should not"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("they'd", "they would"),
    ("they'll", "they will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("we'd", "we would"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what's", "what is"),
    ("where's", "where is"),
    ("who's", "who is"),
    ("won't", "will not"),
    ("wouldn't", "would not"),
    ("you'd", "you would"),
    ("you'll", "you will"),
    ("you're", "you are"),
    ("you've", "you have"),
];

// An empty canonical form marks a pure particle that is dropped entirely.
const SINGLISH_TERMS: &[(&str, &str)] = &[
    ("lah", ""),
    ("lor", ""),
    ("meh", ""),
    ("sia", ""),
    ("what", "what"),
    ("liddat", "like that"),
    ("lidat", "like that"),
    ("lidis", "like this"),
    ("macam", "like"),
    ("machai", "friend"),
    ("machan", "friend"),
    ("nangi", "sister"),
    ("akka", "sister"),
    ("aiya", "oh no"),
    ("aiyo", "oh no"),
    ("wah", "wow"),
    ("shiok", "nice"),
    ("steady", "good"),
    ("chio", "beautiful"),
    ("blur", "confused"),
    ("sian", "bored"),
    ("jialat", "terrible"),
    ("buay", "cannot"),
    ("tahan", "endure"),
    ("paiseh", "embarrassed"),
    ("kiasu", "afraid to lose"),
    ("kiasi", "afraid to die"),
    ("bojio", "didnt invite"),
    ("chope", "reserve"),
    ("lepak", "relax"),
    ("makan", "eat"),
    ("tapao", "takeaway"),
    ("tabao", "takeaway"),
    ("chit chat", "chat"),
    ("ang moh", "westerner"),
    ("mata", "police"),
    ("kena", "got"),
    ("cannot", "cannot"),
    ("can", "can"),
    ("got", "have"),
    ("never", "didnt"),
    ("already", "already"),
    ("then", "then"),
    ("also", "also"),
    ("still", "still"),
    ("very", "very"),
    ("so", "so"),
    ("like", "like"),
    ("want", "want"),
    ("dont want", "dont want"),
    ("no need", "no need"),
    ("need", "need"),
    ("must", "must"),
    ("confirm", "confirm"),
    ("sure", "sure"),
    ("really", "really"),
    ("actually", "actually"),
    ("maybe", "maybe"),
    ("definitely", "definitely"),
    ("probably", "probably"),
];

const SINHALA_GLOSSES: &[(&str, &str)] = &[
    ("kohomada", "how are you"),
    ("kohomadha", "how are you"),
    ("kohomda", "how are you"),
    ("kohoma", "how"),
    ("oyage", "your"),
    ("mage", "my"),
    ("nama", "name"),
    ("mama", "i"),
    ("oya", "you"),
    ("api", "we"),
    ("mokakda", "what"),
    ("mokak", "what"),
    ("kawda", "who"),
    ("koheda", "where"),
    ("kiyada", "how much"),
    ("kiyanne", "saying"),
    ("karanne", "doing"),
    ("yanne", "going"),
    ("enawa", "coming"),
    ("hari", "good"),
    ("honda", "good"),
    ("naha", "no"),
    ("ow", "yes"),
    ("mata", "me"),
    ("giya", "went"),
    ("awa", "came"),
    ("kanna", "eat"),
    ("bonawa", "drink"),
    ("balanna", "see"),
    ("ahanna", "listen"),
    ("katha", "talk"),
    ("help", "help"),
    ("karanna", "do"),
    ("denne", "give"),
    ("ganna", "take"),
    ("therenne", "know"),
    ("dannawa", "know"),
    ("adare", "love"),
    ("stuti", "thanks"),
    ("stutiyi", "thanks"),
    ("bohoma", "very"),
    ("godak", "very"),
    ("tikak", "little"),
    ("loku", "big"),
    ("podi", "small"),
    ("rassai", "delicious"),
    ("watinawa", "important"),
    ("lassana", "beautiful"),
    ("hodai", "good"),
    ("naraka", "bad"),
    ("baya", "scared"),
    ("ussai", "tall"),
    ("pathal", "low"),
    ("mal", "flowers"),
    ("gas", "tree"),
    ("pala", "fruit"),
    ("bath", "rice"),
    ("curry", "curry"),
    ("kiri", "milk"),
    ("thee", "tea"),
    ("kopi", "coffee"),
    ("watura", "water"),
    ("ira", "sun"),
    ("handa", "moon"),
    ("tharu", "star"),
    ("gaha", "tree"),
    ("mala", "flower"),
    ("wassa", "rain"),
    ("wata", "wind"),
];

/// Particles dropped during canonicalization.
const PARTICLES: &[&str] = &["lah", "lor", "meh", "sia", "leh", "hor", "ah"];

/// Subset of particles consulted by feature extraction.
const FEATURE_PARTICLES: &[&str] = &["lah", "lor", "meh", "sia"];

const SINHALA_INDICATORS: &[&str] = &["kohomada", "oyage", "mage", "mama", "oya"];

#[derive(Debug)]
pub struct LanguageMarkers {
    pub particles: &'static [&'static str],
    pub sinhala_words: &'static [&'static str],
    pub grammar_patterns: &'static [&'static str],
    pub expressions: &'static [&'static str],
}

const MARKERS: LanguageMarkers = LanguageMarkers {
    particles: PARTICLES,
    sinhala_words: &["kohomada", "mama", "oya", "nama", "mokakda"],
    grammar_patterns: &["got", "never", "already", "still", "also"],
    expressions: &["aiyo", "wah", "shiok", "steady", "chio"],
};

/// Process-wide immutable lookup tables for code-mixed Singlish text.
#[derive(Debug)]
pub struct Lexicon {
    singlish_terms: HashMap<&'static str, &'static str>,
    sinhala_glosses: HashMap<&'static str, &'static str>,
}

static LEXICON: Lazy<Lexicon> = Lazy::new(|| Lexicon {
    singlish_terms: SINGLISH_TERMS.iter().copied().collect(),
    sinhala_glosses: SINHALA_GLOSSES.iter().copied().collect(),
});

impl Lexicon {
    pub fn shared() -> &'static Lexicon {
        &LEXICON
    }

    pub fn contractions(&self) -> &'static [(&'static str, &'static str)] {
        CONTRACTIONS
    }

    pub fn is_particle(&self, token: &str) -> bool {
        PARTICLES.contains(&token)
    }

    pub fn singlish_mapping(&self, token: &str) -> Option<&'static str> {
        self.singlish_terms.get(token).copied()
    }

    pub fn sinhala_gloss(&self, token: &str) -> Option<&'static str> {
        self.sinhala_glosses.get(token).copied()
    }

    pub fn has_singlish_term(&self, token: &str) -> bool {
        self.singlish_terms.contains_key(token)
    }

    pub fn has_sinhala_term(&self, token: &str) -> bool {
        self.sinhala_glosses.contains_key(token)
    }

    pub fn sinhala_surface_forms(&self) -> impl Iterator<Item = &'static str> + '_ {
        SINHALA_GLOSSES.iter().map(|(surface, _)| *surface)
    }

    pub fn feature_particles(&self) -> &'static [&'static str] {
        FEATURE_PARTICLES
    }

    pub fn sinhala_indicators(&self) -> &'static [&'static str] {
        SINHALA_INDICATORS
    }

    pub fn markers(&self) -> &'static LanguageMarkers {
        &MARKERS
    }
}
