use std::collections::HashMap;

use once_cell::sync::Lazy;
use thiserror::Error;

use crate::models::{IntentRecord, UNKNOWN_INTENT};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("intent `{0}` has no templates")]
    EmptyIntent(String),
    #[error("intent `{intent}` contains an empty template")]
    EmptyTemplate { intent: String },
    #[error("catalog is missing the `unknown` fallback entry")]
    MissingUnknown,
}

#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    text: String,
}

impl ResponseTemplate {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn has_name_slot(&self) -> bool {
        self.text.contains("{name}")
    }
}

/// Intent-keyed response templates, validated at construction so every lookup
/// can resolve to at least one template.
#[derive(Debug)]
pub struct ResponseCatalog {
    templates: HashMap<String, Vec<ResponseTemplate>>,
}

impl ResponseCatalog {
    pub fn from_entries<I, T>(entries: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (T, Vec<T>)>,
        T: Into<String>,
    {
        let mut templates: HashMap<String, Vec<ResponseTemplate>> = HashMap::new();

        for (intent, texts) in entries {
            let intent = intent.into();
            if texts.is_empty() {
                return Err(CatalogError::EmptyIntent(intent));
            }
            let mut validated = Vec::with_capacity(texts.len());
            for text in texts {
                let text = text.into();
                if text.trim().is_empty() {
                    return Err(CatalogError::EmptyTemplate { intent });
                }
                validated.push(ResponseTemplate { text });
            }
            templates.insert(intent, validated);
        }

        if !templates.contains_key(UNKNOWN_INTENT) {
            return Err(CatalogError::MissingUnknown);
        }

        Ok(Self { templates })
    }

    pub fn builtin() -> &'static ResponseCatalog {
        static BUILTIN: Lazy<ResponseCatalog> = Lazy::new(|| {
            ResponseCatalog::from_entries(builtin_entries())
                .expect("builtin response catalog is valid")
        });
        &BUILTIN
    }

    /// Templates for the intent, falling back to the `unknown` set for labels
    /// the catalog does not know.
    pub fn templates_for(&self, intent: &str) -> &[ResponseTemplate] {
        self.templates
            .get(intent)
            .or_else(|| self.templates.get(UNKNOWN_INTENT))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, intent: &str) -> bool {
        self.templates.contains_key(intent)
    }

    pub fn intent_count(&self) -> usize {
        self.templates.len()
    }
}

fn builtin_entries() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "greeting",
            vec![
                "Hari honda machan! Oya kohomada? 😊",
                "Ayubowan! Mama hari honda. Oya kohomada? 👋",
                "Hello machan! Everything good or not? 😄",
                "Wah, kohomada bro! Long time no see! 🤗",
            ],
        ),
        (
            "self_intro",
            vec![
                "Oya {name} neda? Hari honda! Mama CoverageBot, oyata help karanna puluwan! 🤖",
                "Nice to meet you {name}! Mama ai-powered Singlish chatbot kenek. 😊",
                "Wah {name}, nice name machan! Mata oyata Singlish walata reply karanna puluwan! 💬",
                "Nice to meet you! Mama CoverageBot, oyata help karanna puluwan! 🤖",
            ],
        ),
        (
            "ask_name",
            vec![
                "Mama CoverageBot! Singlish walata reply karanna puluwan chatbot kenek. Oyata mata kohomada kiyanawa? 😄",
                "My name is CoverageBot machan! AI-powered Singlish assistant kenek. What about you? 🤖",
                "Hehe, mama CoverageBot kiyanawa. Sri Lankan chatbot kenek. Oya? 😊",
            ],
        ),
        (
            "how_are_you",
            vec![
                "Mama hari honda machan! Always ready to chat! Oya kohomada? 💪",
                "I'm doing great la! Everyday also learning new Singlish words. You leh? 😊",
                "Aiyo, mama super good! Thanks for asking machan! 🌟",
            ],
        ),
        (
            "goodbye",
            vec![
                "Bye bye machan! Mata aye pennako! See you soon! 👋",
                "Okay la, see you later! Take care ah! 🤗",
                "Sige, giya giya! Come back and chat again okay! 😊",
            ],
        ),
        (
            "thanks",
            vec![
                "Mokakwath naha machan! Mata help karanna lassana! 😊",
                "Welcome la! Anytime can ask me anything! 🤝",
                "No problem bro! That's what friends are for mah! 💪",
            ],
        ),
        (
            "help",
            vec![
                "Mama oyata Singlish walata reply karanna puluwan! Try karala balanna - kohomada, oyage nama mokakda, thanks wage! 🤝",
                "Sure sure! I can understand Singlish and reply back. Try saying things like 'kohomada' or 'oya kawda'! 😄",
                "Of course can help! I'm here to chat in Singlish with you. What you want to know? 🤖",
            ],
        ),
        (
            "weather",
            vec![
                "Mata weather check karanna baha machan, but Google eken balanna puluwan! 🌤️",
                "Aiyo, I cannot check weather la. But today looks nice right? ☀️",
                "Sorry machan, weather updates mata naha. Try weather app! 🌦️",
            ],
        ),
        (
            "love",
            vec![
                "Aww, sweet machan! Mata podi robot kenek witharai, but thanks! 💕",
                "Hehe, so sweet! But I'm just AI la. Find real human better! 😄❤️",
                "Ayyo, mata emotions naha but appreciate the love! 🤗",
            ],
        ),
        (
            "food",
            vec![
                "Aiyo mata kanna baha! But rice and curry sounds good machan! 🍛",
                "Wah, food talk ah? I cannot eat but love hearing about Sri Lankan food! 🍜",
                "Cannot taste but kottu, hoppers, string hoppers all sound delicious! 🥘",
            ],
        ),
        (
            UNKNOWN_INTENT,
            vec![
                "Mata eka therenne naha machan! Try 'kohomada' or 'help' kiyla! 🤔",
                "Hmm, mata eka understand karanna baha. Simple Singlish walata try karanna! 😅",
                "Aiyo, mata confused! Can you say that again in simpler words? 🤷‍♂️",
                "Sorry machan, that one I don't know. Ask me something else! 💭",
            ],
        ),
    ]
}

/// Seed intent catalog used for fuzzy matching and for bootstrapping the
/// statistical model when no trained artifact exists.
pub fn seed_intents() -> Vec<IntentRecord> {
    let entries: [(&str, &[&str]); 7] = [
        (
            "greeting",
            &[
                "kohomada",
                "kohomadha",
                "kohomda",
                "hello",
                "hi",
                "machan kohomada",
                "ayubowan",
                "kohoma hari",
            ],
        ),
        (
            "self_intro",
            &[
                "mage nama",
                "my name is",
                "im",
                "i am",
                "mama",
                "mamai",
                "mamayi",
            ],
        ),
        (
            "ask_name",
            &[
                "oyage nama mokakda",
                "whats your name",
                "who are you",
                "oya kawda",
                "oyage nama",
            ],
        ),
        (
            "how_are_you",
            &[
                "oya kohomada",
                "how are you",
                "oyage hal",
                "oya hari honda neda",
                "oya hondaida",
            ],
        ),
        (
            "goodbye",
            &[
                "bye",
                "goodbye",
                "giya",
                "mata yanna ona",
                "see you",
                "catch you later",
            ],
        ),
        (
            "thanks",
            &[
                "thanks",
                "thank you",
                "stuti",
                "stutiyi",
                "bohoma stuti",
                "thanks machan",
            ],
        ),
        (
            "help",
            &[
                "help",
                "help karanna",
                "mata help karanna",
                "help me",
                "mokak karanne",
            ],
        ),
    ];

    entries
        .into_iter()
        .map(|(label, phrases)| IntentRecord {
            label: label.to_string(),
            seed_phrases: phrases.iter().map(ToString::to_string).collect(),
        })
        .collect()
}
