pub mod catalog;
pub mod compose;
pub mod language;
pub mod lexicon;
pub mod models;
pub mod normalize;

pub use catalog::{seed_intents, CatalogError, ResponseCatalog, ResponseTemplate};
pub use compose::ResponseComposer;
pub use language::LanguageClassifier;
pub use lexicon::Lexicon;
pub use models::*;
pub use normalize::Normalizer;
