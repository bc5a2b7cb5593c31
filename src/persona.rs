use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

const BUNDLED_PERSONAS: &str = include_str!("../config/personas.toml");
const DESCRIPTION_PLACEHOLDER: &str = "{description}";

#[derive(Debug, Clone, Deserialize)]
struct DefaultPersona {
    name: String,
    greeting: String,
    fallback_reply: String,
    loading_text: String,
    #[serde(default)]
    photo_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PersonaEntry {
    name: String,
    greeting: String,
    #[serde(default)]
    fallback_reply: Option<String>,
    #[serde(default)]
    loading_text: Option<String>,
    #[serde(default)]
    photo_prompt: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PersonaTable {
    default: DefaultPersona,
    #[serde(default)]
    personas: BTreeMap<String, PersonaEntry>,
}

/// The voice a session speaks in, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    pub id: Option<String>,
    pub name: String,
    pub greeting: String,
    pub fallback_reply: String,
    pub loading_text: String,
    pub photo_prompt: Option<String>,
}

impl Persona {
    /// Fills the persona's prompt template, or passes the description through.
    pub fn photo_prompt_for(&self, description: &str) -> String {
        match &self.photo_prompt {
            Some(template) if template.contains(DESCRIPTION_PLACEHOLDER) => {
                template.replace(DESCRIPTION_PLACEHOLDER, description)
            }
            Some(template) => format!("{template}, {description}"),
            None => description.to_string(),
        }
    }
}

impl PersonaTable {
    pub fn bundled() -> Result<Self, toml::de::Error> {
        Self::from_toml_str(BUNDLED_PERSONAS)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.personas.keys().map(String::as_str)
    }

    /// Unknown or absent identifiers get the generic persona. The identifier is kept
    /// either way so the backend can still scope its behavior.
    pub fn select(&self, id: Option<&str>) -> Persona {
        let fallback = &self.default;
        let id = id.map(str::trim).filter(|id| !id.is_empty());

        match id.and_then(|id| self.personas.get(id)) {
            Some(entry) => Persona {
                id: id.map(str::to_string),
                name: entry.name.clone(),
                greeting: entry.greeting.clone(),
                fallback_reply: entry
                    .fallback_reply
                    .clone()
                    .unwrap_or_else(|| fallback.fallback_reply.clone()),
                loading_text: entry
                    .loading_text
                    .clone()
                    .unwrap_or_else(|| fallback.loading_text.clone()),
                photo_prompt: entry
                    .photo_prompt
                    .clone()
                    .or_else(|| fallback.photo_prompt.clone()),
            },
            None => {
                if let Some(id) = id {
                    log::debug!("persona {id:?} not in table, using generic greeting");
                }
                Persona {
                    id: id.map(str::to_string),
                    name: fallback.name.clone(),
                    greeting: fallback.greeting.clone(),
                    fallback_reply: fallback.fallback_reply.clone(),
                    loading_text: fallback.loading_text.clone(),
                    photo_prompt: fallback.photo_prompt.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PersonaTable;

    const TABLE: &str = r#"
[default]
name = "Assistant"
greeting = "Hello."
fallback_reply = "Sorry, something broke."
loading_text = "taking a photo..."

[personas.mila]
name = "Mila"
greeting = "Hi, I'm Mila."
photo_prompt = "portrait of Mila, {description}"
"#;

    #[test]
    fn bundled_table_parses_and_knows_anastasia() {
        let table = PersonaTable::bundled().expect("bundled personas should parse");
        let persona = table.select(Some("anastasia"));
        assert_eq!(persona.name, "Anastasia");
        assert_eq!(persona.greeting, "Bonjour. Je suis Anastasia. Que voulez-vous ?");
        assert_eq!(persona.fallback_reply, "Désolée, j'ai un petit problème technique.");
        assert!(table.ids().any(|id| id == "lena"));
    }

    #[test]
    fn known_persona_inherits_missing_fields_from_default() {
        let table = PersonaTable::from_toml_str(TABLE).expect("table should parse");
        let persona = table.select(Some("mila"));
        assert_eq!(persona.id.as_deref(), Some("mila"));
        assert_eq!(persona.greeting, "Hi, I'm Mila.");
        assert_eq!(persona.fallback_reply, "Sorry, something broke.");
        assert_eq!(persona.loading_text, "taking a photo...");
    }

    #[test]
    fn unknown_persona_gets_generic_greeting_but_keeps_id() {
        let table = PersonaTable::from_toml_str(TABLE).expect("table should parse");
        let persona = table.select(Some("nobody"));
        assert_eq!(persona.id.as_deref(), Some("nobody"));
        assert_eq!(persona.greeting, "Hello.");
    }

    #[test]
    fn absent_or_blank_persona_has_no_id() {
        let table = PersonaTable::from_toml_str(TABLE).expect("table should parse");
        assert!(table.select(None).id.is_none());
        assert!(table.select(Some("  ")).id.is_none());
        assert_eq!(table.select(None).name, "Assistant");
    }

    #[test]
    fn photo_prompt_uses_template_or_passes_description_through() {
        let table = PersonaTable::from_toml_str(TABLE).expect("table should parse");
        assert_eq!(
            table.select(Some("mila")).photo_prompt_for(" smiling"),
            "portrait of Mila,  smiling"
        );
        assert_eq!(table.select(None).photo_prompt_for(" smiling"), " smiling");
    }
}
