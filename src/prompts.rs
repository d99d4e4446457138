//! System instruction for the translation call.
//!
//! Callers can override it via [`crate::config::ConversionConfig::system_prompt`];
//! the builder here is used only when no override is provided.

use crate::config::ConversionConfig;

/// Build the fixed instruction naming the source and target languages.
pub fn translation_instruction(source: &str, target: &str) -> String {
    format!("Translate the user content from {source} to {target}.")
}

/// The instruction actually sent: the override if set, else the default.
pub fn system_prompt(config: &ConversionConfig) -> String {
    config
        .system_prompt
        .clone()
        .unwrap_or_else(|| {
            translation_instruction(&config.source_language, &config.target_language)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_instruction_names_both_languages() {
        assert_eq!(
            system_prompt(&ConversionConfig::default()),
            "Translate the user content from English to Turkish."
        );
    }

    #[test]
    fn override_is_used_verbatim() {
        let config = ConversionConfig::builder()
            .system_prompt("Translate to pirate speak.")
            .build()
            .unwrap();
        assert_eq!(system_prompt(&config), "Translate to pirate speak.");
    }
}
