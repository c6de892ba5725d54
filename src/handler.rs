//! Resolved message handlers.
//!
//! A [`MessageHandler`] wraps one resolved bundle together with the
//! contract's operation → key table, built once at construction. Message
//! operations dispatch through [`MessageHandler::invoke`]; the base
//! capabilities (fetch the bundle, fetch its locale, format by key) are the
//! [`Messages`] trait. Lookup failures degrade to a decorated sentinel
//! instead of an error: rendering a message must never take the caller
//! down.

use std::collections::HashMap;

use tracing::error;

use crate::bundle::MessageBundle;
use crate::contract::MessageContract;
use crate::format::{format_pattern, FormatArg};
use crate::locale::Locale;

/// Marker wrapped around keys that failed to resolve, e.g. `!!greeting!!`.
pub const MISSING_KEY_MARKER: &str = "!!";

/// Base capabilities of any resolved message contract.
pub trait Messages {
    /// The backing bundle, file-based or fabricated.
    fn bundle(&self) -> &MessageBundle;

    /// The locale of the backing bundle.
    fn locale(&self) -> &Locale;

    /// Format the message stored under `key` with positional arguments.
    /// A key absent from the bundle is logged and rendered as
    /// `!!key!!` rather than raised.
    fn format(&self, key: &str, args: &[FormatArg]) -> String;
}

/// Immutable handler for one (contract, locale) pair.
#[derive(Debug)]
pub struct MessageHandler {
    bundle: MessageBundle,
    keys: HashMap<String, String>,
}

impl MessageHandler {
    pub fn new(bundle: MessageBundle, contract: &MessageContract) -> MessageHandler {
        let keys = contract
            .entries()
            .iter()
            .map(|entry| (entry.name().to_string(), entry.effective_key().to_string()))
            .collect();
        MessageHandler { bundle, keys }
    }

    /// Dispatch a contract operation by name: resolve the operation's
    /// declared key through the table and format it. Names that are not
    /// declared operations are treated as direct bundle keys.
    pub fn invoke(&self, operation: &str, args: &[FormatArg]) -> String {
        match self.keys.get(operation) {
            Some(key) => self.format(key, args),
            None => self.format(operation, args),
        }
    }
}

impl Messages for MessageHandler {
    fn bundle(&self) -> &MessageBundle {
        &self.bundle
    }

    fn locale(&self) -> &Locale {
        self.bundle.locale()
    }

    fn format(&self, key: &str, args: &[FormatArg]) -> String {
        match self.bundle.get(key) {
            Some(pattern) => format_pattern(pattern, args),
            None => {
                error!(
                    "no message for key `{}` in bundle (locale {})",
                    key,
                    self.bundle.locale()
                );
                format!("{}{}{}", MISSING_KEY_MARKER, key, MISSING_KEY_MARKER)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractBuilder, MessageEntry};

    fn handler() -> MessageHandler {
        let contract = ContractBuilder::new("app.Messages")
            .entry(MessageEntry::text("greeting", "Hello, {0}!"))
            .entry(MessageEntry::text("farewell", "Goodbye").with_key("exit.message"))
            .build()
            .unwrap();

        let bundle = MessageBundle::from_properties(
            "test",
            "greeting=Hello, {0}!\nexit.message=See you, {0}.\nplain=No yelling\n",
            Locale::new("en", "", ""),
        )
        .unwrap();

        MessageHandler::new(bundle, &contract)
    }

    #[test]
    fn test_format_known_key() {
        let handler = handler();
        assert_eq!(handler.format("plain", &[]), "No yelling");
    }

    #[test]
    fn test_format_with_arguments() {
        let handler = handler();
        assert_eq!(
            handler.format("greeting", &["Ada".into()]),
            "Hello, Ada!"
        );
    }

    #[test]
    fn test_format_missing_key_returns_sentinel() {
        let handler = handler();
        assert_eq!(handler.format("absent", &[]), "!!absent!!");
    }

    #[test]
    fn test_invoke_by_operation_name() {
        let handler = handler();
        assert_eq!(
            handler.invoke("greeting", &["Ada".into()]),
            "Hello, Ada!"
        );
    }

    #[test]
    fn test_invoke_uses_key_override() {
        let handler = handler();
        // The farewell operation reads exit.message, not its own name.
        assert_eq!(
            handler.invoke("farewell", &["Ada".into()]),
            "See you, Ada."
        );
    }

    #[test]
    fn test_invoke_unknown_operation_falls_through_to_key() {
        let handler = handler();
        assert_eq!(handler.invoke("plain", &[]), "No yelling");
        assert_eq!(handler.invoke("nothing", &[]), "!!nothing!!");
    }

    #[test]
    fn test_locale_comes_from_bundle() {
        let handler = handler();
        assert_eq!(handler.locale().to_string(), "en");
    }

    #[test]
    fn test_handler_over_fabricated_bundle() {
        let contract = ContractBuilder::new("app.Messages")
            .entry(MessageEntry::text("greeting", "Hi, {0}"))
            .build()
            .unwrap();
        let bundle = contract.fabricated_bundle(&Locale::new("en", "", ""));
        let handler = MessageHandler::new(bundle, &contract);

        assert_eq!(handler.invoke("greeting", &["you".into()]), "Hi, you");
        assert!(handler.bundle().is_fabricated());
    }
}
