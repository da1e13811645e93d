//! Widget type assignment as an ordered decision table.
//!
//! Text rules come first, then geometry; the first matching rule wins and the
//! table always ends in a catch-all.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Region, WidgetType};

/// Keyword lists and limits feeding the text rules. Matching is a
/// case-insensitive substring test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Keywords {
    pub button: Vec<String>,
    pub input: Vec<String>,
    pub textarea: Vec<String>,
    pub card: Vec<String>,
    pub label: Vec<String>,
    /// A short text in a small box reads as a label.
    pub label_max_chars: usize,
    pub label_max_width: i32,
    pub label_max_height: i32,
}

impl Default for Keywords {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|word| word.to_string()).collect()
        }

        Self {
            button: words(&[
                "submit",
                "login",
                "log in",
                "sign in",
                "sign up",
                "register",
                "accept",
                "confirm",
                "continue",
                "send",
                "save",
                "aceptar",
                "enviar",
                "entrar",
                "ingresar",
                "guardar",
                "registrar",
                "iniciar",
            ]),
            input: words(&[
                "email",
                "e-mail",
                "password",
                "username",
                "search",
                "enter your",
                "type here",
                "correo",
                "contraseña",
                "usuario",
                "buscar",
                "escribe",
            ]),
            textarea: words(&["textarea", "message", "comment", "mensaje", "comentario"]),
            card: words(&["card", "tarjeta"]),
            label: words(&["label", "etiqueta"]),
            label_max_chars: 10,
            label_max_width: 200,
            label_max_height: 100,
        }
    }
}

/// Strict bound on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Any,
    Above(i32),
    Below(i32),
}

impl Bound {
    fn admits(&self, value: i32) -> bool {
        match *self {
            Bound::Any => true,
            Bound::Above(limit) => value > limit,
            Bound::Below(limit) => value < limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Text contains any of the (lowercase) keywords.
    TextContains(Vec<String>),
    /// Non-blank text of at most `max_chars` characters in a box smaller than
    /// the given size.
    ShortText {
        max_chars: usize,
        max_width: i32,
        max_height: i32,
    },
    Size { width: Bound, height: Bound },
    AnyOf(Vec<Condition>),
    Always,
}

impl Condition {
    /// `text` must already be trimmed and lowercased.
    fn holds(&self, region: &Region, text: &str) -> bool {
        match self {
            Condition::TextContains(keywords) => {
                !text.is_empty() && keywords.iter().any(|keyword| text.contains(keyword.as_str()))
            }
            Condition::ShortText {
                max_chars,
                max_width,
                max_height,
            } => {
                !text.is_empty()
                    && text.chars().count() <= *max_chars
                    && region.width < *max_width
                    && region.height < *max_height
            }
            Condition::Size { width, height } => {
                width.admits(region.width) && height.admits(region.height)
            }
            Condition::AnyOf(conditions) => conditions.iter().any(|c| c.holds(region, text)),
            Condition::Always => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn bound(f: &mut fmt::Formatter<'_>, axis: &str, bound: Bound) -> fmt::Result {
            match bound {
                Bound::Any => Ok(()),
                Bound::Above(limit) => write!(f, " {axis} > {limit}"),
                Bound::Below(limit) => write!(f, " {axis} < {limit}"),
            }
        }

        match self {
            Condition::TextContains(keywords) => write!(f, "text contains {keywords:?}"),
            Condition::ShortText {
                max_chars,
                max_width,
                max_height,
            } => write!(
                f,
                "text <= {max_chars} chars, width < {max_width}, height < {max_height}"
            ),
            Condition::Size { width, height } => {
                f.write_str("size")?;
                bound(f, "width", *width)?;
                bound(f, "height", *height)
            }
            Condition::AnyOf(conditions) => {
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "({condition})")?;
                }
                Ok(())
            }
            Condition::Always => f.write_str("always"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub condition: Condition,
    pub widget: WidgetType,
}

impl Rule {
    pub fn new(condition: Condition, widget: WidgetType) -> Self {
        Self { condition, widget }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
}

impl Classifier {
    /// Builds the default table around the given keyword lists.
    pub fn new(keywords: &Keywords) -> Self {
        fn lowercase(list: &[String]) -> Vec<String> {
            list.iter()
                .map(|word| word.trim().to_lowercase())
                .filter(|word| !word.is_empty())
                .collect()
        }

        let rules = vec![
            Rule::new(
                Condition::TextContains(lowercase(&keywords.button)),
                WidgetType::Button,
            ),
            Rule::new(
                Condition::TextContains(lowercase(&keywords.input)),
                WidgetType::Input,
            ),
            Rule::new(
                Condition::TextContains(lowercase(&keywords.textarea)),
                WidgetType::Textarea,
            ),
            Rule::new(
                Condition::TextContains(lowercase(&keywords.card)),
                WidgetType::Card,
            ),
            Rule::new(
                Condition::AnyOf(vec![
                    Condition::TextContains(lowercase(&keywords.label)),
                    Condition::ShortText {
                        max_chars: keywords.label_max_chars,
                        max_width: keywords.label_max_width,
                        max_height: keywords.label_max_height,
                    },
                ]),
                WidgetType::Label,
            ),
            Rule::new(
                Condition::Size {
                    width: Bound::Above(250),
                    height: Bound::Above(100),
                },
                WidgetType::Card,
            ),
            Rule::new(
                Condition::Size {
                    width: Bound::Below(300),
                    height: Bound::Above(50),
                },
                WidgetType::Textarea,
            ),
            Rule::new(
                Condition::Size {
                    width: Bound::Below(150),
                    height: Bound::Below(50),
                },
                WidgetType::Label,
            ),
            Rule::new(Condition::Always, WidgetType::Input),
        ];
        Self::from_rules(rules)
    }

    /// Uses a custom table. Regions no rule accepts become inputs.
    pub fn from_rules(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[instrument(level = "trace", skip(self))]
    pub fn classify(&self, region: &Region, text: &str) -> WidgetType {
        let text = text.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.condition.holds(region, &text))
            .map(|rule| rule.widget)
            .unwrap_or(WidgetType::Input)
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&Keywords::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(width: i32, height: i32) -> Region {
        Region {
            id: 1,
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    #[test]
    fn text_outranks_geometry() {
        let classifier = Classifier::default();
        // Card-sized, but the text says button.
        assert_eq!(classifier.classify(&region(400, 200), "Login"), WidgetType::Button);
        assert_eq!(classifier.classify(&region(300, 120), "Submit"), WidgetType::Button);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(&region(300, 40), "  ENTER YOUR EMAIL ADDRESS "),
            WidgetType::Input
        );
        assert_eq!(
            classifier.classify(&region(300, 40), "Leave a Message"),
            WidgetType::Textarea
        );
        assert_eq!(
            classifier.classify(&region(300, 40), "Product card title"),
            WidgetType::Card
        );
    }

    #[test]
    fn button_keywords_win_over_later_text_rules() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.classify(&region(300, 40), "Send message"),
            WidgetType::Button
        );
    }

    #[test]
    fn short_text_in_small_box_is_a_label() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&region(199, 99), "Name"), WidgetType::Label);
        // Same text, box too wide: falls through to geometry.
        assert_eq!(classifier.classify(&region(200, 40), "Name"), WidgetType::Input);
        // Eleven characters is no longer short, so geometry decides.
        assert_eq!(
            classifier.classify(&region(120, 40), "Description"),
            WidgetType::Label
        );
        assert_eq!(
            classifier.classify(&region(160, 40), "Description"),
            WidgetType::Input
        );
    }

    #[test]
    fn geometry_fallback_without_text() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&region(251, 101), ""), WidgetType::Card);
        assert_eq!(classifier.classify(&region(250, 101), ""), WidgetType::Textarea);
        assert_eq!(classifier.classify(&region(299, 51), ""), WidgetType::Textarea);
        assert_eq!(classifier.classify(&region(50, 30), ""), WidgetType::Label);
        assert_eq!(classifier.classify(&region(150, 30), ""), WidgetType::Input);
        assert_eq!(classifier.classify(&region(300, 50), ""), WidgetType::Input);
    }

    #[test]
    fn blank_text_uses_geometry() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify(&region(120, 40), "   "), WidgetType::Label);
        assert_eq!(classifier.classify(&region(180, 40), "   "), WidgetType::Input);
    }

    #[test]
    fn custom_keywords_replace_defaults() {
        let keywords = Keywords {
            button: vec!["Go".to_string()],
            ..Keywords::default()
        };
        let classifier = Classifier::new(&keywords);
        assert_eq!(classifier.classify(&region(300, 40), "Let's go"), WidgetType::Button);
        assert_eq!(classifier.classify(&region(300, 40), "Submit form"), WidgetType::Input);
    }

    #[test]
    fn empty_table_defaults_to_input() {
        let classifier = Classifier::from_rules(vec![]);
        assert_eq!(classifier.classify(&region(50, 30), "Login"), WidgetType::Input);
    }

    #[test]
    fn table_ends_in_catch_all() {
        let classifier = Classifier::default();
        let last = classifier.rules().last().unwrap();
        assert_eq!(last.condition, Condition::Always);
        assert_eq!(last.widget, WidgetType::Input);
        assert_eq!(last.condition.to_string(), "always");
        assert_eq!(
            classifier.rules()[5].condition.to_string(),
            "size width > 250 height > 100"
        );
    }
}
