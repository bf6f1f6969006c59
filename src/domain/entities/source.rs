//! External content sources and their extractors

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::errors::FetchError;

/// `{/json/pointer}` placeholder inside a template
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(/[^{}]*)\}").unwrap());

static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// One external JSON API and how to turn its response into display text
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ContentSource {
    pub url: String,
    /// Prefix of a successful reply, e.g. `🐱 Cat Fact:`
    pub label: String,
    /// Used in the apology, e.g. `a cat fact`
    pub subject: String,
    /// Display text with `{/pointer}` placeholders
    pub template: String,
}

impl ContentSource {
    pub fn new(
        url: impl Into<String>,
        label: impl Into<String>,
        subject: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            subject: subject.into(),
            template: template.into(),
        }
    }

    /// Fill the template from a decoded response body
    pub fn render(&self, body: &Value) -> Result<String, FetchError> {
        let mut out = String::with_capacity(self.template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(&self.template) {
            let Some(whole) = caps.get(0) else { continue };
            let pointer = &caps[1];
            out.push_str(&self.template[last..whole.start()]);
            let value = decode_entities(&scalar_at(body, pointer)?);
            if value.trim().is_empty() {
                return Err(FetchError::Shape(pointer.to_string()));
            }
            out.push_str(&value);
            last = whole.end();
        }
        out.push_str(&self.template[last..]);

        Ok(out.trim().to_string())
    }

    /// Pointers referenced by the template
    pub fn pointers(&self) -> Vec<&str> {
        PLACEHOLDER
            .captures_iter(&self.template)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }

    pub fn success_text(&self, content: &str) -> String {
        format!("{} {}", self.label, content)
    }

    pub fn apology_text(&self) -> String {
        format!(
            "Sorry, I couldn't fetch {} right now. Please try again later.",
            self.subject
        )
    }
}

fn scalar_at(body: &Value, pointer: &str) -> Result<String, FetchError> {
    match body.pointer(pointer) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        _ => Err(FetchError::Shape(pointer.to_string())),
    }
}

/// Decode the HTML entities some APIs leave in their text
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITY
        .replace_all(text, |caps: &Captures<'_>| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map(String::from).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<char> {
    Some(match name {
        "quot" => '"',
        "apos" => '\'',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "nbsp" => '\u{a0}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "hellip" => '\u{2026}',
        "eacute" => 'é',
        _ => return None,
    })
}
