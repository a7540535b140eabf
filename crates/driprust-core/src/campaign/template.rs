//! Personalization Engine - Handles placeholder substitution in message bodies

use chrono::{DateTime, Local, TimeZone};
use driprust_storage::models::Contact;
use regex::{Captures, Regex};

/// Personalization engine for message bodies
///
/// Placeholders look like `{field}`. Contact fields win over system
/// fields, `{name}` falls back to "there" when no name is known, and
/// unresolved placeholders are left in place so typos stay visible.
pub struct PersonalizationEngine {
    token_re: Regex,
}

impl PersonalizationEngine {
    /// Create a new personalization engine
    pub fn new() -> Self {
        Self {
            token_re: Regex::new(r"\{([^{}]+)\}").unwrap(),
        }
    }

    /// Personalize a message body for a contact using the current local time
    pub fn personalize(&self, template: &str, contact: &Contact) -> String {
        self.personalize_at(template, contact, Local::now())
    }

    /// Personalize a message body at a fixed instant
    ///
    /// Substitution is a single pass, so substituted values containing
    /// braces are never expanded again.
    pub fn personalize_at<Tz: TimeZone>(
        &self,
        template: &str,
        contact: &Contact,
        now: DateTime<Tz>,
    ) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        self.token_re
            .replace_all(template, |caps: &Captures| {
                let key = &caps[1];
                if let Some(value) = contact.field_value(key) {
                    return value;
                }
                if let Some(value) = system_field(key, &now) {
                    return value;
                }
                if key == "name" {
                    return contact
                        .display_name()
                        .unwrap_or_else(|| "there".to_string());
                }
                caps[0].to_string()
            })
            .into_owned()
    }
}

impl Default for PersonalizationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve date and time placeholders
fn system_field<Tz: TimeZone>(key: &str, now: &DateTime<Tz>) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let value = match key {
        "date" => now.format("%-m/%-d/%Y"),
        "time" => now.format("%-I:%M %p"),
        "current_month" => now.format("%B"),
        "current_year" => now.format("%Y"),
        "day_of_week" => now.format("%A"),
        _ => return None,
    };
    Some(value.to_string())
}
