//! Template filters and functions.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local};
use quill_core::ports::SettingsStore;
use tera::{Function, Value};

use super::markdown::render_markdown;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const DEFAULT_EXCERPT_LENGTH: usize = 150;
const DEFAULT_FOOTER: &str = r#"Powered by <a href="https://github.com/quill-blog/quill">Quill</a>"#;

/// `{{ post.created_at | format_date }}` - local time, `YYYY-MM-DD HH:mm` by default.
pub fn format_date(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let raw = tera::try_get_value!("format_date", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("format_date", "format", String, val),
        None => DEFAULT_DATE_FORMAT.to_string(),
    };

    match DateTime::parse_from_rfc3339(&raw) {
        Ok(date) => Ok(Value::String(
            date.with_timezone(&Local).format(&format).to_string(),
        )),
        Err(_) => Ok(Value::String(raw)),
    }
}

/// `{{ post.content | excerpt(length=200) }}` - first N characters plus `...`.
pub fn excerpt(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::Null => return Ok(Value::String(String::new())),
        other => tera::try_get_value!("excerpt", "value", String, other),
    };
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("excerpt", "length", usize, val),
        None => DEFAULT_EXCERPT_LENGTH,
    };

    Ok(Value::String(truncate(&text, length)))
}

fn truncate(text: &str, length: usize) -> String {
    match text.char_indices().nth(length) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// `{{ post.content | markdown | safe }}`
pub fn markdown(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = match value {
        Value::Null => String::new(),
        other => tera::try_get_value!("markdown", "value", String, other),
    };
    Ok(Value::String(render_markdown(&source)))
}

/// `{{ config(key="site.title") }}` - dotted lookup into the live site config.
pub fn config_function(settings: Arc<dyn SettingsStore>) -> impl Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let key = match args.get("key") {
            Some(val) => tera::try_get_value!("config", "key", String, val),
            None => return Err(tera::Error::msg("`config` requires a `key` argument")),
        };
        Ok(settings.current().lookup(&key).unwrap_or(Value::Null))
    }
}

/// `{{ footer_html() | safe }}` - configured footer or the default credit.
pub fn footer_function(settings: Arc<dyn SettingsStore>) -> impl Function {
    move |_args: &HashMap<String, Value>| -> tera::Result<Value> {
        let html = settings
            .current()
            .footer
            .html
            .clone()
            .filter(|html| !html.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FOOTER.to_string());
        Ok(Value::String(html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_args() -> HashMap<String, Value> {
        HashMap::new()
    }

    #[test]
    fn test_excerpt_truncates_by_chars() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), json!(5));

        assert_eq!(excerpt(&json!("hello world"), &args).unwrap(), json!("hello..."));
        assert_eq!(excerpt(&json!("short"), &args).unwrap(), json!("short"));
        assert_eq!(excerpt(&json!("你好世界你好世界"), &args).unwrap(), json!("你好世界你..."));
        assert_eq!(excerpt(&Value::Null, &args).unwrap(), json!(""));
    }

    #[test]
    fn test_excerpt_default_length() {
        let long = "a".repeat(200);
        let out = excerpt(&json!(long), &no_args()).unwrap();
        assert_eq!(out.as_str().unwrap().len(), DEFAULT_EXCERPT_LENGTH + 3);
    }

    #[test]
    fn test_format_date() {
        let out = format_date(&json!("2024-03-05T10:20:30Z"), &no_args()).unwrap();
        let s = out.as_str().unwrap();
        assert_eq!(s.len(), "2024-03-05 10:20".len());
        assert!(s.starts_with("2024-03-0"));

        let mut args = HashMap::new();
        args.insert("format".to_string(), json!("%Y"));
        assert_eq!(format_date(&json!("2024-06-15T12:00:00Z"), &args).unwrap(), json!("2024"));
    }

    #[test]
    fn test_format_date_passes_through_unparsable() {
        assert_eq!(format_date(&json!("yesterday"), &no_args()).unwrap(), json!("yesterday"));
    }

    #[test]
    fn test_markdown_filter_handles_null() {
        assert_eq!(markdown(&Value::Null, &no_args()).unwrap(), json!(""));
        let html = markdown(&json!("*hi*"), &no_args()).unwrap();
        assert!(html.as_str().unwrap().contains("<em>hi</em>"));
    }
}
