use std::rc::Rc;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::interaction::Tooltip;
use crate::render::{Container, ExportSettings};

/// Externally supplied i18n lookup.
///
/// Pipelines pass a `defaultValue` template in `params`; translators that do
/// not know a key are expected to fall back to it.
pub trait Translate {
    fn translate(&self, key: &str, params: &Value) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &Value) -> String,
{
    fn translate(&self, key: &str, params: &Value) -> String {
        self(key, params)
    }
}

/// Translator that only knows the `defaultValue` templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl Translate for DefaultTranslator {
    fn translate(&self, key: &str, params: &Value) -> String {
        match params.get("defaultValue").and_then(Value::as_str) {
            Some(template) => interpolate(template, params),
            None => key.to_owned(),
        }
    }
}

/// Replaces `{{name}}` placeholders with string or number fields of `params`.
#[must_use]
pub fn interpolate(template: &str, params: &Value) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after[..end].trim();
        match params.get(name) {
            Some(Value::String(text)) => out.push_str(text),
            Some(Value::Number(number)) => out.push_str(&number.to_string()),
            Some(Value::Bool(flag)) => out.push_str(if *flag { "true" } else { "false" }),
            _ => {
                out.push_str("{{");
                out.push_str(&after[..end]);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Turns raw category keys (city slugs, metric ids) into display labels.
pub trait LabelFormatter {
    fn format_label(&self, raw: &str) -> String;
}

impl<F> LabelFormatter for F
where
    F: Fn(&str) -> String,
{
    fn format_label(&self, raw: &str) -> String {
        self(raw)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RawLabels;

impl LabelFormatter for RawLabels {
    fn format_label(&self, raw: &str) -> String {
        raw.to_owned()
    }
}

/// Formats numeric values for labels and tooltips.
pub trait ValueFormatter {
    fn format_value(&self, value: f64) -> String;
}

impl<F> ValueFormatter for F
where
    F: Fn(f64) -> String,
{
    fn format_value(&self, value: f64) -> String {
        self(value)
    }
}

/// Thousands-grouped integers, one decimal for fractional values.
#[derive(Debug, Clone, Copy)]
pub struct GroupedNumbers {
    pub group_separator: char,
    pub decimal_separator: char,
}

impl Default for GroupedNumbers {
    fn default() -> Self {
        Self {
            group_separator: ',',
            decimal_separator: '.',
        }
    }
}

impl ValueFormatter for GroupedNumbers {
    fn format_value(&self, value: f64) -> String {
        if !value.is_finite() {
            return "–".to_owned();
        }
        let rounded = (value * 10.0).round() / 10.0;
        let negative = rounded < 0.0;
        let abs = rounded.abs();
        let whole = abs.trunc() as u64;
        let tenths = ((abs - abs.trunc()) * 10.0).round() as u64;

        let digits = whole.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (index, digit) in digits.chars().enumerate() {
            if index > 0 && (digits.len() - index) % 3 == 0 {
                grouped.push(self.group_separator);
            }
            grouped.push(digit);
        }

        let mut out = String::new();
        if negative && (whole > 0 || tenths > 0) {
            out.push('-');
        }
        out.push_str(&grouped);
        if tenths > 0 {
            out.push(self.decimal_separator);
            out.push_str(&tenths.to_string());
        }
        out
    }
}

/// Reformats ISO day keys (`2024-05-01`) with a chrono format string.
///
/// Keys that are not ISO dates are returned unchanged.
#[must_use]
pub fn format_day_key(raw: &str, format: &str) -> String {
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => date.format(format).to_string(),
        Err(_) => raw.to_owned(),
    }
}

/// Capabilities and mount point for one render call.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub container: &'a Container,
    pub tooltip: &'a Tooltip,
    pub translate: &'a dyn Translate,
    pub format_label: &'a dyn LabelFormatter,
    pub format_value: &'a dyn ValueFormatter,
    pub export: ExportSettings,
}

static DEFAULT_NUMBERS: GroupedNumbers = GroupedNumbers {
    group_separator: ',',
    decimal_separator: '.',
};

impl<'a> RenderContext<'a> {
    #[must_use]
    pub fn new(
        container: &'a Container,
        tooltip: &'a Tooltip,
        translate: &'a dyn Translate,
    ) -> Self {
        Self {
            container,
            tooltip,
            translate,
            format_label: &RawLabels,
            format_value: &DEFAULT_NUMBERS,
            export: ExportSettings::default(),
        }
    }

    #[must_use]
    pub fn with_label_formatter(mut self, format_label: &'a dyn LabelFormatter) -> Self {
        self.format_label = format_label;
        self
    }

    #[must_use]
    pub fn with_value_formatter(mut self, format_value: &'a dyn ValueFormatter) -> Self {
        self.format_value = format_value;
        self
    }

    #[must_use]
    pub fn with_export_settings(mut self, export: ExportSettings) -> Self {
        self.export = export;
        self
    }

    /// Translates `key`, supplying `default` as the fallback template.
    pub(crate) fn text(&self, key: &str, default: &str, params: Value) -> String {
        let mut params = match params {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        params
            .entry("defaultValue")
            .or_insert_with(|| Value::String(default.to_owned()));
        self.translate.translate(key, &Value::Object(params))
    }

    pub(crate) fn label(&self, raw: &str) -> String {
        self.format_label.format_label(raw)
    }

    pub(crate) fn value(&self, value: f64) -> String {
        self.format_value.format_value(value)
    }
}

/// Owned counterpart of `RenderContext` for charts that re-render from timers.
#[derive(Clone)]
pub struct SharedContext {
    pub container: Container,
    pub tooltip: Tooltip,
    pub translate: Rc<dyn Translate>,
    pub format_label: Rc<dyn LabelFormatter>,
    pub format_value: Rc<dyn ValueFormatter>,
    pub export: ExportSettings,
}

impl SharedContext {
    #[must_use]
    pub fn new(container: &Container, tooltip: &Tooltip, translate: Rc<dyn Translate>) -> Self {
        Self {
            container: container.clone(),
            tooltip: tooltip.clone(),
            translate,
            format_label: Rc::new(RawLabels),
            format_value: Rc::new(GroupedNumbers::default()),
            export: ExportSettings::default(),
        }
    }

    #[must_use]
    pub fn with_label_formatter(mut self, format_label: Rc<dyn LabelFormatter>) -> Self {
        self.format_label = format_label;
        self
    }

    #[must_use]
    pub fn with_value_formatter(mut self, format_value: Rc<dyn ValueFormatter>) -> Self {
        self.format_value = format_value;
        self
    }

    #[must_use]
    pub fn borrowed(&self) -> RenderContext<'_> {
        RenderContext {
            container: &self.container,
            tooltip: &self.tooltip,
            translate: self.translate.as_ref(),
            format_label: self.format_label.as_ref(),
            format_value: self.format_value.as_ref(),
            export: self.export,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn interpolates_known_fields_and_keeps_unknown() {
        let params = json!({"label": "Köln", "value": 58});
        assert_eq!(
            interpolate("{{label}}: {{value}} ({{unit}})", &params),
            "Köln: 58 ({{unit}})"
        );
    }

    #[test]
    fn grouped_numbers() {
        let format = GroupedNumbers::default();
        assert_eq!(format.format_value(1_234_567.0), "1,234,567");
        assert_eq!(format.format_value(42.25), "42.3");
        assert_eq!(format.format_value(-0.01), "0");
        assert_eq!(format.format_value(f64::NAN), "–");
    }

    #[test]
    fn day_keys_use_chrono_format() {
        assert_eq!(format_day_key("2024-05-01", "%d.%m."), "01.05.");
        assert_eq!(format_day_key("Mon", "%d.%m."), "Mon");
    }
}
