//! Text preview of the learner's code.
//!
//! Nothing is executed. The preview pulls the component name and the text of
//! the first `return` out of the source, drops markup and `{...}`
//! expressions, and shows what is left.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static FUNCTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"function\s+(\w+)").expect("function pattern is valid"));

#[allow(clippy::expect_used)]
static RETURN_EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"return\s*\(([\s\S]*?)\)|return\s+([^;\n]+)").expect("return pattern is valid")
});

#[allow(clippy::expect_used)]
static MARKUP_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[^>]+(>|$)").expect("markup pattern is valid"));

#[allow(clippy::expect_used)]
static BRACED_EXPRESSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("brace pattern is valid"));

/// Name used when the code declares no named function.
const DEFAULT_COMPONENT: &str = "Component";

/// What the preview pane shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    /// Component name, when the code looks like a component.
    pub component: Option<String>,
    /// Text to display.
    pub output: String,
}

/// Builds the preview for `code`.
///
/// Code that mentions neither `function` nor `return` is shown as-is.
#[must_use]
pub fn render_preview(code: &str) -> Preview {
    if !code.contains("function") && !code.contains("return") {
        return echo(code);
    }

    let component = FUNCTION_NAME
        .captures(code)
        .and_then(|caps| caps.get(1))
        .map_or(DEFAULT_COMPONENT, |m| m.as_str())
        .to_string();

    let content = RETURN_EXPRESSION
        .captures(code)
        .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map_or("", |m| m.as_str());

    let without_tags = MARKUP_TAG.replace_all(content, "");
    let text = BRACED_EXPRESSION.replace_all(&without_tags, "").trim().to_string();

    let output = if text.is_empty() {
        format!("{component} component rendered successfully")
    } else {
        text
    };

    Preview {
        component: Some(component),
        output,
    }
}

fn echo(code: &str) -> Preview {
    Preview {
        component: None,
        output: code.to_string(),
    }
}
