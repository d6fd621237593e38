//! Locators and ordered locator sets.
//!
//! A [`LocatorSet`] lists alternative ways of finding one logical element
//! ("the login button"). Order is preference: the engine tries them front to
//! back and acts on the first actionable match.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a locator query is interpreted by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Css,
    #[serde(rename = "xpath")]
    XPath,
    Id,
    LinkText,
    /// Any element whose visible text contains the query.
    Text,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Css => "css",
            Strategy::XPath => "xpath",
            Strategy::Id => "id",
            Strategy::LinkText => "link_text",
            Strategy::Text => "text",
        }
    }
}

/// A single `(strategy, query)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    pub by: Strategy,
    pub query: String,
}

impl Locator {
    pub fn new(by: Strategy, query: impl Into<String>) -> Self {
        Self {
            by,
            query: query.into(),
        }
    }

    pub fn css(query: impl Into<String>) -> Self {
        Self::new(Strategy::Css, query)
    }

    pub fn xpath(query: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, query)
    }

    pub fn id(query: impl Into<String>) -> Self {
        Self::new(Strategy::Id, query)
    }

    pub fn text(query: impl Into<String>) -> Self {
        Self::new(Strategy::Text, query)
    }

    /// Lower strategies the driver has no native support for.
    ///
    /// `Text` becomes an XPath containment query; everything else is
    /// returned unchanged.
    pub fn lowered(&self) -> Locator {
        match self.by {
            Strategy::Text => Locator::xpath(format!(
                "//*[contains(normalize-space(.), {})]",
                xpath_literal(&self.query)
            )),
            _ => self.clone(),
        }
    }

    /// Substitute `{key}` tokens in the query.
    ///
    /// XPath queries receive the value as an XPath string literal body so that
    /// names containing quotes still produce a valid expression; the token
    /// must therefore sit inside single quotes in the template, e.g.
    /// `//div[contains(text(),'{restaurant}')]`.
    pub fn render(&self, vars: &[(&str, &str)]) -> Locator {
        let mut query = self.query.clone();
        for (key, value) in vars {
            let token = format!("{{{}}}", key);
            if !query.contains(&token) {
                continue;
            }
            query = match self.by {
                Strategy::XPath => {
                    let quoted = format!("'{}'", token);
                    if query.contains(&quoted) {
                        query.replace(&quoted, &xpath_literal(value))
                    } else {
                        query.replace(&token, value)
                    }
                }
                _ => query.replace(&token, value),
            };
        }
        Locator {
            by: self.by,
            query,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.by.name(), self.query)
    }
}

/// Ordered alternatives for the same logical UI target. First match wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorSet(pub Vec<Locator>);

impl LocatorSet {
    pub fn new(locators: Vec<Locator>) -> Self {
        Self(locators)
    }

    pub fn xpaths(queries: &[&str]) -> Self {
        Self(queries.iter().map(|q| Locator::xpath(*q)).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Locator> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Locator> {
        self.0.get(index)
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> LocatorSet {
        LocatorSet(self.0.iter().map(|l| l.render(vars)).collect())
    }
}

impl From<Vec<Locator>> for LocatorSet {
    fn from(locators: Vec<Locator>) -> Self {
        Self(locators)
    }
}

impl<'a> IntoIterator for &'a LocatorSet {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Quote a value as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so a value containing both quote kinds is
/// assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        return format!("'{}'", value);
    }
    if !value.contains('"') {
        return format!("\"{}\"", value);
    }
    let parts: Vec<String> = value
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xpath_literal_plain() {
        assert_eq!(xpath_literal("Chandrika Grand"), "'Chandrika Grand'");
    }

    #[test]
    fn test_xpath_literal_apostrophe() {
        assert_eq!(xpath_literal("Domino's"), "\"Domino's\"");
    }

    #[test]
    fn test_xpath_literal_both_quotes() {
        assert_eq!(
            xpath_literal(r#"Joe's "Grill""#),
            r#"concat('Joe', "'", 's "Grill"')"#
        );
    }

    #[test]
    fn test_render_xpath_template() {
        let l = Locator::xpath("//h3[contains(text(),'{restaurant}')]");
        let r = l.render(&[("restaurant", "Domino's")]);
        assert_eq!(r.query, "//h3[contains(text(),\"Domino's\")]");
    }

    #[test]
    fn test_render_css_template() {
        let l = Locator::css("[data-name='{restaurant}']");
        let r = l.render(&[("restaurant", "Paradise")]);
        assert_eq!(r.query, "[data-name='Paradise']");
    }

    #[test]
    fn test_render_leaves_unrelated_queries() {
        let set = LocatorSet::xpaths(&["//button", "//a[contains(text(),'{restaurant}')]"]);
        let rendered = set.render(&[("restaurant", "Meghana")]);
        assert_eq!(rendered.0[0].query, "//button");
        assert_eq!(rendered.0[1].query, "//a[contains(text(),'Meghana')]");
    }

    #[test]
    fn test_text_lowering() {
        let l = Locator::text("View Cart").lowered();
        assert_eq!(l.by, Strategy::XPath);
        assert_eq!(l.query, "//*[contains(normalize-space(.), 'View Cart')]");
    }

    #[test]
    fn test_locator_yaml_shape() {
        let yaml = "- by: xpath\n  query: //form\n- by: css\n  query: input[type='tel']\n";
        let set: LocatorSet = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.0[0], Locator::xpath("//form"));
        assert_eq!(set.0[1].by, Strategy::Css);
    }
}
