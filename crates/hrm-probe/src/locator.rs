//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an inert description of a DOM query. Nothing is resolved
//! when it is built: every driver call turns it into a fresh JavaScript
//! expression, so two actions on the same locator may hit different elements
//! if the document changed in between.

use std::fmt;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    XPath(String),
    /// Innermost elements whose text contains the string
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
    /// Combined selector with text filter (case-insensitive, like `:has-text`)
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// CSS selector evaluated inside the element another locator resolves to
    Within {
        /// Scope element
        scope: Box<Locator>,
        /// CSS selector relative to the scope
        css: String,
    },
    /// Union of two selectors in document order
    Either(Box<Selector>, Box<Selector>),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// JavaScript expression evaluating to an `Array<Element>` of all matches
    #[must_use]
    pub fn to_elements_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::XPath(s) => format!(
                "((r) => Array.from({{ length: r.snapshotLength }}, (_, i) => r.snapshotItem(i)))\
                 (document.evaluate({s:?}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null))"
            ),
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.includes({t:?}) && \
                 !Array.from(el.children).some(c => c.textContent.includes({t:?})))"
            ),
            Self::TestId(id) => {
                format!("Array.from(document.querySelectorAll('[data-testid={id:?}]'))")
            }
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => \
                 el.textContent.toLowerCase().includes({:?}))",
                text.to_lowercase()
            ),
            Self::Within { scope, css } => format!(
                "((root) => root ? Array.from(root.querySelectorAll({css:?})) : [])({})",
                scope.to_element_query()
            ),
            Self::Either(a, b) => format!(
                "Array.from(new Set([...{}, ...{}])).sort((x, y) => \
                 x.compareDocumentPosition(y) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1)",
                a.to_elements_query(),
                b.to_elements_query()
            ),
        }
    }

    /// JavaScript expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("({}).length", self.to_elements_query())
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::XPath(s) => write!(f, "xpath={s}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> has-text={text}"),
            Self::Within { scope, css } => write!(f, "{scope} >> css={css}"),
            Self::Either(a, b) => write!(f, "{a} || {b}"),
        }
    }
}

/// Which match of a selector a locator acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    /// First match in document order
    #[default]
    First,
    /// Zero-based match index
    Nth(usize),
    /// Last match in document order
    Last,
}

/// A locator for finding and interacting with elements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    selector: Selector,
    position: Position,
}

impl Locator {
    /// Create a new locator with a CSS selector
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            position: Position::First,
        }
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::from_selector(Selector::XPath(expression.into()))
    }

    /// Text locator
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::text(text))
    }

    /// Filter by text content.
    ///
    /// Only CSS locators can carry a text filter; other selectors are
    /// returned unchanged.
    #[must_use]
    pub fn with_text(self, text: impl Into<String>) -> Self {
        let selector = match self.selector {
            Selector::Css(css) => Selector::CssWithText {
                css,
                text: text.into(),
            },
            other => other,
        };
        Self { selector, ..self }
    }

    /// Locate descendants matching `css` inside this locator's element
    #[must_use]
    pub fn locator(&self, css: impl Into<String>) -> Self {
        Self::from_selector(Selector::Within {
            scope: Box::new(self.clone()),
            css: css.into(),
        })
    }

    /// Match either this locator's selector or the other one
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::from_selector(Selector::Either(
            Box::new(self.selector),
            Box::new(other.selector),
        ))
    }

    #[must_use]
    pub fn first(self) -> Self {
        Self {
            position: Position::First,
            ..self
        }
    }

    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self {
            position: Position::Nth(index),
            ..self
        }
    }

    #[must_use]
    pub fn last(self) -> Self {
        Self {
            position: Position::Last,
            ..self
        }
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// JavaScript expression evaluating to the targeted element or `null`
    #[must_use]
    pub fn to_element_query(&self) -> String {
        let pick = match self.position {
            Position::First => "els[0]".to_string(),
            Position::Nth(i) => format!("els[{i}]"),
            Position::Last => "els[els.length - 1]".to_string(),
        };
        format!(
            "((els) => {pick} ?? null)({})",
            self.selector.to_elements_query()
        )
    }

    /// JavaScript expression evaluating to the number of selector matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        self.selector.to_count_query()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        match self.position {
            Position::First => Ok(()),
            Position::Nth(i) => write!(f, " >> nth={i}"),
            Position::Last => write!(f, " >> last"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod selector_tests {
        use super::*;

        #[test]
        fn test_css_selector() {
            let selector = Selector::css("button.primary");
            let query = selector.to_elements_query();
            assert!(query.contains("querySelectorAll"));
            assert!(query.contains("button.primary"));
        }

        #[test]
        fn test_test_id_selector() {
            let query = Selector::test_id("login").to_elements_query();
            assert!(query.contains("data-testid"));
        }

        #[test]
        fn test_xpath_selector() {
            let query = Selector::XPath("//label".into()).to_elements_query();
            assert!(query.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(query.contains("//label"));
        }

        #[test]
        fn test_css_with_text_is_case_insensitive() {
            let selector = Selector::CssWithText {
                css: "button".into(),
                text: "Search".into(),
            };
            let query = selector.to_elements_query();
            assert!(query.contains("toLowerCase()"));
            assert!(query.contains("\"search\""));
        }

        #[test]
        fn test_quotes_are_escaped() {
            let query = Selector::css("input[name=\"username\"]").to_elements_query();
            assert!(query.contains(r#""input[name=\"username\"]""#));
        }

        #[test]
        fn test_count_query() {
            let query = Selector::css(".oxd-table-row").to_count_query();
            assert!(query.ends_with(".length"));
        }

        #[test]
        fn test_display() {
            assert_eq!(Selector::css("h6").to_string(), "css=h6");
            let either = Selector::Either(
                Box::new(Selector::css("a")),
                Box::new(Selector::text("b")),
            );
            assert_eq!(either.to_string(), "css=a || text=b");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_locator_new() {
            let locator = Locator::new("button");
            assert!(matches!(locator.selector(), Selector::Css(s) if s == "button"));
            assert_eq!(locator.position(), Position::First);
        }

        #[test]
        fn test_locator_with_text() {
            let locator = Locator::new("button").with_text("Save");
            assert!(matches!(locator.selector(), Selector::CssWithText { .. }));
            assert_eq!(locator.to_string(), "css=button >> has-text=Save");
        }

        #[test]
        fn test_with_text_ignored_for_xpath() {
            let locator = Locator::xpath("//a").with_text("x");
            assert!(matches!(locator.selector(), Selector::XPath(_)));
        }

        #[test]
        fn test_positions() {
            let base = Locator::new(".oxd-select-text-input");
            assert!(base.clone().nth(1).to_element_query().contains("els[1]"));
            assert!(base
                .clone()
                .last()
                .to_element_query()
                .contains("els[els.length - 1]"));
            assert_eq!(base.nth(2).to_string(), "css=.oxd-select-text-input >> nth=2");
        }

        #[test]
        fn test_scoped_locator() {
            let row = Locator::new(".oxd-table-row").with_text("Admin");
            let button = row.locator("button.oxd-button--label-danger");
            let query = button.to_element_query();
            assert!(query.contains("root.querySelectorAll"));
            assert!(query.contains("\"admin\""));
            assert_eq!(
                button.to_string(),
                "css=.oxd-table-row >> has-text=Admin >> css=button.oxd-button--label-danger"
            );
        }

        #[test]
        fn test_or_locator() {
            let locator = Locator::new("a").or(Locator::new("b"));
            assert!(locator.to_element_query().contains("compareDocumentPosition"));
        }
    }
}
