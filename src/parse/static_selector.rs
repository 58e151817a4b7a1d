use std::sync::OnceLock;

use scraper::Selector;

/// A css selector compiled on first use.
///
/// Only ever built from string literals, so a parse failure is a bug in this
/// crate and panics.
#[derive(Debug)]
pub struct StaticSelector {
    css: &'static str,
    compiled: OnceLock<Selector>,
}

impl StaticSelector {
    pub const fn new(css: &'static str) -> Self {
        Self {
            css,
            compiled: OnceLock::new(),
        }
    }

    pub const fn css(&self) -> &'static str {
        self.css
    }
}

impl core::ops::Deref for StaticSelector {
    type Target = Selector;

    fn deref(&self) -> &Selector {
        self.compiled.get_or_init(|| {
            Selector::parse(self.css)
                .unwrap_or_else(|e| panic!("invalid static selector {:?}: {e:?}", self.css))
        })
    }
}

#[macro_export]
macro_rules! static_selector {
    ($x: ident <- $sel: literal) => {
        static $x: $crate::parse::StaticSelector = $crate::parse::StaticSelector::new($sel);
    };
}
