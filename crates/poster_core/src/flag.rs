/// Interpretation of a boolean-like CSV cell such as `posted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flag {
    Truthy,
    Falsy,
    /// Not a recognised spelling. Treated as falsy; callers should warn.
    Ambiguous,
}

impl Flag {
    /// Parse a cell, ignoring surrounding whitespace and ASCII case.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "y" | "t" => Flag::Truthy,
            "" | "0" | "false" | "no" | "n" => Flag::Falsy,
            _ => Flag::Ambiguous,
        }
    }

    pub fn is_truthy(self) -> bool {
        self == Flag::Truthy
    }
}
