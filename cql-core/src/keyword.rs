use core::fmt;

/// Defines the `Keyword` enum together with its parallel, sorted string
/// table, so lookup can use binary search.
macro_rules! define_keywords {
    ($( $variant:ident => $string:expr ),* $(,)?) => {
        /// A reserved word of the CQL language.
        ///
        /// The lexer lowercases every alphabetic run before keyword
        /// classification, so the table only contains lowercase entries.
        /// `OrderBy` and `GroupBy` are never produced by the scanner
        /// itself; they appear when deep partition fuses the two-word
        /// forms.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
        pub enum Keyword {
            $(
                #[allow(missing_docs)]
                $variant,
            )*
        }

        /// All keywords, in the same order as [`KEYWORD_STRINGS`].
        const KEYWORDS: &[Keyword] = &[ $(Keyword::$variant),* ];

        /// All keyword strings, sorted for binary search.
        const KEYWORD_STRINGS: &[&str] = &[ $($string),* ];

        impl Keyword {
            /// Returns the textual form of the keyword.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Keyword::$variant => $string),*
                }
            }
        }
    };
}

define_keywords! {
    Abs => "abs",
    Acos => "acos",
    Agg => "agg",
    And => "and",
    Asc => "asc",
    Asin => "asin",
    Atan => "atan",
    By => "by",
    Cos => "cos",
    Count => "count",
    Create => "create",
    Delete => "delete",
    Desc => "desc",
    Dest => "dest",
    Disp => "disp",
    Exists => "exists",
    Exp => "exp",
    False => "false",
    From => "from",
    Group => "group",
    GroupBy => "group by",
    Having => "having",
    If => "if",
    In => "in",
    Insert => "insert",
    Into => "into",
    Limit => "limit",
    Ln => "ln",
    Load => "load",
    Max => "max",
    Min => "min",
    Not => "not",
    Offset => "offset",
    Or => "or",
    Order => "order",
    OrderBy => "order by",
    Read => "read",
    Schema => "schema",
    Select => "select",
    Set => "set",
    Sgn => "sgn",
    Sin => "sin",
    Sqr => "sqr",
    Sqrt => "sqrt",
    Sum => "sum",
    Table => "table",
    Tan => "tan",
    ToBool => "tobool",
    ToFloat => "tofloat",
    ToStr => "tostr",
    True => "true",
    Update => "update",
    Values => "values",
    Var => "var",
    Watch => "watch",
    Where => "where",
    Xor => "xor",
}

impl Keyword {
    /// Looks up a lowercased word in the keyword table.
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORD_STRINGS
            .binary_search(&word)
            .map(|idx| KEYWORDS[idx])
            .ok()
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_strings_are_sorted() {
        let mut sorted = KEYWORD_STRINGS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, KEYWORD_STRINGS);
    }

    #[test]
    fn lookup_round_trips() {
        for (kw, s) in KEYWORDS.iter().zip(KEYWORD_STRINGS) {
            assert_eq!(Keyword::lookup(s), Some(*kw));
        }
        assert_eq!(Keyword::lookup("people"), None);
        assert_eq!(Keyword::lookup("SELECT"), None);
    }
}
