//! Choice of the `x`, `y` and `value` display columns.
//!
//! Each projection takes the first column, in source order, whose lowercased
//! name contains one of its keywords. Column order therefore matters when more
//! than one name matches.

/// Fallback for the value column when no keyword matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueFallback {
    First,
    Last,
}

/// Keyword rules for one container kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectionRules {
    pub x: &'static [&'static str],
    pub y: &'static [&'static str],
    pub value: &'static [&'static str],
    pub value_fallback: ValueFallback,
}

/// Delimited text files.
pub(crate) const TABULAR_RULES: ProjectionRules = ProjectionRules {
    x: &["ra", "x"],
    y: &["dec", "y"],
    value: &["flux", "mag", "val"],
    value_fallback: ValueFallback::First,
};

/// Binary table sub-units.
pub(crate) const TABLE_RULES: ProjectionRules = ProjectionRules {
    x: &["ra", "x"],
    y: &["dec", "y"],
    value: &["flux", "mag", "err"],
    value_fallback: ValueFallback::Last,
};

/// Indices of the projected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Projection {
    pub x: usize,
    pub y: usize,
    pub value: usize,
}

impl Projection {
    /// Pick projection columns among `names`; `None` when there are none.
    pub fn choose<S: AsRef<str>>(names: &[S], rules: &ProjectionRules) -> Option<Self> {
        if names.is_empty() {
            return None;
        }
        let lowered: Vec<String> = names
            .iter()
            .map(|name| name.as_ref().to_lowercase())
            .collect();
        let find = |keywords: &[&str]| {
            lowered
                .iter()
                .position(|name| keywords.iter().any(|keyword| name.contains(keyword)))
        };
        let last = names.len() - 1;
        Some(Self {
            x: find(rules.x).unwrap_or(0),
            y: find(rules.y).unwrap_or(1.min(last)),
            value: find(rules.value).unwrap_or(match rules.value_fallback {
                ValueFallback::First => 0,
                ValueFallback::Last => last,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_pick_first_match_in_order() {
        let names = ["RA_J2000", "Dec_deg", "FluX_Val"];
        let projection = Projection::choose(&names, &TABULAR_RULES).unwrap();
        assert_eq!(
            projection,
            Projection {
                x: 0,
                y: 1,
                value: 2
            }
        );
    }

    #[test]
    fn fallbacks_when_nothing_matches() {
        let names = ["a", "b", "c"];
        let tabular = Projection::choose(&names, &TABULAR_RULES).unwrap();
        assert_eq!((tabular.x, tabular.y, tabular.value), (0, 1, 0));
        let table = Projection::choose(&names, &TABLE_RULES).unwrap();
        assert_eq!(table.value, 2);

        let single = Projection::choose(&["only"], &TABULAR_RULES).unwrap();
        assert_eq!((single.x, single.y, single.value), (0, 0, 0));
        assert!(Projection::choose::<&str>(&[], &TABULAR_RULES).is_none());
    }

    #[test]
    fn substring_matches_are_order_dependent() {
        // "flux" contains "x", so it wins the x slot when listed first.
        let names = ["flux", "ra"];
        let projection = Projection::choose(&names, &TABULAR_RULES).unwrap();
        assert_eq!(projection.x, 0);
        assert_eq!(projection.value, 0);
    }
}
