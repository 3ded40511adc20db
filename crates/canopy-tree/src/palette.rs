//! Class color palettes.

use std::fmt;
use std::str::FromStr;

use crate::TreeError;

/// Qualitative 8-color palette (ColorBrewer Dark2).
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#1B9E77", "#D95F02", "#7570B3", "#E7298A", "#66A61E", "#E6AB02", "#A6761D", "#666666",
];

/// Where node colors come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColorScheme {
    /// The first `n_classes` entries of [`DEFAULT_PALETTE`].
    #[default]
    Default,
    /// One caller-supplied color per class.
    Explicit(Vec<String>),
}

impl ColorScheme {
    /// Resolve the scheme to exactly one color per class.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::ColorCountMismatch`] if the default palette has
    /// fewer entries than `n_classes`, or an explicit list's length differs
    /// from `n_classes`.
    pub fn resolve(&self, n_classes: usize) -> Result<Vec<String>, TreeError> {
        let colors: Vec<String> = match self {
            ColorScheme::Default => {
                if n_classes > DEFAULT_PALETTE.len() {
                    return Err(TreeError::ColorCountMismatch {
                        n_colors: DEFAULT_PALETTE.len(),
                        n_classes,
                    });
                }
                DEFAULT_PALETTE[..n_classes]
                    .iter()
                    .map(|c| (*c).to_string())
                    .collect()
            }
            ColorScheme::Explicit(colors) => colors.clone(),
        };
        if colors.len() != n_classes {
            return Err(TreeError::ColorCountMismatch {
                n_colors: colors.len(),
                n_classes,
            });
        }
        Ok(colors)
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorScheme::Default => f.write_str("default"),
            ColorScheme::Explicit(colors) => f.write_str(&colors.join(",")),
        }
    }
}

/// Parses `"default"` or a comma-separated color list.
impl FromStr for ColorScheme {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "default" {
            return Ok(ColorScheme::Default);
        }
        let colors: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        if colors.is_empty() {
            return Err(TreeError::UnknownOption {
                option: "colors",
                value: s.to_string(),
                expected: "default, or a comma-separated color list",
            });
        }
        Ok(ColorScheme::Explicit(colors))
    }
}

/// Index of the largest class count. Ties go to the first maximum.
///
/// Returns 0 for an empty slice.
#[must_use]
pub fn majority_class(class_counts: &[u64]) -> usize {
    class_counts
        .iter()
        .enumerate()
        .fold((0, None), |(best, best_count), (i, &count)| match best_count {
            Some(b) if count <= b => (best, best_count),
            _ => (i, Some(count)),
        })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_truncated_to_class_count() {
        let colors = ColorScheme::Default.resolve(3).unwrap();
        assert_eq!(colors, vec!["#1B9E77", "#D95F02", "#7570B3"]);
    }

    #[test]
    fn default_palette_fits_eight_classes() {
        assert_eq!(ColorScheme::Default.resolve(8).unwrap().len(), 8);
    }

    #[test]
    fn default_palette_rejects_nine_classes() {
        let err = ColorScheme::Default.resolve(9).unwrap_err();
        assert!(matches!(
            err,
            TreeError::ColorCountMismatch { n_colors: 8, n_classes: 9 }
        ));
    }

    #[test]
    fn explicit_list_must_match_class_count() {
        let scheme = ColorScheme::Explicit(vec!["a".into(), "b".into(), "c".into()]);
        let err = scheme.resolve(4).unwrap_err();
        assert!(matches!(
            err,
            TreeError::ColorCountMismatch { n_colors: 3, n_classes: 4 }
        ));
        assert_eq!(scheme.resolve(3).unwrap().len(), 3);
    }

    #[test]
    fn parse_default_and_list() {
        assert_eq!("default".parse::<ColorScheme>().unwrap(), ColorScheme::Default);
        assert_eq!(
            "red, blue".parse::<ColorScheme>().unwrap(),
            ColorScheme::Explicit(vec!["red".into(), "blue".into()])
        );
        assert!(",".parse::<ColorScheme>().is_err());
    }

    #[test]
    fn majority_picks_largest() {
        assert_eq!(majority_class(&[1, 9, 3]), 1);
    }

    #[test]
    fn majority_tie_goes_to_first_index() {
        assert_eq!(majority_class(&[2, 5, 5, 1]), 1);
        assert_eq!(majority_class(&[0, 0]), 0);
    }

    #[test]
    fn majority_of_empty_is_zero() {
        assert_eq!(majority_class(&[]), 0);
    }
}
