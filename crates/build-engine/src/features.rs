//! Feature flag translation

use rust_android_core::FeatureSelection;

/// Cargo flags for a feature selection
pub fn feature_args(selection: &FeatureSelection) -> Vec<String> {
    let mut args = Vec::new();

    match selection {
        FeatureSelection::All => args.push("--all-features".to_string()),
        FeatureSelection::DefaultAnd(features) => {
            if !features.is_empty() {
                args.push("--features".to_string());
                args.push(features.joined());
            }
        }
        FeatureSelection::NoDefaultBut(features) => {
            args.push("--no-default-features".to_string());
            if !features.is_empty() {
                args.push("--features".to_string());
                args.push(features.joined());
            }
        }
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_android_core::FeatureSet;

    #[test]
    fn test_all_features() {
        assert_eq!(feature_args(&FeatureSelection::All), vec!["--all-features"]);
    }

    #[test]
    fn test_default_and() {
        let empty = FeatureSelection::DefaultAnd(FeatureSet::default());
        assert!(feature_args(&empty).is_empty());

        let some = FeatureSelection::DefaultAnd(FeatureSet::new(["b", "a", "b"]));
        assert_eq!(feature_args(&some), vec!["--features", "b a"]);
    }

    #[test]
    fn test_no_default_but() {
        let empty = FeatureSelection::NoDefaultBut(FeatureSet::default());
        assert_eq!(feature_args(&empty), vec!["--no-default-features"]);

        let some = FeatureSelection::NoDefaultBut(FeatureSet::new(["x", "y"]));
        assert_eq!(
            feature_args(&some),
            vec!["--no-default-features", "--features", "x y"]
        );
    }
}
