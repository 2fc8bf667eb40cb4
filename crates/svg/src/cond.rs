//! Conditional processing attributes for `switch` children.

use crate::document::SvgNode;

const SUPPORTED_FEATURES: &[&str] = &["org.w3c.svg.static", "org.w3c.dom.svg.all"];

const SUPPORTED_LANGUAGE: &str = "en";

/// Whether `node` passes `requiredExtensions`, `requiredFeatures` and
/// `systemLanguage`.
pub fn passes(node: &SvgNode) -> bool {
    // No extension namespaces are understood.
    if node.has_attribute("requiredExtensions") {
        return false;
    }
    if let Some(features) = node.attribute("requiredFeatures") {
        if !features
            .split_whitespace()
            .all(|feature| SUPPORTED_FEATURES.contains(&feature))
        {
            return false;
        }
    }
    if let Some(languages) = node.attribute("systemLanguage") {
        return languages.split(',').any(|tag| {
            let primary = tag.trim().split('-').next().unwrap_or_default();
            primary.eq_ignore_ascii_case(SUPPORTED_LANGUAGE)
        });
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::SvgDocument;

    fn check(attributes: &str) -> bool {
        let doc = SvgDocument::parse(&format!("<svg><g id=\"t\" {}/></svg>", attributes)).unwrap();
        passes(doc.node(doc.lookup("t").unwrap()))
    }

    #[test]
    fn no_conditions_pass() {
        assert!(check(""));
    }

    #[test]
    fn extensions_never_pass() {
        assert!(!check(r#"requiredExtensions="http://example.org/ext""#));
        assert!(!check(r#"requiredExtensions="""#));
    }

    #[test]
    fn only_static_features_pass() {
        assert!(check(r#"requiredFeatures="org.w3c.svg.static""#));
        assert!(check(r#"requiredFeatures="org.w3c.svg.static org.w3c.dom.svg.all""#));
        assert!(!check(r#"requiredFeatures="http://www.w3.org/TR/SVG11/feature#Shape""#));
    }

    #[test]
    fn english_variants_pass() {
        assert!(check(r#"systemLanguage="en""#));
        assert!(check(r#"systemLanguage="fr, en-US""#));
        assert!(!check(r#"systemLanguage="de""#));
    }
}
