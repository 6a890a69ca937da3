use widgetlink_core::config::PlaceholderConfig;

/// The two kinds of element the server emits around a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Container whose content is replaced on inline refresh.
    Content,
    /// Nested browsing context navigated on refresh.
    NestedContext,
}

/// `prefix + path (with "/" as "__") + suffix`.
pub fn element_id(placeholders: &PlaceholderConfig, kind: PlaceholderKind, path: &str) -> String {
    let prefix = match kind {
        PlaceholderKind::Content => &placeholders.content_prefix,
        PlaceholderKind::NestedContext => &placeholders.nested_prefix,
    };
    format!("{}{}{}", prefix, path.replace('/', "__"), placeholders.suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_slash_is_replaced() {
        let cfg = PlaceholderConfig::default();
        assert_eq!(
            element_id(&cfg, PlaceholderKind::Content, "a/b/c"),
            "beng_widget___a__b__c__"
        );
        assert_eq!(
            element_id(&cfg, PlaceholderKind::NestedContext, "top"),
            "beng_iframe___top__"
        );
    }

    #[test]
    fn test_custom_convention() {
        let cfg = PlaceholderConfig {
            content_prefix: "w-".to_string(),
            nested_prefix: "f-".to_string(),
            suffix: String::new(),
        };
        assert_eq!(element_id(&cfg, PlaceholderKind::Content, "a/b"), "w-a__b");
    }
}
