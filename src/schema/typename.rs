//! Deterministic type-name generation
//!
//! Generated type names come from the full dotted selector path, so sibling
//! branches can never collide and rebuilding a schema yields the same names.

/// Derive a schema type name from a dotted selector path.
///
/// `Article.frontmatter.tags` becomes `ArticleFrontmatterTags`. Injective
/// over distinct selector paths and always succeeds for non-empty input.
pub fn create_type_name(selector: &str) -> String {
    selector.split('.').map(upper_first).collect()
}

/// Upper-case the first character, leaving the rest untouched
pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-camel-case a whitespace-separated phrase: `"Thing sortBy"`
/// becomes `"thingSortBy"`
pub fn camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for (i, word) in s.split_whitespace().enumerate() {
        if i == 0 {
            out.extend(word.chars().next().map(|c| c.to_ascii_lowercase()));
            out.push_str(word.get(1..).unwrap_or(""));
        } else {
            out.push_str(&upper_first(word));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_create_type_name_from_selector() {
        assert_eq!(create_type_name("Article"), "Article");
        assert_eq!(
            create_type_name("Article.frontmatter.tags"),
            "ArticleFrontmatterTags"
        );
        assert_eq!(create_type_name("thing.nested"), "ThingNested");
    }

    #[test]
    fn test_sibling_branches_never_collide() {
        // Both branches end in `author`, the full path keeps them apart.
        assert_ne!(
            create_type_name("Post.meta.author"),
            create_type_name("Post.frontmatter.author")
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(
            create_type_name("A.b.c.d"),
            create_type_name("A.b.c.d")
        );
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("Thing sortBy"), "thingSortBy");
        assert_eq!(camel_case("BlogPost sortOrderValues"), "blogPostSortOrderValues");
        assert_eq!(camel_case("one"), "one");
    }
}
