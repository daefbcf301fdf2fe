/// Prefix that marks a pathspec entry as an exclusion.
pub const EXCLUDE_MARKER: &str = ":!";

pub fn is_blank(path: &str) -> bool {
    path.trim().is_empty()
}

/// Build the provider pathspec: included paths first, then excluded paths
/// prefixed with [`EXCLUDE_MARKER`]. Blank entries are dropped, duplicates kept.
pub fn build_pathspec<I, E>(included: &[I], excluded: &[E]) -> Vec<String>
where
    I: AsRef<str>,
    E: AsRef<str>,
{
    let included = included
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !is_blank(p))
        .map(str::to_string);
    let excluded = excluded
        .iter()
        .map(AsRef::as_ref)
        .filter(|p| !is_blank(p))
        .map(|p| format!("{EXCLUDE_MARKER}{p}"));
    included.chain(excluded).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_lists_give_empty_pathspec() {
        let none: [&str; 0] = [];
        assert_eq!(build_pathspec(&none, &none), Vec::<String>::new());
    }

    #[test]
    fn blanks_dropped_and_exclusions_prefixed() {
        assert_eq!(build_pathspec(&["a", " "], &["b"]), vec!["a", ":!b"]);
    }

    #[test]
    fn order_preserved_and_duplicates_kept() {
        let spec = build_pathspec(&["src", "\t", "src", "docs"], &["", "target", "src/gen"]);
        assert_eq!(spec, vec!["src", "src", "docs", ":!target", ":!src/gen"]);
    }

    #[test]
    fn entries_are_not_trimmed() {
        assert_eq!(build_pathspec(&[" a "], &["b "]), vec![" a ", ":!b "]);
    }
}
