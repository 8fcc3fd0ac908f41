use similar::TextDiff;

/// Unified diff between two buffer states, labelled `before`/`after`.
/// Returns `None` when nothing changed.
pub fn build_unified_diff(before: &str, after: &str, label: &str) -> Option<String> {
    if before == after {
        return None;
    }

    let diff = TextDiff::from_lines(before, after);
    let header_old = format!("{label} (before)");
    let header_new = format!("{label} (after)");

    let mut output = Vec::new();
    diff.unified_diff()
        .context_radius(2)
        .header(&header_old, &header_new)
        .to_writer(&mut output)
        .expect("writing diff to a Vec never fails");

    Some(String::from_utf8(output).expect("diff of str inputs is valid utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unchanged_buffer_has_no_diff() {
        assert!(build_unified_diff("hello", "hello", "buffer").is_none());
    }

    #[test]
    fn appended_markup_shows_up() {
        let diff = build_unified_diff("hello\n", "hello\n<em></em>\n", "buffer").unwrap();
        assert!(diff.contains("buffer (after)"));
        assert!(diff.contains("+<em></em>"));
    }
}
