//! Source preprocessing
//!
//! Normalizes inputs before parsing: shebang lines are neutralized and Vue
//! single-file components are reduced to their `<script>` block. Both
//! transformations preserve byte offsets and line numbers, so spans
//! reported downstream match the original file.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("script block pattern")
});

/// Replace a leading `#!` line with a line comment of equal length
pub fn strip_shebang(source: &str) -> String {
    if let Some(rest) = source.strip_prefix("#!") {
        format!("//{}", rest)
    } else {
        source.to_string()
    }
}

/// Extract the `<script>` block of a Vue single-file component
///
/// Everything outside the block is blanked: non-newline bytes become
/// spaces, newlines are kept. Returns `None` when no script block exists.
pub fn extract_vue_script(source: &str) -> Option<String> {
    let caps = SCRIPT_BLOCK.captures(source)?;
    let script = caps.get(1)?;

    let mut out = String::with_capacity(source.len());
    for (idx, ch) in source.char_indices() {
        let inside = idx >= script.start() && idx < script.end();
        if inside || ch == '\n' {
            out.push(ch);
        } else {
            // pad with spaces, one per byte, to keep offsets stable
            for _ in 0..ch.len_utf8() {
                out.push(' ');
            }
        }
    }
    Some(out)
}

/// Full preprocessing for one input file
///
/// `.vue` files without a script block degrade to an empty module.
pub fn preprocess(path: &str, source: &str) -> String {
    let source = strip_shebang(source);
    if path.ends_with(".vue") {
        extract_vue_script(&source).unwrap_or_else(|| {
            source.chars().map(|c| if c == '\n' { c } else { ' ' }).collect()
        })
    } else {
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_shebang_preserves_length() {
        let src = "#!/usr/bin/env node\nvar x = 1;\n";
        let out = strip_shebang(src);
        assert_eq!(out.len(), src.len());
        assert!(out.starts_with("//"));
        assert!(out.contains("var x = 1;"));
    }

    #[test]
    fn test_no_shebang_untouched() {
        let src = "var x = 1;\n";
        assert_eq!(strip_shebang(src), src);
    }

    #[test]
    fn test_vue_script_extraction_keeps_lines() {
        let src = "<template>\n  <div/>\n</template>\n<script>\nfunction f() {}\n</script>\n";
        let out = extract_vue_script(src).unwrap();
        assert_eq!(out.lines().count(), src.lines().count());
        // the function still starts on line 5
        let line = out.lines().nth(4).unwrap();
        assert_eq!(line, "function f() {}");
    }

    #[test]
    fn test_vue_without_script() {
        let src = "<template><div/></template>";
        assert!(extract_vue_script(src).is_none());
        let out = preprocess("a.vue", src);
        assert!(out.trim().is_empty());
    }
}
