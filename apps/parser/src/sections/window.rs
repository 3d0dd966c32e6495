/// A bounded run of consecutive lines starting at a trigger line.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub start: usize,
    /// The window's lines joined with `\n`, so patterns stay line-bounded.
    pub text: String,
}

/// Scans `text` line by line and opens a window at every line that contains one
/// of `triggers`. Each window covers the trigger line plus up to `lookahead`
/// following lines, clipped at the end of the text.
///
/// Triggers are compared against the lowercased line, so ASCII triggers must be
/// written in lowercase; CJK triggers are unaffected by case folding.
///
/// Windows are not merged: nearby triggers yield overlapping windows, and
/// each one may produce its own entry downstream.
pub fn trigger_windows(text: &str, triggers: &[&str], lookahead: usize) -> Vec<Window> {
    let lines: Vec<&str> = text.lines().collect();
    let mut windows = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let lowered = line.to_lowercase();
        if !triggers.iter().any(|t| lowered.contains(t)) {
            continue;
        }
        let end = (i + lookahead).min(lines.len() - 1);
        windows.push(Window {
            start: i,
            text: lines[i..=end].join("\n"),
        });
    }

    windows
}

/// First keyword (in list order) contained in `haystack`.
pub fn first_keyword<'k>(haystack: &str, keywords: &[&'k str]) -> Option<&'k str> {
    keywords.iter().copied().find(|k| haystack.contains(k))
}
