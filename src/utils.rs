use indicatif::{ProgressBar, ProgressStyle};
use std::cmp::Ordering;

/// Compare two strings the way a human orders file names: runs of digits are
/// compared by numeric value, so `frame2` sorts before `frame10`.
///
/// Names are split into alternating text and digit chunks and compared chunk
/// by chunk, so `a1.jpg` (`a`, `1`, `.jpg`) sorts before `a.jpg` (`a.jpg`).
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = split_chunks(a);
    let right = split_chunks(b);

    for (i, (l, r)) in left.iter().zip(&right).enumerate() {
        let ord = if i % 2 == 1 {
            compare_digit_runs(l, r)
        } else {
            l.cmp(r)
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

// Even indices hold text, odd indices digit runs; a leading digit run gets an
// empty text chunk in front so both sides always line up.
fn split_chunks(s: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut in_digits = None;
    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(previous) if previous != digit => {
                chunks.push(&s[start..i]);
                start = i;
            }
            None if digit => chunks.push(""),
            _ => {}
        }
        in_digits = Some(digit);
    }
    if start < s.len() {
        chunks.push(&s[start..]);
    }
    chunks
}

// Equal values with more leading zeros sort last so the order stays total.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Strip the last `.ext` from a file name; names without a dot are returned as-is.
pub fn strip_extension(file_name: &str) -> &str {
    file_name
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(file_name)
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
