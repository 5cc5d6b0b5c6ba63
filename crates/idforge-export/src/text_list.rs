/// Split free text into barcode items: one per line, blank lines dropped.
///
/// Non-blank lines are kept exactly as typed, surrounding whitespace included.
pub fn parse_text_list(input: &str) -> Vec<String> {
    input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}
