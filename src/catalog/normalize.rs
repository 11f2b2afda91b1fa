/// Keep only ASCII digits. An empty payload yields an empty string.
pub fn normalize_digits(raw: &str) -> String {
    raw.chars().filter(|ch| ch.is_ascii_digit()).collect()
}
