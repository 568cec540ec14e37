/// Strips invisible and control characters and collapses runs of whitespace.
pub(crate) fn normalize_text(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '\u{feff}' | '\u{200b}' | '\u{a0}' => ' ',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::normalize_text;

    #[test]
    fn removes_invisible_characters_and_extra_spaces() {
        assert_eq!(normalize_text("\u{feff}Hot  Springs "), "Hot Springs");
        assert_eq!(normalize_text("Papua\u{a0}New Guinea"), "Papua New Guinea");
        assert_eq!(normalize_text("Ar/Ar"), "Ar/Ar");
    }

    #[test]
    fn control_characters_become_spaces() {
        assert_eq!(normalize_text("Sub\u{1f}marine"), "Sub marine");
        assert_eq!(normalize_text("Japan\u{0}"), "Japan");
    }

    #[test]
    fn keeps_case() {
        assert_eq!(normalize_text("  Pleistocene-Fumarol"), "Pleistocene-Fumarol");
    }
}
