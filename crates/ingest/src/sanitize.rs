/// Characters that make a spreadsheet program treat a cell as a formula.
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

/// Neutralize spreadsheet-formula-injection payloads cell by cell.
///
/// Cells are split on commas without quoted-field semantics: extraction is
/// delegated downstream, so the line is just a flat text blob to neutralize
/// for any human who later opens the stored or re-exported CSV in
/// spreadsheet software. The guard applies to every row, header included.
pub fn sanitize_csv(raw_csv: &str) -> String {
    raw_csv
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(sanitize_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn sanitize_line(line: &str) -> String {
    line.split(',')
        .map(sanitize_cell)
        .collect::<Vec<_>>()
        .join(",")
}

fn sanitize_cell(cell: &str) -> String {
    let trimmed = cell.trim();
    match trimmed.chars().next() {
        Some(c) if FORMULA_TRIGGERS.contains(&c) => format!("'{trimmed}"),
        _ => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cells_pass_through() {
        assert_eq!(sanitize_csv("date,description,amount"), "date,description,amount");
    }

    #[test]
    fn formula_cells_get_quoted() {
        assert_eq!(sanitize_cell("=SUM(A1:A9)"), "'=SUM(A1:A9)");
        assert_eq!(sanitize_cell("+1234"), "'+1234");
        assert_eq!(sanitize_cell("@cmd"), "'@cmd");
        assert_eq!(sanitize_cell("-42.50"), "'-42.50");
    }

    #[test]
    fn leading_whitespace_triggers_are_absorbed_by_the_trim() {
        // Trimming runs before the first-character check, so a leading tab or
        // CR is stripped rather than quoted.
        assert_eq!(sanitize_cell("\tpayload"), "payload");
        assert_eq!(sanitize_cell("a\tb"), "a\tb");
    }

    #[test]
    fn cells_are_trimmed() {
        assert_eq!(sanitize_cell("  coffee  "), "coffee");
    }

    #[test]
    fn negative_amounts_are_neutralized_too() {
        // The guard is uniform; it does not try to distinguish amounts from
        // formulas. The extraction service sees the quote and copes.
        assert_eq!(
            sanitize_csv("2024-01-15,STARBUCKS,-5.50"),
            "2024-01-15,STARBUCKS,'-5.50"
        );
    }

    #[test]
    fn header_row_is_sanitized_like_any_other() {
        assert_eq!(sanitize_csv("=date,desc\n2024-01-15,ok"), "'=date,desc\n2024-01-15,ok");
    }

    #[test]
    fn sanitizing_twice_is_the_same_as_once() {
        let input = "date,description,amount\n2024-01-15,=HYPERLINK(\"evil\"),-5.50\n@IMPORT,+4,ok";
        let once = sanitize_csv(input);
        let twice = sanitize_csv(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn blank_lines_are_dropped() {
        assert_eq!(sanitize_csv("a,b\n\n   \nc,d\n"), "a,b\nc,d");
    }
}
