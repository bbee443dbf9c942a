//! Minimal CSV writer for catalog export.

/// Quotes a field when it contains the delimiter, a quote or a line break.
pub fn escape_csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

pub fn csv_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Header line plus one line per row, `\n` terminated.
pub fn build_csv<S: AsRef<str>>(headers: &[&str], rows: &[Vec<S>]) -> String {
    let mut out = String::new();
    out.push_str(&csv_row(headers));
    out.push('\n');
    for row in rows {
        out.push_str(&csv_row(row));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_csv_field() {
        assert_eq!(escape_csv_field("Oreo"), "Oreo");
        assert_eq!(escape_csv_field("Mie, goreng"), "\"Mie, goreng\"");
        assert_eq!(escape_csv_field("12\" pizza"), "\"12\"\" pizza\"");
        assert_eq!(escape_csv_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn test_build_csv() {
        let rows = vec![
            vec!["1".to_string(), "Kopiko".to_string(), "".to_string()],
            vec!["2".to_string(), "Roma, Kelapa".to_string(), "x".to_string()],
        ];
        let out = build_csv(&["id", "name", "image_url"], &rows);
        assert_eq!(
            out,
            "id,name,image_url\n1,Kopiko,\n2,\"Roma, Kelapa\",x\n"
        );
    }
}
