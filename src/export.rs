//! Tabular exports for the back office: semicolon-delimited text for
//! spreadsheet import, and a standalone print-ready HTML document.

pub const DELIMITER: char = ';';

fn escape_field(field: &str) -> String {
    if field.contains(DELIMITER) || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn delimited_document(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = String::new();
    let header_line = headers
        .iter()
        .map(|h| escape_field(h))
        .collect::<Vec<_>>()
        .join(&DELIMITER.to_string());
    out.push_str(&header_line);
    out.push('\n');
    for row in rows {
        let line = row
            .iter()
            .map(|field| escape_field(field))
            .collect::<Vec<_>>()
            .join(&DELIMITER.to_string());
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub struct PrintSection {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A self-contained document meant for the browser's print dialog; the same
/// result sets as the delimited export, laid out as titled tables.
pub fn printable_document(title: &str, generated_at: &str, sections: &[PrintSection]) -> String {
    let mut body = String::new();
    body.push_str(&format!(
        "<h1>{}</h1>\n<p class=\"meta\">Generated: {}</p>\n",
        escape_html(title),
        escape_html(generated_at)
    ));
    for section in sections {
        body.push_str(&format!("<h2>{}</h2>\n<table>\n<thead><tr>", escape_html(&section.title)));
        for header in &section.headers {
            body.push_str(&format!("<th>{}</th>", escape_html(header)));
        }
        body.push_str("</tr></thead>\n<tbody>\n");
        for row in &section.rows {
            body.push_str("<tr>");
            for field in row {
                body.push_str(&format!("<td>{}</td>", escape_html(field)));
            }
            body.push_str("</tr>\n");
        }
        body.push_str("</tbody>\n</table>\n");
    }
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
body {{ font-family: serif; margin: 2em; }}
h1 {{ font-size: 1.4em; }}
h2 {{ font-size: 1.1em; margin-top: 1.5em; }}
p.meta {{ color: #555; }}
table {{ border-collapse: collapse; width: 100%; page-break-inside: avoid; }}
th, td {{ border-bottom: 1px solid #ccc; padding: 4px 8px; text-align: left; }}
thead th {{ background: #eee; }}
</style>
</head>
<body>
{body}</body>
</html>
"#,
        title = escape_html(title),
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_fields_pass_through() {
        let doc = delimited_document(&["id", "name"], &[vec!["1".into(), "Fantasy".into()]]);
        assert_eq!(doc, "id;name\n1;Fantasy\n");
    }

    #[test]
    fn fields_with_delimiter_or_quotes_are_quoted() {
        let doc = delimited_document(
            &["title"],
            &[
                vec!["one;two".into()],
                vec!["she said \"hi\"".into()],
                vec!["line\nbreak".into()],
            ],
        );
        assert_eq!(
            doc,
            "title\n\"one;two\"\n\"she said \"\"hi\"\"\"\n\"line\nbreak\"\n"
        );
    }

    #[test]
    fn printable_document_escapes_markup() {
        let doc = printable_document(
            "Report",
            "2026-08-06",
            &[PrintSection {
                title: "<scripts>".into(),
                headers: vec!["a & b".into()],
                rows: vec![vec!["<td>".into()]],
            }],
        );
        assert!(doc.contains("&lt;scripts&gt;"));
        assert!(doc.contains("a &amp; b"));
        assert!(doc.contains("&lt;td&gt;"));
        assert!(!doc.contains("<scripts>"));
    }
}
