//! Regex-based extraction primitives for the driver-provided HTML.
//!
//! The result pages are server-rendered ASP.NET grids with stable element
//! ids, so targeted regexes over the raw HTML are enough; no DOM crate.

use regex::Regex;

/// One row of the secondary standards table: the document code cell and the
/// raw (unresolved) link target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardsRow {
    pub code: String,
    pub href: String,
}

/// Inner text of the result-count label, if present.
pub fn result_count_label(html: &str) -> Option<String> {
    let label = Regex::new(r#"(?s)<span[^>]*id=["']?lbl_Result["']?[^>]*>(.*?)</span>"#).unwrap();
    label
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| clean_text(m.as_str()))
}

/// Parse the total out of a result-count label shaped `"... : <n>"`.
pub fn parse_result_count(label: &str) -> Option<usize> {
    let (_, tail) = label.split_once(':')?;
    tail.trim().parse().ok()
}

/// Extract `(entry_id, subject)` pairs from the current result page.
///
/// The first `<tr>` is the grid header and is skipped. A row missing either
/// field ends extraction for the page early; the site renders short pages
/// for the final block of results.
pub fn gazette_rows(html: &str) -> Vec<(String, String)> {
    let Some(table) = table_chunk(html, r#"id=["']?gvGazetteList["']?"#) else {
        return Vec::new();
    };
    let row_pattern = Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap();
    let entry_pattern = Regex::new(
        r#"(?s)<span[^>]*id=["']?gvGazetteList_lbl_UGID_\d+["']?[^>]*>(.*?)</span>"#,
    )
    .unwrap();
    let subject_pattern = Regex::new(
        r#"(?s)<span[^>]*id=["']?gvGazetteList_lbl_Subject_\d+["']?[^>]*>(.*?)</span>"#,
    )
    .unwrap();

    let mut rows = Vec::new();
    for cap in row_pattern.captures_iter(&table).skip(1) {
        let row = match cap.get(1) {
            Some(m) => m.as_str(),
            None => break,
        };
        let entry = entry_pattern
            .captures(row)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()));
        let subject = subject_pattern
            .captures(row)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()));
        match (entry, subject) {
            (Some(entry), Some(subject)) if !entry.is_empty() => rows.push((entry, subject)),
            _ => break,
        }
    }
    rows
}

/// Parse the category dropdown into `(value, name)` pairs, skipping the
/// value-0 placeholder and blank labels.
pub fn category_options(html: &str) -> Vec<(u32, String)> {
    let select =
        Regex::new(r#"(?s)<select[^>]*name=["']?ddlMinistry["']?[^>]*>(.*?)</select>"#).unwrap();
    let Some(chunk) = select
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
    else {
        return Vec::new();
    };

    let option = Regex::new(r#"(?s)<option[^>]*value=["']?(\d+)["']?[^>]*>(.*?)</option>"#).unwrap();
    option
        .captures_iter(&chunk)
        .filter_map(|cap| {
            let value: u32 = cap.get(1)?.as_str().parse().ok()?;
            let name = clean_text(cap.get(2)?.as_str());
            if value == 0 || name.is_empty() {
                None
            } else {
                Some((value, name))
            }
        })
        .collect()
}

/// Extract the secondary standards table's rows: code from the second cell,
/// link target from the anchor in the fourth. Rows missing either are
/// skipped, not fatal.
pub fn standards_rows(html: &str) -> Vec<StandardsRow> {
    let Some(table) = table_chunk(html, r"_ngcontent-arai-c19") else {
        return Vec::new();
    };
    // Angular renders the data rows inside tbody; fall back to the whole
    // table when the markup omits it.
    let tbody = Regex::new(r"(?s)<tbody[^>]*>(.*?)</tbody>").unwrap();
    let body = tbody
        .captures(&table)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or(table);

    let row_pattern = Regex::new(r"(?s)<tr[^>]*>(.*?)</tr>").unwrap();
    let cell_pattern = Regex::new(r"(?s)<td[^>]*>(.*?)</td>").unwrap();
    let href_pattern = Regex::new(r#"href\s*=\s*["']([^"']+)["']"#).unwrap();

    let mut rows = Vec::new();
    for cap in row_pattern.captures_iter(&body) {
        let row = match cap.get(1) {
            Some(m) => m.as_str(),
            None => continue,
        };
        let cells: Vec<&str> = cell_pattern
            .captures_iter(row)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if cells.len() < 4 {
            continue;
        }
        let code = clean_text(cells[1]);
        if code.is_empty() {
            continue;
        }
        let Some(href) = href_pattern
            .captures(cells[3])
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };
        rows.push(StandardsRow { code, href });
    }
    rows
}

fn table_chunk(html: &str, id_fragment: &str) -> Option<String> {
    let pattern = format!(r"(?s)<table[^>]*{id_fragment}[^>]*>(.*?)</table>");
    Regex::new(&pattern)
        .ok()?
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Inner text of an HTML fragment: tags stripped, entities decoded,
/// non-ASCII dropped, whitespace collapsed.
pub fn clean_text(fragment: &str) -> String {
    let tag_pattern = Regex::new(r"<[^>]+>").unwrap();
    let mut text = tag_pattern.replace_all(fragment, " ").to_string();

    text = text
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'");

    let non_ascii = Regex::new(r"[^\x00-\x7F]").unwrap();
    text = non_ascii.replace_all(&text, "").to_string();

    let whitespace = Regex::new(r"\s+").unwrap();
    whitespace.replace_all(&text, " ").trim().to_string()
}
