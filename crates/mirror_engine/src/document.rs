/// Assemble the final document: generated header, horizontal rule, converted
/// body. `generated_utc` is expected in `YYYY-MM-DD HH:MM:SS UTC` form.
pub fn build_document(
    title: &str,
    source_url: &str,
    generated_utc: &str,
    body_markdown: &str,
) -> String {
    let mut doc = format!(
        "# {title}\n\nLast updated: {generated_utc}\n\nSource: {source_url}\n\n---\n\n{body_markdown}",
    );
    if !doc.ends_with('\n') {
        doc.push('\n');
    }
    doc
}
