use mirror_engine::{build_document, index_html, system_clock};
use pretty_assertions::assert_eq;

#[test]
fn document_header_layout_is_exact() {
    let doc = build_document(
        "Acme Changelog",
        "https://site.example/changelog",
        "2025-01-02 03:04:05 UTC",
        "## Release 1.2\n\nFirst note.",
    );
    assert_eq!(
        doc,
        "# Acme Changelog\n\n\
         Last updated: 2025-01-02 03:04:05 UTC\n\n\
         Source: https://site.example/changelog\n\n\
         ---\n\n\
         ## Release 1.2\n\nFirst note.\n"
    );
}

#[test]
fn document_always_ends_with_a_newline() {
    let doc = build_document("T", "https://u.example", "2025-01-02 03:04:05 UTC", "body");
    assert!(doc.ends_with("body\n"));
}

#[test]
fn the_system_clock_matches_the_header_pattern() {
    let stamp = (system_clock())();
    assert!(stamp.ends_with(" UTC"), "unexpected stamp: {stamp}");
    let naive = stamp.trim_end_matches(" UTC");
    assert!(
        chrono::NaiveDateTime::parse_from_str(naive, "%Y-%m-%d %H:%M:%S").is_ok(),
        "unexpected stamp: {stamp}"
    );
}

#[test]
fn the_viewer_shell_embeds_title_and_document_name() {
    let html = index_html("Acme Changelog", "changelog.md");
    assert!(html.contains("<title>Acme Changelog</title>"));
    assert!(html.contains("<h1>Acme Changelog</h1>"));
    assert!(html.contains("fetch('changelog.md')"));
    assert!(html.contains("class=\"spinner\""));
    assert!(html.contains("Error loading document"));
}
