use std::collections::HashMap;

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Renders parsed HTML into flat Markdown.
///
/// Hyperlinks come out as `[text](url)` with addresses resolved against the
/// page base, emphasis and code spans keep their markers, and no line is ever
/// wrapped. Image sources are routed through the localization map, so a
/// successfully downloaded image points at its local copy while a failed one
/// keeps its resolved remote address.
pub struct MarkdownRenderer {
    image_paths: HashMap<String, String>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_image_paths(HashMap::new())
    }

    pub fn with_image_paths(image_paths: HashMap<String, String>) -> Self {
        Self { image_paths }
    }

    pub fn render(&self, html: &str, base_url: Option<&str>) -> String {
        let document = Html::parse_document(html);
        let base_url = base_url.and_then(|b| Url::parse(b).ok());
        let mut ctx = RenderContext::new(base_url);

        for child in document.root_element().children() {
            self.visit_node(child, &mut ctx);
        }

        ctx.into_markdown()
    }

    fn visit_node<'a>(&self, node: NodeRef<'a, Node>, ctx: &mut RenderContext) {
        match node.value() {
            Node::Text(text) => ctx.append_text(text),
            Node::Element(_) => {
                if let Some(element) = ElementRef::wrap(node) {
                    self.visit_element(element, ctx);
                }
            }
            _ => {
                for child in node.children() {
                    self.visit_node(child, ctx);
                }
            }
        }
    }

    fn visit_element(&self, element: ElementRef, ctx: &mut RenderContext) {
        let tag = element.value().name().to_ascii_lowercase();
        match tag.as_str() {
            "a" => self.handle_anchor(element, ctx),
            "img" => self.handle_image(element, ctx),
            "br" => ctx.ensure_newline(),
            "hr" => {
                ctx.ensure_blank_line();
                ctx.append_raw("---");
                ctx.ensure_blank_line();
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag.as_bytes()[1] - b'0';
                ctx.ensure_blank_line();
                for _ in 0..level {
                    ctx.append_raw("#");
                }
                ctx.append_raw(" ");
                self.visit_children(element, ctx);
                ctx.ensure_blank_line();
            }
            "ul" | "ol" => {
                if ctx.list_depth == 0 {
                    ctx.ensure_blank_line();
                }
                ctx.list_depth += 1;
                self.visit_children(element, ctx);
                ctx.list_depth -= 1;
                if ctx.list_depth == 0 {
                    ctx.ensure_blank_line();
                }
            }
            "li" => {
                ctx.ensure_newline();
                for _ in 0..ctx.list_depth.saturating_sub(1) {
                    ctx.append_raw("  ");
                }
                ctx.append_raw("- ");
                self.visit_children(element, ctx);
                ctx.ensure_newline();
            }
            "strong" | "b" => self.handle_wrapped(element, ctx, "**"),
            "em" | "i" => self.handle_wrapped(element, ctx, "*"),
            "code" => {
                if ctx.in_pre {
                    self.visit_children(element, ctx);
                } else {
                    self.handle_wrapped(element, ctx, "`");
                }
            }
            "pre" => {
                ctx.ensure_blank_line();
                ctx.append_raw("```\n");
                ctx.in_pre = true;
                self.visit_children(element, ctx);
                ctx.in_pre = false;
                ctx.ensure_newline();
                ctx.append_raw("```");
                ctx.ensure_blank_line();
            }
            "p" | "div" | "section" | "article" | "main" | "header" | "footer" | "nav"
            | "figure" | "figcaption" | "table" | "tr" | "blockquote" | "address" => {
                ctx.ensure_blank_line();
                self.visit_children(element, ctx);
                ctx.ensure_blank_line();
            }
            "head" | "script" | "style" | "noscript" | "iframe" | "svg" | "template" => {
                // scripting and presentation-only subtrees are dropped
            }
            _ => self.visit_children(element, ctx),
        }
    }

    fn visit_children(&self, element: ElementRef, ctx: &mut RenderContext) {
        for child in element.children() {
            self.visit_node(child, ctx);
        }
    }

    fn handle_wrapped(&self, element: ElementRef, ctx: &mut RenderContext, marker: &str) {
        ctx.append_raw(marker);
        self.visit_children(element, ctx);
        ctx.trim_trailing_space();
        ctx.append_raw(marker);
    }

    fn handle_anchor(&self, element: ElementRef, ctx: &mut RenderContext) {
        let href = element
            .value()
            .attr("href")
            .map(str::trim)
            .and_then(|raw| resolve_url(raw, ctx.base_url.as_ref()));
        match href {
            Some(url) => {
                ctx.append_raw("[");
                self.visit_children(element, ctx);
                ctx.trim_trailing_space();
                ctx.append_raw("](");
                ctx.append_raw(url.as_str());
                ctx.append_raw(")");
            }
            None => self.visit_children(element, ctx),
        }
    }

    fn handle_image(&self, element: ElementRef, ctx: &mut RenderContext) {
        let value = element.value();
        let src = value
            .attr("src")
            .or_else(|| value.attr("data-src"))
            .map(str::trim);
        let Some(src) = src.filter(|s| !s.is_empty()) else {
            return;
        };
        let Some(resolved) = resolve_url(src, ctx.base_url.as_ref()) else {
            return;
        };

        let resolved = resolved.to_string();
        let target = self
            .image_paths
            .get(&resolved)
            .cloned()
            .unwrap_or(resolved);
        let alt = value.attr("alt").unwrap_or("").trim().to_string();
        ctx.append_raw(&format!("![{alt}]({target})"));
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the page `<title>` text, if any.
pub fn page_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}

struct RenderContext {
    builder: String,
    base_url: Option<Url>,
    last_char: Option<char>,
    in_pre: bool,
    list_depth: usize,
}

impl RenderContext {
    fn new(base_url: Option<Url>) -> Self {
        Self {
            builder: String::new(),
            base_url,
            last_char: None,
            in_pre: false,
            list_depth: 0,
        }
    }

    fn into_markdown(self) -> String {
        self.builder.trim().to_string()
    }

    fn append_text(&mut self, text: &str) {
        if self.in_pre {
            self.append_raw(text);
            return;
        }
        for ch in text.chars() {
            if ch.is_whitespace() {
                if matches!(self.last_char, None | Some(' ') | Some('\n')) {
                    continue;
                }
                self.push_char(' ');
            } else {
                self.push_char(ch);
            }
        }
    }

    fn append_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.builder.push_str(text);
        self.last_char = text.chars().next_back();
    }

    fn ensure_newline(&mut self) {
        if self.builder.is_empty() || self.last_char == Some('\n') {
            return;
        }
        self.trim_trailing_space();
        if !self.builder.is_empty() {
            self.push_char('\n');
        }
    }

    /// Close the current block with an empty line.
    fn ensure_blank_line(&mut self) {
        if self.builder.is_empty() {
            return;
        }
        self.trim_trailing_space();
        while !self.builder.is_empty() && !self.builder.ends_with("\n\n") {
            self.builder.push('\n');
        }
        self.last_char = Some('\n');
    }

    fn trim_trailing_space(&mut self) {
        while self.builder.ends_with(' ') {
            self.builder.pop();
        }
        self.last_char = self.builder.chars().next_back();
    }

    fn push_char(&mut self, ch: char) {
        self.builder.push(ch);
        self.last_char = Some(ch);
    }
}
