use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^<\s*(/)?\s*([A-Za-z_:!?][^\s/>]*)(.*?)(/)?\s*>$").unwrap()
});
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s=/"']+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#).unwrap()
});

/// Structured view of a markup token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    /// Attributes in source order.
    pub attributes: Vec<(String, String)>,
    pub is_end_tag: bool,
    pub is_single_tag: bool,
}

impl Tag {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attributes(&self) -> bool {
        !self.attributes.is_empty()
    }
}

/// Parses a token's surface text as a tag. Returns `None` for ordinary words.
///
/// Comments, doctype declarations and processing instructions (`<!...>`,
/// `<?...?>`) parse as self-closing tags named after their leading word.
pub fn parse_tag(word: &str) -> Option<Tag> {
    let captures = TAG_RE.captures(word)?;
    let name = captures[2].to_string();
    let is_end_tag = captures.get(1).is_some();
    let is_declaration = name.starts_with('!') || name.starts_with('?');
    let is_single_tag = captures.get(4).is_some() || is_declaration;

    let mut rest = captures.get(3).map_or("", |m| m.as_str());
    if name.starts_with('?') {
        rest = rest.trim_end_matches('?');
    }
    let attributes = if name.starts_with('!') {
        Vec::new()
    } else {
        parse_attributes(rest)
    };

    Some(Tag {
        name,
        attributes,
        is_end_tag,
        is_single_tag,
    })
}

fn parse_attributes(raw: &str) -> Vec<(String, String)> {
    ATTR_RE
        .captures_iter(raw)
        .map(|captures| {
            let value = captures
                .get(2)
                .or_else(|| captures.get(3))
                .or_else(|| captures.get(4))
                .map_or("", |m| m.as_str());
            (captures[1].to_string(), unescape(value).into_owned())
        })
        .collect()
}

/// Resolves markup entities. Text with malformed or unknown entities is
/// returned unchanged.
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    match quick_xml::escape::unescape(text) {
        Ok(unescaped) => unescaped,
        Err(err) => {
            tracing::trace!("leaving {:?} escaped: {}", text, err);
            Cow::Borrowed(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_end_and_single_tags() {
        let start = parse_tag("<post author=\"A\" id='7'>").unwrap();
        assert_eq!(start.name, "post");
        assert!(!start.is_end_tag && !start.is_single_tag);
        assert_eq!(start.attribute("author"), Some("A"));
        assert_eq!(start.attribute("id"), Some("7"));

        let end = parse_tag("</post>").unwrap();
        assert!(end.is_end_tag);
        assert_eq!(end.name, "post");

        let single = parse_tag("<br/>").unwrap();
        assert!(single.is_single_tag);
        assert_eq!(single.name, "br");
    }

    #[test]
    fn keeps_attribute_order_and_unquoted_values() {
        let tag = parse_tag("<doc type=story id=ABC selected>").unwrap();
        let names: Vec<&str> = tag.attributes.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["type", "id", "selected"]);
        assert_eq!(tag.attribute("id"), Some("ABC"));
        assert_eq!(tag.attribute("selected"), Some(""));
    }

    #[test]
    fn declarations_are_single_tags() {
        let decl = parse_tag("<?xml version=\"1.0\"?>").unwrap();
        assert_eq!(decl.name, "?xml");
        assert!(decl.is_single_tag);
        assert_eq!(decl.attribute("version"), Some("1.0"));

        let comment = parse_tag("<!--note-->").unwrap();
        assert!(comment.is_single_tag);
        assert!(comment.attributes.is_empty());
    }

    #[test]
    fn rejects_words() {
        assert_eq!(parse_tag("hello"), None);
        assert_eq!(parse_tag("<3"), None);
        assert_eq!(parse_tag("< 5 >"), None);
        assert_eq!(parse_tag("a<b>"), None);
    }

    #[test]
    fn unescapes_entities() {
        assert_eq!(unescape("AT&amp;T"), "AT&T");
        assert_eq!(unescape("&lt;b&gt;"), "<b>");
        assert_eq!(unescape("&#65;"), "A");
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape("&bogus;"), "&bogus;");
    }
}
