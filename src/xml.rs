//! XML writing helpers over `quick-xml`

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::{NetconfError, Result};

/// NETCONF base namespace.
pub const NS_NETCONF_BASE: &str = "urn:ietf:params:xml:ns:netconf:base:1.0";

/// RFC 6022 monitoring namespace.
pub const NS_NETCONF_MONITORING: &str = "urn:ietf:params:xml:ns:yang:ietf-netconf-monitoring";

/// RFC 7895 YANG library namespace.
pub const NS_YANG_LIBRARY: &str = "urn:ietf:params:xml:ns:yang:ietf-yang-library";

/// Element-at-a-time writer producing an in-memory document.
pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
    reply_payload: bool,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self { writer: Writer::new(Vec::new()), reply_payload: false }
    }

    /// Writer for fragments that are placed in an `rpc-reply`.
    ///
    /// Text and attribute values are escaped with [`escape_for_reply`].
    pub fn for_reply() -> Self {
        Self { writer: Writer::new(Vec::new()), reply_payload: true }
    }

    pub fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = self.element(name, attributes);
        self.event(Event::Start(element))
    }

    pub fn end(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    /// Self-closing element.
    pub fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let element = self.element(name, attributes);
        self.event(Event::Empty(element))
    }

    /// Escaped character data.
    pub fn text(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let text = if self.reply_payload {
            BytesText::from_escaped(escape_for_reply(text))
        } else {
            BytesText::new(text)
        };
        self.event(Event::Text(text))
    }

    /// `<name>text</name>`
    pub fn leaf(&mut self, name: &str, text: &str) -> Result<()> {
        self.start(name, &[])?;
        self.text(text)?;
        self.end(name)
    }

    pub fn finish(self) -> Result<String> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| NetconfError::internal(format!("XML output is not UTF-8: {}", e)))
    }

    fn element<'a>(&self, name: &'a str, attributes: &[(&str, &str)]) -> BytesStart<'a> {
        if !self.reply_payload {
            return BytesStart::new(name).with_attributes(attributes.iter().copied());
        }
        let mut element = BytesStart::new(name);
        for (key, value) in attributes {
            let value = escape_for_reply(value);
            element.push_attribute((key.as_bytes(), value.as_bytes()));
        }
        element
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| NetconfError::internal(format!("XML serialization failed: {}", e)))
    }
}

/// Escape XML special characters in `text`.
pub fn escape(text: &str) -> String {
    quick_xml::escape::escape(text).into_owned()
}

/// Escape `text` for a reply payload.
///
/// The reply builder folds every `&amp;` back into `&`, so payload text is
/// escaped twice to come out escaped exactly once.
pub fn escape_for_reply(text: &str) -> String {
    escape(&escape(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_nested_elements_with_escaped_content() {
        let mut xml = XmlWriter::new();
        xml.start("capabilities", &[("xmlns", NS_NETCONF_BASE)]).unwrap();
        xml.leaf("capability", "urn:x?module=a&revision=1").unwrap();
        xml.empty("ok", &[]).unwrap();
        xml.end("capabilities").unwrap();

        assert_eq!(
            xml.finish().unwrap(),
            "<capabilities xmlns=\"urn:ietf:params:xml:ns:netconf:base:1.0\">\
             <capability>urn:x?module=a&amp;revision=1</capability><ok/></capabilities>"
        );
    }

    #[test]
    fn reply_writers_escape_twice() {
        let mut xml = XmlWriter::for_reply();
        xml.start("data", &[("xmlns", "urn:x?a=1&b=2")]).unwrap();
        xml.leaf("description", "R&D <lab>").unwrap();
        xml.end("data").unwrap();

        assert_eq!(
            xml.finish().unwrap(),
            "<data xmlns=\"urn:x?a=1&amp;amp;b=2\">\
             <description>R&amp;amp;D &amp;lt;lab&amp;gt;</description></data>"
        );
        assert_eq!(escape_for_reply("a\"b"), "a&amp;quot;b");
    }

    #[test]
    fn empty_leaves_have_no_text() {
        let mut xml = XmlWriter::new();
        xml.leaf("description", "").unwrap();
        assert_eq!(xml.finish().unwrap(), "<description></description>");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
    }
}
