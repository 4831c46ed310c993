use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use rust_decimal::Decimal;
use std::io::Cursor;
use std::str::FromStr;

use crate::core::ConversionError;

pub type XmlResult = Result<String, ConversionError>;

fn xml_io(e: std::io::Error) -> ConversionError {
    ConversionError::Xml(format!("write error: {e}"))
}

pub struct XmlWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlWriter {
    pub fn new() -> Result<Self, ConversionError> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_io)?;
        Ok(Self { writer })
    }

    pub fn into_string(self) -> XmlResult {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| ConversionError::Xml(format!("UTF-8 error: {e}")))
    }

    pub fn start(&mut self, name: &str) -> Result<&mut Self, ConversionError> {
        self.start_with_attrs(name, &[])
    }

    pub fn start_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ConversionError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer.write_event(Event::Start(elem)).map_err(xml_io)?;
        Ok(self)
    }

    pub fn empty_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ConversionError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer.write_event(Event::Empty(elem)).map_err(xml_io)?;
        Ok(self)
    }

    pub fn empty(&mut self, name: &str) -> Result<&mut Self, ConversionError> {
        self.empty_with_attrs(name, &[])
    }

    pub fn end(&mut self, name: &str) -> Result<&mut Self, ConversionError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    pub fn text(&mut self, name: &str, text: &str) -> Result<&mut Self, ConversionError> {
        self.text_with_attrs(name, text, &[])
    }

    pub fn text_with_attrs(
        &mut self,
        name: &str,
        text: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ConversionError> {
        self.start_with_attrs(name, attrs)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end(name)
    }

    /// Write `text` only when present.
    pub fn opt_text(
        &mut self,
        name: &str,
        text: Option<&str>,
    ) -> Result<&mut Self, ConversionError> {
        if let Some(t) = text {
            self.text(name, t)?;
        }
        Ok(self)
    }

    pub fn date(&mut self, name: &str, date: NaiveDate) -> Result<&mut Self, ConversionError> {
        self.text(name, &date.format("%Y-%m-%d").to_string())
    }

    pub fn decimal(&mut self, name: &str, value: Decimal) -> Result<&mut Self, ConversionError> {
        self.text(name, &format_decimal(value))
    }

    /// Write a decimal amount with a currencyID attribute.
    pub fn amount(
        &mut self,
        name: &str,
        amount: Decimal,
        currency: &str,
    ) -> Result<&mut Self, ConversionError> {
        self.text_with_attrs(name, &format_decimal(amount), &[("currencyID", currency)])
    }
}

/// Format a Decimal for XML output: at least 2 decimal places, trailing
/// zeros beyond that stripped.
pub fn format_decimal(d: Decimal) -> String {
    let s = d.normalize().to_string();
    if let Some(dot_pos) = s.find('.') {
        let decimals = s.len() - dot_pos - 1;
        if decimals < 2 {
            format!("{s}{}", "0".repeat(2 - decimals))
        } else {
            s
        }
    } else {
        format!("{s}.00")
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One reader step, reported with the stack of open element local names.
pub enum XmlEvent<'a> {
    /// An element opened; it is the last entry of the path.
    Start { attrs: &'a [(String, String)] },
    /// Non-empty text inside the last element of the path.
    Text(&'a str),
    /// The last element of the path closes.
    End,
}

/// Stream `xml`, calling `f` with the current element path for every
/// start tag, text node and end tag. Namespace prefixes are stripped from
/// element names; attribute keys are kept as written.
pub fn walk_xml(
    xml: &str,
    mut f: impl FnMut(&[String], XmlEvent<'_>) -> Result<(), ConversionError>,
) -> Result<(), ConversionError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut path: Vec<String> = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                path.push(local_name(e));
                let attrs = attributes(e)?;
                f(&path, XmlEvent::Start { attrs: &attrs })?;
            }
            Ok(Event::Empty(ref e)) => {
                path.push(local_name(e));
                let attrs = attributes(e)?;
                f(&path, XmlEvent::Start { attrs: &attrs })?;
                f(&path, XmlEvent::End)?;
                path.pop();
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|err| ConversionError::Xml(format!("invalid text: {err}")))?;
                if !text.is_empty() {
                    f(&path, XmlEvent::Text(&text))?;
                }
            }
            Ok(Event::CData(ref e)) => {
                let text = String::from_utf8_lossy(e.as_ref()).to_string();
                if !text.trim().is_empty() {
                    f(&path, XmlEvent::Text(text.trim()))?;
                }
            }
            Ok(Event::End(_)) => {
                f(&path, XmlEvent::End)?;
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConversionError::Xml(format!(
                    "parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !path.is_empty() {
        return Err(ConversionError::Xml(format!(
            "unexpected end of document inside <{}>",
            path.join("/")
        )));
    }
    Ok(())
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attributes(e: &BytesStart<'_>) -> Result<Vec<(String, String)>, ConversionError> {
    let mut out = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConversionError::Xml(format!("invalid attribute: {err}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|err| ConversionError::Xml(format!("invalid attribute value: {err}")))?
            .to_string();
        out.push((key, value));
    }
    Ok(out)
}

/// Value of the attribute `key` (exact match), if present.
pub fn attr<'a>(attrs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

pub fn parse_decimal(field: &str, text: &str) -> Result<Decimal, ConversionError> {
    Decimal::from_str(text.trim())
        .or_else(|_| Decimal::from_scientific(text.trim()))
        .map_err(|_| ConversionError::Xml(format!("invalid decimal in {field}: '{text}'")))
}

pub fn parse_date(field: &str, text: &str) -> Result<NaiveDate, ConversionError> {
    let t = text.trim();
    // xsd:date may carry a timezone suffix
    let date_part = t.get(..10).unwrap_or(t);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ConversionError::Xml(format!("invalid date in {field}: '{text}'")))
}
