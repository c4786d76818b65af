//! Build string → XML → [`PobBuild`].

use std::io::Read;

use base64::{engine::general_purpose, Engine as _};
use flate2::read::ZlibDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::PobError;
use super::items::{parse_item_text, PobItem};

/// Decoded contents of a Path of Building export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PobBuild {
    /// `<Build>` attributes, numeric values coerced.
    pub character: Map<String, Value>,
    /// First `<Tree><Spec>` attributes plus `nodes` and `url`.
    pub tree: Map<String, Value>,
    pub items: Vec<PobItem>,
}

/// Decode a build string into the raw XML document.
pub fn decode_build_xml(encoded: &str) -> Result<String, PobError> {
    let cleaned: String = encoded.split_whitespace().collect();

    let compressed = general_purpose::STANDARD
        .decode(&cleaned)
        .or_else(|_| general_purpose::URL_SAFE.decode(&cleaned))
        .map_err(|e| PobError::InvalidBase64 {
            reason: e.to_string(),
        })?;

    let mut xml = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut xml)
        .map_err(|e| PobError::Decompress {
            reason: e.to_string(),
        })?;

    String::from_utf8(xml).map_err(|e| PobError::Xml {
        reason: e.to_string(),
    })
}

/// Decode and parse a PoB build string.
pub fn parse_pob_build(encoded: &str) -> Result<PobBuild, PobError> {
    let xml = decode_build_xml(encoded)?;
    let build = parse_build_xml(&xml)?;
    tracing::debug!(
        items = build.items.len(),
        nodes = build.tree.get("nodes").and_then(|nodes| nodes.as_array()).map_or(0, Vec::len),
        "decoded PoB build"
    );
    Ok(build)
}

// ─── Value coercion ─────────────────────────────────────────────────────────

/// Attribute text as an integer, then a float (one `.` and a digit), else
/// the original string.
pub fn coerce_attribute(raw: &str) -> Value {
    let trimmed = raw.trim();
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::Number(int.into());
    }
    let one_dot = raw.matches('.').count() == 1;
    if one_dot && raw.chars().any(|c| c.is_ascii_digit()) {
        if let Some(number) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}

fn parse_nodes(raw: &str) -> Vec<Value> {
    raw.split(',')
        .map(str::trim)
        .filter(|node| !node.is_empty())
        .filter_map(|node| node.parse::<i64>().ok())
        .map(Value::from)
        .collect()
}

fn attributes(element: &BytesStart<'_>) -> Result<Vec<(String, String)>, PobError> {
    element
        .attributes()
        .map(|attr| {
            let attr = attr.map_err(|e| PobError::Xml {
                reason: e.to_string(),
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            Ok((key, value))
        })
        .collect()
}

// ─── XML walk ───────────────────────────────────────────────────────────────

/// Open `<Item>` element collecting its leading text.
struct OpenItem {
    id: Option<String>,
    slot: Option<String>,
    text: String,
    child_seen: bool,
}

impl OpenItem {
    fn finish(self) -> PobItem {
        PobItem {
            id: self.id,
            slot: self.slot,
            ..parse_item_text(&self.text)
        }
    }
}

#[derive(Default)]
struct BuildWalker {
    path: Vec<String>,
    saw_root: bool,
    build: PobBuild,
    character_seen: bool,
    trees_seen: usize,
    spec_seen: bool,
    url_seen: bool,
    capturing_url: Option<String>,
    items_sections_seen: usize,
    item: Option<OpenItem>,
}

impl BuildWalker {
    fn in_first(&self, section: &str, count: usize) -> bool {
        count == 1 && self.path.get(1).map(String::as_str) == Some(section)
    }

    fn open(&mut self, element: &BytesStart<'_>, empty: bool) -> Result<(), PobError> {
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        let depth = self.path.len();

        if depth == 0 {
            self.saw_root = true;
        }
        if let Some(item) = self.item.as_mut() {
            if depth >= 3 {
                item.child_seen = true;
            }
        }

        match (depth, name.as_str()) {
            (1, "Build") if !self.character_seen => {
                self.character_seen = true;
                for (key, value) in attributes(element)? {
                    self.build.character.insert(key, coerce_attribute(&value));
                }
            }
            (1, "Tree") => self.trees_seen += 1,
            (1, "Items") => self.items_sections_seen += 1,
            (2, "Spec") if self.in_first("Tree", self.trees_seen) && !self.spec_seen => {
                self.spec_seen = true;
                let mut nodes = Vec::new();
                for (key, value) in attributes(element)? {
                    if key == "nodes" {
                        nodes = parse_nodes(&value);
                    } else {
                        self.build.tree.insert(key, coerce_attribute(&value));
                    }
                }
                self.build.tree.insert("nodes".into(), Value::Array(nodes));
            }
            (3, "URL")
                if self.spec_seen
                    && !self.url_seen
                    && self.in_first("Tree", self.trees_seen)
                    && self.path.get(2).map(String::as_str) == Some("Spec") =>
            {
                self.url_seen = true;
                if !empty {
                    self.capturing_url = Some(String::new());
                }
            }
            (2, "Item") if self.in_first("Items", self.items_sections_seen) => {
                let mut open = OpenItem {
                    id: None,
                    slot: None,
                    text: String::new(),
                    child_seen: false,
                };
                for (key, value) in attributes(element)? {
                    match key.as_str() {
                        "id" => open.id = Some(value),
                        "slot" => open.slot = Some(value),
                        _ => {}
                    }
                }
                if empty {
                    self.build.items.push(open.finish());
                } else {
                    self.item = Some(open);
                }
            }
            _ => {}
        }

        if !empty {
            self.path.push(name);
        }
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if let Some(url) = self.capturing_url.as_mut() {
            url.push_str(text);
            return;
        }
        if self.path.len() == 3 {
            if let Some(item) = self.item.as_mut() {
                if !item.child_seen {
                    item.text.push_str(text);
                }
            }
        }
    }

    fn close(&mut self) {
        let depth = self.path.len();
        if let Some(url) = self.capturing_url.take() {
            let url = url.trim();
            if !url.is_empty() {
                self.build.tree.insert("url".into(), Value::String(url.to_string()));
            }
        }
        if depth == 3 {
            if let Some(item) = self.item.take() {
                self.build.items.push(item.finish());
            }
        }
        self.path.pop();
    }
}

/// Parse an inflated PoB XML document.
pub fn parse_build_xml(xml: &str) -> Result<PobBuild, PobError> {
    let mut reader = Reader::from_str(xml);
    let mut walker = BuildWalker::default();

    loop {
        match reader.read_event()? {
            Event::Start(element) => walker.open(&element, false)?,
            Event::Empty(element) => walker.open(&element, true)?,
            Event::Text(text) => walker.text(&text.unescape()?),
            Event::CData(data) => walker.text(&String::from_utf8_lossy(&data)),
            Event::End(_) => walker.close(),
            Event::Eof => break,
            _ => {}
        }
    }

    if !walker.saw_root {
        return Err(PobError::Xml {
            reason: "document has no root element".into(),
        });
    }
    if !walker.path.is_empty() {
        return Err(PobError::Xml {
            reason: format!("unclosed element <{}>", walker.path.join("/")),
        });
    }
    Ok(walker.build)
}

// ─── Tests ──────────────────────────────────────────────────────────────────
