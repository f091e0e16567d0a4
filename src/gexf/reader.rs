use std::borrow::Cow;
use std::path::Path;

use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesStart, Event as XmlEvent};
use quick_xml::reader::Reader as XmlReader;
use tracing::{debug, warn};

use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::graph::{EdgeKind, GraphStore, Node};
use crate::io::Importer;
use crate::layout::placement::spiral_position;

type Attrs = Vec<(String, String)>;

/// Reads GEXF 1.1 / 1.2 documents with the `viz` extension.
#[derive(Debug, Clone, Default)]
pub struct GexfImporter {
    config: ImportConfig,
}

#[derive(Debug, Default)]
struct RawNode {
    key: String,
    label: Option<String>,
    position: Option<(f64, f64)>,
    size: Option<f64>,
}

#[derive(Debug)]
struct RawEdge {
    key: Option<String>,
    source: String,
    target: String,
    weight: f64,
    kind: Option<EdgeKind>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum MetaField {
    Creator,
    Description,
}

#[derive(Debug, Default)]
struct Document {
    creator: Option<String>,
    description: Option<String>,
    default_edge_kind: EdgeKind,
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
}

impl GexfImporter {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ImportConfig::default())
    }

    /// Parse a GEXF document held in memory.
    pub fn parse_str(&self, source: &str) -> Result<GraphStore, ImportError> {
        let document = parse_document(source)?;
        self.build(document)
    }

    fn build(&self, document: Document) -> Result<GraphStore, ImportError> {
        let mut store = GraphStore::with_capacity(document.nodes.len(), document.edges.len());
        {
            let meta = store.meta_mut();
            meta.creator = document.creator;
            meta.description = document.description;
            meta.default_edge_kind = document.default_edge_kind;
        }

        let mut unplaced = 0;
        for raw in document.nodes {
            let (x, y) = match raw.position {
                Some(position) => position,
                None => {
                    let position = spiral_position(unplaced, self.config.placement_spacing);
                    unplaced += 1;
                    position
                }
            };
            let size = raw.size.unwrap_or(self.config.default_node_size);
            let mut node = Node::new(raw.key).with_size(size);
            node.label = raw.label;
            store.add_node(node, x, y)?;
        }
        if unplaced > 0 {
            warn!(nodes = unplaced, "nodes without viz:position placed on a spiral");
        }

        for raw in document.edges {
            let kind = raw.kind.unwrap_or(document.default_edge_kind);
            store.add_edge_with(raw.key, &raw.source, &raw.target, raw.weight, kind)?;
        }

        debug!(
            nodes = store.node_count(),
            edges = store.edge_count(),
            "GEXF document imported"
        );
        Ok(store)
    }
}

impl Importer for GexfImporter {
    fn import(&self, path: &Path) -> Result<GraphStore, ImportError> {
        let source = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_str(&source)
    }
}

fn parse_document(source: &str) -> Result<Document, ImportError> {
    let mut reader = XmlReader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut document = Document::default();
    let mut buf = Vec::new();
    let mut seen_root = false;
    // Open <node> elements; nested nodes are flattened into the node list
    let mut open_nodes: Vec<RawNode> = Vec::new();
    let mut meta_field: Option<MetaField> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml_error(&reader, e))?;
        match event {
            XmlEvent::Start(ref e) | XmlEvent::Empty(ref e) => {
                let is_empty = matches!(event, XmlEvent::Empty(_));
                let name = local_name(e);
                if !seen_root {
                    if name != "gexf" {
                        return Err(ImportError::UnsupportedFormat { root: name });
                    }
                    seen_root = true;
                }
                let attrs = attributes(&reader, e)?;

                match name.as_str() {
                    "graph" => {
                        if let Some(value) = get_attr(&attrs, "defaultedgetype") {
                            match EdgeKind::parse(value) {
                                Some(kind) => document.default_edge_kind = kind,
                                None => warn!(value, "unknown defaultedgetype, assuming directed"),
                            }
                        }
                    }
                    "creator" if !is_empty => meta_field = Some(MetaField::Creator),
                    "description" if !is_empty => meta_field = Some(MetaField::Description),
                    "node" => {
                        let key = require_attr(&attrs, "node", "id")?;
                        let node = RawNode {
                            key: key.to_string(),
                            label: get_attr(&attrs, "label").map(str::to_string),
                            ..RawNode::default()
                        };
                        if is_empty {
                            document.nodes.push(node);
                        } else {
                            open_nodes.push(node);
                        }
                    }
                    "position" => {
                        if let Some(node) = open_nodes.last_mut() {
                            let x = number_attr(&attrs, "position", "x")?.unwrap_or(0.0);
                            let y = number_attr(&attrs, "position", "y")?.unwrap_or(0.0);
                            node.position = Some((x, y));
                        }
                    }
                    "size" => {
                        if let Some(node) = open_nodes.last_mut() {
                            node.size = number_attr(&attrs, "size", "value")?;
                        }
                    }
                    "edge" => {
                        let kind = match get_attr(&attrs, "type") {
                            Some(value) => {
                                let kind = EdgeKind::parse(value);
                                if kind.is_none() {
                                    warn!(value, "unknown edge type, using the graph default");
                                }
                                kind
                            }
                            None => None,
                        };
                        document.edges.push(RawEdge {
                            key: get_attr(&attrs, "id").map(str::to_string),
                            source: require_attr(&attrs, "edge", "source")?.to_string(),
                            target: require_attr(&attrs, "edge", "target")?.to_string(),
                            weight: number_attr(&attrs, "edge", "weight")?.unwrap_or(1.0),
                            kind,
                        });
                    }
                    _ => {}
                }
            }
            XmlEvent::End(ref e) => match e.name().local_name().as_ref() {
                b"node" => {
                    if let Some(node) = open_nodes.pop() {
                        document.nodes.push(node);
                    }
                }
                b"creator" | b"description" => meta_field = None,
                _ => {}
            },
            XmlEvent::Text(ref e) => {
                if let Some(field) = meta_field {
                    let text = e.decode().map_err(|e| xml_error(&reader, e))?;
                    append_meta(&mut document, field, &text);
                }
            }
            XmlEvent::GeneralRef(ref e) => {
                if let Some(field) = meta_field {
                    let resolved = match e.resolve_char_ref() {
                        Ok(Some(c)) => Some(c.to_string()),
                        _ => {
                            let name = e.decode().map_err(|e| xml_error(&reader, e))?;
                            resolve_predefined_entity(&name).map(str::to_string)
                        }
                    };
                    if let Some(text) = resolved {
                        append_meta(&mut document, field, &text);
                    }
                }
            }
            XmlEvent::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(ImportError::UnsupportedFormat {
            root: String::new(),
        });
    }
    // Unclosed nodes are reported by the XML reader; keep whatever was opened
    document.nodes.extend(open_nodes);
    Ok(document)
}

fn append_meta(document: &mut Document, field: MetaField, text: &str) {
    let slot = match field {
        MetaField::Creator => &mut document.creator,
        MetaField::Description => &mut document.description,
    };
    slot.get_or_insert_with(String::new).push_str(text);
}

fn xml_error(reader: &XmlReader<&[u8]>, err: impl std::fmt::Display) -> ImportError {
    ImportError::Xml {
        position: reader.error_position() as u64,
        message: err.to_string(),
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().local_name().as_ref()).to_string()
}

fn attributes(reader: &XmlReader<&[u8]>, e: &BytesStart<'_>) -> Result<Attrs, ImportError> {
    let mut attrs = Attrs::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|err| xml_error(reader, err))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let raw = String::from_utf8_lossy(&attr.value);
        let value = match unescape(&raw) {
            Ok(Cow::Borrowed(_)) => raw.to_string(),
            Ok(Cow::Owned(value)) => value,
            Err(err) => return Err(xml_error(reader, err)),
        };
        attrs.push((key, value));
    }
    Ok(attrs)
}

fn get_attr<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    attrs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn require_attr<'a>(
    attrs: &'a [(String, String)],
    element: &str,
    name: &str,
) -> Result<&'a str, ImportError> {
    get_attr(attrs, name).ok_or_else(|| ImportError::MissingAttribute {
        element: element.to_string(),
        attribute: name.to_string(),
    })
}

fn number_attr(
    attrs: &[(String, String)],
    element: &str,
    name: &str,
) -> Result<Option<f64>, ImportError> {
    let Some(value) = get_attr(attrs, name) else {
        return Ok(None);
    };
    match value.trim().parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(Some(number)),
        _ => Err(ImportError::InvalidNumber {
            element: element.to_string(),
            attribute: name.to_string(),
            value: value.to_string(),
        }),
    }
}
