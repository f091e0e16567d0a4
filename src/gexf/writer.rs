use std::io::{self, BufWriter, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::writer::Writer as XmlWriter;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ExportError;
use crate::graph::{EdgeKind, GraphStore};
use crate::io::Exporter;

const GEXF_NAMESPACE: &str = "http://www.gexf.net/1.2draft";
const VIZ_NAMESPACE: &str = "http://www.gexf.net/1.2draft/viz";

/// Writes GEXF 1.2draft documents with node positions and sizes.
#[derive(Debug, Clone)]
pub struct GexfExporter {
    creator: String,
    date: Option<String>,
}

impl GexfExporter {
    pub fn new() -> Self {
        Self {
            creator: env!("CARGO_PKG_NAME").to_string(),
            date: None,
        }
    }

    /// Use a fixed `lastmodifieddate` instead of today's date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Serialize the store to a string.
    pub fn render(&self, store: &GraphStore) -> Result<String, ExportError> {
        let mut bytes = Vec::new();
        self.write_to(store, &mut bytes)
            .map_err(|source| ExportError::Render { source })?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Serialize the store to any writer.
    pub fn write_to<W: Write>(&self, store: &GraphStore, out: W) -> io::Result<()> {
        let mut writer = XmlWriter::new_with_indent(out, b' ', 2);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer
            .create_element("gexf")
            .with_attributes([
                ("xmlns", GEXF_NAMESPACE),
                ("xmlns:viz", VIZ_NAMESPACE),
                ("version", "1.2"),
            ])
            .write_inner_content(|w| {
                self.write_meta(w, store)?;
                write_graph(w, store)
            })?;

        let mut out = writer.into_inner();
        out.write_all(b"\n")?;
        out.flush()
    }

    fn write_meta<W: Write>(&self, w: &mut XmlWriter<W>, store: &GraphStore) -> io::Result<()> {
        let meta = store.meta();
        let date = match &self.date {
            Some(date) => date.clone(),
            None => chrono::Local::now().format("%Y-%m-%d").to_string(),
        };
        let creator = meta.creator.as_deref().unwrap_or(&self.creator);

        w.create_element("meta")
            .with_attribute(("lastmodifieddate", date.as_str()))
            .write_inner_content(|w| {
                w.create_element("creator")
                    .write_text_content(BytesText::new(creator))?;
                if let Some(description) = &meta.description {
                    w.create_element("description")
                        .write_text_content(BytesText::new(description))?;
                }
                Ok(())
            })?;
        Ok(())
    }
}

fn write_graph<W: Write>(w: &mut XmlWriter<W>, store: &GraphStore) -> io::Result<()> {
    let default_kind = store.meta().default_edge_kind;

    w.create_element("graph")
        .with_attributes([
            ("mode", "static"),
            ("defaultedgetype", default_kind.as_str()),
        ])
        .write_inner_content(|w| {
            w.create_element("nodes")
                .write_inner_content(|w| write_nodes(w, store))?;
            w.create_element("edges")
                .write_inner_content(|w| write_edges(w, store, default_kind))?;
            Ok(())
        })?;
    Ok(())
}

fn write_nodes<W: Write>(w: &mut XmlWriter<W>, store: &GraphStore) -> io::Result<()> {
    for ((node, x), y) in store
        .node_slice()
        .iter()
        .zip(store.positions_x())
        .zip(store.positions_y())
    {
        let label = node.label.as_deref().unwrap_or(&node.key);
        let (x, y, size) = (x.to_string(), y.to_string(), node.size.to_string());
        w.create_element("node")
            .with_attributes([("id", node.key.as_str()), ("label", label)])
            .write_inner_content(|w| {
                w.create_element("viz:position")
                    .with_attributes([("x", x.as_str()), ("y", y.as_str()), ("z", "0.0")])
                    .write_empty()?;
                w.create_element("viz:size")
                    .with_attribute(("value", size.as_str()))
                    .write_empty()?;
                Ok(())
            })?;
    }
    Ok(())
}

fn write_edges<W: Write>(
    w: &mut XmlWriter<W>,
    store: &GraphStore,
    default_kind: EdgeKind,
) -> io::Result<()> {
    for edge in store.edges() {
        let id = edge.key.unwrap_or_else(|| edge.id.raw().to_string());
        let source = store.node(edge.source).map(|n| n.key.as_str()).unwrap_or_default();
        let target = store.node(edge.target).map(|n| n.key.as_str()).unwrap_or_default();
        let weight = edge.weight.to_string();

        let mut element = w.create_element("edge").with_attributes([
            ("id", id.as_str()),
            ("source", source),
            ("target", target),
            ("weight", weight.as_str()),
        ]);
        if edge.kind != default_kind {
            element = element.with_attribute(("type", edge.kind.as_str()));
        }
        element.write_empty()?;
    }
    Ok(())
}

impl Default for GexfExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Exporter for GexfExporter {
    /// Write to a temporary file next to `path`, then atomically replace `path`.
    ///
    /// A failed export leaves any existing file at `path` untouched.
    fn export(&self, store: &GraphStore, path: &Path) -> Result<(), ExportError> {
        let io_error = |source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        {
            let writer = BufWriter::new(file.as_file_mut());
            self.write_to(store, writer).map_err(io_error)?;
        }
        file.persist(path).map_err(|e| ExportError::Persist {
            path: path.to_path_buf(),
            source: e.error,
        })?;

        debug!(
            path = %path.display(),
            nodes = store.node_count(),
            edges = store.edge_count(),
            "GEXF document written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gexf::GexfImporter;
    use crate::graph::{EdgeKind, Node};
    use crate::io::Importer;

    fn sample_store() -> GraphStore {
        let mut store = GraphStore::new();
        store
            .add_node(Node::new("a").with_label("Alpha & co").with_size(4.0), 1.5, -2.0)
            .unwrap();
        store.add_node(Node::new("b"), 10.0, 20.0).unwrap();
        store.add_edge_with(Some("e0".into()), "a", "b", 2.5, EdgeKind::Directed).unwrap();
        store.add_edge_with(None, "b", "a", 1.0, EdgeKind::Undirected).unwrap();
        store
    }

    #[test]
    fn test_render_document() {
        let text = GexfExporter::new()
            .with_date("2024-05-01")
            .render(&sample_store())
            .unwrap();

        assert!(text.starts_with("<?xml"));
        assert!(text.contains(r#"<meta lastmodifieddate="2024-05-01">"#));
        assert!(text.contains("<creator>gexf-layout</creator>"));
        assert!(text.contains(r#"<node id="a" label="Alpha &amp; co">"#));
        assert!(text.contains(r#"<viz:position x="1.5" y="-2" z="0.0"/>"#));
        assert!(text.contains(r#"<viz:size value="4"/>"#));
        assert!(text.contains(r#"<node id="b" label="b">"#));
        assert!(text.contains(r#"<edge id="e0" source="a" target="b" weight="2.5"/>"#));
        assert!(text.contains(r#"<edge id="1" source="b" target="a" weight="1" type="undirected"/>"#));
    }

    #[test]
    fn test_meta_carried_through() {
        let mut store = sample_store();
        store.meta_mut().creator = Some("nsndswap".to_string());
        store.meta_mut().description = Some("<songs>".to_string());
        let text = GexfExporter::new().with_date("2024-05-01").render(&store).unwrap();

        assert!(text.contains("<creator>nsndswap</creator>"));
        assert!(text.contains("<description>&lt;songs&gt;</description>"));
    }

    #[test]
    fn test_empty_graph_is_well_formed() {
        let text = GexfExporter::new()
            .with_date("2024-05-01")
            .render(&GraphStore::new())
            .unwrap();
        let store = GexfImporter::with_defaults().parse_str(&text).unwrap();
        assert!(store.is_empty());
        assert!(text.contains("<nodes>\n    </nodes>"));
    }

    #[test]
    fn test_reimport_preserves_graph() {
        let original = sample_store();
        let text = GexfExporter::new().render(&original).unwrap();
        let store = GexfImporter::with_defaults().parse_str(&text).unwrap();

        assert_eq!(store.node_count(), 2);
        assert_eq!(store.position(store.node_id("a").unwrap()), Some((1.5, -2.0)));
        assert_eq!(store.node(store.node_id("a").unwrap()).unwrap().size, 4.0);
        let kinds: Vec<_> = store.edges().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EdgeKind::Directed, EdgeKind::Undirected]);
    }

    #[test]
    fn test_export_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.gexf");
        std::fs::write(&path, "old contents").unwrap();

        GexfExporter::new().export(&sample_store(), &path).unwrap();

        let store = GexfImporter::with_defaults().import(&path).unwrap();
        assert_eq!(store.node_count(), 2);
        assert_eq!(store.edge_count(), 2);
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("graph.gexf");
        let err = GexfExporter::new().export(&sample_store(), &path).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!path.exists());
    }
}
