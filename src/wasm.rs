//! WebAssembly entry points.

use wasm_bindgen::prelude::*;

use crate::config::LayoutParameters;
use crate::gexf::{GexfExporter, GexfImporter};
use crate::layout::NoProgress;
use crate::pipeline::Pipeline;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Lay out a GEXF document and return the laid-out document.
///
/// `params` follows the TOML configuration layout; `undefined` or `null`
/// selects the defaults.
#[wasm_bindgen(js_name = layoutGexf)]
pub fn layout_gexf(source: &str, params: JsValue) -> Result<String, JsValue> {
    let params: LayoutParameters = if params.is_undefined() || params.is_null() {
        LayoutParameters::default()
    } else {
        serde_wasm_bindgen::from_value(params)?
    };

    let store = GexfImporter::new(params.import.clone())
        .parse_str(source)
        .map_err(to_js_error)?;
    let mut pipeline = Pipeline::new(store, params);
    pipeline.run_stages(&mut NoProgress).map_err(to_js_error)?;

    let exporter = GexfExporter::new();
    let (document, _) = pipeline
        .export_with(|store| exporter.render(store))
        .map_err(to_js_error)?;
    Ok(document)
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
