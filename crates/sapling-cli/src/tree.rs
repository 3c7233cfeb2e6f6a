//! JSON description of a node tree and its construction in an engine.

use sapling::prelude::*;
use serde::Deserialize;
use serde_json::{Map, Value as Json};
use std::rc::Rc;

use crate::CliError;

/// One node of an input document.
///
/// ```json
/// {
///   "style": { "flex-direction": "row", "width": { "point": 300 } },
///   "children": [ { "measure": { "width": 40, "height": 12 } } ]
/// }
/// ```
///
/// `style` lists only the properties that differ from the node's defaults,
/// which depend on whether the engine uses web defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NodeSpec {
    #[serde(default)]
    pub(crate) style: Map<String, Json>,
    #[serde(default)]
    pub(crate) children: Vec<NodeSpec>,
    /// Natural size of a leaf whose content sizes itself, like a text run.
    #[serde(default)]
    pub(crate) measure: Option<Size>,
}

impl NodeSpec {
    pub(crate) fn from_json(text: &str) -> serde_json::Result<Self> {
        let spec: Self = serde_json::from_str(text)?;
        spec.check_styles()?;
        Ok(spec)
    }

    /// Total node count including this one.
    pub(crate) fn len(&self) -> usize {
        1 + self.children.iter().map(Self::len).sum::<usize>()
    }

    fn check_styles(&self) -> serde_json::Result<()> {
        apply_style(Style::default(), &self.style)?;
        self.children.iter().try_for_each(Self::check_styles)
    }
}

/// Overlay the properties in `overrides` onto `base`.
fn apply_style(base: Style, overrides: &Map<String, Json>) -> serde_json::Result<Style> {
    if overrides.is_empty() {
        return Ok(base);
    }
    let mut merged = match serde_json::to_value(base)? {
        Json::Object(fields) => fields,
        _ => Map::new(),
    };
    for (name, value) in overrides {
        merged.insert(name.clone(), value.clone());
    }
    serde_json::from_value(Json::Object(merged))
}

/// Fit a natural extent into the space the parent offers.
fn fit(natural: f32, available: f32, mode: MeasureMode) -> f32 {
    match mode {
        MeasureMode::Undefined => natural,
        MeasureMode::Exactly => available,
        MeasureMode::AtMost => natural.min(available),
    }
}

/// Create the nodes of `spec` in `engine` and return the root.
pub(crate) fn build(engine: &mut LayoutEngine, spec: &NodeSpec) -> Result<NodeId, CliError> {
    let id = engine.new_node();
    let style = apply_style(*engine.style(id)?, &spec.style)?;
    engine.set_style(id, style)?;

    if let Some(natural) = spec.measure {
        engine.set_measure_func(
            id,
            Some(Rc::new(move |_, width: f32, width_mode, height: f32, height_mode| {
                Size::new(
                    fit(natural.width, width, width_mode),
                    fit(natural.height, height, height_mode),
                )
            })),
        )?;
    }

    for child in &spec.children {
        let child = build(engine, child)?;
        engine.append_child(id, child)?;
    }
    Ok(id)
}
