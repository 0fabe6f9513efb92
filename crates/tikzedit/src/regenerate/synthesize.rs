//! From-scratch serialization of a model.

use indexmap::IndexMap;

use tikzedit_core::{geometry::Point, identifier::Id, model::ConnectorStyle};

use crate::model::{Group, Model};

use super::Format;

/// Writes a minimal document containing only what the model knows:
/// nodes, groups and connectors. Source formatting is not preserved.
pub(crate) fn synthesize(model: &Model, positions: &IndexMap<Id, Point>, format: Format) -> String {
    let mut out = String::from("\\begin{tikzpicture}\n");

    for node in model.nodes().values() {
        let Some(position) = positions.get(&node.name()) else {
            continue;
        };
        let label = model
            .document()
            .nodes
            .get(&node.name())
            .map_or(node.text(), |record| record.raw_label.as_str());
        out.push_str(&format!(
            "    \\node[{}] ({}) {} {{{label}}};\n",
            node.shape().style_keyword(),
            node.name(),
            format.at(*position),
        ));
    }

    let groups: Vec<&Group> = model
        .groups()
        .values()
        .filter(|group| !group.members().is_empty())
        .collect();
    if !groups.is_empty() {
        out.push_str("    \\begin{scope}[on background layer]\n");
        let scale = model.config().units().scale();
        for group in groups {
            out.push_str(&format!(
                "        \\node[{}] ({}) {{{}}};\n",
                group_options(group, format.length(group.padding() / scale)),
                group.name(),
                group.text(),
            ));
        }
        out.push_str("    \\end{scope}\n");
    }

    for connector in model.connectors() {
        let style = match connector.style {
            ConnectorStyle::Dashed => "[dashed]",
            ConnectorStyle::Plain => "",
        };
        out.push_str(&format!(
            "    \\draw{style} ({}) -- ({});\n",
            connector.source, connector.target
        ));
    }

    out.push_str("\\end{tikzpicture}\n");
    out
}

fn group_options(group: &Group, padding: String) -> String {
    let hints = group.hints();
    let mut options: Vec<String> = Vec::new();
    if let Some(draw) = &hints.draw {
        options.push(if draw.is_empty() {
            "draw".to_string()
        } else {
            format!("draw={draw}")
        });
    }
    if let Some(fill) = &hints.fill {
        options.push(format!("fill={fill}"));
    }
    if hints.rounded_corners {
        options.push("rounded corners".to_string());
    }
    if hints.dashed {
        options.push("dashed".to_string());
    }
    let members: Vec<String> = group.members().iter().map(|m| format!("({m})")).collect();
    options.push(format!("fit={}", members.join(" ")));
    options.push(format!("inner sep={padding}"));
    options.join(", ")
}
