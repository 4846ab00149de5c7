//! Interactive HTML visualization (Vega-Lite, rendered by vega-embed in the browser).

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tracing::info;

use crate::error::{ReportError, Result};
use crate::records::{ChartData, UNIQUE_MARK};

const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Output path with an `.html` extension appended when missing.
pub fn visualization_path(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "html") {
        path.to_path_buf()
    } else {
        let mut raw = path.as_os_str().to_owned();
        raw.push(".html");
        PathBuf::from(raw)
    }
}

fn count_encoding() -> Value {
    json!({"aggregate": "count", "field": "cat_val", "type": "quantitative"})
}

fn dropdown(name: &str, options: &[String]) -> Value {
    let mut param = json!({
        "name": name,
        "select": {"type": "point", "fields": [name]},
        "bind": {"input": "select", "options": options, "name": format!("{name} ")},
    });
    if let Some(first) = options.first() {
        param["value"] = json!([{ name: first }]);
    }
    param
}

/// Three horizontally concatenated panels: selection progression, numeric
/// scatter with variable dropdowns and a brush, and categorical counts
/// filtered by the brush.
pub fn chart_spec(data: &ChartData) -> Result<Value> {
    let steps: Vec<&str> = data.flowchart.iter().map(|r| r.step.as_str()).collect();

    let progression = json!({
        "title": "Samples selection progression",
        "width": 200,
        "height": 200,
        "data": {"name": "flowchart"},
        "mark": {"type": "line", "point": true},
        "encoding": {
            "x": {"field": "step", "type": "nominal", "sort": steps},
            "y": {"field": "samples", "type": "quantitative", "scale": {"zero": false}},
            "tooltip": [
                {"field": "step"},
                {"field": "samples"},
                {"field": "variable"},
                {"field": "values"},
                {"field": "indicator"}
            ]
        }
    });

    let scatter = json!({
        "title": "Numeric variables values per sample",
        "width": 400,
        "height": 400,
        "data": {"name": "samples"},
        "params": [
            dropdown("num_var_x", &data.numeric_x),
            dropdown("num_var_y", &data.numeric_y),
            {"name": "brush", "select": {"type": "interval", "resolve": "global"}}
        ],
        "transform": [
            {"filter": {"param": "num_var_x"}},
            {"filter": {"param": "num_var_y"}}
        ],
        "mark": {"type": "point", "filled": true},
        "encoding": {
            "x": {"field": "num_val_x", "type": "quantitative", "scale": {"zero": false}},
            "y": {"field": "num_val_y", "type": "quantitative", "scale": {"zero": false}},
            "color": {
                "condition": {"param": "brush", "field": "num_val_y", "type": "quantitative"},
                "value": "gray"
            },
            "tooltip": {"field": "sample_name", "type": "nominal"}
        }
    });

    let factor_axis = json!({"field": "cat_val", "type": "nominal", "sort": data.sorted_factors});
    let bars = json!({
        "title": "Number of samples per categorical variable",
        "width": 600,
        "height": 200,
        "data": {"name": "samples"},
        "transform": [
            {"filter": {"param": "brush"}},
            {"filter": {"field": "is_unique_id", "equal": UNIQUE_MARK}}
        ],
        "layer": [
            {
                "mark": "bar",
                "encoding": {
                    "x": factor_axis,
                    "y": count_encoding(),
                    "color": {"field": "cat_var", "type": "nominal"}
                }
            },
            {
                "mark": {"type": "text", "align": "center", "baseline": "middle", "dy": -10},
                "encoding": {"x": factor_axis, "y": count_encoding(), "text": count_encoding()}
            }
        ]
    });

    Ok(json!({
        "$schema": VEGA_LITE_SCHEMA,
        "datasets": {
            "flowchart": serde_json::to_value(&data.flowchart)?,
            "samples": serde_json::to_value(&data.samples)?,
        },
        "hconcat": [progression, scatter, bars],
        "resolve": {"scale": {"color": "independent"}}
    }))
}

/// Standalone HTML page embedding `spec`.
pub fn render_html(spec: &Value) -> Result<String> {
    // A literal "</" would end the script element early.
    let spec = serde_json::to_string_pretty(spec)?.replace("</", "<\\/");
    Ok(format!(
        r##"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Samples inclusion/exclusion</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
</head>
<body>
  <div id="vis"></div>
  <script type="text/javascript">
    vegaEmbed("#vis", {spec}).catch(console.error);
  </script>
</body>
</html>
"##
    ))
}

/// Write the visualization, creating parent directories. Returns the path
/// written, with `.html` appended when it was missing.
pub fn write_visualization(data: &ChartData, path: &Path) -> Result<PathBuf> {
    let path = visualization_path(path);
    let write_error = |source| ReportError::Write {
        path: path.clone(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    let html = render_html(&chart_spec(data)?)?;
    fs::write(&path, html).map_err(write_error)?;
    info!(
        path = %path.display(),
        steps = data.flowchart.len(),
        records = data.samples.len(),
        "visualization written"
    );
    Ok(path)
}
