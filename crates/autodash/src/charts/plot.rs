//! Declarative plot definitions.
//!
//! A [`PlotDefinition`] carries the data arrays and display hints a renderer
//! needs; it holds no pixels and round-trips through JSON.

use serde::{Deserialize, Serialize};

/// Renderable description of one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotDefinition {
    pub layout: Layout,
    pub mark: Mark,
}

impl PlotDefinition {
    pub fn new(layout: Layout, mark: Mark) -> Self {
        Self { layout, mark }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Display hints shared by every mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub margin: Margin,
    pub show_legend: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
}

impl Layout {
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            margin: Margin::default(),
            show_legend: true,
            x_label: None,
            y_label: None,
        }
    }

    pub fn without_legend(mut self) -> Self {
        self.show_legend = false;
        self
    }

    pub fn with_axis_labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x_label = Some(x.into());
        self.y_label = Some(y.into());
        self
    }
}

/// Plot margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margin {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            left: 20,
            right: 20,
            top: 40,
            bottom: 20,
        }
    }
}

/// A named sequence of numeric values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValues {
    pub name: String,
    pub values: Vec<f64>,
}

/// The geometry of a chart and the data bound to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Mark {
    /// Binned distribution of one column; binning is left to the renderer.
    Histogram {
        column: String,
        values: Vec<f64>,
        nbins: usize,
        color: String,
    },
    /// Square matrix of values with shared row/column labels.
    Heatmap {
        labels: Vec<String>,
        z: Vec<Vec<f64>>,
        color_scale: String,
        zmin: f64,
        zmax: f64,
    },
    /// One box per series.
    Box { series: Vec<NamedValues> },
    /// Bars of counts per category, in display order.
    Bar {
        column: String,
        categories: Vec<String>,
        counts: Vec<usize>,
    },
    /// Pairwise scatter plots over the dimensions.
    ScatterMatrix { dimensions: Vec<NamedValues> },
    /// Line of `y` against ISO-8601 timestamps `x`, ascending in time.
    Line {
        x_column: String,
        y_column: String,
        x: Vec<String>,
        y: Vec<f64>,
    },
}
