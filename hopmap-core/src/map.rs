// Map document generation: one self-contained HTML page per route.

use hopmap_resolver::Location;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_ATTRIBUTION: &str =
    r#"&copy; <a href="http://openstreetmap.org/copyright">OpenStreetMap</a> contributors"#;

const LEAFLET_CSS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS_URL: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";

/// Rendering configuration for one map document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapOptions {
    /// Identity of the widget container; teardown-before-create is keyed
    /// on this.
    pub container_id: String,
    pub title: String,
    pub tile_url: String,
    pub attribution: String,
    pub max_zoom: u8,
    /// View shown when no locations exist.
    pub default_center: (f64, f64),
    pub default_zoom: u8,
    /// Zoom used when centering on the first location.
    pub focus_zoom: u8,
    /// Draw a connecting path through the markers in input order.
    pub draw_path: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            title: "hopmap".to_string(),
            tile_url: DEFAULT_TILE_URL.to_string(),
            attribution: DEFAULT_ATTRIBUTION.to_string(),
            max_zoom: 19,
            default_center: (0.0, 0.0),
            default_zoom: 2,
            focus_zoom: 4,
            draw_path: true,
        }
    }
}

/// A renderable map: options plus the locations to plot. Rendering is a
/// pure function of both; rendering twice yields the same document.
pub struct MapDocument {
    options: MapOptions,
    locations: Vec<Location>,
}

impl MapDocument {
    pub fn new(options: MapOptions) -> Self {
        Self {
            options,
            locations: Vec::new(),
        }
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    /// Emit the complete HTML document.
    pub fn render(&self) -> String {
        let mut page = String::new();

        page.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        page.push_str("<meta charset=\"utf-8\">\n");
        page.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        page.push_str(&format!("<title>{}</title>\n", html_escape(&self.options.title)));
        page.push_str(&format!(
            "<link rel=\"stylesheet\" href=\"{}\">\n",
            LEAFLET_CSS_URL
        ));
        page.push_str(&format!("<script src=\"{}\"></script>\n", LEAFLET_JS_URL));
        page.push_str("<style>\n");
        page.push_str(&format!(
            "html, body, #{} {{ height: 100%; margin: 0; }}\n",
            self.options.container_id
        ));
        page.push_str("</style>\n</head>\n<body>\n");
        page.push_str(&format!(
            "<div id=\"{}\"></div>\n",
            html_escape(&self.options.container_id)
        ));
        page.push_str("<script>\n");
        page.push_str(&self.render_script());
        page.push_str("</script>\n</body>\n</html>\n");

        page
    }

    /// Emit the widget init script alone.
    pub fn render_script(&self) -> String {
        let mut script = String::new();

        // Tear down any widget previously bound to this container before
        // creating a new one.
        script.push_str(&format!(
            "var containerId = {};\n",
            js_string(&self.options.container_id)
        ));
        script.push_str("var widgets = window.__hopmapWidgets = window.__hopmapWidgets || {};\n");
        script.push_str("if (widgets[containerId]) {\n");
        script.push_str("    widgets[containerId].remove();\n");
        script.push_str("}\n\n");

        match self.locations.first() {
            Some(first) => {
                script.push_str(&format!(
                    "var map = L.map(containerId).setView([{}, {}], {});\n",
                    first.latitude, first.longitude, self.options.focus_zoom
                ));
            }
            None => {
                script.push_str(&format!(
                    "var map = L.map(containerId).setView([{}, {}], {});\n",
                    self.options.default_center.0,
                    self.options.default_center.1,
                    self.options.default_zoom
                ));
            }
        }
        script.push_str("widgets[containerId] = map;\n\n");

        script.push_str(&format!(
            "L.tileLayer({}, {{\n    maxZoom: {},\n    attribution: {}\n}}).addTo(map);\n\n",
            js_string(&self.options.tile_url),
            self.options.max_zoom,
            js_string(&self.options.attribution)
        ));

        for (index, location) in self.locations.iter().enumerate() {
            script.push_str(&format!(
                "L.marker([{}, {}]).addTo(map)\n    .bindPopup({});\n",
                location.latitude,
                location.longitude,
                js_string(&popup_html(index, location))
            ));
        }

        if self.options.draw_path && self.locations.len() > 1 {
            let vertices: Vec<String> = self
                .locations
                .iter()
                .map(|location| format!("[{}, {}]", location.latitude, location.longitude))
                .collect();

            script.push('\n');
            script.push_str(&format!(
                "var path = L.polyline([{}]).addTo(map);\n",
                vertices.join(", ")
            ));
            script.push_str("map.fitBounds(path.getBounds());\n");
        }

        script
    }
}

/// Popup body for one marker: 1-based hop index, address and coordinates.
pub fn popup_html(index: usize, location: &Location) -> String {
    format!(
        "<b>Hop {}</b><br>IP: {}<br>Lat: {}<br>Lon: {}",
        index + 1,
        html_escape(&location.ip),
        location.latitude,
        location.longitude
    )
}

fn js_string(value: &str) -> String {
    serde_json::to_string(value).expect("string serializes to JSON")
}

fn html_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
