use geojson::GeoJson;
use geo::{BoundingRect, Contains, Geometry, MultiPolygon, Point, Polygon};
use ratatui::widgets::canvas::{Canvas, Line, Points};
use ratatui::widgets::{Block, Borders};
use ratatui::layout::Rect as TuiRect;
use ratatui::{Frame, style::Color, symbols::Marker};

use crate::charts::{ChoroplethSpec, Rgb};

/// Grid columns used to sample the interior of every shape.
const FILL_COLUMNS: f64 = 220.0;

/// Islands smaller than this share of a prefecture's largest polygon are
/// dropped.
const MIN_ISLAND_SHARE: f64 = 0.02;

/// Shoelace area of a polygon's exterior ring, in squared degrees.
fn poly_area(poly: &Polygon<f64>) -> f64 {
    let coords = &poly.exterior().0;
    let mut sum = 0.0;
    for window in coords.windows(2) {
        let a = window[0];
        let b = window[1];
        sum += a.x * b.y - b.x * a.y;
    }
    (sum * 0.5).abs()
}

fn feature_id(props: &serde_json::Map<String, serde_json::Value>) -> Option<String> {
    match props.get("id")? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

struct Shape {
    code: String,
    polygons: MultiPolygon<f64>,
    /// Sample points inside the shape, painted in the prefecture's color.
    fill: Vec<(f64, f64)>,
}

/// Prefecture boundaries keyed by `prefecture_code`, ready for the canvas.
pub struct MapView {
    shapes: Vec<Shape>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl Default for MapView {
    fn default() -> Self {
        Self { shapes: Vec::new(), x_bounds: [0.0, 1.0], y_bounds: [0.0, 1.0] }
    }
}

impl MapView {
    pub fn new(raw: GeoJson) -> Result<Self, geojson::Error> {
        let mut shapes = Vec::new();

        if let GeoJson::FeatureCollection(fc) = raw {
            for feature in fc.features {
                let Some(code) = feature.properties.as_ref().and_then(feature_id) else {
                    log::debug!("Skipping feature without an id property");
                    continue;
                };

                if let Some(gj) = feature.geometry {
                    let geom: Geometry<f64> = gj.value.try_into()?;
                    let mut mp = match geom {
                        Geometry::Polygon(p) => p.into(),
                        Geometry::MultiPolygon(m) => m,
                        _ => {
                            log::debug!("Skipping non-polygon geometry for {code}");
                            continue;
                        }
                    };

                    if mp.0.len() > 1 {
                        let areas: Vec<f64> = mp.0.iter().map(poly_area).collect();
                        let max_area = areas.iter().copied().fold(0.0, f64::max);
                        let threshold = max_area * MIN_ISLAND_SHARE;
                        let kept: Vec<Polygon<f64>> = mp
                            .0
                            .iter()
                            .zip(areas)
                            .filter(|(_, area)| *area >= threshold)
                            .map(|(poly, _)| poly.clone())
                            .collect();
                        if !kept.is_empty() {
                            mp = MultiPolygon(kept);
                        }
                    }

                    shapes.push(Shape { code, polygons: mp, fill: Vec::new() });
                }
            }
        }

        let (mut minx, mut miny, mut maxx, mut maxy) =
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);
        for shape in &shapes {
            if let Some(rect) = shape.polygons.bounding_rect() {
                minx = minx.min(rect.min().x);
                miny = miny.min(rect.min().y);
                maxx = maxx.max(rect.max().x);
                maxy = maxy.max(rect.max().y);
            }
        }
        if shapes.is_empty() || minx >= maxx || miny >= maxy {
            return Ok(Self { shapes, ..Self::default() });
        }

        let step = (maxx - minx) / FILL_COLUMNS;
        for shape in &mut shapes {
            shape.fill = sample_interior(&shape.polygons, minx, miny, step);
        }

        Ok(Self { shapes, x_bounds: [minx, maxx], y_bounds: [miny, maxy] })
    }

    /// Number of prefecture shapes.
    pub fn feature_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn has_feature(&self, code: &str) -> bool {
        self.shapes.iter().any(|s| s.code == code)
    }

    /// Paints every prefecture in its choropleth color, then the borders.
    pub fn render(&self, f: &mut Frame, area: TuiRect, title: &str, spec: &ChoroplethSpec) {
        let canvas = Canvas::default()
            .block(Block::default().title(title).borders(Borders::ALL))
            .marker(Marker::Braille)
            .x_bounds(self.x_bounds)
            .y_bounds(self.y_bounds)
            .paint(|ctx| {
                for shape in &self.shapes {
                    let color = spec.color_of(&shape.code).map_or(Color::DarkGray, tui_color);
                    ctx.draw(&Points { coords: &shape.fill, color });
                }
                ctx.layer();
                for shape in &self.shapes {
                    for poly in &shape.polygons.0 {
                        let ring = &poly.exterior().0;
                        for window in ring.windows(2) {
                            let a = window[0];
                            let b = window[1];
                            ctx.draw(&Line { x1: a.x, y1: a.y, x2: b.x, y2: b.y, color: Color::Gray });
                        }
                    }
                }
            });
        f.render_widget(canvas, area);
    }
}

/// Grid points (aligned to the map origin) that fall inside `mp`.
fn sample_interior(mp: &MultiPolygon<f64>, origin_x: f64, origin_y: f64, step: f64) -> Vec<(f64, f64)> {
    let Some(rect) = mp.bounding_rect() else {
        return Vec::new();
    };
    let first_x = origin_x + ((rect.min().x - origin_x) / step).ceil() * step;
    let first_y = origin_y + ((rect.min().y - origin_y) / step).ceil() * step;

    let mut points = Vec::new();
    let mut x = first_x;
    while x <= rect.max().x {
        let mut y = first_y;
        while y <= rect.max().y {
            if mp.contains(&Point::new(x, y)) {
                points.push((x, y));
            }
            y += step;
        }
        x += step;
    }
    points
}

pub fn tui_color(c: Rgb) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const TWO_SQUARES: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"id":"JP01"},
         "geometry":{"type":"Polygon","coordinates":[[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
        {"type":"Feature","properties":{"id":47},
         "geometry":{"type":"MultiPolygon","coordinates":[
            [[[20,0],[30,0],[30,10],[20,10],[20,0]]],
            [[[40,0],[40.01,0],[40.01,0.01],[40,0.01],[40,0]]]
         ]}},
        {"type":"Feature","properties":{"name":"no id"},
         "geometry":{"type":"Point","coordinates":[5,5]}},
        {"type":"Feature","properties":{"id":"JP99"},
         "geometry":{"type":"Point","coordinates":[5,5]}}
    ]}"#;

    #[test]
    fn keys_shapes_by_id() {
        let view = MapView::new(GeoJson::from_str(TWO_SQUARES).unwrap()).unwrap();
        assert_eq!(view.feature_count(), 2);
        assert!(view.has_feature("JP01"));
        assert!(view.has_feature("47"));
        assert!(!view.has_feature("JP99"));
    }

    #[test]
    fn small_islands_are_dropped() {
        let view = MapView::new(GeoJson::from_str(TWO_SQUARES).unwrap()).unwrap();
        let okinawa = view.shapes.iter().find(|s| s.code == "47").unwrap();
        assert_eq!(okinawa.polygons.0.len(), 1);
        assert!((view.x_bounds[1] - 30.0).abs() < 1e-9);
    }

    #[test]
    fn interior_is_sampled() {
        let view = MapView::new(GeoJson::from_str(TWO_SQUARES).unwrap()).unwrap();
        for shape in &view.shapes {
            assert!(!shape.fill.is_empty());
            assert!(shape.fill.iter().all(|&(x, y)| shape.polygons.contains(&Point::new(x, y))));
        }
    }

    #[test]
    fn square_area() {
        let poly = Polygon::new(
            vec![(0.0, 0.0), (2.0, 0.0), (2.0, 3.0), (0.0, 3.0), (0.0, 0.0)].into(),
            vec![],
        );
        assert!((poly_area(&poly) - 6.0).abs() < f64::EPSILON);
    }
}
