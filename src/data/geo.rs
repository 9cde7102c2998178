use geo::{Contains, LineString, MultiPolygon, Point, Polygon, TriangulateEarcut};
use serde::Deserialize;
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// Raw GeoJSON shapes (only what the map needs)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GeoJsonFeatureCollection {
    features: Vec<GeoJsonFeature>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonFeature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, JsonValue>>,
    geometry: Option<GeoJsonGeometry>,
}

#[derive(Debug, Deserialize)]
struct GeoJsonGeometry {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    coordinates: JsonValue,
}

/// Property holding the region name that joins against `Record::region`.
pub const JOIN_PROPERTY: &str = "VARNAME_2";

/// Coordinates of one GeoJSON polygon: outer ring first, then holes.
type PolygonCoords = Vec<Vec<Vec<f64>>>;

// ---------------------------------------------------------------------------
// Boundary features
// ---------------------------------------------------------------------------

/// One drawable region: its join name, its polygons (with holes) and the
/// fill triangulation of those polygons.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub triangles: Vec<[[f64; 2]; 3]>,
}

impl BoundaryFeature {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        let triangles = fill_triangles(&geometry);
        Self {
            name: name.into(),
            geometry,
            triangles,
        }
    }

    /// Inside the region, holes excluded.
    pub fn contains(&self, point: [f64; 2]) -> bool {
        self.geometry.contains(&Point::new(point[0], point[1]))
    }
}

/// All region boundaries of the map, in file order.
#[derive(Debug, Clone, Default)]
pub struct Boundaries {
    features: Vec<BoundaryFeature>,
}

impl Boundaries {
    pub fn from_features(features: Vec<BoundaryFeature>) -> Self {
        Self { features }
    }

    /// Parse a FeatureCollection. Features without a name or without
    /// polygon geometry are skipped with a warning.
    pub fn from_geojson_str(text: &str) -> serde_json::Result<Self> {
        let fc: GeoJsonFeatureCollection = serde_json::from_str(text)?;

        let mut features = Vec::with_capacity(fc.features.len());
        for (i, feature) in fc.features.into_iter().enumerate() {
            let name = feature
                .properties
                .as_ref()
                .and_then(|p| p.get(JOIN_PROPERTY))
                .and_then(|v| v.as_str());
            let Some(name) = name else {
                log::warn!("Feature {i}: missing '{JOIN_PROPERTY}' property, skipped");
                continue;
            };
            let Some(geometry) = feature.geometry else {
                log::warn!("Feature {i} ({name}): no geometry, skipped");
                continue;
            };

            let polygons = match geometry.ty.as_str() {
                "Polygon" => serde_json::from_value::<PolygonCoords>(geometry.coordinates)
                    .map(|coords| polygon(&coords).into_iter().collect::<Vec<_>>()),
                "MultiPolygon" => serde_json::from_value::<Vec<PolygonCoords>>(geometry.coordinates)
                    .map(|polys| polys.iter().filter_map(polygon).collect()),
                other => {
                    log::warn!("Feature {i} ({name}): unsupported geometry {other}, skipped");
                    continue;
                }
            };
            let polygons = match polygons {
                Ok(polygons) if !polygons.is_empty() => polygons,
                Ok(_) => {
                    log::warn!("Feature {i} ({name}): no usable rings, skipped");
                    continue;
                }
                Err(e) => {
                    log::warn!("Feature {i} ({name}): bad coordinates ({e}), skipped");
                    continue;
                }
            };

            features.push(BoundaryFeature::new(name, MultiPolygon::new(polygons)));
        }

        Ok(Self::from_features(features))
    }

    pub fn features(&self) -> &[BoundaryFeature] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Build a polygon from GeoJSON rings. Positions keep only `[lon, lat]`;
/// rings with fewer than three positions are dropped, and a polygon without
/// a usable outer ring is `None`.
fn polygon(coords: &PolygonCoords) -> Option<Polygon<f64>> {
    let mut rings = coords.iter().filter_map(|ring| {
        let points: Vec<[f64; 2]> = ring
            .iter()
            .filter_map(|pos| Some([*pos.first()?, *pos.get(1)?]))
            .collect();
        (points.len() >= 3).then(|| LineString::from(points))
    });
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

/// Ear-clipping triangulation of every polygon, holes cut out. The plot
/// layer only fills convex shapes, so regions are painted triangle by
/// triangle.
pub fn fill_triangles(geometry: &MultiPolygon<f64>) -> Vec<[[f64; 2]; 3]> {
    geometry
        .iter()
        .flat_map(|poly| poly.earcut_triangles())
        .map(|tri| tri.to_array().map(|c| [c.x, c.y]))
        .collect()
}

/// Closed rings (outer and holes) of every polygon, as `[lon, lat]` points.
pub fn outlines(geometry: &MultiPolygon<f64>) -> impl Iterator<Item = Vec<[f64; 2]>> + '_ {
    geometry.iter().flat_map(|poly| {
        std::iter::once(poly.exterior())
            .chain(poly.interiors())
            .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"VARNAME_2": "Bogor"},
             "geometry": {"type": "Polygon",
                          "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]],
                                          [[0.5,0.5],[1,0.5],[1,1],[0.5,0.5]]]}},
            {"type": "Feature", "properties": {"VARNAME_2": "Kepulauan"},
             "geometry": {"type": "MultiPolygon",
                          "coordinates": [[[[3,0],[4,0],[4,1],[3,0]]],
                                          [[[5,0,12.0],[6,0,12.0],[6,1,12.0],[5,0,12.0]]]]}},
            {"type": "Feature", "properties": {"NAME_2": "Nameless"},
             "geometry": {"type": "Polygon", "coordinates": [[[9,9],[10,9],[10,10],[9,9]]]}},
            {"type": "Feature", "properties": {"VARNAME_2": "Point"},
             "geometry": {"type": "Point", "coordinates": [1, 1]}},
            {"type": "Feature", "properties": {"VARNAME_2": "Null"}, "geometry": null}
        ]
    }"#;

    /// Barycentric sign test, inclusive of edges.
    fn in_triangle(p: [f64; 2], [a, b, c]: [[f64; 2]; 3]) -> bool {
        let cross = |o: [f64; 2], u: [f64; 2]| {
            (u[0] - o[0]) * (p[1] - o[1]) - (u[1] - o[1]) * (p[0] - o[0])
        };
        let (d1, d2, d3) = (cross(a, b), cross(b, c), cross(c, a));
        let neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(neg && pos)
    }

    fn triangle_area([a, b, c]: [[f64; 2]; 3]) -> f64 {
        ((b[0] - a[0]) * (c[1] - a[1]) - (c[0] - a[0]) * (b[1] - a[1])).abs() / 2.0
    }

    fn region(rings: Vec<Vec<[f64; 2]>>) -> BoundaryFeature {
        let mut rings = rings.into_iter().map(LineString::from);
        let exterior = rings.next().unwrap();
        BoundaryFeature::new(
            "r",
            MultiPolygon::new(vec![Polygon::new(exterior, rings.collect())]),
        )
    }

    #[test]
    fn keeps_polygons_and_skips_unusable_features() {
        let b = Boundaries::from_geojson_str(COLLECTION).unwrap();
        let names: Vec<_> = b.features().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Bogor", "Kepulauan"]);
        assert_eq!(b.features()[0].geometry.0.len(), 1);
        assert_eq!(b.features()[0].geometry.0[0].interiors().len(), 1);
        assert_eq!(b.features()[1].geometry.0.len(), 2);
        // Third coordinate (elevation) is dropped.
        let second = b.features()[1].geometry.0[1].exterior();
        assert_eq!(second.0[0], geo::coord! { x: 5.0, y: 0.0 });
    }

    #[test]
    fn holes_are_excluded_from_the_region() {
        let b = Boundaries::from_geojson_str(COLLECTION).unwrap();
        let bogor = &b.features()[0];
        assert!(bogor.contains([1.5, 1.5]));
        assert!(!bogor.contains([0.8, 0.6]));
        assert!(!bogor.contains([5.8, 0.2]));
        assert!(b.features()[1].contains([5.8, 0.2]));
    }

    #[test]
    fn concave_region_fill_stays_inside_outline() {
        let u = region(vec![vec![
            [0.0, 0.0],
            [3.0, 0.0],
            [3.0, 3.0],
            [2.0, 3.0],
            [2.0, 1.0],
            [1.0, 1.0],
            [1.0, 3.0],
            [0.0, 3.0],
        ]]);
        assert!(!u.contains([1.5, 2.0]));
        assert!(!u.triangles.iter().any(|&t| in_triangle([1.5, 2.0], t)));
        assert!(u.triangles.iter().any(|&t| in_triangle([0.5, 2.5], t)));

        let area: f64 = u.triangles.iter().map(|&t| triangle_area(t)).sum();
        assert!((area - 7.0).abs() < 1e-9, "filled area {area}");
    }

    #[test]
    fn fill_leaves_holes_empty() {
        let framed = region(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]],
            vec![[1.0, 1.0], [3.0, 1.0], [3.0, 3.0], [1.0, 3.0]],
        ]);
        assert!(!framed.triangles.iter().any(|&t| in_triangle([2.0, 2.0], t)));
        let area: f64 = framed.triangles.iter().map(|&t| triangle_area(t)).sum();
        assert!((area - 12.0).abs() < 1e-9, "filled area {area}");
        assert_eq!(outlines(&framed.geometry).count(), 2);
    }

    #[test]
    fn rejects_non_collection() {
        assert!(Boundaries::from_geojson_str("[]").is_err());
    }
}
