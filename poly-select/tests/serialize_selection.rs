use poly_select::{Point, PolyLine};

#[test]
fn serialize_deserialize_selection_path() {
    let path = vec![
        PolyLine::new(Point::new(0, 0), Point::new(10, 0)),
        PolyLine::from_points(vec![Point::new(10, 0), Point::new(7, 5), Point::new(0, 0)]).unwrap(),
    ];
    let serialized = serde_json::to_string(&path).unwrap();
    let deserialized: Vec<PolyLine> = serde_json::from_str(&serialized).unwrap();
    assert_eq!(path, deserialized);
}
