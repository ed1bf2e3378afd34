use image::{DynamicImage, GenericImageView, RgbaImage};
use itertools::Itertools;

use crate::{ExportError, Point, PolyLine};

/// Vertices of the polygon described by a closed path, without repeating shared
/// boundary points.
pub fn polygon_vertices(path: &[PolyLine]) -> Vec<Point> {
    path.iter()
        .flat_map(|leg| &leg.points()[..leg.point_count() - 1])
        .copied()
        .collect()
}

/// Copy the pixels of `image` inside the closed `path` into a new image the size of
/// the path's bounding box (clipped to the image). Pixels whose centre lies outside
/// the polygon (even-odd rule) are fully transparent.
pub fn extract_selection(image: &DynamicImage, path: &[PolyLine]) -> Result<RgbaImage, ExportError> {
    let vertices = polygon_vertices(path);
    let (Some((min_x, max_x)), Some((min_y, max_y))) = (
        vertices.iter().map(|p| p.x).minmax().into_option(),
        vertices.iter().map(|p| p.y).minmax().into_option(),
    ) else {
        return Err(ExportError::OutsideImage);
    };

    let (width, height) = image.dimensions();
    let x0 = min_x.max(0) as i64;
    let y0 = min_y.max(0) as i64;
    let x1 = i64::from(max_x).min(i64::from(width) - 1);
    let y1 = i64::from(max_y).min(i64::from(height) - 1);
    if x0 > x1 || y0 > y1 {
        return Err(ExportError::OutsideImage);
    }

    let mut out = image
        .crop_imm(x0 as u32, y0 as u32, (x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32)
        .to_rgba8();

    let mut crossings = Vec::new();
    for row in 0..out.height() {
        let yc = (y0 + i64::from(row)) as f64 + 0.5;
        scanline_crossings(&vertices, yc, &mut crossings);

        let mut inside_spans = crossings.chunks_exact(2).map(|c| (c[0], c[1])).peekable();
        for col in 0..out.width() {
            let xc = (x0 + i64::from(col)) as f64 + 0.5;
            while inside_spans.next_if(|&(_, end)| end <= xc).is_some() {}
            let inside = inside_spans.peek().is_some_and(|&(start, _)| start <= xc);
            if !inside {
                out.get_pixel_mut(col, row).0[3] = 0;
            }
        }
    }
    Ok(out)
}

/// Sorted x positions where the polygon's edges cross the horizontal line `y`.
fn scanline_crossings(vertices: &[Point], y: f64, out: &mut Vec<f64>) {
    out.clear();
    let n = vertices.len();
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let (ay, by) = (f64::from(a.y), f64::from(b.y));
        if (ay < y) != (by < y) {
            let t = (y - ay) / (by - ay);
            out.push(f64::from(a.x) + t * f64::from(b.x - a.x));
        }
    }
    out.sort_by(f64::total_cmp);
}
