// src/plot.rs

use crate::error::PcaError;
use crate::font::{glyph, text_width, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};
use crate::pca::PcaResult;
use image::{ImageFormat, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Common colour definitions
pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_GRAY: Rgb<u8> = Rgb([220, 220, 220]);
    pub const DARK_GRAY: Rgb<u8> = Rgb([60, 60, 60]);
}

/// Raster layout of a scatter plot.
#[derive(Debug, Clone)]
pub struct PlotConfig {
    pub width: u32,
    pub height: u32,
    pub background: Rgb<u8>,
    pub grid_color: Rgb<u8>,
    pub axis_color: Rgb<u8>,
    pub text_color: Rgb<u8>,
    pub marker_radius: u32,
    /// Pixel size of one font cell.
    pub font_scale: u32,
    pub grid_lines: usize,
}

impl Default for PlotConfig {
    /// 6×5 inches at 300 dpi.
    fn default() -> Self {
        Self {
            width: 1800,
            height: 1500,
            background: colors::WHITE,
            grid_color: colors::LIGHT_GRAY,
            axis_color: colors::BLACK,
            text_color: colors::DARK_GRAY,
            marker_radius: 16,
            font_scale: 3,
            grid_lines: 5,
        }
    }
}

/// Points to scatter, one label per point.
#[derive(Debug, Clone, Copy)]
pub struct ScatterSeries<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub labels: &'a [String],
    pub color: Rgb<u8>,
}

/// Pixel rectangle holding the data area, and the data range mapped onto it.
struct Frame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Frame {
    fn to_pixel(&self, x: f64, y: f64) -> (i64, i64) {
        let px = self.left + (x - self.x_range.0) / (self.x_range.1 - self.x_range.0) * self.width;
        let py = self.top + (self.y_range.1 - y) / (self.y_range.1 - self.y_range.0) * self.height;
        (px.round() as i64, py.round() as i64)
    }
}

/// Padded [min, max] of `values`; a zero-width range is widened to ±1.
fn padded_range(values: &[f64], lower_pad: f64, upper_pad: f64) -> (f64, f64) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span <= f64::EPSILON * max.abs().max(1.0) {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * lower_pad, max + span * upper_pad)
    }
}

fn put_pixel_checked(img: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Helper function to draw a horizontal line
fn draw_horizontal_line(img: &mut RgbImage, x1: i64, x2: i64, y: i64, color: Rgb<u8>) {
    for x in x1.min(x2)..=x1.max(x2) {
        put_pixel_checked(img, x, y, color);
    }
}

/// Helper function to draw a vertical line
fn draw_vertical_line(img: &mut RgbImage, x: i64, y1: i64, y2: i64, color: Rgb<u8>) {
    for y in y1.min(y2)..=y1.max(y2) {
        put_pixel_checked(img, x, y, color);
    }
}

fn fill_circle(img: &mut RgbImage, cx: i64, cy: i64, radius: u32, color: Rgb<u8>) {
    let r = radius as i64;
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy <= r * r {
                put_pixel_checked(img, cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draws `text` left to right with its top-left corner at (x, y).
fn draw_text(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let s = scale as i64;
    for (i, c) in text.chars().enumerate() {
        let origin_x = x + (i as i64) * (GLYPH_ADVANCE as i64) * s;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                for sy in 0..s {
                    for sx in 0..s {
                        put_pixel_checked(
                            img,
                            origin_x + col as i64 * s + sx,
                            y + row as i64 * s + sy,
                            color,
                        );
                    }
                }
            }
        }
    }
}

/// Draws `text` rotated 90° counter-clockwise, reading bottom to top,
/// with the bottom-left corner of the first glyph at (x, y).
fn draw_text_vertical(img: &mut RgbImage, x: i64, y: i64, text: &str, scale: u32, color: Rgb<u8>) {
    let s = scale as i64;
    for (i, c) in text.chars().enumerate() {
        let origin_y = y - (i as i64) * (GLYPH_ADVANCE as i64) * s;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                    continue;
                }
                // Glyph column runs up the page, glyph row runs right.
                let gx = x + row as i64 * s;
                let gy = origin_y - col as i64 * s;
                for sy in 0..s {
                    for sx in 0..s {
                        put_pixel_checked(img, gx + sx, gy - sy, color);
                    }
                }
            }
        }
    }
}

/// Renders a labelled scatter plot with a grid, axis titles and a title.
///
/// # Errors
/// `InvalidInput` if the series is empty, its slices differ in length, or a
/// coordinate is non-finite.
pub fn render_scatter(
    series: &ScatterSeries<'_>,
    title: &str,
    x_label: &str,
    y_label: &str,
    config: &PlotConfig,
) -> Result<RgbImage, PcaError> {
    let n = series.x.len();
    if n == 0 || series.y.len() != n || series.labels.len() != n {
        return Err(PcaError::InvalidInput(format!(
            "scatter needs matching non-empty x/y/labels, got {}/{}/{}",
            n,
            series.y.len(),
            series.labels.len()
        )));
    }
    if series.x.iter().chain(series.y).any(|v| !v.is_finite()) {
        return Err(PcaError::InvalidInput("scatter coordinates must be finite".to_string()));
    }

    let scale = config.font_scale.max(1);
    let line_height = (GLYPH_HEIGHT * scale) as i64;
    let mut img = RgbImage::from_pixel(config.width, config.height, config.background);

    // --- Layout ---
    let margin_left = (line_height * 6) as f64;
    let margin_right = (line_height * 2) as f64;
    let margin_top = (line_height * 4) as f64;
    let margin_bottom = (line_height * 5) as f64;
    let frame = Frame {
        left: margin_left,
        top: margin_top,
        width: (config.width as f64 - margin_left - margin_right).max(1.0),
        height: (config.height as f64 - margin_top - margin_bottom).max(1.0),
        // Extra room on the right for the point labels.
        x_range: padded_range(series.x, 0.1, 0.35),
        y_range: padded_range(series.y, 0.15, 0.15),
    };
    let (frame_left, frame_top) = (frame.left as i64, frame.top as i64);
    let frame_right = (frame.left + frame.width) as i64;
    let frame_bottom = (frame.top + frame.height) as i64;

    // --- Grid and tick labels ---
    let ticks = config.grid_lines.max(2);
    for t in 0..ticks {
        let frac = t as f64 / (ticks - 1) as f64;
        let xv = frame.x_range.0 + frac * (frame.x_range.1 - frame.x_range.0);
        let yv = frame.y_range.0 + frac * (frame.y_range.1 - frame.y_range.0);
        let (gx, gy) = frame.to_pixel(xv, yv);
        draw_vertical_line(&mut img, gx, frame_top, frame_bottom, config.grid_color);
        draw_horizontal_line(&mut img, frame_left, frame_right, gy, config.grid_color);

        let x_tick = format!("{xv:.2}");
        let x_tick_w = text_width(&x_tick, scale) as i64;
        draw_text(&mut img, gx - x_tick_w / 2, frame_bottom + line_height / 2, &x_tick, scale, config.text_color);
        let y_tick = format!("{yv:.2}");
        let y_tick_w = text_width(&y_tick, scale) as i64;
        draw_text(
            &mut img,
            frame_left - y_tick_w - line_height / 2,
            gy - line_height / 2,
            &y_tick,
            scale,
            config.text_color,
        );
    }

    // --- Axes frame ---
    draw_horizontal_line(&mut img, frame_left, frame_right, frame_top, config.axis_color);
    draw_horizontal_line(&mut img, frame_left, frame_right, frame_bottom, config.axis_color);
    draw_vertical_line(&mut img, frame_left, frame_top, frame_bottom, config.axis_color);
    draw_vertical_line(&mut img, frame_right, frame_top, frame_bottom, config.axis_color);

    // --- Points and labels ---
    for ((&x, &y), label) in series.x.iter().zip(series.y).zip(series.labels) {
        let (px, py) = frame.to_pixel(x, y);
        fill_circle(&mut img, px, py, config.marker_radius, series.color);
        let offset = config.marker_radius as i64 / 2 + 4;
        draw_text(&mut img, px + offset, py - offset - line_height, label, scale, config.axis_color);
    }

    // --- Titles ---
    let center_x = (frame.left + frame.width / 2.0) as i64;
    let title_scale = scale + 1;
    let title_w = text_width(title, title_scale) as i64;
    draw_text(&mut img, center_x - title_w / 2, line_height, title, title_scale, config.axis_color);

    let x_label_w = text_width(x_label, scale) as i64;
    draw_text(
        &mut img,
        center_x - x_label_w / 2,
        frame_bottom + line_height * 2,
        x_label,
        scale,
        config.axis_color,
    );

    let center_y = (frame.top + frame.height / 2.0) as i64;
    let y_label_h = text_width(y_label, scale) as i64;
    draw_text_vertical(
        &mut img,
        line_height / 2,
        center_y + y_label_h / 2,
        y_label,
        scale,
        config.axis_color,
    );

    Ok(img)
}

/// Renders PC1 against PC2 for a decomposition, with the explained variance
/// percentage of each axis in its title. A single-feature result has no PC2,
/// so its points are drawn at zero on that axis.
pub fn render_pc_scatter(
    result: &PcaResult,
    title: &str,
    color: [u8; 3],
    config: &PlotConfig,
) -> Result<RgbImage, PcaError> {
    let n_samples = result.scores().nrows();
    let pc1: Vec<f64> = result
        .score_column(0)
        .map(|c| c.to_vec())
        .ok_or_else(|| PcaError::InvalidInput("result has no components to plot".to_string()))?;
    let pc2: Vec<f64> = result
        .score_column(1)
        .map(|c| c.to_vec())
        .unwrap_or_else(|| vec![0.0; n_samples]);

    let ratios = result.explained_variance_ratio();
    let pct = |k: usize| ratios.get(k).copied().unwrap_or(0.0) * 100.0;
    let x_label = format!("PC1 ({:.2}%)", pct(0));
    let y_label = format!("PC2 ({:.2}%)", pct(1));

    let series = ScatterSeries {
        x: &pc1,
        y: &pc2,
        labels: result.sample_labels(),
        color: Rgb(color),
    };
    render_scatter(&series, title, &x_label, &y_label, config)
}

/// Renders [`render_pc_scatter`] and writes it as PNG.
pub fn save_pc_scatter<P: AsRef<Path>>(
    path: P,
    result: &PcaResult,
    title: &str,
    color: [u8; 3],
    config: &PlotConfig,
) -> Result<(), PcaError> {
    let img = render_pc_scatter(result, title, color, config)?;
    img.save_with_format(path.as_ref(), ImageFormat::Png)?;
    info!("Scatter plot saved to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::DataMatrix;
    use crate::pca::decompose;
    use ndarray::array;

    fn small_config() -> PlotConfig {
        PlotConfig {
            width: 400,
            height: 300,
            marker_radius: 4,
            font_scale: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_padded_range_widens_constant_values() {
        assert_eq!(padded_range(&[2.0, 2.0], 0.1, 0.1), (1.0, 3.0));
        let (lo, hi) = padded_range(&[0.0, 10.0], 0.1, 0.5);
        assert!((lo + 1.0).abs() < 1e-12 && (hi - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_markers_are_drawn_in_series_colour() {
        let labels = vec!["a".to_string(), "b".to_string()];
        let series = ScatterSeries {
            x: &[0.0, 1.0],
            y: &[0.0, 1.0],
            labels: &labels,
            color: Rgb([255, 0, 0]),
        };
        let img = render_scatter(&series, "T", "X", "Y", &small_config()).unwrap();
        assert_eq!(img.dimensions(), (400, 300));
        let red = img.pixels().filter(|p| **p == Rgb([255, 0, 0])).count();
        // Two discs of radius 4 hold roughly 2 * pi * 16 pixels.
        assert!(red > 80, "found {red} marker pixels");
    }

    #[test]
    fn test_scatter_rejects_mismatched_series() {
        let labels = vec!["a".to_string()];
        let series = ScatterSeries {
            x: &[0.0, 1.0],
            y: &[0.0, 1.0],
            labels: &labels,
            color: colors::BLACK,
        };
        assert!(matches!(
            render_scatter(&series, "T", "X", "Y", &small_config()),
            Err(PcaError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_single_feature_result_plots_on_zero_pc2() {
        let m = DataMatrix::new(
            vec!["a".into(), "b".into(), "c".into()],
            vec!["Novel".into()],
            array![[1.0], [2.0], [4.0]],
        )
        .unwrap();
        let result = decompose(&m).unwrap();
        let img = render_pc_scatter(&result, "One", [0, 0, 255], &small_config()).unwrap();
        assert!(img.pixels().any(|p| *p == Rgb([0, 0, 255])));
    }
}
