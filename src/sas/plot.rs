//! # 散射图表生成
//!
//! 使用 `plotters` 库生成 p(r) 与 I(q) 图。
//!
//! ## 功能
//! - p(r)：峰值归一化，线性坐标
//! - I(q)：双对数坐标，自动跳过非正值
//! - 支持 PNG 和 SVG 输出
//!
//! ## 依赖关系
//! - 被 `commands/simulate.rs`, `commands/pr.rs` 调用
//! - 使用 `models/scattering.rs` 的 TheoreticalScattering
//! - 使用 `plotters` 渲染图表

use crate::error::{Result, SasError};
use crate::models::TheoreticalScattering;
use crate::sas::math::max_value;

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// 图片格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// 图表尺寸与标题
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
}

impl PlotOptions {
    pub fn new(title: impl Into<String>, format: ImageFormat) -> Self {
        Self {
            title: title.into(),
            width: 1000,
            height: 700,
            format,
        }
    }
}

/// 生成归一化 p(r) 图
pub fn generate_pr_plot(
    r: &[f64],
    pr_norm: &[f64],
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    if r.len() != pr_norm.len() {
        return Err(SasError::shape_mismatch("p(r)", r.len(), pr_norm.len()));
    }
    match options.format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(output_path, (options.width, options.height))
                .into_drawing_area();
            draw_pr_chart(&root, r, pr_norm, &options.title)?;
            root.present().map_err(plot_error)?;
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(output_path, (options.width, options.height))
                .into_drawing_area();
            draw_pr_chart(&root, r, pr_norm, &options.title)?;
            root.present().map_err(plot_error)?;
        }
    }
    Ok(())
}

/// 生成双对数 I(q) 图
pub fn generate_iq_plot(
    result: &TheoreticalScattering,
    output_path: &Path,
    options: &PlotOptions,
) -> Result<()> {
    match options.format {
        ImageFormat::Svg => {
            let root = SVGBackend::new(output_path, (options.width, options.height))
                .into_drawing_area();
            draw_iq_chart(&root, result, &options.title)?;
            root.present().map_err(plot_error)?;
        }
        ImageFormat::Png => {
            let root = BitMapBackend::new(output_path, (options.width, options.height))
                .into_drawing_area();
            draw_iq_chart(&root, result, &options.title)?;
            root.present().map_err(plot_error)?;
        }
    }
    Ok(())
}

fn draw_pr_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    r: &[f64],
    pr_norm: &[f64],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    let r_max = max_value(r).filter(|v| *v > 0.0).unwrap_or(1.0);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..r_max, 0.0..1.1)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("r (Å)")
        .y_desc("p(r) (normalised)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_error)?;

    let line_color = RGBColor(0, 102, 204);
    chart
        .draw_series(AreaSeries::new(
            r.iter().zip(pr_norm).map(|(x, y)| (*x, *y)),
            0.0,
            line_color.mix(0.2),
        ))
        .map_err(plot_error)?;
    chart
        .draw_series(LineSeries::new(
            r.iter().zip(pr_norm).map(|(x, y)| (*x, *y)),
            line_color.stroke_width(2),
        ))
        .map_err(plot_error)?;

    Ok(())
}

fn draw_iq_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    result: &TheoreticalScattering,
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_error)?;

    // 对数坐标只能绘制正值
    let points: Vec<(f64, f64)> = result
        .q
        .iter()
        .zip(&result.i)
        .filter(|(q, i)| **q > 0.0 && **i > 0.0 && i.is_finite())
        .map(|(q, i)| (*q, *i))
        .collect();
    if points.is_empty() {
        return Err(SasError::Other(
            "no positive I(q) values to plot on log scale".to_string(),
        ));
    }

    let (q_min, q_max) = log_range(points.iter().map(|p| p.0));
    let (i_min, i_max) = log_range(points.iter().map(|p| p.1));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d((q_min..q_max).log_scale(), (i_min..i_max).log_scale())
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .x_desc("q (Å⁻¹)")
        .y_desc("I(q) (a.u.)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .y_label_formatter(&|v| format!("{:.0e}", v))
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(LineSeries::new(
            points.iter().copied(),
            RGBColor(204, 51, 0).stroke_width(2),
        ))
        .map_err(plot_error)?;

    let info = match result.rg {
        Some(rg) => format!("I(0) = {:.3e}   Rg = {:.2} Å", result.i0, rg),
        None => format!("I(0) = {:.3e}   Rg = n/a", result.i0),
    };
    root.draw(&Text::new(
        info,
        (90, 60),
        ("sans-serif", 14).into_font().color(&BLACK),
    ))
    .map_err(plot_error)?;

    Ok(())
}

/// 对数坐标轴范围，两端各留少量余量
fn log_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo == hi {
        (lo / 2.0, hi * 2.0)
    } else {
        (lo / 1.2, hi * 1.2)
    }
}

fn plot_error<E: std::fmt::Debug>(e: E) -> SasError {
    SasError::Other(format!("plot error: {:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_range_margins() {
        let (lo, hi) = log_range([0.01, 0.5, 0.1].into_iter());
        assert!((lo - 0.01 / 1.2).abs() < 1e-15);
        assert!((hi - 0.6).abs() < 1e-12);

        let (lo, hi) = log_range(std::iter::once(1.0));
        assert_eq!((lo, hi), (0.5, 2.0));
    }

    #[test]
    fn test_iq_plot_rejects_non_positive_curve() {
        let dir = tempfile::tempdir().unwrap();
        let result = TheoreticalScattering {
            q: vec![0.1, 0.2],
            i0: 0.0,
            i: vec![0.0, -1.0],
            pq: vec![0.0, -1.0],
            s_eff: vec![1.0; 2],
            r: vec![],
            pr: vec![],
            pr_norm: vec![],
            rg: None,
        };
        let options = PlotOptions::new("bad", ImageFormat::Svg);
        assert!(generate_iq_plot(&result, &dir.path().join("iq.svg"), &options).is_err());
    }
}
