// Static PNG charts, one function per figure
use crate::analyzer::aggregation::PriceQuartiles;
use crate::analyzer::distribution::{CorrelationMatrix, Histogram};
use crate::analyzer::elasticity::{BucketRevenue, LinearFit};
use crate::analyzer::pareto::{AbcReport, CLASS_A_LIMIT};
use crate::analyzer::price_bins::PriceBinning;
use crate::analyzer::sentiment::SentimentSummary;
use crate::model::{ChartError, GroupSummary};
use crate::utils::{format_brl, format_thousands};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::{Path, PathBuf};

pub type DrawResult = Result<(), Box<dyn std::error::Error>>;

const FONT: &str = "sans-serif";
const CAPTION_SIZE: u32 = 32;

const CORAL: RGBColor = RGBColor(255, 127, 80);
const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
const TEAL: RGBColor = RGBColor(0, 128, 128);
const NAVY: RGBColor = RGBColor(0, 0, 128);
const PURPLE: RGBColor = RGBColor(128, 0, 128);
const SKYBLUE: RGBColor = RGBColor(135, 206, 235);
const DARKRED: RGBColor = RGBColor(139, 0, 0);
const DARKGREEN: RGBColor = RGBColor(0, 100, 0);
const FOREST: RGBColor = RGBColor(34, 139, 34);

/// Viridis control points, dark to bright.
pub const VIRIDIS: [RGBColor; 6] = [
    RGBColor(68, 1, 84),
    RGBColor(65, 68, 135),
    RGBColor(42, 120, 142),
    RGBColor(34, 168, 132),
    RGBColor(122, 209, 81),
    RGBColor(253, 231, 37),
];

/// Output location and pixel size shared by every chart of a run.
pub struct ChartCanvas {
    pub dir: PathBuf,
    pub size: (u32, u32),
}

impl ChartCanvas {
    pub fn new(dir: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self { dir: dir.into(), size }
    }

    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn render<F>(&self, file: &str, draw: F) -> Result<PathBuf, ChartError>
    where
        F: FnOnce(&Path, (u32, u32)) -> DrawResult,
    {
        let path = self.path(file);
        draw(&path, self.size).map_err(|e| ChartError {
            file: file.to_string(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

/// Linear interpolation over the viridis control points, `t` in [0,1].
pub fn viridis(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    lerp(VIRIDIS[i], VIRIDIS[i + 1], scaled - i as f64)
}

/// Blue-white-red scale for correlations in [-1,1].
pub fn diverging(r: f64) -> RGBColor {
    let cold = RGBColor(59, 76, 192);
    let neutral = RGBColor(221, 221, 221);
    let warm = RGBColor(180, 4, 38);
    let r = r.clamp(-1.0, 1.0);
    if r < 0.0 {
        lerp(neutral, cold, -r)
    } else {
        lerp(neutral, warm, r)
    }
}

fn lerp(a: RGBColor, b: RGBColor, t: f64) -> RGBColor {
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

fn label_at(labels: &[String], v: &SegmentValue<i32>) -> String {
    match v {
        SegmentValue::CenterOf(i) if *i >= 0 => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

fn upper_bound(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0, f64::max);
    if max > 0.0 { max * 1.15 } else { 1.0 }
}

struct BarChart<'a> {
    file: &'a str,
    title: &'a str,
    category_desc: &'a str,
    value_desc: &'a str,
    labels: Vec<String>,
    values: Vec<f64>,
    colors: Vec<RGBColor>,
    annotate: Option<fn(f64) -> String>,
    /// Vertical/horizontal reference line and its legend text.
    reference: Option<(f64, String)>,
}

fn vertical_bars(canvas: &ChartCanvas, bars: BarChart<'_>) -> Result<PathBuf, ChartError> {
    canvas.render(bars.file, |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = bars.values.len() as i32;

        let mut chart = ChartBuilder::on(&root)
            .caption(bars.title, (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..upper_bound(bars.values.iter().copied()))?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.labels.len() + 1)
            .x_label_formatter(&|v| label_at(&bars.labels, v))
            .y_label_formatter(&|v| format_thousands(*v, 0))
            .x_desc(bars.category_desc)
            .y_desc(bars.value_desc)
            .draw()?;

        chart.draw_series(bars.values.iter().enumerate().map(|(i, v)| {
            let color = bars.colors[i % bars.colors.len()];
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i as i32), 0.0), (SegmentValue::Exact(i as i32 + 1), *v)],
                color.filled(),
            );
            bar.set_margin(0, 0, 12, 12);
            bar
        }))?;

        if let Some(annotate) = bars.annotate {
            let style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));
            chart.draw_series(bars.values.iter().enumerate().map(|(i, v)| {
                Text::new(annotate(*v), (SegmentValue::CenterOf(i as i32), *v), style.clone())
            }))?;
        }

        root.present()?;
        Ok(())
    })
}

fn horizontal_bars(canvas: &ChartCanvas, bars: BarChart<'_>) -> Result<PathBuf, ChartError> {
    canvas.render(bars.file, |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = bars.values.len() as i32;
        // first item drawn on top
        let row = |i: usize| n - 1 - i as i32;
        let flipped: Vec<String> = bars.labels.iter().rev().cloned().collect();

        let x_max = upper_bound(
            bars.values
                .iter()
                .copied()
                .chain(bars.reference.as_ref().map(|r| r.0)),
        ) * 1.1;
        let mut chart = ChartBuilder::on(&root)
            .caption(bars.title, (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(180)
            .build_cartesian_2d(0f64..x_max, (0..n).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(flipped.len() + 1)
            .y_label_formatter(&|v| label_at(&flipped, v))
            .x_label_formatter(&|v| format_thousands(*v, 1))
            .x_desc(bars.value_desc)
            .y_desc(bars.category_desc)
            .draw()?;

        chart.draw_series(bars.values.iter().enumerate().map(|(i, v)| {
            let color = bars.colors[i % bars.colors.len()];
            let mut bar = Rectangle::new(
                [(0.0, SegmentValue::Exact(row(i))), (*v, SegmentValue::Exact(row(i) + 1))],
                color.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))?;

        if let Some(annotate) = bars.annotate {
            let style = TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Left, VPos::Center));
            chart.draw_series(bars.values.iter().enumerate().map(|(i, v)| {
                Text::new(annotate(*v), (*v, SegmentValue::CenterOf(row(i))), style.clone())
            }))?;
        }

        if let Some((x, legend)) = &bars.reference {
            let x = *x;
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(x, SegmentValue::Exact(0)), (x, SegmentValue::Exact(n))],
                    RED.stroke_width(2),
                )))?
                .label(legend.as_str())
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        root.present()?;
        Ok(())
    })
}

fn brl_rounded(v: f64) -> String {
    format!(" {}", format_brl(v, 0))
}

pub fn brand_revenue(canvas: &ChartCanvas, brands: &[GroupSummary]) -> Result<PathBuf, ChartError> {
    horizontal_bars(
        canvas,
        BarChart {
            file: "01_marca_receita.png",
            title: &format!("Top {} Marcas por Receita Estimada", brands.len()),
            category_desc: "Marca",
            value_desc: "Receita Estimada (R$)",
            labels: brands.iter().map(|g| g.key.clone()).collect(),
            values: brands.iter().map(|g| g.revenue).collect(),
            colors: vec![CORAL],
            annotate: Some(brl_rounded),
            reference: None,
        },
    )
}

pub fn brand_quality(
    canvas: &ChartCanvas,
    brands: &[GroupSummary],
    overall_rating: Option<f64>,
) -> Result<PathBuf, ChartError> {
    horizontal_bars(
        canvas,
        BarChart {
            file: "02_marca_qualidade.png",
            title: "Qualidade por Marca (Nota Média)",
            category_desc: "Marca",
            value_desc: "Nota Média (0-5)",
            labels: brands.iter().map(|g| g.key.clone()).collect(),
            values: brands.iter().map(|g| g.mean_rating.unwrap_or(0.0)).collect(),
            colors: vec![STEELBLUE],
            annotate: None,
            reference: overall_rating.map(|r| (r, format!("Média Geral: {r:.2}"))),
        },
    )
}

pub fn material_value_scatter(canvas: &ChartCanvas, materials: &[GroupSummary]) -> Result<PathBuf, ChartError> {
    canvas.render("03_material_custo_beneficio.png", |path, size| {
        let points: Vec<(&str, f64, f64, f64)> = materials
            .iter()
            .filter_map(|g| Some((g.key.as_str(), g.mean_price?, g.mean_rating?, g.quantity)))
            .collect();
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_lo, x_hi) = padded_range(points.iter().map(|p| p.1));
        let (y_lo, y_hi) = padded_range(points.iter().map(|p| p.2));
        let max_qty = points.iter().map(|p| p.3).fold(0.0, f64::max);

        let mut chart = ChartBuilder::on(&root)
            .caption("Material: Preço x Qualidade x Volume de Vendas", (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(70)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
        chart
            .configure_mesh()
            .x_desc("Preço Médio (R$)")
            .y_desc("Nota Média")
            .draw()?;

        let scale = |qty: f64| if max_qty > 0.0 { qty / max_qty } else { 0.0 };
        chart.draw_series(points.iter().map(|(_, x, y, qty)| {
            let radius = 8 + (scale(*qty) * 40.0) as u32;
            Circle::new((*x, *y), radius, viridis(scale(*qty)).mix(0.6).filled())
        }))?;
        chart.draw_series(points.iter().map(|(_, x, y, qty)| {
            let radius = 8 + (scale(*qty) * 40.0) as u32;
            Circle::new((*x, *y), radius, BLACK.stroke_width(2))
        }))?;

        let style = TextStyle::from((FONT, 15).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(
            points
                .iter()
                .map(|(name, x, y, _)| Text::new(name.to_string(), (*x, *y), style.clone())),
        )?;

        root.present()?;
        Ok(())
    })
}

fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi > lo { (hi - lo) * 0.15 } else { lo.abs().max(1.0) * 0.1 };
    (lo - pad, hi + pad)
}

pub fn material_price_boxplot(canvas: &ChartCanvas, quartiles: &[PriceQuartiles]) -> Result<PathBuf, ChartError> {
    canvas.render("04_material_variacao_preco.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = quartiles.len() as i32;
        let labels: Vec<String> = quartiles.iter().map(|q| q.key.clone()).collect();
        let y_max = upper_bound(quartiles.iter().map(|q| q.max));

        let mut chart = ChartBuilder::on(&root)
            .caption(format!("Variação de Preços por Material (Top {})", n), (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), 0f64..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len() + 1)
            .x_label_formatter(&|v| label_at(&labels, v))
            .x_desc("Material")
            .y_desc("Preço (R$)")
            .draw()?;

        for (i, q) in quartiles.iter().enumerate() {
            let i = i as i32;
            let center = SegmentValue::CenterOf(i);
            let color = viridis(i as f64 / (n.max(2) - 1) as f64);

            chart.draw_series(std::iter::once(PathElement::new(
                vec![(center.clone(), q.min), (center.clone(), q.q1)],
                BLACK.stroke_width(2),
            )))?;
            chart.draw_series(std::iter::once(PathElement::new(
                vec![(center.clone(), q.q3), (center.clone(), q.max)],
                BLACK.stroke_width(2),
            )))?;

            let mut body = Rectangle::new(
                [(SegmentValue::Exact(i), q.q1), (SegmentValue::Exact(i + 1), q.q3)],
                color.mix(0.7).filled(),
            );
            body.set_margin(0, 0, 25, 25);
            let mut outline = Rectangle::new(
                [(SegmentValue::Exact(i), q.q1), (SegmentValue::Exact(i + 1), q.q3)],
                BLACK.stroke_width(2),
            );
            outline.set_margin(0, 0, 25, 25);
            let mut median = Rectangle::new(
                [(SegmentValue::Exact(i), q.median), (SegmentValue::Exact(i + 1), q.median)],
                RED.stroke_width(3),
            );
            median.set_margin(0, 0, 25, 25);
            chart.draw_series([body, outline, median])?;
        }

        root.present()?;
        Ok(())
    })
}

pub fn season_revenue(canvas: &ChartCanvas, seasons: &[GroupSummary]) -> Result<PathBuf, ChartError> {
    vertical_bars(
        canvas,
        BarChart {
            file: "05_temporada_receita.png",
            title: "Receita por Temporada",
            category_desc: "Temporada",
            value_desc: "Receita Estimada (R$)",
            labels: seasons.iter().map(|g| g.key.clone()).collect(),
            values: seasons.iter().map(|g| g.revenue).collect(),
            colors: vec![TEAL],
            annotate: Some(|v| format_brl(v, 0)),
            reference: None,
        },
    )
}

pub fn season_price(canvas: &ChartCanvas, seasons: &[GroupSummary]) -> Result<PathBuf, ChartError> {
    vertical_bars(
        canvas,
        BarChart {
            file: "06_temporada_preco.png",
            title: "Preço Médio por Temporada",
            category_desc: "Temporada",
            value_desc: "Preço Médio (R$)",
            labels: seasons.iter().map(|g| g.key.clone()).collect(),
            values: seasons.iter().map(|g| g.mean_price.unwrap_or(0.0)).collect(),
            colors: vec![CORAL],
            annotate: None,
            reference: None,
        },
    )
}

pub fn discount_elasticity(canvas: &ChartCanvas, fit: &LinearFit) -> Result<PathBuf, ChartError> {
    canvas.render("07_desconto_elasticidade.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;

        let (x_lo, x_hi) = padded_range(fit.points.iter().map(|p| p.0));
        let (_, y_hi) = padded_range(fit.points.iter().map(|p| p.1));
        let y_lo = fit.points.iter().map(|p| p.1).fold(0.0, f64::min);

        let mut chart = ChartBuilder::on(&root)
            .caption("Elasticidade: Desconto x Volume de Vendas", (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(80)
            .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;
        chart
            .configure_mesh()
            .x_desc("Desconto (%)")
            .y_desc("Quantidade Vendida")
            .draw()?;

        chart.draw_series(
            fit.points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, NAVY.mix(0.5).filled())),
        )?;
        chart
            .draw_series(LineSeries::new(
                [x_lo, x_hi].map(|x| (x, fit.predict(x))),
                RED.stroke_width(3),
            ))?
            .label(format!("R²={:.3}", fit.r_squared))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(3)));
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    })
}

pub fn discount_bucket_revenue(canvas: &ChartCanvas, buckets: &[BucketRevenue]) -> Result<PathBuf, ChartError> {
    vertical_bars(
        canvas,
        BarChart {
            file: "08_faixa_desconto_receita.png",
            title: "Receita por Faixa de Desconto",
            category_desc: "Faixa de Desconto",
            value_desc: "Receita Total (R$)",
            labels: buckets.iter().map(|b| b.bucket.label().to_string()).collect(),
            values: buckets.iter().map(|b| b.revenue).collect(),
            colors: vec![PURPLE],
            annotate: None,
            reference: None,
        },
    )
}

pub fn sentiment_counts(canvas: &ChartCanvas, summary: &SentimentSummary) -> Result<PathBuf, ChartError> {
    vertical_bars(
        canvas,
        BarChart {
            file: "09_sentiment_analysis.png",
            title: "Análise de Sentimento - Reviews dos Clientes",
            category_desc: "Sentimento",
            value_desc: "Frequência de Palavras",
            labels: vec!["Positivo".into(), "Negativo".into()],
            values: vec![summary.positive as f64, summary.negative as f64],
            colors: vec![GREEN, RED],
            annotate: Some(|v| format!("{}", v as u64)),
            reference: None,
        },
    )
}

pub fn abc_pareto(canvas: &ChartCanvas, report: &AbcReport) -> Result<PathBuf, ChartError> {
    canvas.render("11_curva_abc_pareto.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = report.entries.len() as f64;
        let y_max = upper_bound(report.entries.iter().map(|e| e.revenue));

        let mut chart = ChartBuilder::on(&root)
            .caption("Curva ABC - Princípio de Pareto (80/20)", (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(50)
            .y_label_area_size(90)
            .right_y_label_area_size(70)
            .build_cartesian_2d(0f64..n, 0f64..y_max)?
            .set_secondary_coord(0f64..n, 0f64..105f64);

        chart
            .configure_mesh()
            .x_desc("Produtos (ordenados por receita)")
            .y_desc("Receita Estimada (R$)")
            .y_label_formatter(&|v| format_thousands(*v, 0))
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Percentual Acumulado (%)")
            .draw()?;

        chart
            .draw_series(report.entries.iter().enumerate().map(|(i, e)| {
                Rectangle::new([(i as f64, 0.0), (i as f64 + 1.0, e.revenue)], STEELBLUE.mix(0.6).filled())
            }))?
            .label("Receita")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], STEELBLUE.mix(0.6).filled()));

        chart
            .draw_secondary_series(LineSeries::new(
                report
                    .entries
                    .iter()
                    .enumerate()
                    .map(|(i, e)| (i as f64 + 0.5, e.cumulative_percent)),
                RED.stroke_width(3),
            ))?
            .label("% Acumulado")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(3)));

        chart
            .draw_secondary_series(LineSeries::new(
                [(0.0, CLASS_A_LIMIT), (n, CLASS_A_LIMIT)],
                FOREST.stroke_width(2),
            ))?
            .label("80% (Pareto)")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FOREST.stroke_width(2)));

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::MiddleRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    })
}

pub fn price_sweet_spot(canvas: &ChartCanvas, binning: &PriceBinning) -> Result<PathBuf, ChartError> {
    canvas.render("12_sweet_spot_preco.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = binning.bins.len() as i32;
        let labels: Vec<String> = binning.bins.iter().map(|b| b.label()).collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Sweet Spot de Preço: Volume x Receita", (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(90)
            .right_y_label_area_size(100)
            .build_cartesian_2d(
                (0..n).into_segmented(),
                0f64..upper_bound(binning.bins.iter().map(|b| b.quantity)),
            )?
            .set_secondary_coord(
                (0..n).into_segmented(),
                0f64..upper_bound(binning.bins.iter().map(|b| b.revenue)),
            );

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len() + 1)
            .x_label_formatter(&|v| label_at(&labels, v))
            .x_desc("Faixa de Preço")
            .y_desc("Volume de Vendas")
            .draw()?;
        chart
            .configure_secondary_axes()
            .y_desc("Receita Estimada (R$)")
            .y_label_formatter(&|v| format_thousands(*v, 0))
            .draw()?;

        chart
            .draw_series(binning.bins.iter().enumerate().map(|(i, b)| {
                let mut bar = Rectangle::new(
                    [(SegmentValue::Exact(i as i32), 0.0), (SegmentValue::Exact(i as i32 + 1), b.quantity)],
                    SKYBLUE.mix(0.7).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))?
            .label("Volume de Vendas")
            .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], SKYBLUE.filled()));

        chart
            .draw_secondary_series(LineSeries::new(
                binning
                    .bins
                    .iter()
                    .enumerate()
                    .map(|(i, b)| (SegmentValue::CenterOf(i as i32), b.revenue)),
                DARKRED.stroke_width(3),
            ))?
            .label("Receita")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], DARKRED.stroke_width(3)));
        chart.draw_secondary_series(
            binning
                .bins
                .iter()
                .enumerate()
                .map(|(i, b)| Circle::new((SegmentValue::CenterOf(i as i32), b.revenue), 6, DARKRED.filled())),
        )?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    })
}

pub fn correlation_heatmap(canvas: &ChartCanvas, matrix: &CorrelationMatrix) -> Result<PathBuf, ChartError> {
    canvas.render("13_correlacao_global.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let n = matrix.columns.len() as i32;
        let labels: Vec<String> = matrix.columns.iter().map(|c| c.header().to_string()).collect();
        // row 0 of the matrix is drawn at the top
        let flipped: Vec<String> = labels.iter().rev().cloned().collect();

        let mut chart = ChartBuilder::on(&root)
            .caption("Mapa de Correlação - Variáveis Críticas de Negócio", (FONT, CAPTION_SIZE))
            .margin(20)
            .x_label_area_size(60)
            .y_label_area_size(200)
            .build_cartesian_2d((0..n).into_segmented(), (0..n).into_segmented())?;
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(labels.len() + 1)
            .y_labels(labels.len() + 1)
            .x_label_formatter(&|v| label_at(&labels, v))
            .y_label_formatter(&|v| label_at(&flipped, v))
            .draw()?;

        let cells: Vec<(i32, i32, Option<f64>)> = matrix
            .cells
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .map(move |(j, r)| (j as i32, n - 1 - i as i32, *r))
            })
            .collect();

        chart.draw_series(cells.iter().map(|(x, y, r)| {
            let color = r.map(diverging).unwrap_or(RGBColor(240, 240, 240));
            let mut cell = Rectangle::new(
                [(SegmentValue::Exact(*x), SegmentValue::Exact(*y)), (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1))],
                color.filled(),
            );
            cell.set_margin(1, 1, 1, 1);
            cell
        }))?;

        let style = TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
        chart.draw_series(cells.iter().map(|(x, y, r)| {
            let text = r.map(|r| format!("{r:.2}")).unwrap_or_else(|| "n/a".into());
            Text::new(text, (SegmentValue::CenterOf(*x), SegmentValue::CenterOf(*y)), style.clone())
        }))?;

        root.present()?;
        Ok(())
    })
}

/// Price histogram with mean/median markers next to the rating density.
pub struct DistributionInputs<'a> {
    pub price_histogram: Option<&'a Histogram>,
    pub mean_price: Option<f64>,
    pub median_price: Option<f64>,
    pub rating_density: Option<&'a [(f64, f64)]>,
    pub mean_rating: Option<f64>,
}

pub fn price_rating_distribution(canvas: &ChartCanvas, inputs: &DistributionInputs<'_>) -> Result<PathBuf, ChartError> {
    canvas.render("14_distribuicao_preco_nota.png", |path, size| {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE)?;
        let panels = root.split_evenly((1, 2));

        if let Some(hist) = inputs.price_histogram {
            let lo = hist.edges.first().copied().unwrap_or(0.0);
            let hi = hist.edges.last().copied().unwrap_or(1.0);
            let y_max = upper_bound(hist.counts.iter().map(|c| *c as f64));
            let mut chart = ChartBuilder::on(&panels[0])
                .caption("Histograma de Preços", (FONT, 26))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(lo..hi, 0f64..y_max)?;
            chart.configure_mesh().x_desc("Preço (R$)").y_desc("Frequência").draw()?;

            chart.draw_series(hist.counts.iter().enumerate().map(|(i, c)| {
                Rectangle::new([(hist.edges[i], 0.0), (hist.edges[i + 1], *c as f64)], STEELBLUE.mix(0.7).filled())
            }))?;
            chart.draw_series(hist.counts.iter().enumerate().map(|(i, c)| {
                Rectangle::new([(hist.edges[i], 0.0), (hist.edges[i + 1], *c as f64)], BLACK.stroke_width(1))
            }))?;

            for (value, color, name) in [
                (inputs.mean_price, RED, "Média"),
                (inputs.median_price, GREEN, "Mediana"),
            ] {
                let Some(v) = value else { continue };
                chart
                    .draw_series(LineSeries::new([(v, 0.0), (v, y_max)], color.stroke_width(2)))?
                    .label(format!("{name}: {}", format_brl(v, 2)))
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .draw()?;
        }

        if let Some(curve) = inputs.rating_density {
            let x_lo = curve.first().map(|p| p.0).unwrap_or(0.0);
            let x_hi = curve.last().map(|p| p.0).unwrap_or(5.0);
            let y_max = upper_bound(curve.iter().map(|p| p.1));
            let mut chart = ChartBuilder::on(&panels[1])
                .caption("Densidade de Notas", (FONT, 26))
                .margin(15)
                .x_label_area_size(45)
                .y_label_area_size(60)
                .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;
            chart.configure_mesh().x_desc("Nota (0-5)").y_desc("Densidade").draw()?;

            chart.draw_series(
                AreaSeries::new(curve.iter().copied(), 0.0, RGBColor(144, 238, 144).mix(0.3))
                    .border_style(DARKGREEN.stroke_width(3)),
            )?;
            if let Some(m) = inputs.mean_rating {
                chart
                    .draw_series(LineSeries::new([(m, 0.0), (m, y_max)], RED.stroke_width(2)))?
                    .label(format!("Média: {m:.2}"))
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
                chart
                    .configure_series_labels()
                    .background_style(WHITE.mix(0.8))
                    .border_style(BLACK)
                    .draw()?;
            }
        }

        root.present()?;
        Ok(())
    })
}
