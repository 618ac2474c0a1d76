mod analyzer;
mod config;
mod loader;
mod model;
mod normalizer;
mod report;
mod utils;

use analyzer::aggregation::{RankMetric, best_rated, group_by, price_quartiles, rank_by, value_counts};
use analyzer::distribution::{correlation_matrix, histogram, kde, summary_stats};
use analyzer::elasticity::{discount_buckets, fit_elasticity};
use analyzer::pareto::classify_abc;
use analyzer::price_bins::bin_prices;
use analyzer::sentiment::count_sentiment;
use chrono::{DateTime, Utc};
use config::{AppConfig, load_config};
use loader::{CsvLoader, Loader};
use model::{Column, Dataset, Dimension, ReportError};
use normalizer::review_corpus;
use report::charts::{self, DistributionInputs};
use report::insights;
use report::wordcloud::WordCloudOutcome;
use report::Reporter;
use std::process::ExitCode;
use tracing::{error, info, warn};
use utils::mean;

const KDE_POINTS: usize = 1000;

fn main() -> ExitCode {
    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = match load_config("config.json") {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Config load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let loader = CsvLoader::new();
    let dataset = match loader.load(&config.dataset_path) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Dataset load error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reporter = match Reporter::new(&config) {
        Ok(r) => r,
        Err(e) => {
            error!("Failed to initialize reporter: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run_report(&dataset, &config, &reporter, Utc::now()) {
        Ok(charts) => {
            info!("Report finished: {} charts written", charts);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Report aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Answers every business question in order and prints the executive
/// summary. Returns the number of charts written.
fn run_report(
    dataset: &Dataset,
    config: &AppConfig,
    reporter: &Reporter,
    generated_at: DateTime<Utc>,
) -> Result<usize, ReportError> {
    reporter.print(insights::banner(generated_at, dataset.len()));

    let mut charts = 0;
    charts += brand_performance(dataset, config, reporter)?;
    charts += material_value(dataset, config, reporter)?;
    charts += seasonality(dataset, reporter)?;
    charts += discount_effect(dataset, reporter)?;
    charts += customer_sentiment(dataset, reporter)?;
    charts += pareto_curve(dataset, reporter)?;
    charts += price_sweet_spot(dataset, config, reporter)?;
    charts += global_correlation(dataset, reporter)?;
    charts += distributions(dataset, config, reporter)?;

    let stats = summary_stats(dataset, config.satisfaction_threshold);
    reporter.print(insights::executive_summary(&stats, config.satisfaction_threshold, generated_at));
    reporter.line(format!("✓ ANÁLISE COMPLETA! {charts} gráficos estratégicos gerados."));
    reporter.line(insights::rule());
    Ok(charts)
}

/// Checks the columns a section needs; prints and logs the skip otherwise.
fn require(dataset: &Dataset, reporter: &Reporter, section: &str, columns: &[Column]) -> bool {
    if dataset.has_all(columns) {
        return true;
    }
    let missing = dataset.missing(columns);
    info!("Skipping {}: missing columns {}", section, missing.join(", "));
    reporter.line(insights::skipped(&missing));
    false
}

fn brand_performance(dataset: &Dataset, config: &AppConfig, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(1, "Quais marcas dominam o mercado?"));
    let required = [Column::Brand, Column::Revenue, Column::QuantitySold, Column::Price, Column::Rating];
    if !require(dataset, reporter, "brand performance", &required) {
        return Ok(0);
    }

    info!("Aggregating by brand...");
    let top = rank_by(group_by(&dataset.records, Dimension::Brand), RankMetric::Revenue, config.top_brands);
    if top.is_empty() {
        reporter.line(insights::degenerate("nenhuma marca informada"));
        return Ok(0);
    }

    let overall_rating = mean(&dataset.values(Column::Rating));
    let files = vec![
        charts::brand_revenue(&reporter.canvas, &top)?,
        charts::brand_quality(&reporter.canvas, &top, overall_rating)?,
    ];
    reporter.saved(&files);
    reporter.print(insights::brands(&top));
    Ok(files.len())
}

fn material_value(dataset: &Dataset, config: &AppConfig, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(2, "Qual material oferece melhor custo-benefício?"));
    let required = [Column::Material, Column::Price, Column::Rating, Column::QuantitySold];
    if !require(dataset, reporter, "material value", &required) {
        return Ok(0);
    }

    info!("Aggregating by material...");
    let top = rank_by(
        group_by(&dataset.records, Dimension::Material),
        RankMetric::Quantity,
        config.top_materials,
    );
    if top.is_empty() {
        reporter.line(insights::degenerate("nenhum material informado"));
        return Ok(0);
    }

    let most_listed: Vec<String> = value_counts(&dataset.records, Dimension::Material)
        .into_iter()
        .take(config.boxplot_materials)
        .map(|(key, _)| key)
        .collect();
    let quartiles = price_quartiles(&dataset.records, Dimension::Material, &most_listed);

    let files = vec![
        charts::material_value_scatter(&reporter.canvas, &top)?,
        charts::material_price_boxplot(&reporter.canvas, &quartiles)?,
    ];
    reporter.saved(&files);
    reporter.print(insights::materials(best_rated(&top)));
    Ok(files.len())
}

fn seasonality(dataset: &Dataset, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(3, "Produtos sazonais vendem mais?"));
    let required = [Column::Season, Column::Revenue, Column::QuantitySold, Column::Price];
    if !require(dataset, reporter, "seasonality", &required) {
        return Ok(0);
    }

    info!("Aggregating by season...");
    let ranked = rank_by(group_by(&dataset.records, Dimension::Season), RankMetric::Revenue, usize::MAX);
    if ranked.is_empty() {
        reporter.line(insights::degenerate("nenhuma temporada informada"));
        return Ok(0);
    }

    let files = vec![
        charts::season_revenue(&reporter.canvas, &ranked)?,
        charts::season_price(&reporter.canvas, &ranked)?,
    ];
    reporter.saved(&files);
    reporter.print(insights::seasons(&ranked));
    Ok(files.len())
}

fn discount_effect(dataset: &Dataset, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(4, "Desconto aumenta vendas? Qual a elasticidade-preço?"));
    if !require(dataset, reporter, "discount elasticity", &[Column::Discount, Column::QuantitySold]) {
        return Ok(0);
    }

    info!("Fitting discount elasticity...");
    let fit = match fit_elasticity(&dataset.records) {
        Ok(fit) => fit,
        Err(e) => {
            warn!("Discount elasticity skipped: {}", e);
            reporter.line(insights::degenerate(&e.to_string()));
            return Ok(0);
        }
    };
    info!("Elasticity fit: slope = {:.4}, R² = {:.4}", fit.slope, fit.r_squared);

    let mut files = vec![charts::discount_elasticity(&reporter.canvas, &fit)?];
    if dataset.has(Column::Revenue) {
        let buckets = discount_buckets(&dataset.records);
        files.push(charts::discount_bucket_revenue(&reporter.canvas, &buckets)?);
    } else {
        reporter.line(insights::skipped(&[Column::Revenue.header()]));
    }
    reporter.saved(&files);
    reporter.print(insights::elasticity(&fit));
    Ok(files.len())
}

fn customer_sentiment(dataset: &Dataset, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(5, "O que os clientes mais elogiam e reclamam?"));
    if !require(dataset, reporter, "review sentiment", &[Column::Review]) {
        return Ok(0);
    }

    info!("Counting sentiment keywords...");
    let corpus = review_corpus(&dataset.records);
    let summary = count_sentiment(&corpus);
    info!("Sentiment hits: {} positive, {} negative", summary.positive, summary.negative);

    let mut files = vec![charts::sentiment_counts(&reporter.canvas, &summary)?];
    let skipped = match reporter.wordcloud(&corpus) {
        WordCloudOutcome::Rendered(path) => {
            files.push(path);
            None
        }
        WordCloudOutcome::Skipped { reason } => Some(reason),
    };
    reporter.saved(&files);
    if let Some(reason) = skipped {
        reporter.line(format!("  AVISO: WordCloud não gerado ({reason})"));
    }
    reporter.print(insights::sentiment(&summary));
    Ok(files.len())
}

fn pareto_curve(dataset: &Dataset, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(6, "Quais produtos são responsáveis por 80% da receita? (Pareto)"));
    if !require(dataset, reporter, "ABC classification", &[Column::Revenue]) {
        return Ok(0);
    }

    info!("Classifying products (ABC)...");
    let report = match classify_abc(&dataset.records) {
        Ok(report) => report,
        Err(e) => {
            warn!("ABC classification skipped: {}", e);
            reporter.line(insights::degenerate(&e.to_string()));
            return Ok(0);
        }
    };

    let files = vec![charts::abc_pareto(&reporter.canvas, &report)?];
    reporter.saved(&files);
    reporter.print(insights::pareto(&report));
    Ok(files.len())
}

fn price_sweet_spot(dataset: &Dataset, config: &AppConfig, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(7, "Qual é o preço ideal para maximizar vendas?"));
    let required = [Column::Price, Column::QuantitySold, Column::Revenue];
    if !require(dataset, reporter, "price sweet spot", &required) {
        return Ok(0);
    }

    info!("Binning prices...");
    let binning = match bin_prices(&dataset.records, config.price_bins) {
        Ok(binning) => binning,
        Err(e) => {
            warn!("Price sweet spot skipped: {}", e);
            reporter.line(insights::degenerate(&e.to_string()));
            return Ok(0);
        }
    };

    let files = vec![charts::price_sweet_spot(&reporter.canvas, &binning)?];
    reporter.saved(&files);
    reporter.print(insights::sweet_spot(&binning));
    Ok(files.len())
}

fn global_correlation(dataset: &Dataset, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(8, "Quais variáveis têm maior impacto nas vendas?"));
    let matrix = correlation_matrix(dataset);
    if matrix.columns.len() < 2 {
        reporter.line(insights::degenerate("menos de duas colunas numéricas disponíveis"));
        return Ok(0);
    }

    let files = vec![charts::correlation_heatmap(&reporter.canvas, &matrix)?];
    reporter.saved(&files);
    reporter.print(insights::correlation(&matrix));
    Ok(files.len())
}

fn distributions(dataset: &Dataset, config: &AppConfig, reporter: &Reporter) -> Result<usize, ReportError> {
    reporter.line(insights::question(9, "Como estão distribuídos os preços e notas?"));
    let prices = dataset.values(Column::Price);
    let ratings = dataset.values(Column::Rating);

    let price_histogram = histogram(&prices, config.histogram_bins);
    let rating_density = kde(&ratings, KDE_POINTS);
    if price_histogram.is_none() && rating_density.is_none() {
        reporter.line(insights::degenerate("sem preços nem notas suficientes"));
        return Ok(0);
    }

    let stats = summary_stats(dataset, config.satisfaction_threshold);
    let inputs = DistributionInputs {
        price_histogram: price_histogram.as_ref(),
        mean_price: stats.mean_price,
        median_price: stats.median_price,
        rating_density: rating_density.as_deref(),
        mean_rating: stats.mean_rating,
    };
    let files = vec![charts::price_rating_distribution(&reporter.canvas, &inputs)?];
    reporter.saved(&files);
    reporter.print(insights::distribution(&stats));
    Ok(files.len())
}
