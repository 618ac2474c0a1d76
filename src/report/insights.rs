// Textual insights printed after each chart group
use crate::analyzer::distribution::{CorrelationMatrix, SummaryStats};
use crate::analyzer::elasticity::LinearFit;
use crate::analyzer::pareto::{AbcClass, AbcReport};
use crate::analyzer::price_bins::PriceBinning;
use crate::analyzer::sentiment::SentimentSummary;
use crate::model::GroupSummary;
use crate::utils::{format_brl, format_thousands};
use chrono::{DateTime, Utc};

pub const RULE_WIDTH: usize = 80;

pub fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

pub fn banner(generated_at: DateTime<Utc>, records: usize) -> Vec<String> {
    vec![
        rule(),
        "ANÁLISE ESTRATÉGICA DE NEGÓCIO - E-COMMERCE".into(),
        rule(),
        "Respondendo perguntas críticas de negócio e identificando oportunidades...".into(),
        format!("Gerado em {} | {} registros", generated_at.format("%Y-%m-%d %H:%M:%S UTC"), records),
        rule(),
    ]
}

pub fn question(number: u8, text: &str) -> String {
    format!("\n📊 PERGUNTA {number}: {text}")
}

pub fn saved(files: &[&str]) -> String {
    match files {
        [single] => format!("✓ Gráfico salvo: {single}"),
        many => format!("✓ Gráficos salvos: {}", many.join(", ")),
    }
}

pub fn skipped(missing: &[&str]) -> String {
    format!("  ⚠️ Análise ignorada: colunas ausentes ({})", missing.join(", "))
}

pub fn degenerate(reason: &str) -> String {
    format!("  ⚠️ Análise ignorada: {reason}")
}

pub fn brands(top: &[GroupSummary]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(leader) = top.first() {
        lines.push(format!(
            "  INSIGHT: {} lidera com {}",
            leader.key,
            format_brl(leader.revenue, 2)
        ));
    }
    lines.push("  OPORTUNIDADE: Marcas com alta nota mas baixa receita têm potencial não explorado".into());
    lines
}

pub fn materials(best: Option<&GroupSummary>) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some((key, rating)) = best.and_then(|g| Some((&g.key, g.mean_rating?))) {
        lines.push(format!("  INSIGHT: Melhor avaliado = {key} (nota {rating:.2})"));
    }
    lines.push("  PROBLEMA: Materiais premium podem estar supervalorizados".into());
    lines
}

pub fn seasons(ranked: &[GroupSummary]) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(top) = ranked.first() {
        lines.push(format!("  INSIGHT: {} é a temporada mais lucrativa", top.key));
    }
    lines.push("  OPORTUNIDADE: Ajustar estoque e precificação por sazonalidade".into());
    lines
}

pub fn elasticity(fit: &LinearFit) -> Vec<String> {
    vec![
        format!(
            "  INSIGHT: Correlação desconto-vendas = {:.3} (R², {} observações, inclinação {:.2} un./p.p.)",
            fit.r_squared, fit.observations, fit.slope
        ),
        "  PROBLEMA: Descontos altos podem queimar margem sem ganho proporcional".into(),
    ]
}

pub fn sentiment(summary: &SentimentSummary) -> Vec<String> {
    let mut lines = Vec::new();
    match summary.positive_share() {
        Some(share) => lines.push(format!("  INSIGHT: {share:.1}% de sentimento positivo")),
        None => lines.push("  INSIGHT: nenhuma palavra-chave de sentimento encontrada nos reviews".into()),
    }
    let complaints = summary.top_complaints(3);
    if !complaints.is_empty() {
        let listed: Vec<String> = complaints.iter().map(|(w, n)| format!("{w} ({n})")).collect();
        lines.push(format!("  RECLAMAÇÕES MAIS FREQUENTES: {}", listed.join(", ")));
    }
    lines.push("  PROBLEMA: Reclamações sobre tamanho/qualidade precisam ser endereçadas".into());
    lines
}

pub fn pareto(report: &AbcReport) -> Vec<String> {
    let count_a = report.count(AbcClass::A);
    vec![
        format!(
            "  INSIGHT: {} produtos ({:.1}%) geram 80% da receita ({})",
            count_a,
            report.share_of_records(AbcClass::A),
            format_brl(report.revenue_of(AbcClass::A), 2)
        ),
        format!(
            "  Classes: A = {} | B = {} | C = {}",
            count_a,
            report.count(AbcClass::B),
            report.count(AbcClass::C)
        ),
        "  OPORTUNIDADE: Focar estoque e marketing nos produtos Classe A".into(),
    ]
}

pub fn sweet_spot(binning: &PriceBinning) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(bin) = binning.sweet_spot() {
        lines.push(format!(
            "  INSIGHT: Faixa de preço mais lucrativa = ({:.3}, {:.3}] com {}",
            bin.lower,
            bin.upper,
            format_brl(bin.revenue, 2)
        ));
    }
    lines.push("  OPORTUNIDADE: Concentrar mix de produtos nesta faixa".into());
    lines
}

pub fn correlation(matrix: &CorrelationMatrix) -> Vec<String> {
    let mut lines = vec!["  INSIGHT: Variáveis com correlação >0.7 têm forte relação".to_string()];
    for (a, b, r) in matrix.strong_pairs(0.7) {
        lines.push(format!("    • {} x {}: {:.2}", a.header(), b.header(), r));
    }
    lines.push("  AÇÃO: Usar variáveis correlacionadas para prever vendas".into());
    lines
}

pub fn distribution(stats: &SummaryStats) -> Vec<String> {
    match (stats.median_price, stats.mean_rating) {
        (Some(median), Some(rating)) => vec![format!(
            "  INSIGHT: Concentração em torno de {} e nota {:.2}",
            format_brl(median, 2),
            rating
        )],
        (Some(median), None) => vec![format!("  INSIGHT: Concentração em torno de {}", format_brl(median, 2))],
        (None, Some(rating)) => vec![format!("  INSIGHT: Nota média {rating:.2}")],
        (None, None) => Vec::new(),
    }
}

pub fn executive_summary(stats: &SummaryStats, threshold: f64, generated_at: DateTime<Utc>) -> Vec<String> {
    let mut lines = vec![
        format!("\n{}", rule()),
        "RELATÓRIO EXECUTIVO - INSIGHTS E RECOMENDAÇÕES".into(),
        rule(),
        "\n🎯 PRINCIPAIS DESCOBERTAS:".into(),
    ];

    let mut findings = Vec::new();
    if let Some(total) = stats.total_revenue {
        findings.push(format!("Receita Total: R$ {}", format_thousands(total, 2)));
    }
    if let Some(price) = stats.mean_price {
        findings.push(format!("Ticket Médio: R$ {price:.2}"));
    }
    if let Some(rating) = stats.mean_rating {
        findings.push(format!("Nota Média Geral: {rating:.2}/5.0"));
    }
    if let Some(rate) = stats.satisfaction_rate {
        findings.push(format!("Taxa de Satisfação (nota ≥{threshold}): {rate:.1}%"));
    }
    lines.extend(findings.iter().enumerate().map(|(i, f)| format!("{}. {}", i + 1, f)));

    lines.push("\n⚠️ PROBLEMAS IDENTIFICADOS:".into());
    lines.extend(
        [
            "• Produtos com alta nota mas baixa visibilidade (oportunidade perdida)",
            "• Descontos altos sem retorno proporcional em volume",
            "• Reclamações recorrentes sobre tamanho e qualidade",
            "• Concentração excessiva em poucas marcas",
        ]
        .map(String::from),
    );

    lines.push("\n💡 OPORTUNIDADES:".into());
    lines.extend(
        [
            "• Investir em produtos Classe A (80% da receita)",
            "• Ajustar mix de produtos para sweet spot de preço",
            "• Melhorar comunicação de tamanho para reduzir devoluções",
            "• Explorar sazonalidade para campanhas direcionadas",
        ]
        .map(String::from),
    );

    lines.push("\n🚀 RECOMENDAÇÕES ESTRATÉGICAS:".into());
    lines.extend(
        [
            "1. Revisar política de descontos (sweet spot: 10-20%)",
            "2. Aumentar estoque de produtos Classe A",
            "3. Criar campanhas por temporada",
            "4. Melhorar descrições de tamanho/material",
            "5. Investir em marcas bem avaliadas mas pouco exploradas",
        ]
        .map(String::from),
    );

    lines.push(format!("\n{}", rule()));
    lines.push(format!(
        "Relatório concluído em {}",
        generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::pareto::classify_abc;
    use crate::analyzer::sentiment::count_sentiment;
    use crate::model::ProductRecord;
    use chrono::TimeZone;

    fn group(key: &str, revenue: f64, rating: Option<f64>) -> GroupSummary {
        GroupSummary {
            key: key.into(),
            count: 1,
            revenue,
            quantity: 0.0,
            mean_price: None,
            mean_rating: rating,
        }
    }

    #[test]
    fn saved_line_singular_and_plural() {
        assert_eq!(saved(&["11_curva_abc_pareto.png"]), "✓ Gráfico salvo: 11_curva_abc_pareto.png");
        assert_eq!(saved(&["a.png", "b.png"]), "✓ Gráficos salvos: a.png, b.png");
    }

    #[test]
    fn brand_leader_is_formatted_as_currency() {
        let lines = brands(&[group("Nike", 1234567.5, None), group("Puma", 10.0, None)]);
        assert_eq!(lines[0], "  INSIGHT: Nike lidera com R$1,234,567.50");
    }

    #[test]
    fn sentiment_without_hits_says_so() {
        let lines = sentiment(&count_sentiment("chegou rápido"));
        assert!(lines[0].contains("nenhuma palavra-chave"));
        let lines = sentiment(&count_sentiment("bom bom ruim pequeno"));
        assert_eq!(lines[0], "  INSIGHT: 50.0% de sentimento positivo");
        assert!(lines[1].starts_with("  RECLAMAÇÕES MAIS FREQUENTES: ruim (1), pequeno (1)"));
    }

    #[test]
    fn pareto_counts_class_a() {
        let records: Vec<ProductRecord> = [500.0, 300.0, 200.0]
            .iter()
            .map(|r| ProductRecord { revenue: Some(*r), ..Default::default() })
            .collect();
        let lines = pareto(&classify_abc(&records).unwrap());
        assert_eq!(lines[0], "  INSIGHT: 2 produtos (66.7%) geram 80% da receita (R$800.00)");
        assert_eq!(lines[1], "  Classes: A = 2 | B = 0 | C = 1");
    }

    #[test]
    fn executive_summary_numbers_only_what_is_known() {
        let stats = SummaryStats {
            total_revenue: Some(98765.4),
            mean_price: None,
            median_price: None,
            mean_rating: Some(4.456),
            satisfaction_rate: Some(41.27),
        };
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let lines = executive_summary(&stats, 4.5, at);
        assert!(lines.contains(&"1. Receita Total: R$ 98,765.40".to_string()));
        assert!(lines.contains(&"2. Nota Média Geral: 4.46/5.0".to_string()));
        assert!(lines.contains(&"3. Taxa de Satisfação (nota ≥4.5): 41.3%".to_string()));
        assert_eq!(lines.last().unwrap(), "Relatório concluído em 2026-10-19 12:00:00 UTC");
    }
}
