//! Human-readable summaries, chart series and assistant reply texts.

use chrono::NaiveDate;
use expense_domain::{format_date, AggregationResult, CategoryShare, Money, FALLBACK_CATEGORY};

use crate::{command::Registration, value::ValueParser, CoreError};

pub const DEFAULT_CHART_CATEGORY_LIMIT: usize = 6;
pub const DEFAULT_CHART_TOP_CATEGORIES: usize = 5;
pub const CHART_OTHER_LABEL: &str = "Outros";

/// Labels and values handed to the chart renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    fn push(&mut self, label: impl Into<String>, amount: Money) {
        self.labels.push(label.into());
        self.values.push(amount.as_f64());
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    pub summary_text: String,
    pub series: ChartSeries,
}

#[derive(Debug, Clone)]
pub struct ReportFormatter {
    values: ValueParser,
    chart_category_limit: usize,
    chart_top_categories: usize,
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new(ValueParser::default())
    }
}

impl ReportFormatter {
    pub fn new(values: ValueParser) -> Self {
        Self {
            values,
            chart_category_limit: DEFAULT_CHART_CATEGORY_LIMIT,
            chart_top_categories: DEFAULT_CHART_TOP_CATEGORIES,
        }
    }

    /// Above `limit` categories the chart keeps the `top` largest and folds the rest.
    pub fn with_chart_limits(mut self, limit: usize, top: usize) -> Self {
        self.chart_category_limit = limit.max(1);
        self.chart_top_categories = top.clamp(1, self.chart_category_limit);
        self
    }

    pub fn values(&self) -> &ValueParser {
        &self.values
    }

    pub fn render(&self, result: &AggregationResult, title: &str) -> RenderedReport {
        let ranked = result.ranked_categories();
        RenderedReport {
            summary_text: self.summary_text(result, &ranked, title),
            series: self.chart_series(&ranked),
        }
    }

    fn summary_text(&self, result: &AggregationResult, ranked: &[CategoryShare], title: &str) -> String {
        let mut text = format!("📊 {}\n\n", title);
        if ranked.is_empty() {
            text.push_str("Nenhuma despesa encontrada.\n");
        } else {
            for share in ranked {
                text.push_str(&format!(
                    "- {}: {} ({:.1}%)\n",
                    share.label,
                    self.values.format(share.amount),
                    share.percent
                ));
            }
            text.push('\n');
        }
        text.push_str(&format!("Total: {}", self.values.format(result.total)));
        text
    }

    fn chart_series(&self, ranked: &[CategoryShare]) -> ChartSeries {
        let mut series = ChartSeries::default();
        if ranked.len() <= self.chart_category_limit {
            for share in ranked {
                series.push(share.label.clone(), share.amount);
            }
            return series;
        }
        let (top, rest) = ranked.split_at(self.chart_top_categories);
        let remainder: Money = rest.iter().map(|share| share.amount).sum();
        let mut folded = false;
        for share in top {
            if share.label.eq_ignore_ascii_case(FALLBACK_CATEGORY) {
                series.push(share.label.clone(), share.amount + remainder);
                folded = true;
            } else {
                series.push(share.label.clone(), share.amount);
            }
        }
        if !folded {
            series.push(CHART_OTHER_LABEL, remainder);
        }
        series
    }

    pub fn confirmation(&self, registration: &Registration) -> String {
        let plan = &registration.plan;
        if !plan.is_split() {
            return format!(
                "✅ Despesa registrada!\n📅 Data: {}\n📂 Categoria: {}\n📝 Descrição: {}\n👤 Responsável: {}\n💰 Valor: {}",
                format_date(plan.base_date),
                registration.category,
                registration.description,
                registration.responsible,
                self.values.format(plan.total)
            );
        }
        format!(
            "✅ Despesa parcelada registrada!\n📅 Primeira parcela: {}\n📅 Última parcela: {}\n📂 Categoria: {}\n📝 Descrição: {}\n👤 Responsável: {}\n💰 Valor total: {}\n💳 Parcelas: {} x {}",
            format_date(plan.base_date),
            format_date(plan.due_date(plan.count)),
            registration.category,
            registration.description,
            registration.responsible,
            self.values.format(plan.total),
            plan.count,
            self.values.format_plain(plan.per_installment())
        )
    }

    pub fn help_text(&self) -> String {
        [
            "🤖 Assistente Financeiro - Comandos disponíveis:",
            "",
            "📌 Registrar despesas:",
            "Larissa, mercado, 150",
            "Larissa, 28/04, mercado, 150",
            "Larissa, geladeira, 3000, 10x",
            "(formato: responsável, [data], descrição, valor, [parcelas])",
            "",
            "📊 Ver resumos:",
            "- resumo geral",
            "- resumo hoje",
            "- resumo da semana",
            "- resumo do mês",
            "- resumo 15 dias",
            "- resumo por categoria",
            "- resumo da Larissa",
            "- resumo do mês do Thiago",
            "",
            "🔉 Também aceitamos mensagens de áudio!",
        ]
        .join("\n")
    }

    /// Corrective reply for a failed request. Infrastructure failures get a generic text.
    pub fn correction(&self, err: &CoreError) -> String {
        match err {
            CoreError::MalformedCommand(detail) => format!(
                "⚠️ Não entendi o comando ({}).\nUse: responsável, [data], descrição, valor, [parcelas]\nExemplo: Ana, hoje, mercado, 150",
                detail
            ),
            CoreError::InvalidAmount(literal) => format!(
                "⚠️ Valor inválido: \"{}\". Informe um valor maior que zero, por exemplo 150 ou 1.234,56.\nExemplo: Ana, mercado, 150",
                literal
            ),
            CoreError::InvalidDateToken(token) => format!(
                "⚠️ Data inválida: \"{}\". Use hoje, ontem, DD/MM ou DD/MM/AAAA.\nExemplo: Ana, 25/12, presente, 80",
                token
            ),
            CoreError::InvalidInstallmentToken(token) => format!(
                "⚠️ Parcelamento inválido: \"{}\". Informe o número de parcelas seguido de x.\nExemplo: Ana, geladeira, 3000, 10x",
                token
            ),
            CoreError::TranscriptionFailed(_) => {
                "⚠️ Não consegui entender o áudio. Tente novamente ou envie uma mensagem de texto."
                    .to_string()
            }
            _ => self.retry_later(),
        }
    }

    pub fn retry_later(&self) -> String {
        "⚠️ Não foi possível concluir agora. Tente novamente mais tarde.".to_string()
    }

    pub fn reminder_text(&self, name: &str, today: NaiveDate) -> String {
        format!(
            "⏰ Olá, {name}!\n\nNão se esqueça de registrar suas despesas de hoje ({}).\n\nPara registrar uma despesa, envie no formato:\n{name}, descrição, valor\n\nExemplo: {name}, supermercado, 50,00",
            format_date(today)
        )
    }

    pub fn daily_summary_title(&self, today: NaiveDate) -> String {
        format!("Resumo do dia {}", format_date(today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with(categories: &[(&str, i64)]) -> AggregationResult {
        let mut result = AggregationResult::default();
        for (label, cents) in categories {
            result.record(label, Money::from_cents(*cents));
        }
        result
    }

    #[test]
    fn summary_lists_categories_by_value_then_total() {
        let result = result_with(&[("LAZER", 5000), ("ALIMENTAÇÃO", 15000)]);
        let report = ReportFormatter::default().render(&result, "Resumo Geral");
        let text = report.summary_text;
        let food = text.find("ALIMENTAÇÃO").unwrap();
        let leisure = text.find("LAZER").unwrap();
        let total = text.find("Total: R$200,00").unwrap();
        assert!(food < leisure && leisure < total, "{text}");
        assert!(text.contains("- ALIMENTAÇÃO: R$150,00 (75.0%)"), "{text}");
        assert_eq!(report.series.labels, vec!["ALIMENTAÇÃO", "LAZER"]);
        assert_eq!(report.series.values, vec![150.0, 50.0]);
    }

    #[test]
    fn empty_result_renders_zero_total() {
        let report = ReportFormatter::default().render(&AggregationResult::default(), "Resumo");
        assert!(report.summary_text.contains("Nenhuma despesa encontrada."));
        assert!(report.summary_text.ends_with("Total: R$0,00"));
        assert!(report.series.is_empty());
    }

    #[test]
    fn chart_collapses_tail_beyond_limit() {
        let result = result_with(&[
            ("A", 7000),
            ("B", 6000),
            ("C", 5000),
            ("D", 4000),
            ("E", 3000),
            ("F", 2000),
            ("G", 1000),
        ]);
        let report = ReportFormatter::default().render(&result, "Resumo");
        assert_eq!(report.series.labels, vec!["A", "B", "C", "D", "E", "Outros"]);
        assert_eq!(report.series.values[5], 30.0);
        // The text keeps every category.
        assert!(report.summary_text.contains("- G: R$10,00"));
        assert!(report.summary_text.contains("- F: R$20,00"));
    }

    #[test]
    fn chart_keeps_six_categories_uncollapsed() {
        let result = result_with(&[("A", 6), ("B", 5), ("C", 4), ("D", 3), ("E", 2), ("F", 1)]);
        let report = ReportFormatter::default().render(&result, "Resumo");
        assert_eq!(report.series.len(), 6);
    }

    #[test]
    fn tail_folds_into_existing_fallback_bucket() {
        let result = result_with(&[
            ("OUTROS", 9000),
            ("B", 6000),
            ("C", 5000),
            ("D", 4000),
            ("E", 3000),
            ("F", 2000),
            ("G", 1000),
        ]);
        let report = ReportFormatter::default().render(&result, "Resumo");
        assert_eq!(report.series.len(), 5);
        assert_eq!(report.series.labels[0], "OUTROS");
        assert_eq!(report.series.values[0], 120.0);
    }

    #[test]
    fn corrections_carry_examples() {
        let formatter = ReportFormatter::default();
        let text = formatter.correction(&CoreError::InvalidAmount("abc".into()));
        assert!(text.contains("\"abc\"") && text.contains("Exemplo"));
        let generic = formatter.correction(&CoreError::Persistence("disk full".into()));
        assert!(!generic.contains("disk full"));
    }

    #[test]
    fn reminder_names_contact_and_date() {
        let text = ReportFormatter::default()
            .reminder_text("Larissa", NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
        assert!(text.contains("Olá, Larissa!"));
        assert!(text.contains("(10/05/2024)"));
        assert!(text.contains("Larissa, supermercado, 50,00"));
    }
}
