// src/models/relatorio.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::{
    agenda::{AgendaComUsuario, AgendaStats},
    usuario::UsuarioStats,
};

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PeriodoQuery {
    /// Mês (1..12); usa o mês corrente quando ausente
    pub mes: Option<i32>,
    pub ano: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct IntervaloQuery {
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

// =========================================================================
//  DASHBOARD
// =========================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiFinanceiro {
    pub receita_total: Decimal,
    pub receita_mes: Decimal,
    pub despesas_total: Decimal,
    pub despesas_mes: Decimal,
    pub comissoes_mes: Decimal,
    pub lucro_mes: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiPagamentos {
    pub total: i64,
    pub mes: i64,
    pub primeiras_adesoes_mes: i64,
    pub renovacoes_mes: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiComissoes {
    pub total: i64,
    pub valor_total: Decimal,
    pub valor_mes: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KpiProspeccao {
    pub total: i64,
    pub convertidos: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegrasComissao {
    pub primeiro: Decimal,
    pub recorrente: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Mês de referência no formato MM/YYYY
    pub periodo: String,
    pub usuarios: UsuarioStats,
    pub financeiro: KpiFinanceiro,
    pub pagamentos: KpiPagamentos,
    pub comissoes: KpiComissoes,
    pub prospeccao: KpiProspeccao,
    pub taxa_conversao: Decimal,
    pub regras_comissao_padrao: RegrasComissao,
}

// =========================================================================
//  RELATÓRIO FINANCEIRO
// =========================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumoFinanceiro {
    pub receita: Decimal,
    pub despesas: Decimal,
    pub comissoes: Decimal,
    pub lucro: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinanceiroMensal {
    pub mes: String,
    pub receita: Decimal,
    pub despesas: Decimal,
    pub comissoes: Decimal,
    pub lucro: Decimal,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TotalPorGrupo {
    pub grupo: String,
    pub quantidade: i64,
    pub valor: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioFinanceiro {
    pub resumo: ResumoFinanceiro,
    pub por_mes: Vec<FinanceiroMensal>,
    pub por_conta: Vec<TotalPorGrupo>,
    pub por_metodo: Vec<TotalPorGrupo>,
}

// =========================================================================
//  RELATÓRIO DE USUÁRIOS
// =========================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContagemPorGrupo {
    pub grupo: String,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IndicadorResumo {
    pub indicador: String,
    pub quantidade: i64,
    pub ativos: i64,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DistribuicaoCiclo {
    pub ciclo: i32,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioUsuarios {
    pub stats: UsuarioStats,
    pub por_status: Vec<ContagemPorGrupo>,
    pub por_indicador: Vec<IndicadorResumo>,
    pub distribuicao_ciclos: Vec<DistribuicaoCiclo>,
}

// =========================================================================
//  DESEMPENHO MENSAL
// =========================================================================

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesempenhoMes {
    pub mes: i32,
    /// MM/YYYY
    pub mes_ref: String,
    pub receita: Decimal,
    pub despesas: Decimal,
    pub lucro: Decimal,
    pub novos_usuarios: i64,
    pub renovacoes: i64,
    pub churns: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DesempenhoMensal {
    pub ano: i32,
    pub meses: Vec<DesempenhoMes>,
}

// =========================================================================
//  RELATÓRIO DA AGENDA
// =========================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioAgenda {
    pub stats: AgendaStats,
    pub vencidos: Vec<AgendaComUsuario>,
    pub proximos_vencimentos: Vec<AgendaComUsuario>,
}
