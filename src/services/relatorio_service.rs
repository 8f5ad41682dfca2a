// src/services/relatorio_service.rs

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    common::{
        comissao::regra_comissao_padrao,
        date_utils::hoje,
        error::AppError,
    },
    db::RelatorioRepository,
    models::{
        agenda::{AgendaFiltros, JanelaAgenda, StatusAgenda},
        pagamento::RegraTipo,
        relatorio::{
            Dashboard, DesempenhoMensal, FinanceiroMensal, IntervaloQuery, PeriodoQuery, RegrasComissao,
            RelatorioAgenda, RelatorioFinanceiro, RelatorioUsuarios, ResumoFinanceiro,
        },
    },
    services::{agenda_service::AgendaService, churn_service::percentual, usuario_service::UsuarioService},
};

const LIMITE_ITENS_AGENDA: i64 = 50;

/// Mês e ano do período, com o mês corrente como padrão.
pub fn resolver_periodo(periodo: &PeriodoQuery, hoje: NaiveDate) -> Result<(i32, i32), AppError> {
    let mes = periodo.mes.unwrap_or(hoje.month() as i32);
    let ano = periodo.ano.unwrap_or(hoje.year());
    if !(1..=12).contains(&mes) {
        return Err(AppError::bad_request("Mês inválido. Use um valor entre 1 e 12"));
    }
    Ok((mes, ano))
}

/// Intervalo do relatório financeiro; padrão do início do ano até hoje.
pub fn resolver_intervalo(intervalo: &IntervaloQuery, hoje: NaiveDate) -> Result<(NaiveDate, NaiveDate), AppError> {
    let inicio = intervalo
        .data_inicio
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(hoje.year(), 1, 1).unwrap_or(hoje));
    let fim = intervalo.data_fim.unwrap_or(hoje);
    if inicio > fim {
        return Err(AppError::bad_request("A data inicial deve ser anterior à data final"));
    }
    Ok((inicio, fim))
}

pub fn resumir(meses: &[FinanceiroMensal]) -> ResumoFinanceiro {
    let receita = meses.iter().map(|m| m.receita).sum::<Decimal>();
    let despesas = meses.iter().map(|m| m.despesas).sum::<Decimal>();
    let comissoes = meses.iter().map(|m| m.comissoes).sum::<Decimal>();
    ResumoFinanceiro { receita, despesas, comissoes, lucro: receita - despesas - comissoes }
}

#[derive(Clone)]
pub struct RelatorioService {
    relatorio_repo: RelatorioRepository,
    usuario_service: UsuarioService,
    agenda_service: AgendaService,
}

impl RelatorioService {
    pub fn new(relatorio_repo: RelatorioRepository, usuario_service: UsuarioService, agenda_service: AgendaService) -> Self {
        Self { relatorio_repo, usuario_service, agenda_service }
    }

    pub async fn dashboard(&self, periodo: &PeriodoQuery) -> Result<Dashboard, AppError> {
        let (mes, ano) = resolver_periodo(periodo, hoje())?;
        let mes_ref = format!("{:02}/{}", mes, ano);

        let usuarios = self.usuario_service.get_stats().await?;
        let kpis = self.relatorio_repo.kpis_dashboard(mes, ano, &mes_ref).await?;
        let taxa_conversao = percentual(kpis.prospeccao.convertidos, kpis.prospeccao.total);

        Ok(Dashboard {
            periodo: mes_ref,
            usuarios,
            financeiro: kpis.financeiro,
            pagamentos: kpis.pagamentos,
            comissoes: kpis.comissoes,
            prospeccao: kpis.prospeccao,
            taxa_conversao,
            regras_comissao_padrao: RegrasComissao {
                primeiro: regra_comissao_padrao(RegraTipo::Primeiro),
                recorrente: regra_comissao_padrao(RegraTipo::Recorrente),
            },
        })
    }

    pub async fn financeiro(&self, intervalo: &IntervaloQuery) -> Result<RelatorioFinanceiro, AppError> {
        let (inicio, fim) = resolver_intervalo(intervalo, hoje())?;

        let por_mes = self.relatorio_repo.financeiro_mensal(inicio, fim).await?;
        let por_conta = self.relatorio_repo.receita_por_conta(inicio, fim).await?;
        let por_metodo = self.relatorio_repo.receita_por_metodo(inicio, fim).await?;

        Ok(RelatorioFinanceiro { resumo: resumir(&por_mes), por_mes, por_conta, por_metodo })
    }

    pub async fn usuarios(&self) -> Result<RelatorioUsuarios, AppError> {
        Ok(RelatorioUsuarios {
            stats: self.usuario_service.get_stats().await?,
            por_status: self.relatorio_repo.usuarios_por_status().await?,
            por_indicador: self.relatorio_repo.usuarios_por_indicador().await?,
            distribuicao_ciclos: self.relatorio_repo.distribuicao_ciclos().await?,
        })
    }

    pub async fn desempenho_mensal(&self, ano: Option<i32>) -> Result<DesempenhoMensal, AppError> {
        let ano = ano.unwrap_or_else(|| hoje().year());
        let meses = self.relatorio_repo.desempenho_mensal(ano).await?;
        Ok(DesempenhoMensal { ano, meses })
    }

    pub async fn agenda(&self) -> Result<RelatorioAgenda, AppError> {
        let pendentes = |janela| AgendaFiltros {
            status: Some(StatusAgenda::Ativo),
            renovou: Some(false),
            cancelou: Some(false),
            janela: Some(janela),
            ..Default::default()
        };

        let stats = self.agenda_service.get_stats().await?;
        let (vencidos, _) = self
            .agenda_service
            .find_all(&pendentes(JanelaAgenda::Vencidos), LIMITE_ITENS_AGENDA, 0)
            .await?;
        let (proximos_vencimentos, _) = self
            .agenda_service
            .find_all(&pendentes(JanelaAgenda::Proximos7Dias), LIMITE_ITENS_AGENDA, 0)
            .await?;

        Ok(RelatorioAgenda { stats, vencidos, proximos_vencimentos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dia).unwrap()
    }

    #[test]
    fn periodo_padrao_e_o_mes_corrente() {
        assert_eq!(resolver_periodo(&PeriodoQuery::default(), d(2025, 7, 14)).unwrap(), (7, 2025));
        assert!(resolver_periodo(&PeriodoQuery { mes: Some(13), ano: None }, d(2025, 7, 14)).is_err());
    }

    #[test]
    fn intervalo_padrao_comeca_no_inicio_do_ano() {
        let (inicio, fim) = resolver_intervalo(&IntervaloQuery::default(), d(2025, 7, 14)).unwrap();
        assert_eq!(inicio, d(2025, 1, 1));
        assert_eq!(fim, d(2025, 7, 14));

        let invertido = IntervaloQuery { data_inicio: Some(d(2025, 8, 1)), data_fim: Some(d(2025, 7, 1)) };
        assert!(resolver_intervalo(&invertido, d(2025, 7, 14)).is_err());
    }

    #[test]
    fn resumo_soma_os_meses() {
        let mes = |r: i64, dsp: i64, c: i64| FinanceiroMensal {
            mes: "01/2025".into(),
            receita: Decimal::from(r),
            despesas: Decimal::from(dsp),
            comissoes: Decimal::from(c),
            lucro: Decimal::ZERO,
        };
        let r = resumir(&[mes(1000, 200, 100), mes(500, 50, 0)]);
        assert_eq!(r.receita, Decimal::from(1500));
        assert_eq!(r.lucro, Decimal::from(1150));
    }
}
