// src/common/date_utils.rs
//
// Cálculos de vencimento. Tudo trabalha com datas de calendário (sem hora)
// e recebe `hoje` como parâmetro, para que o resultado seja determinístico.

use chrono::{Datelike, Duration, NaiveDate, Utc};

/// Duração padrão de um ciclo de assinatura, em dias.
pub const CICLO_DIAS_PADRAO: i64 = 30;

/// Janela de alerta "vence nos próximos dias".
pub const DIAS_ALERTA_VENCIMENTO: i64 = 7;

/// Janela usada pela sincronização da agenda.
pub const JANELA_SINCRONIZACAO_DIAS: i64 = 30;

pub fn hoje() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn calcular_data_vencimento(data_pagto: NaiveDate, ciclo_dias: i64) -> NaiveDate {
    data_pagto + Duration::days(ciclo_dias)
}

pub fn calcular_dias_para_vencer(data_venc: NaiveDate, hoje: NaiveDate) -> i32 {
    (data_venc - hoje).num_days() as i32
}

pub fn vence_hoje(dias: i32) -> bool {
    dias == 0
}

pub fn vence_proximos_7_dias(dias: i32) -> bool {
    dias > 0 && i64::from(dias) <= DIAS_ALERTA_VENCIMENTO
}

pub fn em_atraso(dias: i32) -> bool {
    dias < 0
}

/// Mês de referência no formato `MM/YYYY`.
pub fn mes_pagto(data: NaiveDate) -> String {
    format!("{:02}/{}", data.month(), data.year())
}

/// Interpreta `MM/YYYY` em (mês, ano).
pub fn parse_mes_ano(valor: &str) -> Option<(u32, i32)> {
    let (mes, ano) = valor.split_once('/')?;
    let mes: u32 = mes.trim().parse().ok()?;
    let ano: i32 = ano.trim().parse().ok()?;
    if (1..=12).contains(&mes) { Some((mes, ano)) } else { None }
}

pub fn primeiro_dia_do_mes(data: NaiveDate) -> NaiveDate {
    data.with_day(1).unwrap_or(data)
}

pub fn ultimo_dia_do_mes(data: NaiveDate) -> NaiveDate {
    let (ano, mes) = if data.month() == 12 { (data.year() + 1, 1) } else { (data.year(), data.month() + 1) };
    NaiveDate::from_ymd_opt(ano, mes, 1)
        .map(|d| d - Duration::days(1))
        .unwrap_or(data)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagsVencimento {
    pub dias_para_vencer: i32,
    pub vence_hoje: bool,
    pub prox_7_dias: bool,
    pub em_atraso: bool,
}

impl FlagsVencimento {
    pub fn calcular(data_venc: NaiveDate, hoje: NaiveDate) -> Self {
        let dias = calcular_dias_para_vencer(data_venc, hoje);
        Self {
            dias_para_vencer: dias,
            vence_hoje: vence_hoje(dias),
            prox_7_dias: vence_proximos_7_dias(dias),
            em_atraso: em_atraso(dias),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dia).unwrap()
    }

    #[test]
    fn vencimento_soma_trinta_dias() {
        assert_eq!(calcular_data_vencimento(d(2024, 1, 15), CICLO_DIAS_PADRAO), d(2024, 2, 14));
        assert_eq!(calcular_data_vencimento(d(2024, 2, 1), CICLO_DIAS_PADRAO), d(2024, 3, 2));
    }

    #[test]
    fn flags_nas_fronteiras() {
        let hoje = d(2024, 6, 10);

        let f = FlagsVencimento::calcular(hoje, hoje);
        assert_eq!(f, FlagsVencimento { dias_para_vencer: 0, vence_hoje: true, prox_7_dias: false, em_atraso: false });

        let f = FlagsVencimento::calcular(d(2024, 6, 17), hoje);
        assert_eq!(f.dias_para_vencer, 7);
        assert!(f.prox_7_dias);

        let f = FlagsVencimento::calcular(d(2024, 6, 18), hoje);
        assert!(!f.prox_7_dias);

        let f = FlagsVencimento::calcular(d(2024, 6, 9), hoje);
        assert_eq!(f.dias_para_vencer, -1);
        assert!(f.em_atraso && !f.vence_hoje && !f.prox_7_dias);
    }

    #[test]
    fn mes_pagto_formatado() {
        assert_eq!(mes_pagto(d(2024, 3, 5)), "03/2024");
        assert_eq!(mes_pagto(d(2023, 12, 31)), "12/2023");
        assert_eq!(parse_mes_ano("03/2024"), Some((3, 2024)));
        assert_eq!(parse_mes_ano("13/2024"), None);
        assert_eq!(parse_mes_ano("2024-03"), None);
    }

    #[test]
    fn limites_do_mes() {
        assert_eq!(primeiro_dia_do_mes(d(2024, 2, 17)), d(2024, 2, 1));
        assert_eq!(ultimo_dia_do_mes(d(2024, 2, 17)), d(2024, 2, 29));
        assert_eq!(ultimo_dia_do_mes(d(2024, 12, 3)), d(2024, 12, 31));
    }
}
