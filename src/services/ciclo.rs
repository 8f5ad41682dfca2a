// src/services/ciclo.rs
//
// Transições de estado do usuário e dos itens da agenda.
// Funções puras: os serviços carregam as linhas (com lock), aplicam a
// transição aqui e gravam o resultado na mesma transação.

use chrono::NaiveDate;

use crate::{
    common::{
        date_utils::{calcular_data_vencimento, mes_pagto, FlagsVencimento, CICLO_DIAS_PADRAO},
        error::AppError,
    },
    models::{
        agenda::{Agenda, EstadoAgenda},
        pagamento::{Pagamento, RegraTipo},
        usuario::{StatusFinal, Usuario},
    },
};

// =========================================================================
//  USUÁRIO
// =========================================================================

/// EM_ATRASO se vencido, ATIVO se ainda faltam dias. Vencendo hoje mantém o status.
pub fn status_por_vencimento(atual: StatusFinal, flags: &FlagsVencimento) -> StatusFinal {
    if flags.em_atraso {
        StatusFinal::EmAtraso
    } else if flags.dias_para_vencer >= 1 {
        StatusFinal::Ativo
    } else {
        atual
    }
}

fn aplicar_flags(usuario: &mut Usuario, flags: &FlagsVencimento) {
    usuario.dias_para_vencer = Some(flags.dias_para_vencer);
    usuario.vence_hoje = flags.vence_hoje;
    usuario.prox_7_dias = flags.prox_7_dias;
    usuario.em_atraso = flags.em_atraso;
}

fn copiar_campos_de_pagamento(usuario: &mut Usuario, pagamento: &Pagamento) {
    usuario.data_pagto = Some(pagamento.data_pagto);
    usuario.mes_pagto = Some(pagamento.mes_pagto.clone());
    usuario.data_venc = Some(calcular_data_vencimento(pagamento.data_pagto, CICLO_DIAS_PADRAO));
    usuario.metodo = Some(pagamento.metodo);
    usuario.conta = Some(pagamento.conta.clone());
    usuario.regra_tipo = Some(pagamento.regra_tipo);
    usuario.regra_valor = pagamento.regra_valor;
    usuario.elegivel_comissao = pagamento.elegivel_comissao;
    usuario.comissao_valor = pagamento.comissao_valor;
}

/// Efeito de um pagamento recém-criado sobre o usuário.
pub fn aplicar_pagamento(usuario: &mut Usuario, pagamento: &Pagamento, hoje: NaiveDate) {
    copiar_campos_de_pagamento(usuario, pagamento);

    if let Some(data_venc) = usuario.data_venc {
        let flags = FlagsVencimento::calcular(data_venc, hoje);
        aplicar_flags(usuario, &flags);
    }
    // Pagamento recém-registrado nunca deixa o usuário em atraso.
    usuario.em_atraso = false;

    usuario.ativo_atual = true;
    usuario.status_final = StatusFinal::Ativo;

    match pagamento.regra_tipo {
        RegraTipo::Primeiro => {
            usuario.entrou = true;
            usuario.ciclo = 1;
            usuario.total_ciclos_usuario = 1;
            usuario.mes_ref = Some(mes_pagto(pagamento.data_pagto));
        }
        RegraTipo::Recorrente => {
            usuario.renovou = true;
            usuario.ciclo += 1;
            usuario.total_ciclos_usuario += 1;
        }
    }
}

/// Volta o usuário ao estado de quem nunca pagou.
pub fn resetar_usuario(usuario: &mut Usuario) {
    usuario.status_final = StatusFinal::Inativo;
    usuario.entrou = false;
    usuario.renovou = false;
    usuario.ativo_atual = false;
    usuario.ciclo = 0;
    usuario.total_ciclos_usuario = 0;
    usuario.data_pagto = None;
    usuario.mes_pagto = None;
    usuario.mes_ref = None;
    usuario.data_venc = None;
    usuario.dias_para_vencer = None;
    usuario.vence_hoje = false;
    usuario.prox_7_dias = false;
    usuario.em_atraso = false;
    usuario.metodo = None;
    usuario.conta = None;
    usuario.regra_tipo = None;
    usuario.regra_valor = None;
    usuario.elegivel_comissao = false;
    usuario.comissao_valor = None;
}

/// Desfaz o efeito de `removido` sobre o usuário.
///
/// `anterior` é o pagamento mais recente que sobra após a remoção.
pub fn reverter_pagamento(
    usuario: &mut Usuario,
    removido: &Pagamento,
    anterior: Option<&Pagamento>,
    hoje: NaiveDate,
) {
    let anterior = match (removido.regra_tipo, anterior) {
        (RegraTipo::Recorrente, Some(p)) => p,
        _ => {
            resetar_usuario(usuario);
            return;
        }
    };

    copiar_campos_de_pagamento(usuario, anterior);
    usuario.ciclo = (usuario.ciclo - 1).max(0);
    usuario.total_ciclos_usuario = (usuario.total_ciclos_usuario - 1).max(0);
    usuario.renovou = false;

    if let Some(data_venc) = usuario.data_venc {
        let flags = FlagsVencimento::calcular(data_venc, hoje);
        aplicar_flags(usuario, &flags);
        usuario.status_final = if data_venc > hoje { StatusFinal::Ativo } else { StatusFinal::EmAtraso };
    }
}

/// Recalcula flags e status a partir de `data_venc`. Retorna `true` se algo mudou.
///
/// O status só é derivado para usuários ATIVO ou EM_ATRASO; INATIVO e
/// HISTORICO têm apenas as flags atualizadas.
pub fn atualizar_flags(usuario: &mut Usuario, hoje: NaiveDate) -> bool {
    let Some(data_venc) = usuario.data_venc else {
        return false;
    };

    let flags = FlagsVencimento::calcular(data_venc, hoje);
    let novo_status = match usuario.status_final {
        StatusFinal::Ativo | StatusFinal::EmAtraso => status_por_vencimento(usuario.status_final, &flags),
        outro => outro,
    };

    let mudou = usuario.dias_para_vencer != Some(flags.dias_para_vencer)
        || usuario.vence_hoje != flags.vence_hoje
        || usuario.prox_7_dias != flags.prox_7_dias
        || usuario.em_atraso != flags.em_atraso
        || usuario.status_final != novo_status;

    if mudou {
        aplicar_flags(usuario, &flags);
        usuario.status_final = novo_status;
    }
    mudou
}

pub fn registrar_churn(usuario: &mut Usuario) {
    usuario.churn = true;
    usuario.ativo_atual = false;
}

/// Cancelamento pela agenda: além do churn, o usuário sai da base ativa.
pub fn cancelar_por_agenda(usuario: &mut Usuario) {
    registrar_churn(usuario);
    usuario.status_final = StatusFinal::Inativo;
}

/// Reativa o usuário após reverter um churn. Retorna `true` se ele voltou a ATIVO.
pub fn reativar_apos_churn(usuario: &mut Usuario, hoje: NaiveDate) -> bool {
    usuario.churn = false;
    let tem_pagamento_valido = usuario.data_venc.is_some_and(|d| d > hoje);
    usuario.ativo_atual = tem_pagamento_valido;
    usuario.status_final = if tem_pagamento_valido { StatusFinal::Ativo } else { StatusFinal::Inativo };
    tem_pagamento_valido
}

// =========================================================================
//  AGENDA
// =========================================================================

pub fn validar_renovacao(agenda: &Agenda) -> Result<(), AppError> {
    match agenda.estado() {
        EstadoAgenda::Pendente => Ok(()),
        EstadoAgenda::Renovado => Err(AppError::bad_request("Este item já foi marcado como renovado")),
        EstadoAgenda::Cancelado => Err(AppError::bad_request(
            "Este item está cancelado. Reverta o cancelamento primeiro.",
        )),
    }
}

/// Retorna se o item estava renovado (e portanto há pagamento a desfazer).
pub fn validar_cancelamento(agenda: &Agenda) -> Result<bool, AppError> {
    match agenda.estado() {
        EstadoAgenda::Cancelado => Err(AppError::bad_request("Este item já foi marcado como cancelado")),
        EstadoAgenda::Renovado => Ok(true),
        EstadoAgenda::Pendente => Ok(false),
    }
}

pub fn validar_reverter_renovou(agenda: &Agenda) -> Result<(), AppError> {
    if !agenda.renovou {
        return Err(AppError::bad_request("Este item não foi marcado como renovado"));
    }
    Ok(())
}

pub fn validar_reverter_cancelou(agenda: &Agenda) -> Result<(), AppError> {
    if !agenda.cancelou {
        return Err(AppError::bad_request("Este item não foi marcado como cancelado"));
    }
    Ok(())
}

/// Observação padrão do pagamento gerado ao renovar um item.
pub fn observacao_renovacao(ciclo_atual: i32) -> String {
    format!("Renovação - Ciclo {}", ciclo_atual + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{agenda::StatusAgenda, pagamento::MetodoPagamento};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    fn d(y: i32, m: u32, dia: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, dia).unwrap()
    }

    fn usuario() -> Usuario {
        Usuario {
            id: Uuid::new_v4(),
            email_login: "a@b.com".into(),
            nome_completo: "Ana".into(),
            telefone: None,
            indicador: Some("Carlos".into()),
            obs: None,
            status_final: StatusFinal::Inativo,
            ciclo: 0,
            total_ciclos_usuario: 0,
            data_pagto: None,
            mes_pagto: None,
            mes_ref: None,
            data_venc: None,
            dias_para_vencer: None,
            vence_hoje: false,
            prox_7_dias: false,
            em_atraso: false,
            metodo: None,
            conta: None,
            regra_tipo: None,
            regra_valor: None,
            elegivel_comissao: false,
            comissao_valor: None,
            entrou: false,
            renovou: false,
            ativo_atual: false,
            churn: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn pagamento(usuario_id: Uuid, data: NaiveDate, regra: RegraTipo, conta: &str) -> Pagamento {
        Pagamento {
            id: Uuid::new_v4(),
            usuario_id,
            agenda_id: None,
            data_pagto: data,
            mes_pagto: mes_pagto(data),
            valor: Decimal::new(15000, 2),
            metodo: MetodoPagamento::Pix,
            conta: conta.into(),
            regra_tipo: regra,
            regra_valor: Some(Decimal::new(5000, 2)),
            elegivel_comissao: true,
            comissao_valor: Some(Decimal::new(5000, 2)),
            observacao: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn agenda(renovou: bool, cancelou: bool) -> Agenda {
        Agenda {
            id: Uuid::new_v4(),
            usuario_id: Uuid::new_v4(),
            data_venc: d(2024, 2, 14),
            dias_para_vencer: 0,
            status: StatusAgenda::Ativo,
            ciclo: 1,
            renovou,
            cancelou,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn primeiro_pagamento_ativa_usuario() {
        let hoje = d(2024, 1, 15);
        let mut u = usuario();
        let p = pagamento(u.id, hoje, RegraTipo::Primeiro, "Nubank");

        aplicar_pagamento(&mut u, &p, hoje);

        assert_eq!(u.status_final, StatusFinal::Ativo);
        assert!(u.entrou && u.ativo_atual && !u.renovou);
        assert_eq!((u.ciclo, u.total_ciclos_usuario), (1, 1));
        assert_eq!(u.mes_pagto.as_deref(), Some("01/2024"));
        assert_eq!(u.mes_ref.as_deref(), Some("01/2024"));
        assert_eq!(u.data_venc, Some(d(2024, 2, 14)));
        assert_eq!(u.dias_para_vencer, Some(30));
        assert!(!u.em_atraso);
        assert_eq!(u.comissao_valor, Some(Decimal::new(5000, 2)));
    }

    #[test]
    fn pagamento_retroativo_nao_marca_atraso() {
        let hoje = d(2024, 6, 1);
        let mut u = usuario();
        let p = pagamento(u.id, d(2024, 1, 1), RegraTipo::Primeiro, "Nubank");
        aplicar_pagamento(&mut u, &p, hoje);
        assert!(u.dias_para_vencer.unwrap() < 0);
        assert!(!u.em_atraso);
    }

    #[test]
    fn renovacao_incrementa_ciclo() {
        let mut u = usuario();
        let p1 = pagamento(u.id, d(2024, 1, 15), RegraTipo::Primeiro, "A");
        aplicar_pagamento(&mut u, &p1, d(2024, 1, 15));
        let p2 = pagamento(u.id, d(2024, 2, 14), RegraTipo::Recorrente, "B");
        aplicar_pagamento(&mut u, &p2, d(2024, 2, 14));

        assert!(u.renovou);
        assert_eq!((u.ciclo, u.total_ciclos_usuario), (2, 2));
        assert_eq!(u.data_venc, Some(d(2024, 3, 15)));
        assert_eq!(u.conta.as_deref(), Some("B"));
        // mes_ref é definido apenas na adesão
        assert_eq!(u.mes_ref.as_deref(), Some("01/2024"));
    }

    #[test]
    fn remover_primeiro_pagamento_reseta_usuario() {
        let hoje = d(2024, 1, 15);
        let mut u = usuario();
        let p = pagamento(u.id, hoje, RegraTipo::Primeiro, "A");
        aplicar_pagamento(&mut u, &p, hoje);

        reverter_pagamento(&mut u, &p, None, hoje);

        assert_eq!(u.status_final, StatusFinal::Inativo);
        assert!(!u.entrou && !u.ativo_atual && !u.renovou);
        assert_eq!((u.ciclo, u.total_ciclos_usuario), (0, 0));
        assert!(u.data_venc.is_none() && u.metodo.is_none() && u.comissao_valor.is_none());
    }

    #[test]
    fn remover_renovacao_restaura_pagamento_anterior() {
        let mut u = usuario();
        let p1 = pagamento(u.id, d(2024, 1, 15), RegraTipo::Primeiro, "A");
        let p2 = pagamento(u.id, d(2024, 2, 14), RegraTipo::Recorrente, "B");
        aplicar_pagamento(&mut u, &p1, d(2024, 1, 15));
        aplicar_pagamento(&mut u, &p2, d(2024, 2, 14));

        let hoje = d(2024, 2, 10);
        reverter_pagamento(&mut u, &p2, Some(&p1), hoje);

        assert_eq!(u.data_pagto, Some(d(2024, 1, 15)));
        assert_eq!(u.data_venc, Some(d(2024, 2, 14)));
        assert_eq!(u.conta.as_deref(), Some("A"));
        assert_eq!((u.ciclo, u.total_ciclos_usuario), (1, 1));
        assert!(!u.renovou);
        assert_eq!(u.status_final, StatusFinal::Ativo);
    }

    #[test]
    fn remover_renovacao_com_anterior_vencido_fica_em_atraso() {
        let mut u = usuario();
        let p1 = pagamento(u.id, d(2024, 1, 15), RegraTipo::Primeiro, "A");
        let p2 = pagamento(u.id, d(2024, 2, 14), RegraTipo::Recorrente, "B");
        aplicar_pagamento(&mut u, &p1, d(2024, 1, 15));
        aplicar_pagamento(&mut u, &p2, d(2024, 2, 14));

        reverter_pagamento(&mut u, &p2, Some(&p1), d(2024, 2, 14));
        assert_eq!(u.status_final, StatusFinal::EmAtraso);

        let mut u2 = u.clone();
        reverter_pagamento(&mut u2, &p2, Some(&p1), d(2024, 3, 1));
        assert_eq!(u2.status_final, StatusFinal::EmAtraso);
        assert!(u2.em_atraso);
    }

    #[test]
    fn remover_renovacao_sem_anterior_reseta() {
        let mut u = usuario();
        let p2 = pagamento(u.id, d(2024, 2, 14), RegraTipo::Recorrente, "B");
        aplicar_pagamento(&mut u, &p2, d(2024, 2, 14));
        reverter_pagamento(&mut u, &p2, None, d(2024, 2, 14));
        assert_eq!(u.status_final, StatusFinal::Inativo);
        assert_eq!(u.ciclo, 0);
    }

    #[test]
    fn ciclo_nunca_fica_negativo() {
        let mut u = usuario();
        let p1 = pagamento(u.id, d(2024, 1, 1), RegraTipo::Primeiro, "A");
        let p2 = pagamento(u.id, d(2024, 2, 1), RegraTipo::Recorrente, "A");
        reverter_pagamento(&mut u, &p2, Some(&p1), d(2024, 1, 2));
        assert_eq!((u.ciclo, u.total_ciclos_usuario), (0, 0));
    }

    #[test]
    fn atualizar_flags_cenarios() {
        let hoje = d(2024, 6, 10);

        // Vencido ontem: ATIVO -> EM_ATRASO
        let mut u = usuario();
        u.status_final = StatusFinal::Ativo;
        u.data_venc = Some(d(2024, 6, 9));
        assert!(atualizar_flags(&mut u, hoje));
        assert_eq!(u.status_final, StatusFinal::EmAtraso);
        assert!(u.em_atraso);

        // Idempotente
        assert!(!atualizar_flags(&mut u, hoje));

        // Vence hoje: mantém EM_ATRASO
        let mut u = usuario();
        u.status_final = StatusFinal::EmAtraso;
        u.data_venc = Some(hoje);
        atualizar_flags(&mut u, hoje);
        assert_eq!(u.status_final, StatusFinal::EmAtraso);
        assert!(u.vence_hoje);

        // Vence em 5 dias: EM_ATRASO -> ATIVO
        let mut u = usuario();
        u.status_final = StatusFinal::EmAtraso;
        u.data_venc = Some(d(2024, 6, 15));
        atualizar_flags(&mut u, hoje);
        assert_eq!(u.status_final, StatusFinal::Ativo);
        assert!(u.prox_7_dias);

        // INATIVO não muda de status
        let mut u = usuario();
        u.data_venc = Some(d(2024, 6, 1));
        atualizar_flags(&mut u, hoje);
        assert_eq!(u.status_final, StatusFinal::Inativo);
        assert!(u.em_atraso);

        // Sem vencimento: nada a fazer
        let mut u = usuario();
        assert!(!atualizar_flags(&mut u, hoje));
    }

    #[test]
    fn reverter_churn_depende_do_vencimento() {
        let hoje = d(2024, 6, 10);

        let mut u = usuario();
        u.churn = true;
        u.data_venc = Some(d(2024, 6, 20));
        assert!(reativar_apos_churn(&mut u, hoje));
        assert_eq!(u.status_final, StatusFinal::Ativo);
        assert!(u.ativo_atual && !u.churn);

        let mut u = usuario();
        u.churn = true;
        u.data_venc = Some(hoje);
        assert!(!reativar_apos_churn(&mut u, hoje));
        assert_eq!(u.status_final, StatusFinal::Inativo);
        assert!(!u.ativo_atual && !u.churn);

        let mut u = usuario();
        u.churn = true;
        assert!(!reativar_apos_churn(&mut u, hoje));
    }

    #[test]
    fn cancelamento_inativa_usuario() {
        let mut u = usuario();
        u.status_final = StatusFinal::Ativo;
        u.ativo_atual = true;
        cancelar_por_agenda(&mut u);
        assert!(u.churn && !u.ativo_atual);
        assert_eq!(u.status_final, StatusFinal::Inativo);
    }

    #[test]
    fn transicoes_da_agenda() {
        assert!(validar_renovacao(&agenda(false, false)).is_ok());
        assert!(validar_renovacao(&agenda(true, false)).is_err());
        let err = validar_renovacao(&agenda(false, true)).unwrap_err();
        assert_eq!(err.to_string(), "Este item está cancelado. Reverta o cancelamento primeiro.");

        assert_eq!(validar_cancelamento(&agenda(false, false)).unwrap(), false);
        assert_eq!(validar_cancelamento(&agenda(true, false)).unwrap(), true);
        assert!(validar_cancelamento(&agenda(false, true)).is_err());

        assert!(validar_reverter_renovou(&agenda(false, false)).is_err());
        assert!(validar_reverter_renovou(&agenda(true, false)).is_ok());
        assert!(validar_reverter_cancelou(&agenda(false, false)).is_err());
        assert!(validar_reverter_cancelou(&agenda(false, true)).is_ok());
    }

    #[test]
    fn observacao_padrao_da_renovacao() {
        assert_eq!(observacao_renovacao(1), "Renovação - Ciclo 2");
    }
}
