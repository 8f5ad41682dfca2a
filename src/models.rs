pub mod agenda;
pub mod auditoria;
pub mod auth;
pub mod churn;
pub mod comissao;
pub mod despesa;
pub mod job;
pub mod lista;
pub mod pagamento;
pub mod prospeccao;
pub mod relatorio;
pub mod usuario;

use rust_decimal::Decimal;
use validator::ValidationError;

use crate::common::date_utils::parse_mes_ano;

// Validadores compartilhados pelos payloads

pub(crate) fn validar_valor_positivo(valor: &Decimal) -> Result<(), ValidationError> {
    if *valor <= Decimal::ZERO {
        let mut err = ValidationError::new("valor_positivo");
        err.message = Some("O valor deve ser maior que zero".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validar_mes_ref(valor: &str) -> Result<(), ValidationError> {
    if parse_mes_ano(valor).is_none() {
        let mut err = ValidationError::new("mes_ref");
        err.message = Some("Use o formato MM/YYYY".into());
        return Err(err);
    }
    Ok(())
}
