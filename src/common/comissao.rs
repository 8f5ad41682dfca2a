// src/common/comissao.rs

use rust_decimal::Decimal;

use crate::models::pagamento::RegraTipo;

// Indicadores que não geram comissão (venda direta)
const INDICADORES_SEM_COMISSAO: [&str; 2] = ["Direto", "Orgânico"];

pub fn is_elegivel_comissao(indicador: Option<&str>) -> bool {
    match indicador.map(str::trim) {
        None | Some("") => false,
        Some(i) => !INDICADORES_SEM_COMISSAO.contains(&i),
    }
}

/// A comissão é o valor fixo da regra, sem cálculo percentual.
pub fn calcular_comissao(_valor: Decimal, _regra_tipo: RegraTipo, regra_valor: Option<Decimal>) -> Option<Decimal> {
    regra_valor
}

/// Valores sugeridos ao operador. Nunca aplicados automaticamente.
pub fn regra_comissao_padrao(regra_tipo: RegraTipo) -> Decimal {
    match regra_tipo {
        RegraTipo::Primeiro => Decimal::new(10000, 2),
        RegraTipo::Recorrente => Decimal::new(7000, 2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elegibilidade_por_indicador() {
        assert!(!is_elegivel_comissao(None));
        assert!(!is_elegivel_comissao(Some("")));
        assert!(!is_elegivel_comissao(Some("Direto")));
        assert!(!is_elegivel_comissao(Some("Orgânico")));
        assert!(is_elegivel_comissao(Some("Maria")));
    }

    #[test]
    fn comissao_e_o_valor_da_regra() {
        let v = Decimal::new(15000, 2);
        assert_eq!(calcular_comissao(v, RegraTipo::Primeiro, Some(Decimal::new(5000, 2))), Some(Decimal::new(5000, 2)));
        assert_eq!(calcular_comissao(v, RegraTipo::Recorrente, None), None);
        assert_eq!(regra_comissao_padrao(RegraTipo::Primeiro), Decimal::new(100, 0));
        assert_eq!(regra_comissao_padrao(RegraTipo::Recorrente), Decimal::new(70, 0));
    }
}
