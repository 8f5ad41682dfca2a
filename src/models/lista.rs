// src/models/lista.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "tipo_lista", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TipoLista {
    Conta,
    Metodo,
    Categoria,
    Indicador,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListaAuxiliar {
    pub id: Uuid,
    pub tipo: TipoLista,
    #[schema(example = "Nubank")]
    pub valor: String,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateListaPayload {
    pub tipo: TipoLista,
    #[validate(length(min = 1, max = 100, message = "O valor deve ter entre 1 e 100 caracteres"))]
    pub valor: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateListaPayload {
    #[validate(length(min = 1, max = 100, message = "O valor deve ter entre 1 e 100 caracteres"))]
    pub valor: Option<String>,
    pub ativo: Option<bool>,
}

/// Itens ativos agrupados por tipo.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListasAgrupadas {
    pub contas: Vec<ListaAuxiliar>,
    pub metodos: Vec<ListaAuxiliar>,
    pub categorias: Vec<ListaAuxiliar>,
    pub indicadores: Vec<ListaAuxiliar>,
}

impl ListasAgrupadas {
    pub fn agrupar(itens: Vec<ListaAuxiliar>) -> Self {
        let mut grupos = Self::default();
        for item in itens {
            match item.tipo {
                TipoLista::Conta => grupos.contas.push(item),
                TipoLista::Metodo => grupos.metodos.push(item),
                TipoLista::Categoria => grupos.categorias.push(item),
                TipoLista::Indicador => grupos.indicadores.push(item),
            }
        }
        grupos
    }
}
