// src/services/lista_service.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ListaRepository,
    models::lista::{CreateListaPayload, ListaAuxiliar, ListasAgrupadas, TipoLista, UpdateListaPayload},
};

#[derive(Clone)]
pub struct ListaService {
    pool: PgPool,
    lista_repo: ListaRepository,
}

impl ListaService {
    pub fn new(pool: PgPool, lista_repo: ListaRepository) -> Self {
        Self { pool, lista_repo }
    }

    /// Valores ativos, agrupados por tipo (formato usado pelos selects do front).
    pub async fn find_agrupadas(&self) -> Result<ListasAgrupadas, AppError> {
        let itens = self.lista_repo.find_ativos().await?;
        Ok(ListasAgrupadas::agrupar(itens))
    }

    pub async fn find_by_tipo(&self, tipo: TipoLista, incluir_inativos: bool) -> Result<Vec<ListaAuxiliar>, AppError> {
        self.lista_repo.find_by_tipo(tipo, incluir_inativos).await
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<ListaAuxiliar, AppError> {
        self.lista_repo
            .find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::not_found("Item da lista não encontrado"))
    }

    pub async fn create<'e, E>(&self, executor: E, payload: &CreateListaPayload) -> Result<ListaAuxiliar, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.lista_repo.create(executor, payload.tipo, payload.valor.trim()).await
    }

    pub async fn update<'e, E>(&self, executor: E, id: Uuid, payload: &UpdateListaPayload) -> Result<ListaAuxiliar, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.lista_repo
            .update(executor, id, payload.valor.as_deref().map(str::trim), payload.ativo)
            .await?
            .ok_or_else(|| AppError::not_found("Item da lista não encontrado"))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.lista_repo.delete(executor, id).await? {
            return Err(AppError::not_found("Item da lista não encontrado"));
        }
        Ok(())
    }
}
