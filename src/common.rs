pub mod comissao;
pub mod date_utils;
pub(crate) mod db_utils;
pub mod error;
pub mod response;
