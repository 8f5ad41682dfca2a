pub mod atualizar_flags;

pub use atualizar_flags::{AtualizarFlagsJob, JobConfig};
