// src/common/db_utils.rs

/// Verdadeiro quando o erro do Postgres é uma violação de UNIQUE.
/// Opcionalmente restringe ao nome da constraint/índice.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: Option<&str>) -> bool {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => match constraint {
            Some(name) => db_err.constraint() == Some(name),
            None => true,
        },
        _ => false,
    }
}
