// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::formatting::FormatError;
use crate::middleware::i18n::{Lang, Locale};
use crate::models::organization::MemberRole;

// Erros de domínio. Cada variante sabe o seu status HTTP e a sua mensagem traduzida.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Formato inválido: {0}")]
    InvalidFormat(#[from] FormatError),

    #[error("Campo obrigatório ausente: {0}")]
    MissingField(&'static str),

    // Corpo JSON ou query string que nem chega a desserializar
    #[error("Requisição malformada: {0}")]
    MalformedRequest(String),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // --- Organização / membros / convites ---
    #[error("O nome da organização é obrigatório")]
    OrganizationNameRequired,

    #[error("Usuário não pertence a nenhuma organização")]
    NoOrganization,

    #[error("Usuário já pertence à organização {0:?}")]
    AlreadyInOrganization(Option<String>),

    #[error("Permissão insuficiente")]
    InsufficientRole,

    #[error("O dono da organização não pode ser alterado")]
    OwnerIsImmutable,

    #[error("Cargo não atribuível: {0}")]
    RoleNotAssignable(MemberRole),

    #[error("Membro não encontrado")]
    MemberNotFound,

    #[error("Convite não encontrado")]
    InvitationNotFound,

    #[error("Convite inválido ou expirado")]
    InvitationInvalid,

    #[error("O convite pertence a outro e-mail")]
    InvitationEmailMismatch,

    #[error("Já existe um convite pendente para {0}")]
    InvitationAlreadyPending(String),

    #[error("{0} já é membro da organização")]
    UserAlreadyMember(String),

    #[error("Limite de {0} membros atingido")]
    MemberLimitReached(i32),

    #[error("Slug de organização já existe")]
    SlugAlreadyExists,

    // --- Cadastros (veículos, leads, vendas) ---
    #[error("{0} não encontrado")]
    RecordNotFound(&'static str),

    #[error("Referência inválida: {0}")]
    InvalidReference(&'static str),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// O erro que efetivamente sai pela API: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidFormat(_)
            | AppError::MissingField(_)
            | AppError::MalformedRequest(_)
            | AppError::OrganizationNameRequired
            | AppError::AlreadyInOrganization(_)
            | AppError::RoleNotAssignable(_)
            | AppError::InvitationInvalid
            | AppError::InvitationAlreadyPending(_)
            | AppError::UserAlreadyMember(_)
            | AppError::MemberLimitReached(_)
            | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,

            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::InsufficientRole
            | AppError::OwnerIsImmutable
            | AppError::InvitationEmailMismatch => StatusCode::FORBIDDEN,

            AppError::NoOrganization
            | AppError::MemberNotFound
            | AppError::InvitationNotFound
            | AppError::RecordNotFound(_) => StatusCode::NOT_FOUND,

            AppError::EmailAlreadyExists => StatusCode::CONFLICT,

            AppError::SlugAlreadyExists
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self, lang: Lang) -> String {
        match self {
            AppError::ValidationError(_) => lang.pick(
                "Um ou mais campos são inválidos.",
                "One or more fields are invalid.",
            ),
            AppError::InvalidFormat(kind) => match kind {
                FormatError::Phone => lang.pick(
                    "Telefone inválido. Informe DDD + número.",
                    "Invalid phone number. Include the area code.",
                ),
                FormatError::Cpf => lang.pick("CPF inválido.", "Invalid CPF."),
                FormatError::Cep => lang.pick("CEP inválido.", "Invalid postal code (CEP)."),
                FormatError::Currency => lang.pick("Valor monetário inválido.", "Invalid amount."),
                FormatError::Plate => lang.pick("Placa inválida.", "Invalid license plate."),
            },
            AppError::MissingField(field) => match lang {
                Lang::Pt => format!("O campo '{}' é obrigatório.", field),
                Lang::En => format!("The field '{}' is required.", field),
            },
            AppError::MalformedRequest(_) => lang.pick(
                "Requisição malformada. Confira os campos e os valores enviados.",
                "Malformed request. Check the submitted fields and values.",
            ),
            AppError::EmailAlreadyExists => {
                lang.pick("Este e-mail já está em uso.", "This e-mail is already in use.")
            }
            AppError::InvalidCredentials => {
                lang.pick("E-mail ou senha inválidos.", "Invalid e-mail or password.")
            }
            AppError::InvalidToken => lang.pick(
                "Token de autenticação inválido ou ausente.",
                "Missing or invalid authentication token.",
            ),
            AppError::OrganizationNameRequired => lang.pick(
                "O nome da organização é obrigatório.",
                "Organization name is required.",
            ),
            AppError::NoOrganization => lang.pick(
                "Você não pertence a nenhuma organização.",
                "You do not belong to any organization.",
            ),
            AppError::AlreadyInOrganization(Some(name)) => match lang {
                Lang::Pt => format!("Você já é membro da organização \"{}\".", name),
                Lang::En => format!("You are already a member of \"{}\".", name),
            },
            AppError::AlreadyInOrganization(None) => lang.pick(
                "Você já é membro de uma organização.",
                "You are already a member of an organization.",
            ),
            AppError::InsufficientRole => lang.pick(
                "Você não tem permissão para realizar esta ação.",
                "You are not allowed to perform this action.",
            ),
            AppError::OwnerIsImmutable => lang.pick(
                "O dono da organização não pode ser removido nem ter o cargo alterado.",
                "The organization owner cannot be removed or have their role changed.",
            ),
            AppError::RoleNotAssignable(role) => match lang {
                Lang::Pt => format!("O cargo '{}' não pode ser atribuído por aqui. Use 'admin' ou 'member'.", role),
                Lang::En => format!("Role '{}' cannot be assigned here. Use 'admin' or 'member'.", role),
            },
            AppError::MemberNotFound => lang.pick("Membro não encontrado.", "Member not found."),
            AppError::InvitationNotFound => {
                lang.pick("Convite não encontrado.", "Invitation not found.")
            }
            AppError::InvitationInvalid => lang.pick(
                "Convite inválido ou expirado.",
                "Invalid or expired invitation.",
            ),
            AppError::InvitationEmailMismatch => lang.pick(
                "Este convite foi enviado para outro e-mail.",
                "This invitation was sent to a different e-mail.",
            ),
            AppError::InvitationAlreadyPending(email) => match lang {
                Lang::Pt => format!("Já existe um convite pendente para {}.", email),
                Lang::En => format!("There is already a pending invitation for {}.", email),
            },
            AppError::UserAlreadyMember(email) => match lang {
                Lang::Pt => format!("{} já é membro desta organização.", email),
                Lang::En => format!("{} is already a member of this organization.", email),
            },
            AppError::MemberLimitReached(max) => match lang {
                Lang::Pt => format!("Limite de {} membros atingido (incluindo convites pendentes).", max),
                Lang::En => format!("Member limit of {} reached (pending invitations included).", max),
            },
            AppError::RecordNotFound(entity) => match lang {
                Lang::Pt => format!("{} não encontrado.", entity),
                Lang::En => format!("{} not found.", entity),
            },
            AppError::InvalidReference(entity) => match lang {
                Lang::Pt => format!("{} informado não existe ou não pertence a você.", entity),
                Lang::En => format!("The referenced {} does not exist or is not yours.", entity),
            },
            AppError::SlugAlreadyExists
            | AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => {
                lang.pick("Ocorreu um erro inesperado.", "An unexpected error occurred.")
            }
        }
    }

    pub fn to_api_error(self, locale: &Locale) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica só no log, nunca na resposta
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match &self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::MalformedRequest(reason) => Some(json!({ "reason": reason })),
            _ => None,
        };

        ApiError {
            status,
            error: self.message(locale.lang()),
            details,
        }
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error(&Locale::default())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "obrigatório"))]
        name: String,
    }

    #[test]
    fn workflow_conflicts_map_to_bad_request() {
        assert_eq!(AppError::MemberLimitReached(3).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InvitationAlreadyPending("a@b.com".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AlreadyInOrganization(Some("Org1".into())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::InvitationInvalid.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn permission_errors_map_to_forbidden() {
        assert_eq!(AppError::InsufficientRole.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::OwnerIsImmutable.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvitationEmailMismatch.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn messages_follow_locale() {
        let err = AppError::AlreadyInOrganization(Some("Org1".into()));
        assert!(err.message(Lang::Pt).contains("Org1"));
        assert_eq!(err.message(Lang::En), "You are already a member of \"Org1\".");
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("senha do banco: 123"))
            .to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
    }

    #[test]
    fn malformed_request_is_bad_request_with_reason() {
        let api = AppError::MalformedRequest("missing field `token`".into())
            .to_api_error(&Locale::from_header(Some("en")));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.starts_with("Malformed request"));
        assert_eq!(api.details.unwrap()["reason"], "missing field `token`");
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Payload { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&Locale::default());
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.details.unwrap()["name"][0], "obrigatório");
    }
}
