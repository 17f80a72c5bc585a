// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

/// Idiomas para os quais temos mensagens traduzidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    Pt,
    En,
}

impl Lang {
    /// Escolhe a variante da mensagem no idioma atual.
    pub fn pick(self, pt: &str, en: &str) -> String {
        match self {
            Lang::Pt => pt.to_string(),
            Lang::En => en.to_string(),
        }
    }
}

// Extrator de idioma (Accept-Language). O padrão da casa é português.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("pt".to_string())
    }
}

impl Locale {
    pub fn from_header(header_str: Option<&str>) -> Self {
        header_str
            .and_then(|header_str| {
                accept_language::parse(header_str)
                    .first()
                    // "pt-BR" -> "pt", "en" -> "en"
                    .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            })
            .map(Locale)
            .unwrap_or_default()
    }

    // Usado pelos outros extratores, que precisam responder no idioma certo
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header_str = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Locale::from_header(header_str)
    }

    pub fn from_parts(parts: &Parts) -> Self {
        Locale::from_headers(&parts.headers)
    }

    pub fn lang(&self) -> Lang {
        match self.0.as_str() {
            "en" => Lang::En,
            _ => Lang::Pt,
        }
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_parts(parts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_language_tag() {
        let locale = Locale::from_header(Some("en-US,en;q=0.9,pt-BR;q=0.8"));
        assert_eq!(locale.0, "en");
        assert_eq!(locale.lang(), Lang::En);
    }

    #[test]
    fn falls_back_to_portuguese() {
        assert_eq!(Locale::from_header(None).lang(), Lang::Pt);
        assert_eq!(Locale::from_header(Some("de-DE")).lang(), Lang::Pt);
        assert_eq!(Locale::from_header(Some("pt-BR")).0, "pt");
    }
}
