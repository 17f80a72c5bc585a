// src/common/formatting.rs
//
// Máscaras brasileiras usadas pelos formulários (telefone, CPF, CEP, moeda, placa)
// e a geração de slugs de organização.

use std::str::FromStr;

use rand::Rng;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("telefone inválido")]
    Phone,
    #[error("CPF inválido")]
    Cpf,
    #[error("CEP inválido")]
    Cep,
    #[error("valor monetário inválido")]
    Currency,
    #[error("placa inválida")]
    Plate,
}

const SLUG_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SLUG_SUFFIX_LEN: usize = 5;

pub fn only_digits(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Campo opcional do formulário: aparado, e `None` quando vazio.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// ---
// Telefone
// ---

/// Aceita "(11) 98765-4321", "+55 11 98765-4321", "1134567890"...
/// Retorna apenas os dígitos (DDD + número).
pub fn normalize_phone(input: &str) -> Result<String, FormatError> {
    let mut digits = only_digits(input);

    if (digits.len() == 12 || digits.len() == 13) && digits.starts_with("55") {
        digits.drain(..2);
    }

    match digits.len() {
        10 | 11 if !digits.starts_with('0') => Ok(digits),
        _ => Err(FormatError::Phone),
    }
}

pub fn format_phone(digits: &str) -> String {
    match digits.len() {
        11 => format!("({}) {}-{}", &digits[..2], &digits[2..7], &digits[7..]),
        10 => format!("({}) {}-{}", &digits[..2], &digits[2..6], &digits[6..]),
        _ => digits.to_string(),
    }
}

// ---
// CPF
// ---

fn cpf_check_digit(digits: &[u32]) -> u32 {
    let weight_start = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();

    match (sum * 10) % 11 {
        10 => 0,
        r => r,
    }
}

pub fn normalize_cpf(input: &str) -> Result<String, FormatError> {
    let digits = only_digits(input);
    if digits.len() != 11 {
        return Err(FormatError::Cpf);
    }

    let numbers: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();

    // 000.000.000-00, 111.111.111-11... passam no dígito verificador mas não existem
    if numbers.iter().all(|d| *d == numbers[0]) {
        return Err(FormatError::Cpf);
    }

    if cpf_check_digit(&numbers[..9]) != numbers[9] || cpf_check_digit(&numbers[..10]) != numbers[10] {
        return Err(FormatError::Cpf);
    }

    Ok(digits)
}

pub fn format_cpf(digits: &str) -> String {
    if digits.len() != 11 {
        return digits.to_string();
    }
    format!("{}.{}.{}-{}", &digits[..3], &digits[3..6], &digits[6..9], &digits[9..])
}

// ---
// CEP
// ---

pub fn normalize_cep(input: &str) -> Result<String, FormatError> {
    let digits = only_digits(input);
    if digits.len() != 8 {
        return Err(FormatError::Cep);
    }
    Ok(digits)
}

pub fn format_cep(digits: &str) -> String {
    if digits.len() != 8 {
        return digits.to_string();
    }
    format!("{}-{}", &digits[..5], &digits[5..])
}

// ---
// Moeda (BRL)
// ---

/// Converte o texto da máscara de moeda em `Decimal` com 2 casas.
/// "R$ 1.234,56" -> 1234.56, "1234,5" -> 1234.50, "12.500" -> 12500.00
///
/// Vírgula é sempre o separador decimal; pontos só valem como milhar
/// (grupos de 3 dígitos) ou, sozinhos, como decimal ("45900.90").
pub fn parse_currency(input: &str) -> Result<Decimal, FormatError> {
    let cleaned: String = input
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let canonical = match cleaned.split_once(',') {
        Some((int_part, frac_part)) => {
            if frac_part.is_empty() || !frac_part.chars().all(|c| c.is_ascii_digit()) {
                return Err(FormatError::Currency);
            }
            format!("{}.{}", ungroup_thousands(int_part)?, frac_part)
        }
        None => {
            let dots = cleaned.matches('.').count();
            let decimal_point = dots == 1
                && cleaned
                    .rsplit('.')
                    .next()
                    .is_some_and(|tail| tail.len() != 3);

            if decimal_point {
                cleaned
            } else {
                ungroup_thousands(&cleaned)?
            }
        }
    };

    let value = Decimal::from_str(&canonical).map_err(|_| FormatError::Currency)?;
    if value.is_sign_negative() {
        return Err(FormatError::Currency);
    }

    Ok(value.round_dp(2))
}

// "1.250.000" -> "1250000"; o primeiro grupo tem 1 a 3 dígitos, os demais exatamente 3
fn ungroup_thousands(int_part: &str) -> Result<String, FormatError> {
    let all_digits = |group: &str| !group.is_empty() && group.chars().all(|c| c.is_ascii_digit());

    let mut groups = int_part.split('.');
    let first = groups.next().unwrap_or_default();
    if !all_digits(first) {
        return Err(FormatError::Currency);
    }

    let mut digits = first.to_string();
    let mut grouped = false;
    for group in groups {
        if group.len() != 3 || !all_digits(group) {
            return Err(FormatError::Currency);
        }
        grouped = true;
        digits.push_str(group);
    }

    if grouped && first.len() > 3 {
        return Err(FormatError::Currency);
    }

    Ok(digits)
}

pub fn format_currency(value: Decimal) -> String {
    let rounded = value.round_dp(2).abs();
    let text = format!("{:.2}", rounded);
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if value.is_sign_negative() && !value.is_zero() { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac_part}")
}

// ---
// Placa (padrão antigo ABC1234 ou Mercosul ABC1D23)
// ---

pub fn normalize_plate(input: &str) -> Result<String, FormatError> {
    let plate: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_uppercase();

    let chars: Vec<char> = plate.chars().collect();
    if chars.len() != 7 {
        return Err(FormatError::Plate);
    }

    let valid = chars[..3].iter().all(|c| c.is_ascii_uppercase())
        && chars[3].is_ascii_digit()
        && (chars[4].is_ascii_digit() || chars[4].is_ascii_uppercase())
        && chars[5..].iter().all(|c| c.is_ascii_digit());

    if valid { Ok(plate) } else { Err(FormatError::Plate) }
}

// ---
// Slug de organização
// ---

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// "Auto Peças São João!" -> "auto-pecas-sao-joao"
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(fold_accent)
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                '\0'
            }
        })
        .filter(|c| *c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn random_slug_suffix() -> String {
    let mut rng = rand::rng();
    (0..SLUG_SUFFIX_LEN)
        .map(|_| SLUG_ALPHABET[rng.random_range(0..SLUG_ALPHABET.len())] as char)
        .collect()
}

pub fn organization_slug(name: &str) -> String {
    let base = slugify(name);
    let base = if base.is_empty() { "org".to_string() } else { base };
    format!("{}-{}", base, random_slug_suffix())
}
