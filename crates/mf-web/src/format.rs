//! Formatting and Form Validation
//!
//! Pure helpers used by the widgets; no DOM access.

use mf_sync::{Client, CreateClientRequest};

/// Brazilian real, e.g. `R$ 1.234,56`
pub fn format_brl(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, frac)
}

/// "1 selecionado" / "3 selecionados"
pub fn selected_label(count: usize) -> String {
    if count == 1 {
        "1 selecionado".to_string()
    } else {
        format!("{} selecionados", count)
    }
}

/// Lenient amount parsing for form inputs: surrounding blanks are ignored
/// and a decimal comma is accepted. Unparsable input reads as zero.
pub fn parse_amount(input: &str) -> f64 {
    input.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0)
}

/// Raw text of the create/edit form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientDraft {
    pub name: String,
    pub salary: String,
    pub company_valuation: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftErrors {
    pub name: Option<&'static str>,
    pub salary: Option<&'static str>,
    pub company_valuation: Option<&'static str>,
}

impl DraftErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.salary.is_none() && self.company_valuation.is_none()
    }
}

impl ClientDraft {
    pub fn from_client(client: &Client) -> Self {
        Self {
            name: client.name.clone(),
            salary: client.salary.to_string(),
            company_valuation: client.company_valuation.to_string(),
        }
    }

    /// Non-empty name and positive amounts
    pub fn validate(&self) -> Result<CreateClientRequest, DraftErrors> {
        let salary = parse_amount(&self.salary);
        let company_valuation = parse_amount(&self.company_valuation);
        let errors = DraftErrors {
            name: self.name.trim().is_empty().then_some("Nome é obrigatório"),
            salary: (salary <= 0.0).then_some("Salário deve ser maior que zero"),
            company_valuation: (company_valuation <= 0.0).then_some("Valor da empresa deve ser maior que zero"),
        };
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(CreateClientRequest {
            name: self.name.trim().to_string(),
            salary,
            company_valuation,
        })
    }
}
