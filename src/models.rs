//! Shell Models
//!
//! Pages the shell can show and the notices it raises.

use mf_sync::SyncEvent;

/// Top-level page. Everything but the welcome page needs a signed-in user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShellPage {
    #[default]
    Welcome,
    Clients,
    Selected,
}

impl ShellPage {
    pub fn requires_user(self) -> bool {
        self != ShellPage::Welcome
    }

    /// Where a request for this page lands given the sign-in state
    pub fn resolve(self, signed_in: bool) -> ShellPage {
        if self.requires_user() && !signed_in {
            ShellPage::Welcome
        } else {
            self
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ShellPage::Welcome => "Bem-vindo",
            ShellPage::Clients => "Clientes",
            ShellPage::Selected => "Clientes selecionados",
        }
    }
}

/// Success banner; `id` tells a newer notice from the one a timer is
/// about to dismiss
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub id: u64,
    pub message: &'static str,
}

pub const CREATED_NOTICE: &str = "Cliente criado com sucesso!";
pub const UPDATED_NOTICE: &str = "Cliente atualizado com sucesso!";
pub const DELETED_NOTICE: &str = "Cliente excluído com sucesso!";

/// Message to show for an event, if any
pub fn notice_for_event(event: &SyncEvent) -> Option<&'static str> {
    match event {
        SyncEvent::Created(_) => Some(CREATED_NOTICE),
        SyncEvent::Updated(_) => Some(UPDATED_NOTICE),
        SyncEvent::Deleted(_) => Some(DELETED_NOTICE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_sync::Client;

    #[test]
    fn test_notice_for_event() {
        let client = Client {
            id: 1,
            name: "Ana".to_string(),
            salary: 1.0,
            company_valuation: 1.0,
        };
        assert_eq!(notice_for_event(&SyncEvent::Created(client.clone())), Some(CREATED_NOTICE));
        assert_eq!(notice_for_event(&SyncEvent::Updated(client)), Some(UPDATED_NOTICE));
        assert_eq!(notice_for_event(&SyncEvent::Deleted(1)), Some(DELETED_NOTICE));
        assert_eq!(notice_for_event(&SyncEvent::Selected(1)), None);
        assert_eq!(notice_for_event(&SyncEvent::Cleared), None);
    }

    #[test]
    fn test_pages_behind_sign_in() {
        assert!(!ShellPage::Welcome.requires_user());
        assert!(ShellPage::Clients.requires_user());
        assert!(ShellPage::Selected.requires_user());
        assert_eq!(ShellPage::Selected.resolve(false), ShellPage::Welcome);
        assert_eq!(ShellPage::Selected.resolve(true), ShellPage::Selected);
        assert_eq!(ShellPage::Welcome.resolve(true), ShellPage::Welcome);
    }
}
