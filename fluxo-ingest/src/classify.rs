//! Income/expense resolution for statement rows.
//!
//! Priority: C/D marker > description keywords > a leading minus on the
//! value > the profile's ambiguous default.
//!
//! Resolution is pure. The grammar logs rows that fell through to the
//! default once, after a strategy has been chosen.

use fluxo_core::TransactionType;

use crate::profile::{StatementProfile, contains_any};

/// Where a row's type came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeSource {
    Marker,
    Keyword,
    Sign,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeResolution {
    pub kind: TransactionType,
    pub source: TypeSource,
}

/// Resolve a row's type. Expense keywords are checked before income keywords.
pub fn resolve_type(
    marker: Option<TransactionType>,
    negative: bool,
    description: &str,
    profile: &StatementProfile,
) -> TypeResolution {
    let resolved = |kind, source| TypeResolution { kind, source };

    if let Some(kind) = marker {
        return resolved(kind, TypeSource::Marker);
    }

    let desc = description.to_uppercase();
    if contains_any(&desc, &profile.expense_keywords) {
        return resolved(TransactionType::Expense, TypeSource::Keyword);
    }
    if contains_any(&desc, &profile.income_keywords) {
        return resolved(TransactionType::Income, TypeSource::Keyword);
    }
    if negative {
        return resolved(TransactionType::Expense, TypeSource::Sign);
    }

    resolved(profile.ambiguous_type, TypeSource::Default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_beats_keywords() {
        let p = StatementProfile::default();
        // "PAGAMENTO" is an expense keyword, but the C marker wins.
        let r = resolve_type(Some(TransactionType::Income), false, "PAGAMENTO RECEBIDO", &p);
        assert_eq!(r.kind, TransactionType::Income);
        assert_eq!(r.source, TypeSource::Marker);
    }

    #[test]
    fn test_keyword_sets() {
        let p = StatementProfile::default();
        let kind = |desc| resolve_type(None, false, desc, &p).kind;
        assert_eq!(kind("TARIFA PACOTE"), TransactionType::Expense);
        assert_eq!(kind("PIX ENV JOAO"), TransactionType::Expense);
        assert_eq!(kind("saque 24h"), TransactionType::Expense);
        assert_eq!(kind("DEPOSITO EM DINHEIRO"), TransactionType::Income);
        assert_eq!(kind("PIX REC.OUTRA IF"), TransactionType::Income);
        assert_eq!(resolve_type(None, false, "Credito salario", &p).source, TypeSource::Keyword);
    }

    #[test]
    fn test_keyword_beats_minus_sign() {
        let p = StatementProfile::default();
        let r = resolve_type(None, true, "ESTORNO PIX REC", &p);
        assert_eq!(r.kind, TransactionType::Income);
        assert_eq!(r.source, TypeSource::Keyword);
    }

    #[test]
    fn test_minus_sign_beats_default() {
        let p = StatementProfile::default().with_ambiguous_type(TransactionType::Income);
        let r = resolve_type(None, true, "MERCADO CENTRAL", &p);
        assert_eq!(r.kind, TransactionType::Expense);
        assert_eq!(r.source, TypeSource::Sign);
    }

    #[test]
    fn test_ambiguous_uses_profile_default() {
        let p = StatementProfile::default();
        let r = resolve_type(None, false, "MERCADO CENTRAL", &p);
        assert_eq!(r.kind, TransactionType::Expense);
        assert_eq!(r.source, TypeSource::Default);

        let p = p.with_ambiguous_type(TransactionType::Income);
        assert_eq!(resolve_type(None, false, "MERCADO CENTRAL", &p).kind, TransactionType::Income);
    }
}
