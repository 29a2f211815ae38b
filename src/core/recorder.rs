//! Shared-split arithmetic for the transaction recorder: participant list
//! normalization, the owner-share computation, and the balance delta policy.

use crate::core::errors::LedgerError;
use crate::core::models::transaction::{SharedWith, TransactionKind};

/// Normalize the wire participant list (structured ids or a comma-delimited
/// string) to a deduplicated sequence, preserving first-seen order.
pub fn normalize_participants(shared_with: &SharedWith) -> Vec<String> {
    let raw: Vec<String> = match shared_with {
        SharedWith::Ids(ids) => ids.clone(),
        SharedWith::Csv(csv) => csv.split(',').map(String::from).collect(),
    };

    let mut seen = std::collections::HashSet::new();
    raw.into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Owner's retained share of a shared transaction. The sum of all
/// participant shares may never exceed the total paid.
pub fn owner_share(total_amount: f64, shared_amount: f64, participants: usize) -> Result<f64, LedgerError> {
    let total_shared = shared_amount * participants as f64;
    if total_shared > total_amount {
        return Err(LedgerError::OverSplit);
    }
    Ok(total_amount - total_shared)
}

/// Signed balance adjustment for the payer: credits add, debits and shared
/// expenses subtract, informational and scholarship entries leave the
/// balance untouched.
pub fn balance_delta(kind: TransactionKind, share: f64) -> f64 {
    match kind {
        TransactionKind::Credit => share,
        TransactionKind::Debit | TransactionKind::Shared => -share,
        TransactionKind::Info | TransactionKind::Scholarship => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_structured_lists() {
        let ids = SharedWith::Ids(vec![
            " u2 ".to_string(),
            "u3".to_string(),
            "u2".to_string(),
            "".to_string(),
        ]);
        assert_eq!(normalize_participants(&ids), vec!["u2", "u3"]);
    }

    #[test]
    fn normalizes_delimited_strings() {
        let csv = SharedWith::Csv("u2, u3,,u4 ,u3".to_string());
        assert_eq!(normalize_participants(&csv), vec!["u2", "u3", "u4"]);
    }

    #[test]
    fn owner_share_is_net_of_participant_shares() {
        assert_eq!(owner_share(100.0, 20.0, 2).unwrap(), 60.0);
        assert_eq!(owner_share(100.0, 50.0, 2).unwrap(), 0.0);
    }

    #[test]
    fn over_split_is_rejected() {
        assert!(matches!(owner_share(100.0, 40.0, 3), Err(LedgerError::OverSplit)));
    }

    #[test]
    fn balance_delta_follows_kind() {
        assert_eq!(balance_delta(TransactionKind::Credit, 60.0), 60.0);
        assert_eq!(balance_delta(TransactionKind::Debit, 60.0), -60.0);
        assert_eq!(balance_delta(TransactionKind::Shared, 60.0), -60.0);
        assert_eq!(balance_delta(TransactionKind::Info, 60.0), 0.0);
        assert_eq!(balance_delta(TransactionKind::Scholarship, 60.0), 0.0);
    }
}
