use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{RecordId, ResourceKind};

/// degraded outcomes recorded during a reconciliation pass; none of these
/// abort the pass, but callers can surface them ("some data could not be
/// loaded") instead of silently showing less
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Diagnostic {
    /// a fetch failed or timed out and the resource was degraded to empty
    TransportDegraded {
        resource: ResourceKind,
        message: String,
    },
    /// a response matched no known envelope shape
    ShapeFailure { resource: ResourceKind },
    /// a record was dropped because required fields were missing
    RecordSkipped {
        resource: ResourceKind,
        message: String,
    },
    /// a repayment could not be matched to any loan application
    ReferenceFailure { repayment_id: RecordId },
    /// amount_paid exceeded amount and the remainder was clamped to zero
    PaymentClamped {
        repayment_id: RecordId,
        amount: Money,
        amount_paid: Money,
    },
}

/// diagnostic collector threaded through normalization and reconciliation
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn take_entries(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_and_drains() {
        let mut log = DiagnosticLog::new();
        assert!(log.is_empty());

        log.emit(Diagnostic::ShapeFailure {
            resource: ResourceKind::Deposits,
        });
        log.emit(Diagnostic::ReferenceFailure {
            repayment_id: RecordId::Num(7),
        });

        assert_eq!(log.entries().len(), 2);

        let drained = log.take_entries();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }
}
