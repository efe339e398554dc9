use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors arising from constructing an action.
#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    #[error("{kind:?} action at month {start_month} must last at least one month")]
    ZeroLength { kind: ActionKind, start_month: usize },
}

/// Whether an action purchases a bond or leaves the principal idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Buy,
    Wait,
}

/// A single step of an investment strategy.
///
/// A `Buy` locks the principal into a bond of `length` months starting at
/// `start_month`. A `Wait` leaves it uninvested for `length` consecutive
/// months. A full strategy is a chronological sequence of actions whose
/// lengths sum to the horizon.
///
/// `Display` renders the compact token (`b3`, `w2`); the alternate form
/// (`{:#}`) renders a sentence.
///
/// # Examples
///
/// ```
/// use bond_optimiser::core::action::InvestmentAction;
///
/// let buy = InvestmentAction::buy(0, 6);
/// assert_eq!(buy.to_string(), "b6");
/// assert_eq!(format!("{:#}", buy), "Month 0: buy 6-month bond");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UncheckedAction")]
pub struct InvestmentAction {
    kind: ActionKind,
    start_month: usize,
    length: usize,
}

#[derive(Deserialize)]
struct UncheckedAction {
    kind: ActionKind,
    start_month: usize,
    length: usize,
}

impl TryFrom<UncheckedAction> for InvestmentAction {
    type Error = ActionError;

    fn try_from(raw: UncheckedAction) -> Result<Self, Self::Error> {
        InvestmentAction::try_new(raw.kind, raw.start_month, raw.length)
    }
}

impl InvestmentAction {
    pub fn try_new(kind: ActionKind, start_month: usize, length: usize) -> Result<Self, ActionError> {
        if length == 0 {
            return Err(ActionError::ZeroLength { kind, start_month });
        }
        Ok(Self {
            kind,
            start_month,
            length,
        })
    }

    /// # Panics
    ///
    /// Panics if `length` is zero.
    pub fn new(kind: ActionKind, start_month: usize, length: usize) -> Self {
        assert!(length > 0, "action length must be positive, got {}", length);
        Self {
            kind,
            start_month,
            length,
        }
    }

    pub fn buy(start_month: usize, tenor: usize) -> Self {
        Self::new(ActionKind::Buy, start_month, tenor)
    }

    pub fn wait(start_month: usize, months: usize) -> Self {
        Self::new(ActionKind::Wait, start_month, months)
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn start_month(&self) -> usize {
        self.start_month
    }

    /// Tenor bought, or number of months waited.
    pub fn length(&self) -> usize {
        self.length
    }

    /// First month after this action completes.
    pub fn end_month(&self) -> usize {
        self.start_month + self.length
    }

    pub fn is_buy(&self) -> bool {
        self.kind == ActionKind::Buy
    }
}

impl fmt::Display for InvestmentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            return match (self.kind, self.length) {
                (ActionKind::Buy, len) => {
                    write!(f, "Month {}: buy {}-month bond", self.start_month, len)
                }
                (ActionKind::Wait, 1) => write!(f, "Month {}: wait for 1 month", self.start_month),
                (ActionKind::Wait, len) => {
                    write!(f, "Month {}: wait for {} months", self.start_month, len)
                }
            };
        }
        match self.kind {
            ActionKind::Buy => write!(f, "b{}", self.length),
            ActionKind::Wait => write!(f, "w{}", self.length),
        }
    }
}

/// Render a strategy as comma-joined compact tokens, e.g. `b3,w1,b2`.
pub fn format_path(path: &[InvestmentAction]) -> String {
    path.iter()
        .map(|action| action.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_display() {
        assert_eq!(InvestmentAction::buy(3, 12).to_string(), "b12");
        assert_eq!(InvestmentAction::wait(0, 2).to_string(), "w2");
    }

    #[test]
    fn test_verbose_display() {
        assert_eq!(
            format!("{:#}", InvestmentAction::wait(4, 1)),
            "Month 4: wait for 1 month"
        );
        assert_eq!(
            format!("{:#}", InvestmentAction::wait(4, 3)),
            "Month 4: wait for 3 months"
        );
    }

    #[test]
    fn test_format_path() {
        let path = [
            InvestmentAction::wait(0, 1),
            InvestmentAction::buy(1, 3),
            InvestmentAction::buy(4, 1),
        ];
        assert_eq!(format_path(&path), "w1,b3,b1");
        assert_eq!(format_path(&[]), "");
    }

    #[test]
    fn test_end_month() {
        assert_eq!(InvestmentAction::buy(2, 6).end_month(), 8);
    }

    #[test]
    #[should_panic(expected = "must be positive")]
    fn test_zero_length_action() {
        InvestmentAction::wait(0, 0);
    }

    #[test]
    fn test_try_new_rejects_zero_length() {
        assert_eq!(
            InvestmentAction::try_new(ActionKind::Buy, 2, 0),
            Err(ActionError::ZeroLength {
                kind: ActionKind::Buy,
                start_month: 2
            })
        );
        assert_eq!(
            InvestmentAction::try_new(ActionKind::Wait, 0, 3),
            Ok(InvestmentAction::wait(0, 3))
        );
    }

    #[test]
    fn test_json_round_trip() {
        let action = InvestmentAction::buy(4, 6);
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"kind":"buy","start_month":4,"length":6}"#);
        assert_eq!(serde_json::from_str::<InvestmentAction>(&json).unwrap(), action);
    }

    #[test]
    fn test_json_zero_length_rejected() {
        let err = serde_json::from_str::<InvestmentAction>(
            r#"{"kind":"wait","start_month":1,"length":0}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must last at least one month"));
    }
}
