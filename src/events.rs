// 11.0: every committed state change produces an event. used for audit trails and
// for notifying the collaborators around the vault. rejected calls produce none.

use crate::auth::Role;
use crate::types::{Address, Amount, PositionId, Ratio, SignedAmount, Timestamp};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(id: EventId, timestamp: Timestamp, payload: EventPayload) -> Self {
        Self {
            id,
            timestamp,
            payload,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventPayload {
    // Liquidity events
    LiquidityChanged(LiquidityChangedEvent),

    // Position events
    PositionOpened(PositionEvent),
    PositionClosed(PositionEvent),

    // Epoch events
    Rebalanced(RebalancedEvent),

    // Fee events
    FeesCollected(FeesCollectedEvent),
    FeeParameterChanged(FeeParameterChangedEvent),
    FeeCollectorChanged(FeeCollectorChangedEvent),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidityChangedEvent {
    pub amount: Amount,
    pub is_increase: bool,
    pub new_total: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionEvent {
    pub position: PositionId,
    pub utilized: Amount,
    pub available: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebalancedEvent {
    pub epoch_index: u64,
    pub epochs_closed: u64,
    pub total_before: Amount,
    pub net_change: SignedAmount,
    pub profit_fee: Amount,
    pub maintenance_fee: Amount,
    pub new_total: Amount,
    pub next_epoch_end: Timestamp,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeesCollectedEvent {
    pub collector: Address,
    pub amount: Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeParameter {
    ImmediateProfitFee,
    AnnualMaintenanceFee,
    BenchmarkProfit,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeParameterChangedEvent {
    pub parameter: FeeParameter,
    pub old_value: Ratio,
    pub new_value: Ratio,
    pub changed_by: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeCollectorChangedEvent {
    pub old_collector: Option<Address>,
    pub new_collector: Address,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_payload_tag() {
        let event = Event::new(
            EventId(1),
            Timestamp::from_secs(1_000),
            EventPayload::FeesCollected(FeesCollectedEvent {
                collector: Address(7),
                amount: Amount::from_units(1),
            }),
        );

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("FeesCollected"));

        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, EventId(1));
        assert!(matches!(back.payload, EventPayload::FeesCollected(ref e) if e.amount == Amount::from_units(1)));
    }
}
